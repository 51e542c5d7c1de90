//! Configuration handling for datapush

use std::path::PathBuf;

/// Default service-account key file, matching the layout the factory
/// deployments ship with.
pub const DEFAULT_CREDENTIALS_FILE: &str = "serviceAccountKey.json";

/// Default parent document id under the top-level `factories` collection.
pub const DEFAULT_FACTORY_ID: &str = "factory_002";

/// Default sub-collection that receives the row documents.
pub const DEFAULT_COLLECTION: &str = "raw_data";

/// Configuration for an upload run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the tabular data file to upload
    pub input_file: PathBuf,
    /// Path to the service-account key file
    pub credentials_file: PathBuf,
    /// Factory document id the rows are filed under
    pub factory_id: String,
    /// Sub-collection that receives the row documents
    pub collection: String,
    /// Overrides the project id from the key file
    pub project_id: Option<String>,
    /// For Excel files: which sheet to upload
    pub sheet_name: Option<String>,
    /// Parse and print documents without uploading
    pub dry_run: bool,
    /// Suppress the dataset summary and progress output
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            factory_id: DEFAULT_FACTORY_ID.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            project_id: None,
            sheet_name: None,
            dry_run: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input_file: PathBuf) -> Self {
        Self {
            input_file,
            ..Default::default()
        }
    }

    /// Set the service-account key file path
    pub fn with_credentials_file(mut self, path: PathBuf) -> Self {
        self.credentials_file = path;
        self
    }

    /// Set the factory document id
    pub fn with_factory_id(mut self, factory_id: impl Into<String>) -> Self {
        self.factory_id = factory_id.into();
        self
    }

    /// Set the destination sub-collection
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Override the project id from the key file
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}
