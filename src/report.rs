//! Terminal progress and summary output

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::firestore::CollectionPath;
use crate::model::Table;

const PROGRESS_EVERY: usize = 250;

/// Prints run output to stdout. Quiet mode drops everything except the
/// final success line.
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Pre-upload summary: row/column counts and the inferred schema
    pub fn dataset_summary(&self, path: &Path, table: &Table) {
        if self.quiet {
            return;
        }
        println!(
            "{}: {} rows × {} columns",
            path.display(),
            table.row_count(),
            table.column_count()
        );
        for col in &table.columns {
            println!("  {} ({})", col.name, col.inferred_type);
        }
        println!();
    }

    /// Progress tick, printed every [`PROGRESS_EVERY`] rows
    pub fn progress(&self, done: usize, total: usize) {
        if self.quiet || done == total || done % PROGRESS_EVERY != 0 {
            return;
        }
        println!("  {}/{} rows uploaded", done, total);
    }

    /// Final success line; always printed
    pub fn success(&self, documents: usize, path: &CollectionPath) -> Result<()> {
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(&mut stdout, "✔")?;
        stdout.reset()?;
        writeln!(
            &mut stdout,
            " Uploaded {} documents to {}",
            documents, path
        )?;
        Ok(())
    }

    /// Dry-run closing line; always printed
    pub fn dry_run_summary(&self, documents: usize, path: &CollectionPath) -> Result<()> {
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(&mut stdout, "dry-run")?;
        stdout.reset()?;
        writeln!(
            &mut stdout,
            ": {} documents would be uploaded to {}",
            documents, path
        )?;
        Ok(())
    }
}
