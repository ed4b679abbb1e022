//! Results output port trait.

use std::path::Path;

use crate::domain::analysis::ResultsTable;
use crate::domain::error::CrossbenchError;

/// Port for writing the per-bar results table.
pub trait ReportPort {
    fn write(&self, table: &ResultsTable, output_path: &Path) -> Result<(), CrossbenchError>;
}
