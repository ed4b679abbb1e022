//! CSV results writer.

use std::path::Path;

use tracing::info;

use crate::domain::analysis::ResultsTable;
use crate::domain::error::CrossbenchError;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Write the table to any sink; used for files and stdout alike.
    pub fn write_to<W: std::io::Write>(
        &self,
        table: &ResultsTable,
        sink: W,
    ) -> Result<(), CrossbenchError> {
        let mut wtr = csv::Writer::from_writer(sink);
        wtr.write_record(&table.headers).map_err(csv_error)?;
        for row in &table.rows {
            wtr.write_record(row.cells()).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn csv_error(e: csv::Error) -> CrossbenchError {
    CrossbenchError::Data {
        reason: format!("CSV write error: {}", e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, table: &ResultsTable, output_path: &Path) -> Result<(), CrossbenchError> {
        let file = std::fs::File::create(output_path)?;
        self.write_to(table, file)?;
        info!(path = %output_path.display(), rows = table.len(), "results written");
        Ok(())
    }
}
