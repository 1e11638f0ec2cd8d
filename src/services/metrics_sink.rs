use std::io::Write;

use crate::errors::AnalysisError;
use crate::models::FrameRow;

/// Consumer of per-frame rows, called as each row is produced
pub trait MetricsSink {
    fn emit_row(&mut self, row: &FrameRow) -> Result<(), AnalysisError>;
}

/// Keeps every row in memory
#[derive(Debug, Default)]
pub struct RowCollector {
    rows: Vec<FrameRow>,
}

impl RowCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[FrameRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FrameRow> {
        self.rows
    }
}

impl MetricsSink for RowCollector {
    fn emit_row(&mut self, row: &FrameRow) -> Result<(), AnalysisError> {
        self.rows.push(row.clone());
        Ok(())
    }
}

/// Writes one JSON object per row
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> Result<(), AnalysisError> {
        self.writer
            .flush()
            .map_err(|e| AnalysisError::Sink(e.to_string()))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricsSink for JsonLinesSink<W> {
    fn emit_row(&mut self, row: &FrameRow) -> Result<(), AnalysisError> {
        serde_json::to_writer(&mut self.writer, row)
            .map_err(|e| AnalysisError::Sink(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| AnalysisError::Sink(e.to_string()))
    }
}
