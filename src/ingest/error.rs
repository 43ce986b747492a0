//! Ingestion error type.

use thiserror::Error;

/// Failure cases surfaced by the ingestion pipeline.
///
/// A sheet with missing headers is not an error by itself; it is skipped and
/// reported through [`NormalizedData`](crate::ingest::NormalizedData). The
/// only fatal normalization outcome is an empty merged record set.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No sheet produced a single valid record.
    #[error("no valid student data found in the workbook; check headers and content")]
    EmptyDataset,

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    Workbook(#[from] calamine::Error),
}
