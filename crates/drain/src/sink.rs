//! Telemetry sinks

use async_trait::async_trait;
use crashlog_core::FailureRecord;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Why a sink did not accept a record
#[derive(Debug, Error)]
pub enum SinkError {
    /// The backend refused this record
    #[error("record rejected: {0}")]
    Rejected(String),

    /// The record could not be delivered
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Destination for drained records
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Deliver one record. `Ok` means the record may be deleted locally.
    async fn report(&self, record: &FailureRecord) -> Result<(), SinkError>;
}

#[async_trait]
impl<T: TelemetrySink + ?Sized> TelemetrySink for Arc<T> {
    async fn report(&self, record: &FailureRecord) -> Result<(), SinkError> {
        (**self).report(record).await
    }
}

/// Sink that emits each record as a `tracing` error event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl TelemetrySink for TracingSink {
    async fn report(&self, record: &FailureRecord) -> Result<(), SinkError> {
        error!(
            session_id = %record.session_id,
            captured_at = %record.captured_at,
            type_name = %record.type_name(),
            causes = record.causes.len(),
            "{}",
            record.message()
        );
        Ok(())
    }
}
