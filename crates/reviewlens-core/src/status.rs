//! Write-back of per-review processing status.

use async_trait::async_trait;

use crate::review::ProcessedTag;

/// Marks one review as analysed with the given simplified tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUpdate {
    pub review_id: String,
    pub tag: ProcessedTag,
}

/// Receives status updates as analysis batches complete.
///
/// Failures are reported to the caller, which logs them and carries on.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn mark_processed(&self, update: &ProcessedUpdate) -> anyhow::Result<()>;
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl StatusSink for NullSink {
    async fn mark_processed(&self, _update: &ProcessedUpdate) -> anyhow::Result<()> {
        Ok(())
    }
}
