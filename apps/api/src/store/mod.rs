//! Write-only persistence of analysis records.
//!
//! Persistence is a side record: callers receive a `Result` and decide what a
//! failure means for them. The analysis flow logs it and carries on.

pub mod dynamo;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::models::record::AnalysisRecord;

pub use dynamo::DynamoRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store is not configured (missing AWS credentials)")]
    NotConfigured,

    #[error("failed to write record: {0}")]
    Write(String),
}

/// Acknowledgement of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub id: Uuid,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upserts the record under its id.
    async fn put(&self, record: &AnalysisRecord) -> Result<Ack, StoreError>;
}

/// Stand-in used when store credentials are absent. Every write fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRecordStore;

#[async_trait]
impl RecordStore for UnconfiguredRecordStore {
    async fn put(&self, _record: &AnalysisRecord) -> Result<Ack, StoreError> {
        Err(StoreError::NotConfigured)
    }
}

/// Picks the DynamoDB store when credentials are configured, otherwise the
/// always-failing stand-in.
pub async fn build_record_store(config: &StoreConfig) -> Arc<dyn RecordStore> {
    if !config.has_credentials() {
        warn!("AWS credentials not set; analysis records will not be persisted");
        return Arc::new(UnconfiguredRecordStore);
    }

    let store = DynamoRecordStore::from_config(config).await;
    info!(
        "DynamoDB record store initialized (table: {}, region: {})",
        config.table_name, config.region
    );
    Arc::new(store)
}
