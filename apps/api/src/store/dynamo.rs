use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::debug;

use crate::config::StoreConfig;
use crate::models::record::AnalysisRecord;
use crate::store::{Ack, RecordStore, StoreError};

/// DynamoDB-backed record store. One `PutItem` per record, keyed by `id`.
#[derive(Clone)]
pub struct DynamoRecordStore {
    client: Client,
    table_name: String,
}

impl DynamoRecordStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Constructs a client from static credentials, pointed at AWS or a local endpoint.
    pub async fn from_config(config: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone().unwrap_or_default(),
            config.secret_access_key.clone().unwrap_or_default(),
            None,
            None,
            "resume-analyzer-static",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        Self::new(Client::new(&sdk_config), config.table_name.clone())
    }
}

/// Maps a record onto DynamoDB string attributes.
pub fn record_item(record: &AnalysisRecord) -> HashMap<String, AttributeValue> {
    [
        ("id", record.id.to_string()),
        ("name", record.name.clone()),
        ("email", record.email.clone()),
        ("linkedin_profile", record.linkedin_profile.clone()),
        ("preferred_job_role", record.preferred_job_role.clone()),
        ("resume_text", record.resume_text.clone()),
        ("analysis", record.analysis.clone()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), AttributeValue::S(value)))
    .collect()
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn put(&self, record: &AnalysisRecord) -> Result<Ack, StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_item(record)))
            .send()
            .await
            .map_err(|e| StoreError::Write(DisplayErrorContext(&e).to_string()))?;

        debug!("Wrote record {} to {}", record.id, self.table_name);
        Ok(Ack { id: record.id })
    }
}
