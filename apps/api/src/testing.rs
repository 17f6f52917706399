//! Test doubles for the completion and record-store seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{CompletionClient, CompletionError};
use crate::models::record::AnalysisRecord;
use crate::store::{Ack, RecordStore, StoreError};

/// Returns a fixed reply and remembers every prompt it was given.
pub struct StubCompletion {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Simulates a provider outage.
#[derive(Default)]
pub struct FailingCompletion {
    calls: AtomicUsize,
}

impl FailingCompletion {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for FailingCompletion {
    fn model(&self) -> &str {
        "failing-model"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CompletionError::Api {
            status: 503,
            message: "model overloaded".to_string(),
        })
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<AnalysisRecord>>,
}

impl MemoryRecordStore {
    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(&self, record: &AnalysisRecord) -> Result<Ack, StoreError> {
        let mut records = self.records.lock().unwrap();
        records.retain(|r| r.id != record.id);
        records.push(record.clone());
        Ok(Ack { id: record.id })
    }
}

/// Rejects every write, like a throttled or unauthorized table.
#[derive(Default)]
pub struct FailingRecordStore {
    attempts: AtomicUsize,
}

impl FailingRecordStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn put(&self, _record: &AnalysisRecord) -> Result<Ack, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Write(
            "ProvisionedThroughputExceededException".to_string(),
        ))
    }
}
