//! Runs one analysis for a session: prompt → completion → record → ready.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::prompts::build_prompt;
use crate::analysis::session::{AnalysisOutcome, Session, SessionError, StateKind};
use crate::llm_client::{CompletionClient, CompletionError, ConfigurationError};
use crate::models::record::AnalysisRecord;
use crate::store::RecordStore;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("analysis is unavailable: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("analysis failed: {0}")]
    Completion(#[from] CompletionError),
}

/// Puts the session back to `ExtractedText` if an analysis is dropped while
/// still `Analyzing`, e.g. when the client disconnects mid-request.
struct AnalyzingGuard<'a> {
    session: &'a mut Session,
}

impl Drop for AnalyzingGuard<'_> {
    fn drop(&mut self) {
        if self.session.kind() != StateKind::Analyzing {
            return;
        }
        if self.session.abort_analysis().is_ok() {
            warn!("Session {}: analysis cancelled", self.session.id());
        }
    }
}

/// Sequences the completion client and the record store for a session.
pub struct Analyzer {
    /// `None` when no API key was configured at startup.
    completion: Option<Arc<dyn CompletionClient>>,
    store: Arc<dyn RecordStore>,
    /// Cosmetic pause before the completion call. Zero disables it.
    delay: Duration,
}

impl Analyzer {
    pub fn new(
        completion: Option<Arc<dyn CompletionClient>>,
        store: Arc<dyn RecordStore>,
        delay: Duration,
    ) -> Self {
        Self {
            completion,
            store,
            delay,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.completion.is_some()
    }

    /// `ExtractedText → Analyzing → AnalysisReady`.
    ///
    /// A completion failure returns the session to `ExtractedText` and writes
    /// nothing. A store failure is logged and only clears `persisted`.
    pub async fn run(&self, session: &mut Session) -> Result<AnalysisOutcome, AnalysisError> {
        let completion = self
            .completion
            .as_ref()
            .ok_or(ConfigurationError::MissingApiKey)?;

        let submission = session.begin_analysis()?;
        let mut guard = AnalyzingGuard { session };
        let prompt = build_prompt(&submission.resume_text, &submission.job_description);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let analysis = match completion.complete(&prompt).await {
            Ok(analysis) if !analysis.trim().is_empty() => analysis,
            Ok(_) => {
                guard.session.abort_analysis()?;
                error!(
                    "Session {}: model returned empty analysis",
                    guard.session.id()
                );
                return Err(CompletionError::EmptyContent.into());
            }
            Err(e) => {
                guard.session.abort_analysis()?;
                error!("Session {}: completion failed: {e}", guard.session.id());
                return Err(e.into());
            }
        };

        let record = AnalysisRecord::new(&submission, &analysis);
        let persisted = match self.store.put(&record).await {
            Ok(ack) => {
                info!("Stored analysis record {}", ack.id);
                true
            }
            Err(e) => {
                warn!("Analysis record {} not stored: {e}", record.id);
                false
            }
        };

        let outcome = AnalysisOutcome {
            analysis,
            record_id: record.id,
            persisted,
        };
        guard.session.complete_analysis(outcome.clone())?;
        Ok(outcome)
    }
}
