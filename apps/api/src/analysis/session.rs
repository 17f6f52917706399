//! Per-session analysis state machine.
//!
//! `AwaitingInput → ExtractedText → Analyzing → AnalysisReady`, with every
//! transition guarded. A failed step leaves the session in the state it was in
//! before the step started.

use std::fmt;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::extract::{ExtractionError, TextExtractor};
use crate::models::record::{Submission, SubmissionForm};

pub const DOWNLOAD_FILE_NAME: &str = "analysis.txt";
pub const DOWNLOAD_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StateKind {
    AwaitingInput,
    ExtractedText,
    Analyzing,
    AnalysisReady,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::AwaitingInput => "AwaitingInput",
            StateKind::ExtractedText => "ExtractedText",
            StateKind::Analyzing => "Analyzing",
            StateKind::AnalysisReady => "AnalysisReady",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    MissingInput(&'static str),

    #[error("text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("no text could be extracted from the uploaded resume")]
    EmptyResume,

    #[error("cannot {action} while the session is in {from}")]
    InvalidTransition {
        from: StateKind,
        action: &'static str,
    },
}

/// Result of a successful analysis, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    pub analysis: String,
    pub record_id: Uuid,
    /// Whether the side record reached the store.
    pub persisted: bool,
}

/// The analysis as a plain-text file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisDownload {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl AnalysisDownload {
    pub fn from_analysis(analysis: &str) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME,
            content_type: DOWNLOAD_CONTENT_TYPE,
            body: Bytes::copy_from_slice(analysis.as_bytes()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionState {
    AwaitingInput,
    ExtractedText {
        submission: Submission,
    },
    Analyzing {
        submission: Submission,
    },
    AnalysisReady {
        submission: Submission,
        outcome: AnalysisOutcome,
    },
}

impl SessionState {
    pub fn kind(&self) -> StateKind {
        match self {
            SessionState::AwaitingInput => StateKind::AwaitingInput,
            SessionState::ExtractedText { .. } => StateKind::ExtractedText,
            SessionState::Analyzing { .. } => StateKind::Analyzing,
            SessionState::AnalysisReady { .. } => StateKind::AnalysisReady,
        }
    }

    pub fn submission(&self) -> Option<&Submission> {
        match self {
            SessionState::AwaitingInput => None,
            SessionState::ExtractedText { submission }
            | SessionState::Analyzing { submission }
            | SessionState::AnalysisReady { submission, .. } => Some(submission),
        }
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        match self {
            SessionState::AnalysisReady { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}

/// One user's form state. All mutable state for an interaction lives here.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    state: SessionState,
    last_active: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::AwaitingInput,
            last_active: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// `AwaitingInput → ExtractedText`.
    ///
    /// A fresh upload always starts a new submission, so any earlier result is
    /// discarded first. Requires a PDF and a non-blank job description; on any
    /// failure the session is left in `AwaitingInput`.
    pub fn accept_input(
        &mut self,
        form: SubmissionForm,
        pdf: Option<&[u8]>,
        extractor: &dyn TextExtractor,
    ) -> Result<(), SessionError> {
        self.touch();
        if self.kind() == StateKind::Analyzing {
            return Err(SessionError::InvalidTransition {
                from: StateKind::Analyzing,
                action: "upload a resume",
            });
        }
        self.state = SessionState::AwaitingInput;

        let pdf = pdf
            .filter(|bytes| !bytes.is_empty())
            .ok_or(SessionError::MissingInput("a PDF resume is required"))?;
        if form.job_description.trim().is_empty() {
            return Err(SessionError::MissingInput("a job description is required"));
        }

        let resume_text = extractor.extract(pdf)?;
        if resume_text.trim().is_empty() {
            return Err(SessionError::EmptyResume);
        }

        self.state = SessionState::ExtractedText {
            submission: Submission::from_form(form, resume_text),
        };
        Ok(())
    }

    /// `ExtractedText → Analyzing`. Hands back the submission to analyze.
    pub fn begin_analysis(&mut self) -> Result<Submission, SessionError> {
        self.touch();
        match std::mem::replace(&mut self.state, SessionState::AwaitingInput) {
            SessionState::ExtractedText { submission } => {
                self.state = SessionState::Analyzing {
                    submission: submission.clone(),
                };
                Ok(submission)
            }
            other => {
                let from = other.kind();
                self.state = other;
                Err(SessionError::InvalidTransition {
                    from,
                    action: "start an analysis",
                })
            }
        }
    }

    /// `Analyzing → AnalysisReady`.
    pub fn complete_analysis(&mut self, outcome: AnalysisOutcome) -> Result<(), SessionError> {
        self.touch();
        match std::mem::replace(&mut self.state, SessionState::AwaitingInput) {
            SessionState::Analyzing { submission } => {
                self.state = SessionState::AnalysisReady {
                    submission,
                    outcome,
                };
                Ok(())
            }
            other => {
                let from = other.kind();
                self.state = other;
                Err(SessionError::InvalidTransition {
                    from,
                    action: "complete an analysis",
                })
            }
        }
    }

    /// `Analyzing → ExtractedText`, after a failed analysis.
    pub fn abort_analysis(&mut self) -> Result<(), SessionError> {
        self.touch();
        match std::mem::replace(&mut self.state, SessionState::AwaitingInput) {
            SessionState::Analyzing { submission } => {
                self.state = SessionState::ExtractedText { submission };
                Ok(())
            }
            other => {
                let from = other.kind();
                self.state = other;
                Err(SessionError::InvalidTransition {
                    from,
                    action: "abort an analysis",
                })
            }
        }
    }

    /// Starts a new submission.
    pub fn reset(&mut self) {
        self.touch();
        self.state = SessionState::AwaitingInput;
    }

    /// The downloadable analysis; only available once the analysis is ready.
    pub fn download(&self) -> Result<AnalysisDownload, SessionError> {
        self.state
            .outcome()
            .map(|outcome| AnalysisDownload::from_analysis(&outcome.analysis))
            .ok_or(SessionError::InvalidTransition {
                from: self.kind(),
                action: "download the analysis",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{test_pdf, PdfTextExtractor};

    fn form(job_description: &str) -> SubmissionForm {
        SubmissionForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            linkedin_profile: String::new(),
            preferred_job_role: "Backend Engineer".to_string(),
            job_description: job_description.to_string(),
        }
    }

    fn outcome(analysis: &str) -> AnalysisOutcome {
        AnalysisOutcome {
            analysis: analysis.to_string(),
            record_id: Uuid::new_v4(),
            persisted: true,
        }
    }

    fn extracted_session() -> Session {
        let pdf = test_pdf(&[Some("Rust and Python engineer")]);
        let mut session = Session::new();
        session
            .accept_input(form("Senior Rust role"), Some(&pdf), &PdfTextExtractor)
            .unwrap();
        session
    }

    #[test]
    fn test_new_session_awaits_input() {
        let session = Session::new();
        assert_eq!(session.kind(), StateKind::AwaitingInput);
        assert!(session.state().submission().is_none());
    }

    #[test]
    fn test_valid_input_moves_to_extracted_text() {
        let session = extracted_session();
        assert_eq!(session.kind(), StateKind::ExtractedText);
        let submission = session.state().submission().unwrap();
        assert!(submission.resume_text.contains("Rust and Python engineer"));
        assert_eq!(submission.job_description, "Senior Rust role");
        assert_eq!(submission.name, "Ada");
    }

    #[test]
    fn test_empty_job_description_stays_awaiting_input() {
        let pdf = test_pdf(&[Some("Valid resume")]);
        let mut session = Session::new();
        for jd in ["", "   \n\t"] {
            let err = session
                .accept_input(form(jd), Some(&pdf), &PdfTextExtractor)
                .unwrap_err();
            assert!(matches!(err, SessionError::MissingInput(_)));
            assert_eq!(session.kind(), StateKind::AwaitingInput);
        }
    }

    #[test]
    fn test_missing_pdf_stays_awaiting_input() {
        let mut session = Session::new();
        let err = session
            .accept_input(form("JD"), None, &PdfTextExtractor)
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingInput(_)));
        let err = session
            .accept_input(form("JD"), Some(&[]), &PdfTextExtractor)
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingInput(_)));
        assert_eq!(session.kind(), StateKind::AwaitingInput);
    }

    #[test]
    fn test_invalid_pdf_stays_awaiting_input() {
        let mut session = Session::new();
        let err = session
            .accept_input(form("JD"), Some(b"not a pdf"), &PdfTextExtractor)
            .unwrap_err();
        assert!(matches!(err, SessionError::Extraction(_)));
        assert_eq!(session.kind(), StateKind::AwaitingInput);
    }

    #[test]
    fn test_pdf_without_text_is_rejected() {
        let pdf = test_pdf(&[None]);
        let mut session = Session::new();
        let err = session
            .accept_input(form("JD"), Some(&pdf), &PdfTextExtractor)
            .unwrap_err();
        assert!(matches!(err, SessionError::EmptyResume));
        assert_eq!(session.kind(), StateKind::AwaitingInput);
    }

    #[test]
    fn test_begin_analysis_requires_extracted_text() {
        let mut session = Session::new();
        let err = session.begin_analysis().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                from: StateKind::AwaitingInput,
                ..
            }
        ));
        assert_eq!(session.kind(), StateKind::AwaitingInput);
    }

    #[test]
    fn test_full_happy_path() {
        let mut session = extracted_session();
        let submission = session.begin_analysis().unwrap();
        assert_eq!(session.kind(), StateKind::Analyzing);
        assert!(submission.resume_text.contains("Rust and Python engineer"));

        session
            .complete_analysis(outcome("Match Score: 85/100"))
            .unwrap();
        assert_eq!(session.kind(), StateKind::AnalysisReady);
        assert_eq!(
            session.state().outcome().unwrap().analysis,
            "Match Score: 85/100"
        );
    }

    #[test]
    fn test_abort_returns_to_extracted_text() {
        let mut session = extracted_session();
        session.begin_analysis().unwrap();
        session.abort_analysis().unwrap();
        assert_eq!(session.kind(), StateKind::ExtractedText);
        assert!(session.state().outcome().is_none());
        // The same submission can be analyzed again.
        assert!(session.begin_analysis().is_ok());
    }

    #[test]
    fn test_complete_requires_analyzing() {
        let mut session = extracted_session();
        assert!(session.complete_analysis(outcome("x")).is_err());
        assert_eq!(session.kind(), StateKind::ExtractedText);
    }

    #[test]
    fn test_upload_rejected_while_analyzing() {
        let mut session = extracted_session();
        session.begin_analysis().unwrap();
        let pdf = test_pdf(&[Some("Other resume")]);
        let err = session
            .accept_input(form("Other JD"), Some(&pdf), &PdfTextExtractor)
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
        assert_eq!(session.kind(), StateKind::Analyzing);
    }

    #[test]
    fn test_new_upload_after_ready_starts_new_submission() {
        let mut session = extracted_session();
        session.begin_analysis().unwrap();
        session.complete_analysis(outcome("first")).unwrap();

        let pdf = test_pdf(&[Some("Second resume")]);
        session
            .accept_input(form("Second JD"), Some(&pdf), &PdfTextExtractor)
            .unwrap();
        assert_eq!(session.kind(), StateKind::ExtractedText);
        assert!(session.download().is_err());
    }

    #[test]
    fn test_reset_returns_to_awaiting_input() {
        let mut session = extracted_session();
        session.reset();
        assert_eq!(session.kind(), StateKind::AwaitingInput);
    }

    #[test]
    fn test_download_matches_analysis_bytes() {
        let analysis = "Match Score: 85/100\n\nStrengths:\n- Python: 5 years ✓";
        let mut session = extracted_session();
        session.begin_analysis().unwrap();
        session.complete_analysis(outcome(analysis)).unwrap();

        let download = session.download().unwrap();
        assert_eq!(download.file_name, "analysis.txt");
        assert!(download.content_type.starts_with("text/plain"));
        assert_eq!(download.body, analysis.as_bytes());
    }

    #[test]
    fn test_download_unavailable_before_ready() {
        let session = extracted_session();
        assert!(matches!(
            session.download().unwrap_err(),
            SessionError::InvalidTransition {
                from: StateKind::ExtractedText,
                ..
            }
        ));
    }
}
