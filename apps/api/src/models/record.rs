use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text fields collected from the form alongside the uploaded résumé.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionForm {
    pub name: String,
    pub email: String,
    pub linkedin_profile: String,
    pub preferred_job_role: String,
    pub job_description: String,
}

/// One interaction's form state once the résumé text has been extracted.
/// Lives only inside a session; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub linkedin_profile: String,
    pub preferred_job_role: String,
    pub resume_text: String,
    pub job_description: String,
}

impl Submission {
    pub fn from_form(form: SubmissionForm, resume_text: String) -> Self {
        Self {
            name: form.name,
            email: form.email,
            linkedin_profile: form.linkedin_profile,
            preferred_job_role: form.preferred_job_role,
            resume_text,
            job_description: form.job_description,
        }
    }
}

/// The persisted side record of a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub linkedin_profile: String,
    pub preferred_job_role: String,
    pub resume_text: String,
    pub analysis: String,
}

impl AnalysisRecord {
    /// Builds a record under a freshly generated v4 id.
    pub fn new(submission: &Submission, analysis: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: submission.name.clone(),
            email: submission.email.clone(),
            linkedin_profile: submission.linkedin_profile.clone(),
            preferred_job_role: submission.preferred_job_role.clone(),
            resume_text: submission.resume_text.clone(),
            analysis: analysis.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        Submission::from_form(
            SubmissionForm {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                linkedin_profile: "https://linkedin.com/in/ada".to_string(),
                preferred_job_role: "Backend Engineer".to_string(),
                job_description: "Senior backend engineer".to_string(),
            },
            "Experienced Python developer".to_string(),
        )
    }

    #[test]
    fn test_record_copies_submission_fields() {
        let sub = submission();
        let record = AnalysisRecord::new(&sub, "Match Score: 85/100");
        assert_eq!(record.name, sub.name);
        assert_eq!(record.email, sub.email);
        assert_eq!(record.linkedin_profile, sub.linkedin_profile);
        assert_eq!(record.preferred_job_role, sub.preferred_job_role);
        assert_eq!(record.resume_text, sub.resume_text);
        assert_eq!(record.analysis, "Match Score: 85/100");
    }

    #[test]
    fn test_each_record_gets_a_fresh_v4_id() {
        let sub = submission();
        let first = AnalysisRecord::new(&sub, "same");
        let second = AnalysisRecord::new(&sub, "same");
        assert_ne!(first.id, second.id);
        assert_eq!(first.id.get_version_num(), 4);
    }
}
