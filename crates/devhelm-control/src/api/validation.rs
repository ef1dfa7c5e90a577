// Input validation for app-facing and agent-facing requests
//
// Rules run in order per field and the first failure wins, so each field
// reports at most one message. Lengths are counted in characters.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::common::ApiError;

// =============================================================================
// Limits
// =============================================================================

pub const AGENT_NAME_MIN: usize = 2;
pub const AGENT_NAME_MAX: usize = 255;
pub const AGENT_PROJECT_MIN: usize = 2;
pub const AGENT_PROJECT_MAX: usize = 10;
pub const LEAD_NAME_MIN: usize = 2;
pub const LEAD_NAME_MAX: usize = 255;
pub const EMAIL_MAX: usize = 255;
pub const EXTERNAL_ID_MAX: usize = 255;
pub const TASK_STATUS_MAX: usize = 50;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

// =============================================================================
// Collector
// =============================================================================

/// Collects the first failure per field
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_string()).or_insert(message);
    }

    fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Not blank (whitespace-only counts as blank)
    pub fn required(&mut self, field: &str, label: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, format!("{} is required", label));
        }
        self
    }

    /// Character length within `min..=max`, skipped if the field already failed
    pub fn length(
        &mut self,
        field: &str,
        label: &str,
        value: &str,
        min: Option<usize>,
        max: usize,
    ) -> &mut Self {
        if self.has_error(field) {
            return self;
        }
        let len = value.chars().count();
        if let Some(min) = min {
            if len < min {
                self.fail(
                    field,
                    format!("{} must be at least {} characters long", label, min),
                );
                return self;
            }
        }
        if len > max {
            tracing::warn!(field, len, max, "Field exceeds limit");
            self.fail(
                field,
                format!("{} cannot be longer than {} characters", label, max),
            );
        }
        self
    }

    pub fn email(&mut self, field: &str, label: &str, value: &str) -> &mut Self {
        if !self.has_error(field) && !EMAIL_RE.is_match(value) {
            self.fail(field, format!("{} must be a valid email address", label));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

// =============================================================================
// Request validators
// =============================================================================

/// Agent create and edit share the same rules
pub fn validate_agent_input(name: &str, project: &str) -> Result<(), ApiError> {
    Validator::new()
        .required("name", "Name", name)
        .length("name", "Name", name, Some(AGENT_NAME_MIN), AGENT_NAME_MAX)
        .required("project", "Project", project)
        .length(
            "project",
            "Project",
            project,
            Some(AGENT_PROJECT_MIN),
            AGENT_PROJECT_MAX,
        )
        .finish()
}

pub fn validate_lead_input(name: &str, email: &str) -> Result<(), ApiError> {
    Validator::new()
        .required("name", "Name", name)
        .length("name", "Name", name, Some(LEAD_NAME_MIN), LEAD_NAME_MAX)
        .required("email", "Email", email)
        .email("email", "Email", email)
        .length("email", "Email", email, None, EMAIL_MAX)
        .finish()
}

pub fn validate_task_input(
    jira_ticket_id: &str,
    github_pull_request_id: Option<&str>,
) -> Result<(), ApiError> {
    let mut v = Validator::new();
    v.required("jira_ticket_id", "Jira ticket id", jira_ticket_id)
        .length(
            "jira_ticket_id",
            "Jira ticket id",
            jira_ticket_id,
            None,
            EXTERNAL_ID_MAX,
        );
    if let Some(pr) = github_pull_request_id {
        v.length(
            "github_pull_request_id",
            "GitHub pull request id",
            pr,
            None,
            EXTERNAL_ID_MAX,
        );
    }
    v.finish()
}

pub fn validate_task_status(status: &str) -> Result<(), ApiError> {
    Validator::new()
        .required("status", "Status", status)
        .length("status", "Status", status, None, TASK_STATUS_MAX)
        .finish()
}

pub fn validate_feedback_input(
    feedback: &str,
    github_comment_id: Option<&str>,
) -> Result<(), ApiError> {
    let mut v = Validator::new();
    v.required("feedback", "Feedback", feedback);
    if let Some(comment) = github_comment_id {
        v.length(
            "github_comment_id",
            "GitHub comment id",
            comment,
            None,
            EXTERNAL_ID_MAX,
        );
    }
    v.finish()
}

pub fn validate_question_input(question: &str) -> Result<(), ApiError> {
    Validator::new()
        .required("question", "Question", question)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_errors(result: Result<(), ApiError>) -> BTreeMap<String, String> {
        match result {
            Err(ApiError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_agent_input() {
        assert!(validate_agent_input("Bot1", "DEV").is_ok());
        assert!(validate_agent_input(&"x".repeat(AGENT_NAME_MAX), &"P".repeat(10)).is_ok());
    }

    #[test]
    fn test_agent_required_fields() {
        let errs = field_errors(validate_agent_input("", "  "));
        assert_eq!(errs["name"], "Name is required");
        assert_eq!(errs["project"], "Project is required");
    }

    #[test]
    fn test_agent_length_limits() {
        let errs = field_errors(validate_agent_input("B", "PROJECTCODE"));
        assert_eq!(errs["name"], "Name must be at least 2 characters long");
        assert_eq!(errs["project"], "Project cannot be longer than 10 characters");

        let errs = field_errors(validate_agent_input(&"x".repeat(256), "DEV"));
        assert_eq!(errs["name"], "Name cannot be longer than 255 characters");
        assert!(!errs.contains_key("project"));
    }

    #[test]
    fn test_length_counts_characters() {
        // Ten multi-byte characters fit the project limit
        assert!(validate_agent_input("Bot1", "ÄÖÜÄÖÜÄÖÜÄ").is_ok());
    }

    #[test]
    fn test_lead_input() {
        assert!(validate_lead_input("Jane", "jane@example.com").is_ok());

        let errs = field_errors(validate_lead_input("Jane", "not-an-email"));
        assert_eq!(errs["email"], "Email must be a valid email address");

        let errs = field_errors(validate_lead_input("J", ""));
        assert_eq!(errs["name"], "Name must be at least 2 characters long");
        assert_eq!(errs["email"], "Email is required");

        let long = format!("{}@example.com", "a".repeat(250));
        let errs = field_errors(validate_lead_input("Jane", &long));
        assert_eq!(errs["email"], "Email cannot be longer than 255 characters");
    }

    #[test]
    fn test_task_inputs() {
        assert!(validate_task_input("DEV-1", None).is_ok());
        assert!(validate_task_input("DEV-1", Some("42")).is_ok());
        assert!(field_errors(validate_task_input("", None)).contains_key("jira_ticket_id"));
        assert!(validate_task_status("in_review").is_ok());
        assert!(field_errors(validate_task_status(&"s".repeat(51))).contains_key("status"));
        assert!(validate_feedback_input("Looks good", None).is_ok());
        assert!(field_errors(validate_feedback_input(" ", None)).contains_key("feedback"));
        assert!(field_errors(validate_question_input("")).contains_key("question"));
    }
}
