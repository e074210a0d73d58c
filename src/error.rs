//! Error types for the triage pipeline.

use crate::invoker::StageId;

/// Policy configuration errors, surfaced at load time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{policy} weights sum to {sum}, expected 100")]
    WeightSum { policy: &'static str, sum: u32 },

    #[error("priority cutoff A ({a}) must be greater than cutoff B ({b})")]
    PriorityOrder { a: u8, b: u8 },

    #[error("FIT_ALTA_CONF ({high}) must be >= FIT_OK ({ok})")]
    ThresholdOrder { high: u8, ok: u8 },

    #[error("duplicate role id: {0}")]
    DuplicateRole(String),

    #[error("role {role_id} has no required skills")]
    EmptySkillList { role_id: String },

    #[error("no owner configured for routing department {department}")]
    MissingOwner { department: String },

    #[error("default reply language {language} is not in the accepted set")]
    DefaultLanguageNotAccepted { language: String },

    #[error("unknown policy preset: {0}")]
    UnknownPreset(String),
}

/// A stage result that fails its closed-world schema contract.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field {field} out of range: {message}")]
    OutOfRange { field: &'static str, message: String },

    #[error("inconsistent result: {0}")]
    Inconsistent(String),
}

/// Text-generation boundary errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request to {provider} failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("{provider} returned status {status}: {body}")]
    BadStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure of a single stage invocation.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaError),
}

/// Failure of a whole workflow run.
///
/// Every stage failure carries the identity of the failing stage; a run
/// either fails with one of these or returns exactly one `RouterOutput`.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("stage {stage} failed: {source}")]
    Stage {
        stage: StageId,
        #[source]
        source: StageError,
    },
}

impl WorkflowError {
    /// The stage a failure originated from, if it got past preconditions.
    pub fn stage(&self) -> Option<StageId> {
        match self {
            Self::Precondition(_) => None,
            Self::Stage { stage, .. } => Some(*stage),
        }
    }
}
