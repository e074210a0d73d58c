//! Stage identities and the shared invocation path.
//!
//! Every delegated stage goes through [`StageInvoker::invoke`]: announce the
//! stage, send instructions plus input across the generation boundary, parse
//! the completion against the stage's schema, report the outcome. Failures
//! always carry the identity of the failing stage.

use serde::Serialize;

use crate::error::{StageError, WorkflowError};
use crate::input::WorkflowInput;
use crate::llm::{GenerationRequest, TextGenerator, Usage};
use crate::notify::{PREVIEW_LIMIT, RunProgress};
use crate::schema::{StageOutput, parse_stage_output};

/// Identity of each pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Guardrails,
    Intent,
    OwnerMap,
    CvExtract,
    CvMatch,
    SalesExtract,
    DraftCvReject,
    DraftCvForward,
    DraftSalesForward,
    DraftGenericAck,
    Package,
}

impl StageId {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Guardrails => "guardrails",
            Self::Intent => "intent",
            Self::OwnerMap => "owner_map",
            Self::CvExtract => "cv_extract",
            Self::CvMatch => "cv_match",
            Self::SalesExtract => "sales_extract",
            Self::DraftCvReject => "draft_cv_reject",
            Self::DraftCvForward => "draft_cv_forward",
            Self::DraftSalesForward => "draft_sales_forward",
            Self::DraftGenericAck => "draft_generic_ack",
            Self::Package => "package",
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared invocation path for delegated stages.
pub struct StageInvoker<'a> {
    generator: &'a dyn TextGenerator,
    progress: &'a RunProgress<'a>,
}

impl<'a> StageInvoker<'a> {
    pub fn new(generator: &'a dyn TextGenerator, progress: &'a RunProgress<'a>) -> Self {
        Self {
            generator,
            progress,
        }
    }

    /// Run one delegated stage and parse its typed output.
    pub async fn invoke<T: StageOutput>(
        &self,
        stage: StageId,
        instructions: String,
        input: WorkflowInput,
    ) -> Result<T, WorkflowError> {
        self.progress.stage_started(stage.label());
        self.progress
            .stage_input(stage.label(), &input.preview(PREVIEW_LIMIT));

        let response = self
            .generator
            .generate(GenerationRequest::new(instructions, input))
            .await
            .map_err(|e| fail(stage, StageError::Generation(e)))?;

        let output: T = parse_stage_output(&response.content)
            .map_err(|e| fail(stage, StageError::Schema(e)))?;

        self.progress
            .stage_output(stage.label(), &response.content, response.usage);
        Ok(output)
    }

    /// Record a stage computed locally, without a generation round-trip.
    pub fn record_local<T: Serialize>(&self, stage: StageId, output: &T) {
        self.progress.stage_started(stage.label());
        let preview = serde_json::to_string_pretty(output).unwrap_or_default();
        self.progress
            .stage_output(stage.label(), &preview, Usage::default());
    }
}

fn fail(stage: StageId, source: StageError) -> WorkflowError {
    tracing::warn!(stage = %stage, error = %source, "stage failed");
    WorkflowError::Stage { stage, source }
}
