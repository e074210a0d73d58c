//! The triage workflow: guardrails, intent, routing, branch handling,
//! deterministic packaging.
//!
//! A run consumes one message and produces exactly one [`RouterOutput`] or
//! one [`WorkflowError`]. Branch selection, owner resolution, scoring and
//! packaging are computed locally; only interpretation of free text crosses
//! the generation boundary.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::input::WorkflowInput;
use crate::instructions;
use crate::invoker::{StageId, StageInvoker};
use crate::llm::TextGenerator;
use crate::notify::{ProgressNotifier, RunProgress};
use crate::policy::PolicyConfig;
use crate::schema::{
    CvExtract, DraftEmail, FinalRoute, GuardrailVerdict, Intent, IntentCategory, OwnerMapping,
    RouterOutput, SalesExtract,
};
use crate::scoring;

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Runs the triage pipeline against a fixed policy and generator.
pub struct Orchestrator {
    policy: Arc<PolicyConfig>,
    generator: Arc<dyn TextGenerator>,
}

impl Orchestrator {
    pub fn new(policy: Arc<PolicyConfig>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { policy, generator }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Process one message end to end.
    pub async fn run(
        &self,
        input: WorkflowInput,
        notifier: &dyn ProgressNotifier,
    ) -> Result<RouterOutput, WorkflowError> {
        let run_id = Uuid::new_v4();
        let progress = RunProgress::new(run_id, notifier);
        let invoker = StageInvoker::new(self.generator.as_ref(), &progress);
        let policy = &self.policy;

        tracing::info!(%run_id, "triage run started");

        let verdict: GuardrailVerdict = invoker
            .invoke(
                StageId::Guardrails,
                instructions::guardrails(policy),
                input.clone(),
            )
            .await?;

        if !verdict.passed {
            progress.branch_taken("guardrails_block");
            tracing::warn!(%run_id, "message blocked by guardrails");
            return Ok(self.package(
                &invoker,
                FinalRoute::GuardrailsBlock,
                json!({
                    "safe_text": verdict.safe_text,
                    "flags": to_json(&verdict.flags),
                }),
            ));
        }

        // The redacted text is canonical from here on. File and image parts
        // are carried through unchanged for the extraction stages.
        let screened = match &input {
            WorkflowInput::Text(_) => WorkflowInput::Text(verdict.safe_text.clone()),
            WorkflowInput::Parts(_) => input.clone(),
        };

        let intent: Intent = invoker
            .invoke(
                StageId::Intent,
                instructions::intent(policy),
                screened.clone(),
            )
            .await?;
        tracing::info!(
            %run_id,
            category = %intent.category,
            confidence = intent.confidence,
            "intent classified"
        );

        let department = intent.category.route_department();
        let owner = policy.owner_for(department);
        let owner_map = OwnerMapping {
            route_department: department,
            owner_email: owner.email.clone(),
            owner_name: owner.name.clone(),
        };
        invoker.record_local(StageId::OwnerMap, &owner_map);

        let output = match intent.category {
            IntentCategory::Cv => {
                progress.branch_taken("hr");
                self.run_cv_branch(&invoker, screened, &intent, &owner_map)
                    .await?
            }
            IntentCategory::Sales => {
                progress.branch_taken("sales");
                self.run_sales_branch(&invoker, screened, &owner_map).await?
            }
            IntentCategory::Event => {
                progress.branch_taken("events");
                let draft = self
                    .draft_ack(&invoker, &verdict.safe_text, &intent, &owner_map)
                    .await?;
                self.package(
                    &invoker,
                    FinalRoute::EventsForward,
                    json!({
                        "draft_email": to_json(&draft),
                        "owner_map": to_json(&owner_map),
                    }),
                )
            }
            IntentCategory::Other => {
                progress.branch_taken("other");
                let draft = self
                    .draft_ack(&invoker, &verdict.safe_text, &intent, &owner_map)
                    .await?;
                self.package(
                    &invoker,
                    FinalRoute::Other,
                    json!({
                        "draft_email": to_json(&draft),
                        "owner_map": to_json(&owner_map),
                    }),
                )
            }
        };

        tracing::info!(%run_id, final_route = %output.final_route, "triage run finished");
        Ok(output)
    }

    async fn run_cv_branch(
        &self,
        invoker: &StageInvoker<'_>,
        screened: WorkflowInput,
        intent: &Intent,
        owner_map: &OwnerMapping,
    ) -> Result<RouterOutput, WorkflowError> {
        let policy = &self.policy;

        let cv: CvExtract = invoker
            .invoke(StageId::CvExtract, instructions::cv_extract(policy), screened)
            .await?;

        let matching = scoring::match_candidate(&cv, intent.language, policy);
        invoker.record_local(StageId::CvMatch, &matching);

        match &matching.best_match {
            None => {
                let context = json!({
                    "candidate": to_json(&cv),
                    "reply_to": cv.email,
                });
                let draft: DraftEmail = invoker
                    .invoke(
                        StageId::DraftCvReject,
                        instructions::draft_cv_reject(policy),
                        context_input(&context)?,
                    )
                    .await?;
                Ok(self.package(
                    invoker,
                    FinalRoute::HrCvReject,
                    json!({
                        "reason": "no_vacancies",
                        "cv_extract": to_json(&cv),
                        "draft_email": to_json(&draft),
                        "owner_map": to_json(owner_map),
                    }),
                ))
            }
            Some(best) => {
                tracing::info!(
                    role_id = %best.role_id,
                    match_score = best.match_score,
                    "candidate matched"
                );
                let context = json!({
                    "candidate": to_json(&cv),
                    "match": to_json(&matching),
                    "send_to": owner_map.owner_email,
                });
                let draft: DraftEmail = invoker
                    .invoke(
                        StageId::DraftCvForward,
                        instructions::draft_cv_forward(policy),
                        context_input(&context)?,
                    )
                    .await?;
                Ok(self.package(
                    invoker,
                    FinalRoute::HrCvForward,
                    json!({
                        "cv_extract": to_json(&cv),
                        "matched_roles": to_json(&matching.matched_roles),
                        "draft_email": to_json(&draft),
                        "owner_map": to_json(owner_map),
                    }),
                ))
            }
        }
    }

    async fn run_sales_branch(
        &self,
        invoker: &StageInvoker<'_>,
        screened: WorkflowInput,
        owner_map: &OwnerMapping,
    ) -> Result<RouterOutput, WorkflowError> {
        let policy = &self.policy;

        let mut lead: SalesExtract = invoker
            .invoke(
                StageId::SalesExtract,
                instructions::sales_extract(policy),
                screened,
            )
            .await?;

        // The model's score is advisory; the policy weights decide.
        let signals = scoring::qualify_lead(&mut lead, &policy.sales_policy);
        tracing::debug!(?signals, lead_score = lead.lead_score, "lead qualified");

        let context = json!({
            "lead": to_json(&lead),
            "send_to": owner_map.owner_email,
        });
        let draft: DraftEmail = invoker
            .invoke(
                StageId::DraftSalesForward,
                instructions::draft_sales_forward(policy),
                context_input(&context)?,
            )
            .await?;

        Ok(self.package(
            invoker,
            FinalRoute::SalesForward,
            json!({
                "sales_extract": to_json(&lead),
                "draft_email": to_json(&draft),
                "owner_map": to_json(owner_map),
            }),
        ))
    }

    async fn draft_ack(
        &self,
        invoker: &StageInvoker<'_>,
        safe_text: &str,
        intent: &Intent,
        owner_map: &OwnerMapping,
    ) -> Result<DraftEmail, WorkflowError> {
        let context = json!({
            "message": safe_text,
            "category": to_json(&intent.category),
            "language": to_json(&intent.language),
            "owner": to_json(owner_map),
        });
        invoker
            .invoke(
                StageId::DraftGenericAck,
                instructions::draft_generic_ack(&self.policy),
                context_input(&context)?,
            )
            .await
    }

    fn package(
        &self,
        invoker: &StageInvoker<'_>,
        final_route: FinalRoute,
        payload: serde_json::Value,
    ) -> RouterOutput {
        let payload = match payload {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        let output = RouterOutput {
            final_route,
            payload,
        };
        invoker.record_local(StageId::Package, &output);
        output
    }
}

/// Render a draft stage's context object as its text input.
fn context_input(context: &serde_json::Value) -> Result<WorkflowInput, WorkflowError> {
    let text = serde_json::to_string_pretty(context)
        .map_err(|e| WorkflowError::Precondition(format!("unserializable draft context: {e}")))?;
    WorkflowInput::text(text)
}
