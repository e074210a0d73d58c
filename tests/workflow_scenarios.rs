//! End-to-end runs of the triage workflow against a scripted generator.

use std::sync::Arc;

use async_trait::async_trait;

use inbox_triage::error::{LlmError, StageError, WorkflowError};
use inbox_triage::input::WorkflowInput;
use inbox_triage::invoker::StageId;
use inbox_triage::llm::{GenerationRequest, GenerationResponse, TextGenerator, Usage};
use inbox_triage::notify::NoopNotifier;
use inbox_triage::policy::presets;
use inbox_triage::schema::{FinalRoute, RouterOutput};
use inbox_triage::workflow::Orchestrator;

/// Canned replies, one per delegated stage. Stages are recognized by a
/// marker phrase in their instructions.
#[derive(Clone)]
struct TriageScript {
    guardrails: String,
    intent: String,
    cv_extract: String,
    sales_extract: String,
    draft: String,
}

impl Default for TriageScript {
    fn default() -> Self {
        Self {
            guardrails: pass_verdict("hello"),
            intent: r#"{"category": "other", "confidence": 0.5, "language": "en"}"#.into(),
            cv_extract: String::new(),
            sales_extract: String::new(),
            draft: r#"{"to": "reply@example.test", "cc": "", "subject": "Re: message", "body_markdown": "Thanks."}"#
                .into(),
        }
    }
}

fn pass_verdict(safe_text: &str) -> String {
    format!(
        r#"{{"pass": true, "safe_text": "{safe_text}", "flags": {{
            "moderation": {{"flagged": false, "categories": []}},
            "pii": {{"found": false, "redactions": 0}},
            "jailbreak": {{"suspected": false, "reason": ""}}
        }}}}"#
    )
}

struct ScriptedLlm {
    script: TriageScript,
}

#[async_trait]
impl TextGenerator for ScriptedLlm {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let i = &request.instructions;
        let content = if i.contains("guardrails screener") {
            self.script.guardrails.clone()
        } else if i.contains("intent classifier") {
            self.script.intent.clone()
        } else if i.contains("structured candidate data") {
            self.script.cv_extract.clone()
        } else if i.contains("qualify sales leads") {
            self.script.sales_extract.clone()
        } else {
            self.script.draft.clone()
        };
        Ok(GenerationResponse {
            content,
            usage: Usage::default(),
        })
    }
}

async fn run(script: TriageScript, text: &str) -> Result<RouterOutput, WorkflowError> {
    let orchestrator = Orchestrator::new(
        Arc::new(presets::aurora_agentics()),
        Arc::new(ScriptedLlm { script }),
    );
    orchestrator
        .run(WorkflowInput::text(text).unwrap(), &NoopNotifier)
        .await
}

#[tokio::test]
async fn unqualified_candidate_gets_rejection_with_reason() {
    let script = TriageScript {
        intent: r#"{"category": "cv", "confidence": 0.9, "language": "es"}"#.into(),
        cv_extract: r#"{
            "full_name": "Luis Vega", "email": "luis@example.test",
            "phone": "", "location": "Sevilla", "years_experience": 0,
            "skills": [], "target_department": "other",
            "role_guess": "unspecified", "availability": "not specified"
        }"#
        .into(),
        ..TriageScript::default()
    };

    let output = run(script, "Hola, busco trabajo").await.unwrap();

    assert_eq!(output.final_route, FinalRoute::HrCvReject);
    assert_eq!(output.payload["reason"], "no_vacancies");
    assert_eq!(output.payload["cv_extract"]["full_name"], "Luis Vega");
    assert_eq!(
        output.payload["owner_map"]["owner_email"],
        "talent@aurora-agentics.test"
    );
    assert!(output.payload.get("matched_roles").is_none());
}

#[tokio::test]
async fn strong_candidate_is_forwarded_with_scored_roles() {
    let script = TriageScript {
        intent: r#"{"category": "cv", "confidence": 0.97, "language": "es"}"#.into(),
        cv_extract: r#"{
            "full_name": "Ana Torres", "email": "ana@example.test",
            "phone": "+34 600 000 000", "location": "Madrid", "years_experience": 5,
            "skills": ["python", "ml", "pandas", "apis", "llms", "prompt_engineering"],
            "target_department": "engineering",
            "role_guess": "ML Engineer", "availability": "1 month"
        }"#
        .into(),
        ..TriageScript::default()
    };

    let output = run(script, "Adjunto mi CV para la vacante de ML").await.unwrap();

    assert_eq!(output.final_route, FinalRoute::HrCvForward);
    let roles = output.payload["matched_roles"].as_array().unwrap();
    assert!(!roles.is_empty());
    // Full overlap, 3 years over minimum, default language: 95 for ENG-ML-01.
    assert_eq!(roles[0]["role_id"], "ENG-ML-01");
    assert_eq!(roles[0]["match_score"], 95);
    // Scores are sorted descending.
    let scores: Vec<u64> = roles
        .iter()
        .map(|r| r["match_score"].as_u64().unwrap())
        .collect();
    let mut sorted = scores.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(scores, sorted);
    assert_eq!(output.payload["draft_email"]["to"], "reply@example.test");
}

#[tokio::test]
async fn weak_lead_is_qualified_down_to_priority_c() {
    let script = TriageScript {
        intent: r#"{"category": "sales", "confidence": 0.8, "language": "en"}"#.into(),
        sales_extract: r#"{
            "company": "", "contact_name": "Sam", "contact_email": "sam@gmail.com",
            "contact_phone": "", "intent_summary": "Curious about what you do.",
            "product_interest": [], "budget_hint": "", "timeline": "",
            "title": "", "lead_score": 90, "priority": "A"
        }"#
        .into(),
        ..TriageScript::default()
    };

    let output = run(script, "What do you folks do?").await.unwrap();

    assert_eq!(output.final_route, FinalRoute::SalesForward);
    // Only use-case clarity is present: 20 points, priority C, whatever the
    // model claimed.
    assert_eq!(output.payload["sales_extract"]["lead_score"], 20);
    assert_eq!(output.payload["sales_extract"]["priority"], "C");
    assert_eq!(
        output.payload["owner_map"]["owner_email"],
        "sales@aurora-agentics.test"
    );
}

#[tokio::test]
async fn unclassified_message_falls_through_to_front_desk() {
    let script = TriageScript {
        intent: r#"{"category": "other", "confidence": 0.4, "language": "pt"}"#.into(),
        ..TriageScript::default()
    };

    let output = run(script, "Olá, tenho uma dúvida").await.unwrap();

    assert_eq!(output.final_route, FinalRoute::Other);
    assert_eq!(
        output.payload["owner_map"]["owner_email"],
        "inbox@aurora-agentics.test"
    );
    assert_eq!(output.payload["owner_map"]["route_department"], "other");
    assert!(output.payload.get("cv_extract").is_none());
    assert!(output.payload.get("sales_extract").is_none());
}

#[tokio::test]
async fn blocked_message_carries_flags_and_nothing_else() {
    let script = TriageScript {
        guardrails: r#"{
            "pass": false, "safe_text": "[REDACTED]", "flags": {
                "moderation": {"flagged": true, "categories": ["harassment"]},
                "pii": {"found": true, "redactions": 2},
                "jailbreak": {"suspected": false, "reason": ""}
            }
        }"#
        .into(),
        ..TriageScript::default()
    };

    let output = run(script, "abusive content here").await.unwrap();

    assert_eq!(output.final_route, FinalRoute::GuardrailsBlock);
    assert_eq!(output.payload["safe_text"], "[REDACTED]");
    assert_eq!(output.payload["flags"]["pii"]["redactions"], 2);
    assert_eq!(
        output.payload["flags"]["moderation"]["categories"][0],
        "harassment"
    );
    assert!(output.payload.get("owner_map").is_none());
    assert!(output.payload.get("draft_email").is_none());
}

#[tokio::test]
async fn malformed_stage_output_fails_the_run_with_the_stage() {
    let script = TriageScript {
        intent: "I think this is probably a sales message?".into(),
        ..TriageScript::default()
    };

    let err = run(script, "hello").await.unwrap_err();

    assert_eq!(err.stage(), Some(StageId::Intent));
    assert!(matches!(
        err,
        WorkflowError::Stage {
            source: StageError::Schema(_),
            ..
        }
    ));
}

#[tokio::test]
async fn router_output_round_trips_through_json() {
    let script = TriageScript {
        intent: r#"{"category": "event", "confidence": 0.8, "language": "en"}"#.into(),
        ..TriageScript::default()
    };

    let output = run(script, "Speak at our conference?").await.unwrap();
    assert_eq!(output.final_route, FinalRoute::EventsForward);

    let json = serde_json::to_string(&output).unwrap();
    assert!(json.contains("\"events_forward\""));
    let parsed: RouterOutput = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.final_route, output.final_route);
    assert_eq!(parsed.payload, output.payload);
}

#[tokio::test]
async fn helios_policy_runs_the_same_pipeline() {
    let script = TriageScript {
        intent: r#"{"category": "sales", "confidence": 0.9, "language": "en"}"#.into(),
        sales_extract: r#"{
            "company": "Vulcan Foundry", "contact_name": "Rae",
            "contact_email": "rae@vulcan-foundry.test", "contact_phone": "",
            "intent_summary": "Retrofit two lines with robot arms.",
            "product_interest": ["Line_Retrofit"], "budget_hint": "300k USD",
            "timeline": "next quarter", "title": "Plant Manager",
            "lead_score": 0, "priority": "C"
        }"#
        .into(),
        ..TriageScript::default()
    };

    let orchestrator = Orchestrator::new(
        Arc::new(presets::helios_robotics()),
        Arc::new(ScriptedLlm { script }),
    );
    let output = orchestrator
        .run(
            WorkflowInput::text("We want to retrofit two lines").unwrap(),
            &NoopNotifier,
        )
        .await
        .unwrap();

    assert_eq!(output.final_route, FinalRoute::SalesForward);
    // All five Helios signals present: 25+20+15+20+20.
    assert_eq!(output.payload["sales_extract"]["lead_score"], 100);
    assert_eq!(output.payload["sales_extract"]["priority"], "A");
    assert_eq!(
        output.payload["owner_map"]["owner_email"],
        "sales@helios-robotics.test"
    );
}
