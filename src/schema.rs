//! Strict data contracts for every stage output.
//!
//! Every schema rejects undeclared fields (`deny_unknown_fields`) and enforces
//! declared ranges through `validate()`. A stage result that fails either check
//! is a hard stage failure — downstream branching depends on these invariants
//! holding exactly, so nothing is clamped or coerced.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

// ── Shared enums ────────────────────────────────────────────────────

/// Message language as detected by the intent classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
    Pt,
    Fr,
    Other,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Es => "es",
            Self::En => "en",
            Self::Pt => "pt",
            Self::Fr => "fr",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Intent category driving branch selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentCategory {
    Cv,
    Sales,
    Event,
    Other,
}

impl IntentCategory {
    /// Routing department responsible for this category.
    pub fn route_department(self) -> RouteDepartment {
        match self {
            Self::Cv => RouteDepartment::Hr,
            Self::Sales => RouteDepartment::Sales,
            Self::Event => RouteDepartment::Events,
            Self::Other => RouteDepartment::Other,
        }
    }
}

impl std::fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Cv => "cv",
            Self::Sales => "sales",
            Self::Event => "event",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Internal department an inquiry is routed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RouteDepartment {
    Hr,
    Sales,
    Events,
    Other,
}

impl RouteDepartment {
    pub const ALL: [Self; 4] = [Self::Hr, Self::Sales, Self::Events, Self::Other];
}

impl std::fmt::Display for RouteDepartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Hr => "hr",
            Self::Sales => "sales",
            Self::Events => "events",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Department a candidate is targeting, as extracted from their CV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetDepartment {
    Engineering,
    Sales,
    Marketing,
    Hr,
    Operations,
    Finance,
    It,
    Other,
}

/// Sales lead urgency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    A,
    B,
    C,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(label)
    }
}

/// Terminal classification of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalRoute {
    HrCvReject,
    HrCvForward,
    SalesForward,
    EventsForward,
    Other,
    GuardrailsBlock,
}

impl std::fmt::Display for FinalRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::HrCvReject => "hr_cv_reject",
            Self::HrCvForward => "hr_cv_forward",
            Self::SalesForward => "sales_forward",
            Self::EventsForward => "events_forward",
            Self::Other => "other",
            Self::GuardrailsBlock => "guardrails_block",
        };
        f.write_str(label)
    }
}

// ── Stage output trait ──────────────────────────────────────────────

/// Contract every stage output type satisfies: strict deserialization plus
/// explicit range/consistency validation.
pub trait StageOutput: DeserializeOwned + Serialize + Send {
    fn validate(&self) -> Result<(), SchemaError>;
}

// ── Guardrails ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationFlags {
    pub flagged: bool,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PiiFlags {
    pub found: bool,
    pub redactions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JailbreakFlags {
    pub suspected: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardrailFlags {
    pub moderation: ModerationFlags,
    pub pii: PiiFlags,
    pub jailbreak: JailbreakFlags,
}

/// Safety screening verdict. If `passed` is false the run must not proceed
/// past the Guardrails stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardrailVerdict {
    #[serde(rename = "pass")]
    pub passed: bool,
    pub safe_text: String,
    pub flags: GuardrailFlags,
}

impl StageOutput for GuardrailVerdict {
    fn validate(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

// ── Intent ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Intent {
    pub category: IntentCategory,
    pub confidence: f64,
    pub language: Language,
}

impl StageOutput for Intent {
    fn validate(&self) -> Result<(), SchemaError> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(SchemaError::OutOfRange {
                field: "confidence",
                message: format!("{} not in [0, 1]", self.confidence),
            });
        }
        Ok(())
    }
}

// ── Owner mapping ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerMapping {
    pub route_department: RouteDepartment,
    pub owner_email: String,
    pub owner_name: String,
}

impl StageOutput for OwnerMapping {
    fn validate(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

// ── CV branch ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CvExtract {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub years_experience: u32,
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    pub target_department: TargetDepartment,
    pub role_guess: String,
    pub availability: String,
}

impl StageOutput for CvExtract {
    fn validate(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// One open role scored against a candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleMatch {
    pub role_id: String,
    pub title: String,
    pub department: String,
    pub match_score: u8,
    pub why: String,
}

/// Result of matching a candidate against all configured roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CvMatchResult {
    pub vacancies_found: bool,
    pub best_match: Option<RoleMatch>,
    pub matched_roles: Vec<RoleMatch>,
}

impl StageOutput for CvMatchResult {
    fn validate(&self) -> Result<(), SchemaError> {
        for role in self
            .matched_roles
            .iter()
            .chain(self.best_match.as_slice())
        {
            if role.match_score > 100 {
                return Err(SchemaError::OutOfRange {
                    field: "match_score",
                    message: format!("{} not in [0, 100]", role.match_score),
                });
            }
        }
        if self.best_match.is_some() != !self.matched_roles.is_empty() {
            return Err(SchemaError::Inconsistent(
                "best_match must be present exactly when matched_roles is non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Sales branch ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalesExtract {
    pub company: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub intent_summary: String,
    pub product_interest: Vec<String>,
    pub budget_hint: String,
    pub timeline: String,
    pub title: String,
    pub lead_score: u8,
    pub priority: Priority,
}

impl StageOutput for SalesExtract {
    fn validate(&self) -> Result<(), SchemaError> {
        if self.lead_score > 100 {
            return Err(SchemaError::OutOfRange {
                field: "lead_score",
                message: format!("{} not in [0, 100]", self.lead_score),
            });
        }
        Ok(())
    }
}

// ── Drafts & terminal output ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DraftEmail {
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub body_markdown: String,
}

impl StageOutput for DraftEmail {
    fn validate(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// The terminal packaged output of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterOutput {
    pub final_route: FinalRoute,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

// ── Parsing ─────────────────────────────────────────────────────────

/// Parse a raw completion into a validated stage output.
///
/// The generator is untrusted input: the JSON object is extracted from
/// whatever wrapping the model produced, deserialized with closed-world
/// rules, then range-checked.
pub fn parse_stage_output<T: StageOutput>(raw: &str) -> Result<T, SchemaError> {
    let json = extract_json_object(raw);
    let value: T = serde_json::from_str(&json)?;
    value.validate()?;
    Ok(value)
}

/// Extract a JSON object from model output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guardrail_verdict_uses_pass_wire_name() {
        let raw = r#"{
            "pass": false,
            "safe_text": "redacted",
            "flags": {
                "moderation": {"flagged": true, "categories": ["violence"]},
                "pii": {"found": false, "redactions": 0},
                "jailbreak": {"suspected": false, "reason": ""}
            }
        }"#;
        let verdict: GuardrailVerdict = parse_stage_output(raw).unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.flags.moderation.categories, vec!["violence"]);

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["pass"], false);
        assert!(json.get("passed").is_none());
    }

    #[test]
    fn unknown_fields_rejected() {
        let raw = r#"{"category": "cv", "confidence": 0.9, "language": "es", "note": "hi"}"#;
        let result = parse_stage_output::<Intent>(raw);
        assert!(matches!(result, Err(SchemaError::Json(_))));
    }

    #[test]
    fn confidence_out_of_range_rejected_not_clamped() {
        let raw = r#"{"category": "cv", "confidence": 1.5, "language": "es"}"#;
        let result = parse_stage_output::<Intent>(raw);
        assert!(matches!(
            result,
            Err(SchemaError::OutOfRange {
                field: "confidence",
                ..
            })
        ));
    }

    #[test]
    fn unknown_enum_value_rejected() {
        let raw = r#"{"category": "spam", "confidence": 0.5, "language": "es"}"#;
        assert!(parse_stage_output::<Intent>(raw).is_err());
    }

    #[test]
    fn negative_years_experience_rejected() {
        let raw = r#"{
            "full_name": "X", "email": "x@y.z", "phone": "", "location": "",
            "years_experience": -1, "skills": [], "target_department": "engineering",
            "role_guess": "", "availability": ""
        }"#;
        assert!(parse_stage_output::<CvExtract>(raw).is_err());
    }

    #[test]
    fn cv_extract_certifications_default_empty() {
        let raw = r#"{
            "full_name": "Ana", "email": "ana@x.test", "phone": "", "location": "Madrid",
            "years_experience": 3, "skills": ["python"], "target_department": "engineering",
            "role_guess": "ML Engineer", "availability": "now"
        }"#;
        let cv: CvExtract = parse_stage_output(raw).unwrap();
        assert!(cv.certifications.is_empty());
    }

    #[test]
    fn match_result_best_match_iff_matched_roles() {
        let inconsistent = CvMatchResult {
            vacancies_found: true,
            best_match: None,
            matched_roles: vec![RoleMatch {
                role_id: "R1".into(),
                title: "T".into(),
                department: "Engineering".into(),
                match_score: 80,
                why: "overlap".into(),
            }],
        };
        assert!(matches!(
            inconsistent.validate(),
            Err(SchemaError::Inconsistent(_))
        ));

        let empty = CvMatchResult {
            vacancies_found: true,
            best_match: None,
            matched_roles: vec![],
        };
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn sales_extract_score_bound() {
        let raw = r#"{
            "company": "Acme", "contact_name": "Bo", "contact_email": "bo@acme.test",
            "contact_phone": "", "intent_summary": "wants automation",
            "product_interest": [], "budget_hint": "", "timeline": "", "title": "CTO",
            "lead_score": 101, "priority": "A"
        }"#;
        assert!(matches!(
            parse_stage_output::<SalesExtract>(raw),
            Err(SchemaError::OutOfRange {
                field: "lead_score",
                ..
            })
        ));
    }

    #[test]
    fn json_extracted_from_markdown_fence() {
        let raw = "Here you go:\n```json\n{\"category\": \"sales\", \"confidence\": 0.8, \"language\": \"en\"}\n```";
        let intent: Intent = parse_stage_output(raw).unwrap();
        assert_eq!(intent.category, IntentCategory::Sales);
    }

    #[test]
    fn json_extracted_from_surrounding_text() {
        let raw = "Assessment: {\"category\": \"event\", \"confidence\": 0.7, \"language\": \"pt\"} done.";
        let intent: Intent = parse_stage_output(raw).unwrap();
        assert_eq!(intent.category, IntentCategory::Event);
    }

    #[test]
    fn final_route_wire_names() {
        assert_eq!(
            serde_json::to_value(FinalRoute::HrCvForward).unwrap(),
            "hr_cv_forward"
        );
        assert_eq!(
            serde_json::to_value(FinalRoute::GuardrailsBlock).unwrap(),
            "guardrails_block"
        );
    }

    #[test]
    fn category_maps_to_department() {
        assert_eq!(IntentCategory::Cv.route_department(), RouteDepartment::Hr);
        assert_eq!(
            IntentCategory::Sales.route_department(),
            RouteDepartment::Sales
        );
        assert_eq!(
            IntentCategory::Event.route_department(),
            RouteDepartment::Events
        );
        assert_eq!(
            IntentCategory::Other.route_department(),
            RouteDepartment::Other
        );
    }
}
