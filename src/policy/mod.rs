//! Policy configuration — the single source of truth for everything
//! organization-specific in the pipeline.
//!
//! A `PolicyConfig` is built once, validated at load, and shared read-only
//! across every run. Swapping the config swaps the whole business domain
//! without touching orchestration code; the two presets in [`presets`]
//! demonstrate this.

pub mod presets;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{Language, RouteDepartment};

/// Organization identity rendered into stage instructions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub sector: String,
    pub mission: String,
    pub site_url: String,
    pub careers_url: String,
    pub booking_url: String,
}

/// A service package with a price hint, surfaced to the sales extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePackage {
    pub name: String,
    pub price_hint: String,
    pub duration: String,
}

/// An open role candidates are matched against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRole {
    pub role_id: String,
    pub title: String,
    pub department: String,
    pub skills_required: Vec<String>,
    pub min_experience_years: u32,
    /// Certification categories required for the role; may be empty.
    #[serde(default)]
    pub certifications_required: Vec<String>,
}

/// Owner directory entry for a routing department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub email: String,
    pub name: String,
}

/// Accept/forward thresholds for CV matching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum match score required to forward a candidate.
    pub fit_ok: u8,
    /// Score treated as a high-confidence fit.
    pub fit_high_confidence: u8,
}

/// Weight of each CV match component. Must sum to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CvWeights {
    pub skills_overlap: u8,
    pub experience: u8,
    pub certifications: u8,
    pub language: u8,
}

impl CvWeights {
    pub fn sum(&self) -> u32 {
        self.skills_overlap as u32
            + self.experience as u32
            + self.certifications as u32
            + self.language as u32
    }
}

/// Cumulative experience credits, capped at `CvWeights::experience`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExperienceBonus {
    /// Base credit for meeting the role minimum.
    pub meets_minimum: u8,
    /// Added when the candidate exceeds the minimum by at least one year.
    pub exceeds_by_one: u8,
    /// Added when the candidate exceeds the minimum by two or more years.
    pub exceeds_by_two: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvPolicy {
    pub weights: CvWeights,
    pub experience_bonus: ExperienceBonus,
}

/// Weight of each sales lead signal. Must sum to 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SalesWeights {
    pub corporate_domain: u8,
    pub budget_mentioned: u8,
    pub timeline_clear: u8,
    pub decision_maker_title: u8,
    pub use_case_clarity: u8,
}

impl SalesWeights {
    pub fn sum(&self) -> u32 {
        self.corporate_domain as u32
            + self.budget_mentioned as u32
            + self.timeline_clear as u32
            + self.decision_maker_title as u32
            + self.use_case_clarity as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesPolicy {
    pub weights: SalesWeights,
    /// Leads scoring at or above this are priority A.
    pub priority_a: u8,
    /// Leads scoring at or above this (but below A) are priority B.
    pub priority_b: u8,
    /// Lowercase title tokens that mark a decision maker.
    pub decision_maker_titles: Vec<String>,
    /// Domains that never count as corporate senders.
    pub freemail_domains: Vec<String>,
}

/// PII handling rules rendered into the guardrails instructions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiiRules {
    pub detect: Vec<String>,
    pub redact_method: String,
    pub keep_emails: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailPolicy {
    pub blocking_categories: Vec<String>,
    pub pii_rules: PiiRules,
    pub jailbreak_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagePolicy {
    pub accepted: Vec<Language>,
    pub default_reply: Language,
}

/// Subject pattern and tone for one reply template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject_pattern: String,
    pub tone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplates {
    pub cv_forward: EmailTemplate,
    pub cv_reject: EmailTemplate,
    pub sales_internal: EmailTemplate,
    pub events: EmailTemplate,
    pub generic: EmailTemplate,
}

/// The canonical, immutable-per-run policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub company: CompanyProfile,
    pub services: Vec<String>,
    pub packages: Vec<ServicePackage>,
    pub vacancies: Vec<OpenRole>,
    pub events_of_interest: Vec<String>,
    pub owners: BTreeMap<RouteDepartment, Owner>,
    pub thresholds: Thresholds,
    pub cv_policy: CvPolicy,
    pub sales_policy: SalesPolicy,
    pub guardrails: GuardrailPolicy,
    pub languages: LanguagePolicy,
    pub email_templates: EmailTemplates,
}

impl PolicyConfig {
    /// Validate configuration consistency. Called once at load; every run
    /// thereafter may assume these invariants hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cv_sum = self.cv_policy.weights.sum();
        if cv_sum != 100 {
            return Err(ConfigError::WeightSum {
                policy: "cv_policy",
                sum: cv_sum,
            });
        }

        let sales_sum = self.sales_policy.weights.sum();
        if sales_sum != 100 {
            return Err(ConfigError::WeightSum {
                policy: "sales_policy",
                sum: sales_sum,
            });
        }

        if self.sales_policy.priority_a <= self.sales_policy.priority_b {
            return Err(ConfigError::PriorityOrder {
                a: self.sales_policy.priority_a,
                b: self.sales_policy.priority_b,
            });
        }

        if self.thresholds.fit_high_confidence < self.thresholds.fit_ok {
            return Err(ConfigError::ThresholdOrder {
                high: self.thresholds.fit_high_confidence,
                ok: self.thresholds.fit_ok,
            });
        }

        let mut seen = std::collections::BTreeSet::new();
        for role in &self.vacancies {
            if !seen.insert(role.role_id.as_str()) {
                return Err(ConfigError::DuplicateRole(role.role_id.clone()));
            }
            if role.skills_required.is_empty() {
                return Err(ConfigError::EmptySkillList {
                    role_id: role.role_id.clone(),
                });
            }
        }

        for department in RouteDepartment::ALL {
            if !self.owners.contains_key(&department) {
                return Err(ConfigError::MissingOwner {
                    department: department.to_string(),
                });
            }
        }

        if !self.languages.accepted.contains(&self.languages.default_reply) {
            return Err(ConfigError::DefaultLanguageNotAccepted {
                language: self.languages.default_reply.to_string(),
            });
        }

        Ok(())
    }

    /// Owner directory entry for a routing department.
    ///
    /// `validate()` guarantees every department has one.
    pub fn owner_for(&self, department: RouteDepartment) -> &Owner {
        self.owners
            .get(&department)
            .expect("validated config has an owner for every department")
    }
}

#[cfg(test)]
mod tests {
    use super::presets;
    use crate::error::ConfigError;
    use crate::schema::{Language, RouteDepartment};

    #[test]
    fn presets_pass_validation() {
        presets::aurora_agentics().validate().unwrap();
        presets::helios_robotics().validate().unwrap();
    }

    #[test]
    fn cv_weight_sum_enforced() {
        let mut config = presets::aurora_agentics();
        config.cv_policy.weights.skills_overlap = 60;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WeightSum {
                policy: "cv_policy",
                sum: 110
            }
        ));
    }

    #[test]
    fn sales_weight_sum_enforced() {
        let mut config = presets::aurora_agentics();
        config.sales_policy.weights.use_case_clarity = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::WeightSum {
                policy: "sales_policy",
                ..
            }
        ));
    }

    #[test]
    fn priority_cutoffs_must_be_ordered() {
        let mut config = presets::aurora_agentics();
        config.sales_policy.priority_a = config.sales_policy.priority_b;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::PriorityOrder { .. }
        ));
    }

    #[test]
    fn missing_owner_rejected() {
        let mut config = presets::aurora_agentics();
        config.owners.remove(&RouteDepartment::Events);
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::MissingOwner { .. }
        ));
    }

    #[test]
    fn duplicate_role_id_rejected() {
        let mut config = presets::aurora_agentics();
        let dup = config.vacancies[0].clone();
        config.vacancies.push(dup);
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::DuplicateRole(_)
        ));
    }

    #[test]
    fn default_language_must_be_accepted() {
        let mut config = presets::aurora_agentics();
        config.languages.default_reply = Language::Fr;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::DefaultLanguageNotAccepted { .. }
        ));
    }

    #[test]
    fn owner_lookup_matches_directory() {
        let config = presets::aurora_agentics();
        let owner = config.owner_for(RouteDepartment::Hr);
        assert_eq!(owner.email, "talent@aurora-agentics.test");
    }
}
