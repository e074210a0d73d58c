//! Shipped policy presets.
//!
//! Two fictitious companies with entirely different domains run on the same
//! orchestrator. Only the data below changes.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::schema::{Language, RouteDepartment};

use super::{
    CompanyProfile, CvPolicy, CvWeights, EmailTemplate, EmailTemplates, ExperienceBonus,
    GuardrailPolicy, LanguagePolicy, OpenRole, Owner, PiiRules, PolicyConfig, SalesPolicy,
    SalesWeights, ServicePackage, Thresholds,
};

/// Look up a preset by name. Used by the binary's `TRIAGE_PRESET` env var.
pub fn by_name(name: &str) -> Result<PolicyConfig, ConfigError> {
    let config = match name {
        "aurora" => aurora_agentics(),
        "helios" => helios_robotics(),
        other => return Err(ConfigError::UnknownPreset(other.to_string())),
    };
    config.validate()?;
    Ok(config)
}

fn owners(entries: [(&str, &str, RouteDepartment); 4]) -> BTreeMap<RouteDepartment, Owner> {
    entries
        .into_iter()
        .map(|(email, name, department)| {
            (
                department,
                Owner {
                    email: email.to_string(),
                    name: name.to_string(),
                },
            )
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Aurora Agentics — Spanish-first AI consulting firm.
pub fn aurora_agentics() -> PolicyConfig {
    PolicyConfig {
        company: CompanyProfile {
            name: "Aurora Agentics".to_string(),
            sector: "Agentic AI / Automations".to_string(),
            mission: "Acelerar resultados con workflows agentic alineados a negocio".to_string(),
            site_url: "https://aurora-agentics.test".to_string(),
            careers_url: "https://aurora-agentics.test/careers".to_string(),
            booking_url: "https://cal.aurora-agentics.test/sales".to_string(),
        },
        services: strings(&[
            "Discovery_Agentic",
            "Sales_Automation",
            "Customer_Care_Agent",
            "Ops_RPA_Flows",
            "Semantic_Workflows",
        ]),
        packages: vec![
            ServicePackage {
                name: "Starter".to_string(),
                price_hint: "25k-40k EUR".to_string(),
                duration: "4-6 weeks".to_string(),
            },
            ServicePackage {
                name: "Growth".to_string(),
                price_hint: "60k-120k EUR".to_string(),
                duration: "8-12 weeks".to_string(),
            },
            ServicePackage {
                name: "Scale".to_string(),
                price_hint: ">150k EUR".to_string(),
                duration: "annual program".to_string(),
            },
        ],
        vacancies: vec![
            OpenRole {
                role_id: "ENG-ML-01".to_string(),
                title: "Machine Learning Engineer".to_string(),
                department: "Engineering".to_string(),
                skills_required: strings(&["python", "ml", "pandas", "apis"]),
                min_experience_years: 2,
                certifications_required: vec![],
            },
            OpenRole {
                role_id: "ENG-FE-01".to_string(),
                title: "Frontend Engineer".to_string(),
                department: "Engineering".to_string(),
                skills_required: strings(&["javascript", "react", "apis"]),
                min_experience_years: 2,
                certifications_required: vec![],
            },
            OpenRole {
                role_id: "CONS-AE-01".to_string(),
                title: "Account Executive (AI Consulting)".to_string(),
                department: "Sales".to_string(),
                skills_required: strings(&["ventas", "crm", "negociación", "ai_consulting"]),
                min_experience_years: 3,
                certifications_required: vec![],
            },
            OpenRole {
                role_id: "CONS-DS-01".to_string(),
                title: "AI Consultant / Data Scientist".to_string(),
                department: "Consulting".to_string(),
                skills_required: strings(&["python", "ml", "llms", "prompt_engineering"]),
                min_experience_years: 2,
                certifications_required: vec![],
            },
        ],
        events_of_interest: strings(&["GenAI_Summit", "DataLeaders_Forum", "SaaS_GTMs"]),
        owners: owners([
            ("talent@aurora-agentics.test", "HR Team", RouteDepartment::Hr),
            ("sales@aurora-agentics.test", "Sales Ops", RouteDepartment::Sales),
            (
                "events@aurora-agentics.test",
                "Alliances & Events",
                RouteDepartment::Events,
            ),
            ("inbox@aurora-agentics.test", "Front Desk", RouteDepartment::Other),
        ]),
        thresholds: Thresholds {
            fit_ok: 70,
            fit_high_confidence: 85,
        },
        cv_policy: CvPolicy {
            weights: CvWeights {
                skills_overlap: 50,
                experience: 30,
                certifications: 0,
                language: 20,
            },
            experience_bonus: ExperienceBonus {
                meets_minimum: 10,
                exceeds_by_one: 5,
                exceeds_by_two: 10,
            },
        },
        sales_policy: SalesPolicy {
            weights: SalesWeights {
                corporate_domain: 20,
                budget_mentioned: 20,
                timeline_clear: 20,
                decision_maker_title: 20,
                use_case_clarity: 20,
            },
            priority_a: 80,
            priority_b: 50,
            decision_maker_titles: strings(&[
                "ceo", "cto", "cio", "cdo", "vp", "director", "head", "chief",
            ]),
            freemail_domains: strings(&[
                "gmail.com",
                "yahoo.com",
                "hotmail.com",
                "outlook.com",
                "icloud.com",
            ]),
        },
        guardrails: GuardrailPolicy {
            blocking_categories: strings(&[
                "violence",
                "sexual_content",
                "hate_speech",
                "harassment",
                "illegal_activity",
                "self_harm",
            ]),
            pii_rules: PiiRules {
                detect: strings(&["phone_numbers", "addresses", "national_ids"]),
                redact_method: "replace_with_placeholder".to_string(),
                keep_emails: true,
            },
            jailbreak_patterns: strings(&[
                "ignore previous instructions",
                "disregard your rules",
                "override your policy",
                "you are now in DAN mode",
                "pretend you are",
            ]),
        },
        languages: LanguagePolicy {
            accepted: vec![Language::Es, Language::En, Language::Pt],
            default_reply: Language::Es,
        },
        email_templates: EmailTemplates {
            cv_forward: EmailTemplate {
                subject_pattern: "Candidato potencial – {{title}} (fit {{match_score}}%)"
                    .to_string(),
                tone: "profesional, interno, directo".to_string(),
            },
            cv_reject: EmailTemplate {
                subject_pattern: "Gracias por tu candidatura – Aurora Agentics".to_string(),
                tone: "amable, neutro, agradecido".to_string(),
            },
            sales_internal: EmailTemplate {
                subject_pattern: "Lead {{priority}} – {{company}} (score: {{lead_score}})"
                    .to_string(),
                tone: "briefing ejecutivo, datos clave".to_string(),
            },
            events: EmailTemplate {
                subject_pattern: "Re: Propuesta de evento/alianza".to_string(),
                tone: "abierto, solicita detalles".to_string(),
            },
            generic: EmailTemplate {
                subject_pattern: "Recibido – Aurora Agentics".to_string(),
                tone: "neutro, solicita contexto".to_string(),
            },
        },
    }
}

/// Helios Robotics — English-first industrial robotics manufacturer.
pub fn helios_robotics() -> PolicyConfig {
    PolicyConfig {
        company: CompanyProfile {
            name: "Helios Robotics".to_string(),
            sector: "Industrial Robotics / Factory Automation".to_string(),
            mission: "Put safe, reliable robot arms on every mid-size factory floor".to_string(),
            site_url: "https://helios-robotics.test".to_string(),
            careers_url: "https://helios-robotics.test/jobs".to_string(),
            booking_url: "https://book.helios-robotics.test/demo".to_string(),
        },
        services: strings(&[
            "Arm_Deployment",
            "Cell_Safety_Audit",
            "Fleet_Monitoring",
            "Operator_Training",
        ]),
        packages: vec![
            ServicePackage {
                name: "Pilot Cell".to_string(),
                price_hint: "40k-70k USD".to_string(),
                duration: "6-8 weeks".to_string(),
            },
            ServicePackage {
                name: "Line Retrofit".to_string(),
                price_hint: "150k-400k USD".to_string(),
                duration: "3-5 months".to_string(),
            },
        ],
        vacancies: vec![
            OpenRole {
                role_id: "ROB-CTRL-01".to_string(),
                title: "Controls Engineer".to_string(),
                department: "Engineering".to_string(),
                skills_required: strings(&["plc", "ros", "c++", "motion_planning"]),
                min_experience_years: 3,
                certifications_required: strings(&["functional_safety"]),
            },
            OpenRole {
                role_id: "ROB-FS-01".to_string(),
                title: "Field Service Technician".to_string(),
                department: "Operations".to_string(),
                skills_required: strings(&["electrical", "pneumatics", "troubleshooting"]),
                min_experience_years: 2,
                certifications_required: vec![],
            },
            OpenRole {
                role_id: "SALES-SE-01".to_string(),
                title: "Sales Engineer".to_string(),
                department: "Sales".to_string(),
                skills_required: strings(&["solution_selling", "automation", "crm"]),
                min_experience_years: 4,
                certifications_required: vec![],
            },
        ],
        events_of_interest: strings(&["Automate_Expo", "Hannover_Messe", "PackML_Forum"]),
        owners: owners([
            ("talent@helios-robotics.test", "People Ops", RouteDepartment::Hr),
            ("sales@helios-robotics.test", "Revenue Team", RouteDepartment::Sales),
            (
                "partnerships@helios-robotics.test",
                "Partnerships",
                RouteDepartment::Events,
            ),
            (
                "hello@helios-robotics.test",
                "Reception",
                RouteDepartment::Other,
            ),
        ]),
        thresholds: Thresholds {
            fit_ok: 70,
            fit_high_confidence: 88,
        },
        cv_policy: CvPolicy {
            weights: CvWeights {
                skills_overlap: 40,
                experience: 30,
                certifications: 10,
                language: 20,
            },
            experience_bonus: ExperienceBonus {
                meets_minimum: 10,
                exceeds_by_one: 5,
                exceeds_by_two: 10,
            },
        },
        sales_policy: SalesPolicy {
            weights: SalesWeights {
                corporate_domain: 25,
                budget_mentioned: 20,
                timeline_clear: 15,
                decision_maker_title: 20,
                use_case_clarity: 20,
            },
            priority_a: 80,
            priority_b: 45,
            decision_maker_titles: strings(&[
                "ceo", "coo", "cto", "vp", "director", "head", "plant manager",
            ]),
            freemail_domains: strings(&[
                "gmail.com",
                "yahoo.com",
                "hotmail.com",
                "outlook.com",
                "aol.com",
            ]),
        },
        guardrails: GuardrailPolicy {
            blocking_categories: strings(&[
                "violence",
                "sexual_content",
                "hate_speech",
                "harassment",
                "illegal_activity",
                "self_harm",
            ]),
            pii_rules: PiiRules {
                detect: strings(&["phone_numbers", "addresses", "national_ids"]),
                redact_method: "replace_with_placeholder".to_string(),
                keep_emails: true,
            },
            jailbreak_patterns: strings(&[
                "ignore previous instructions",
                "disregard your rules",
                "override your policy",
                "pretend you are",
            ]),
        },
        languages: LanguagePolicy {
            accepted: vec![Language::En, Language::Es],
            default_reply: Language::En,
        },
        email_templates: EmailTemplates {
            cv_forward: EmailTemplate {
                subject_pattern: "Candidate worth a look – {{title}} (fit {{match_score}}%)"
                    .to_string(),
                tone: "internal, direct, no fluff".to_string(),
            },
            cv_reject: EmailTemplate {
                subject_pattern: "Thanks for applying to Helios Robotics".to_string(),
                tone: "warm, appreciative, brief".to_string(),
            },
            sales_internal: EmailTemplate {
                subject_pattern: "Lead {{priority}} – {{company}} (score: {{lead_score}})"
                    .to_string(),
                tone: "executive briefing, key facts first".to_string(),
            },
            events: EmailTemplate {
                subject_pattern: "Re: Event / partnership proposal".to_string(),
                tone: "open, asks for specifics".to_string(),
            },
            generic: EmailTemplate {
                subject_pattern: "Received – Helios Robotics".to_string(),
                tone: "neutral, asks for context".to_string(),
            },
        },
    }
}
