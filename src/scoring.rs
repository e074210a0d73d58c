//! Deterministic fit and lead scoring.
//!
//! Match scores and lead scores are computed here, in code, from the policy
//! weights. Extraction stages may emit advisory numbers; those are replaced
//! with the values below so that the same extract and the same policy always
//! produce the same decision.

use crate::policy::{OpenRole, PolicyConfig, SalesPolicy};
use crate::schema::{CvExtract, CvMatchResult, Language, Priority, RoleMatch, SalesExtract};

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

// ── CV matching ─────────────────────────────────────────────────────

/// Score one candidate against every configured vacancy.
///
/// Every role is scored; a candidate below a role's minimum experience earns
/// zero experience credit but can still qualify on the other components.
/// `matched_roles` holds the roles scoring at or above `thresholds.fit_ok`,
/// ordered by descending score; ties keep the configured vacancy order.
/// `best_match` is the head of that list.
pub fn match_candidate(
    cv: &CvExtract,
    language: Language,
    policy: &PolicyConfig,
) -> CvMatchResult {
    let candidate_skills: Vec<String> = cv.skills.iter().map(|s| normalize(s)).collect();
    let candidate_certs: Vec<String> = cv.certifications.iter().map(|s| normalize(s)).collect();

    let mut matched: Vec<RoleMatch> = Vec::new();
    for role in &policy.vacancies {
        let scored = score_role(role, cv, &candidate_skills, &candidate_certs, language, policy);
        if scored.match_score >= policy.thresholds.fit_ok {
            matched.push(scored);
        }
    }

    // Stable sort: equal scores keep the configured vacancy order.
    matched.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    let best_match = matched.first().cloned();

    CvMatchResult {
        vacancies_found: !policy.vacancies.is_empty(),
        best_match,
        matched_roles: matched,
    }
}

fn score_role(
    role: &OpenRole,
    cv: &CvExtract,
    candidate_skills: &[String],
    candidate_certs: &[String],
    language: Language,
    policy: &PolicyConfig,
) -> RoleMatch {
    let weights = &policy.cv_policy.weights;
    let bonus = &policy.cv_policy.experience_bonus;

    // Skills overlap, proportional to the role's requirement list.
    let required = role.skills_required.len();
    let matched_skills = role
        .skills_required
        .iter()
        .filter(|skill| candidate_skills.contains(&normalize(skill)))
        .count();
    let skills_points =
        (matched_skills as f64 / required as f64 * weights.skills_overlap as f64).round() as u32;

    // Experience credits are cumulative and capped at the component weight;
    // below the role minimum the component is zero, never an exclusion.
    let experience_points = if cv.years_experience >= role.min_experience_years {
        let excess = cv.years_experience - role.min_experience_years;
        let mut points = bonus.meets_minimum as u32;
        if excess >= 1 {
            points += bonus.exceeds_by_one as u32;
        }
        if excess >= 2 {
            points += bonus.exceeds_by_two as u32;
        }
        points.min(weights.experience as u32)
    } else {
        0
    };

    // A role with no certification requirement grants the full component.
    let certification_points = if role.certifications_required.is_empty() {
        weights.certifications as u32
    } else {
        let held = role
            .certifications_required
            .iter()
            .filter(|cert| candidate_certs.contains(&normalize(cert)))
            .count();
        (held as f64 / role.certifications_required.len() as f64
            * weights.certifications as f64)
            .round() as u32
    };

    let language_points = if language == policy.languages.default_reply {
        weights.language as u32
    } else {
        (weights.language as f64 / 2.0).round() as u32
    };

    let total = skills_points + experience_points + certification_points + language_points;
    let match_score = total.min(100) as u8;

    let mut why = format!(
        "skills {matched_skills}/{required}, {}y experience vs {}y minimum, language {language}",
        cv.years_experience, role.min_experience_years,
    );
    if match_score >= policy.thresholds.fit_high_confidence {
        why.push_str(", high-confidence fit");
    }

    RoleMatch {
        role_id: role.role_id.clone(),
        title: role.title.clone(),
        department: role.department.clone(),
        match_score,
        why,
    }
}

// ── Sales lead qualification ────────────────────────────────────────

/// Presence of each weighted lead signal in an extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadSignals {
    pub corporate_domain: bool,
    pub budget_mentioned: bool,
    pub timeline_clear: bool,
    pub decision_maker_title: bool,
    pub use_case_clarity: bool,
}

/// Derive the five lead signals from an extract.
pub fn derive_signals(extract: &SalesExtract, policy: &SalesPolicy) -> LeadSignals {
    LeadSignals {
        corporate_domain: is_corporate_domain(&extract.contact_email, policy),
        budget_mentioned: !extract.budget_hint.trim().is_empty(),
        timeline_clear: !extract.timeline.trim().is_empty(),
        decision_maker_title: is_decision_maker(&extract.title, policy),
        use_case_clarity: !extract.intent_summary.trim().is_empty(),
    }
}

/// Weighted score plus the priority tier it falls into.
pub fn score_lead(signals: &LeadSignals, policy: &SalesPolicy) -> (u8, Priority) {
    let weights = &policy.weights;
    let mut score: u32 = 0;
    if signals.corporate_domain {
        score += weights.corporate_domain as u32;
    }
    if signals.budget_mentioned {
        score += weights.budget_mentioned as u32;
    }
    if signals.timeline_clear {
        score += weights.timeline_clear as u32;
    }
    if signals.decision_maker_title {
        score += weights.decision_maker_title as u32;
    }
    if signals.use_case_clarity {
        score += weights.use_case_clarity as u32;
    }
    let score = score.min(100) as u8;

    let priority = if score >= policy.priority_a {
        Priority::A
    } else if score >= policy.priority_b {
        Priority::B
    } else {
        Priority::C
    };
    (score, priority)
}

/// Replace the extract's advisory score and priority with the computed ones.
pub fn qualify_lead(extract: &mut SalesExtract, policy: &SalesPolicy) -> LeadSignals {
    let signals = derive_signals(extract, policy);
    let (score, priority) = score_lead(&signals, policy);
    extract.lead_score = score;
    extract.priority = priority;
    signals
}

fn is_corporate_domain(email: &str, policy: &SalesPolicy) -> bool {
    let Some(domain) = email.trim().rsplit_once('@').map(|(_, d)| normalize(d)) else {
        return false;
    };
    !domain.is_empty() && !policy.freemail_domains.iter().any(|f| normalize(f) == domain)
}

fn is_decision_maker(title: &str, policy: &SalesPolicy) -> bool {
    let tokens = tokenize(title);
    policy.decision_maker_titles.iter().any(|configured| {
        let needle = tokenize(configured);
        !needle.is_empty() && tokens.windows(needle.len()).any(|window| window == needle)
    })
}

/// Lowercase alphanumeric tokens, so "Head of Operations" matches "head"
/// while "Headhunter" does not.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
