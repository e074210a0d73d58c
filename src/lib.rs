//! Inbox triage pipeline: guardrails screening, intent classification,
//! deterministic routing and scoring, and drafted replies for every message
//! that lands in a shared inbox.
//!
//! The orchestration in [`workflow`] is generic over a [`policy::PolicyConfig`]
//! (what the organization is, who owns what, how fit is scored) and a
//! [`llm::TextGenerator`] (how free text gets interpreted). Everything that
//! decides, from branch selection and owner resolution through scoring and
//! packaging, runs locally and deterministically.

pub mod error;
pub mod input;
pub mod instructions;
pub mod invoker;
pub mod llm;
pub mod notify;
pub mod policy;
pub mod schema;
pub mod scoring;
pub mod server;
pub mod workflow;
