//! Analyst-side client for an AML monitoring backend: authentication, alert
//! triage, background file analysis, per-account investigation with a derived
//! fund-flow view, and SAR report retrieval.

pub mod alerts;
pub mod analysis;
pub mod api;
pub mod client;
pub mod config;
pub mod investigation;
pub mod jobs;
pub mod sar;
pub mod session;
