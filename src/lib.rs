//! Meteosat skill - satellite imagery for voice assistants with a screen
//!
//! This library verifies that inbound skill requests come from the voice
//! platform, routes the spoken intent and renders the matching list of
//! satellite images.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod regions;
pub mod response_builder;
pub mod router;
pub mod telemetry;
pub mod verifier;
pub mod view_mode;
pub mod web;

// Re-export core types for public API
pub use config::SkillConfig;
pub use error::MeteosatError;
pub use models::{SkillRequest, SkillResponse};
pub use regions::{REGIONS, Region};
pub use router::{ResponseAction, ScrollDirection};
pub use verifier::{AlexaRequestVerifier, RequestVerifier, SignatureHeaders};
pub use view_mode::ViewMode;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
