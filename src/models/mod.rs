//! Data models for the Meteosat skill
//!
//! This module contains the wire envelopes exchanged with the voice platform:
//! - Request: the inbound skill request and its context
//! - Response: speech, cards and display directives sent back

pub mod request;
pub mod response;

// Re-export all public types for convenient access
pub use request::{RequestKind, SkillRequest};
pub use response::{Card, Directive, SkillResponse};
