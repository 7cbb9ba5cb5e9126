//! Intent routing
//!
//! Maps a decoded request to the action the response builder renders. Routing
//! reads only the request kind, the intent name and the display capability,
//! so the same envelope always yields the same action.

use tracing::debug;

use crate::models::{RequestKind, SkillRequest};
use crate::view_mode::ViewMode;

pub const NAVIGATE_HOME_INTENT: &str = "AMAZON.NavigateHomeIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const NEXT_INTENT: &str = "AMAZON.NextIntent";
pub const PREVIOUS_INTENT: &str = "AMAZON.PreviousIntent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseAction {
    /// The device has no screen; nothing else is considered
    DisplayRequired,
    ShowImages(ViewMode),
    Help,
    Goodbye,
    Scroll(ScrollDirection),
    Unrecognized,
}

/// Select the action for a request.
pub fn route(request: &SkillRequest) -> ResponseAction {
    if !request.supports_display() {
        debug!("Device has no display, short-circuiting");
        return ResponseAction::DisplayRequired;
    }

    let action = match request.kind() {
        RequestKind::Launch => ResponseAction::ShowImages(ViewMode::Normal),
        RequestKind::Intent => route_intent(request.intent_name().unwrap_or_default()),
        RequestKind::SessionEnded => ResponseAction::Goodbye,
        RequestKind::Other => ResponseAction::Unrecognized,
    };

    debug!(kind = ?request.kind(), intent = ?request.intent_name(), ?action, "Routed request");
    action
}

fn route_intent(name: &str) -> ResponseAction {
    if let Some(mode) = ViewMode::from_intent_name(name) {
        return ResponseAction::ShowImages(mode);
    }

    match name {
        NAVIGATE_HOME_INTENT => ResponseAction::ShowImages(ViewMode::Normal),
        STOP_INTENT | CANCEL_INTENT => ResponseAction::Goodbye,
        HELP_INTENT => ResponseAction::Help,
        NEXT_INTENT => ResponseAction::Scroll(ScrollDirection::Forward),
        PREVIOUS_INTENT => ResponseAction::Scroll(ScrollDirection::Backward),
        _ => ResponseAction::Unrecognized,
    }
}
