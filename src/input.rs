//! Pointer routing for hosts
//!
//! Browsers report a touch twice: once as a pointer event and once as a touch
//! event. Touch samples are taken from the touch listeners only, so pointer
//! handlers ask here what a press or drag should do.

use crate::sim::GamePhase;

/// What a pointer press should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressAction {
    /// Start or restart a session (any pointer type)
    StartSession,
    /// Record a blade sample
    BladeSample,
    /// Handled elsewhere
    Ignore,
}

/// Route a pointer press
pub fn press_action(phase: GamePhase, pointer_type: &str) -> PressAction {
    if phase != GamePhase::Active {
        PressAction::StartSession
    } else if pointer_type == "touch" {
        PressAction::Ignore
    } else {
        PressAction::BladeSample
    }
}

/// Whether a pointer move is a blade sample (primary button held, not touch)
pub fn drag_is_sample(pointer_type: &str, buttons: u16) -> bool {
    pointer_type != "touch" && buttons & 1 != 0
}
