/// Single-entity canvas state machine.
pub mod canvas;
/// Handle-based engine over canvas sessions.
pub mod engine;
