//! Terminal output module.
//!
//! Plain styled step output for the binary; no interactive UI.

mod display;

pub use display::StepDisplay;
