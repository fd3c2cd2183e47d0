//! Pre-generation safety gate: emergency and restricted-request screening.

pub mod gate;
pub mod types;

pub use gate::{classify_question, gate_rules, GateRule};
pub use types::*;
