pub mod client;
pub mod wire;
pub mod worker;

pub use client::{EvaluationService, HttpEvaluationClient};
pub use wire::{EvaluationRequest, EvaluationResult, VariableValue};
