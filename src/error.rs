//! Error taxonomy of the drawing and evaluation engine.
//!
//! None of these are fatal: every variant is recovered locally by the session
//! controller.

use thiserror::Error;

/// Failure of one round trip to the evaluation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service responded with status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("could not capture the canvas: {0}")]
    Capture(String),

    #[error("evaluation worker exited without a response")]
    WorkerLost,
}

/// Why a submit request did not start an evaluation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("an evaluation is already in flight")]
    InFlight,

    #[error("the canvas has no ink to evaluate")]
    EmptyCanvas,

    #[error("no drawing surface is attached")]
    Detached,
}

/// Pointer input that cannot be mapped onto the surface. Dropped by callers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDeviceError {
    #[error("touch event carried no touch points")]
    NoTouchPoints,

    #[error("pointer coordinates are not finite")]
    NonFiniteCoordinates,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("no drawing surface is attached")]
    Detached,

    #[error("png encoding failed: {0}")]
    Encode(String),
}

impl From<SurfaceError> for EvaluationError {
    fn from(err: SurfaceError) -> Self {
        EvaluationError::Capture(err.to_string())
    }
}
