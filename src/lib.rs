pub mod draw;
pub mod error;
pub mod eval;
pub mod gui;
pub mod logging;
pub mod session;
pub mod settings;
