pub mod config;
pub mod error;
pub mod grading;
pub mod identity;
pub mod simulations;
pub mod telemetry;
