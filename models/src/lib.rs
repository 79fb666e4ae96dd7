//! Domain models for the evaluation terminal.
//!
//! Pure data structures shared by the controller, the RPC layer and the
//! backend connectors. Models carry validation and classification rules but
//! no I/O.
//!
//! ## Architecture
//!
//! - **models** (this crate): cells, spectra, sessions, fineness, RPC payloads
//! - **terminal-core**: controller, connectors, transport operating on models
//! - **terminal-emulator**: process wiring

pub mod api;
pub mod error;
pub mod evaluation;
pub mod fineness;
pub mod storage;

#[cfg(test)]
mod tests;

pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use evaluation::builder::EvaluationSessionBuilder;
pub use evaluation::session::{EvaluationSession, EvaluationStage, Spectrum};
pub use fineness::Fineness;
pub use storage::{OccupiedCells, StorageCell};
