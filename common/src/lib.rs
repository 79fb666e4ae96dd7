//! Shared building blocks for the terminal emulator workspace.
//!
//! Every error enum in the workspace records where it was raised through
//! [`ErrorLocation`], and backend pass-through calls carry their HTTP status
//! as an [`HttpStatusCode`].

pub mod error;
pub mod http_status;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use http_status::HttpStatusCode;
