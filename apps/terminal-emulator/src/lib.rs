// Library exports for testing
// The binary (main.rs) imports these as well

pub mod app;
pub mod console;
pub mod env;
pub mod error;
pub mod logger;

#[cfg(test)]
mod tests;
