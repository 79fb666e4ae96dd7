pub mod builder;
pub mod session;
