pub mod access;
pub mod tracing;
