pub mod form;
pub mod service;

pub use form::{FormState, FormStep, Operator};
