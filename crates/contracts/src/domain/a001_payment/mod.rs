pub mod aggregate;

pub use aggregate::{FieldValue, RecordField, RecordFields, RecordId};
