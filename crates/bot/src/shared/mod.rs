pub mod airtable;
pub mod config;
pub mod fuzzy;
