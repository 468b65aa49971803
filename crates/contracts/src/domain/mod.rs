pub mod a001_payment;
pub mod a002_order;
pub mod common;
