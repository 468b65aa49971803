pub mod u001_resolve_order;
pub mod u002_payment_dialog;
