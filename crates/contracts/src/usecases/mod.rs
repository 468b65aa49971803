pub mod u001_resolve_order;
