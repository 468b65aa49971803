pub mod snapshot;

pub use snapshot::OrdersSnapshot;
