pub mod resolver;

pub use resolver::{is_shortcut, resolve, OrderResolver, SCORE_CUTOFF};
