pub mod controller;
pub mod keyboards;
pub mod stimulus;

pub use controller::ConversationController;
pub use stimulus::{Command, Incoming, Stimulus};
