pub mod outcome;

pub use outcome::ResolutionOutcome;
