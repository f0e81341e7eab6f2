pub mod publish;
pub mod serve;

// Re-export command functions for convenience
pub use publish::{latest, publish};
pub use serve::serve;
