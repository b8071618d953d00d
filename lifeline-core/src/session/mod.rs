//! Refinement session state and storage

pub mod state;
pub mod store;

// Re-export key types for convenience
pub use state::{Answer, RefinementSession, SessionSnapshot, SessionState};
pub use store::{SessionHandle, SessionStore};
