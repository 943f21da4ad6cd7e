// Library interface for the sealvote command-line client
// This exposes the internal modules for testing and external use

pub mod cli;
pub mod client;
pub mod config;
pub mod keys;
pub mod store;

// Re-export commonly used types for convenience
pub use client::Client;
pub use config::AppConfig;
pub use keys::Keyring;
pub use store::StateStore;
