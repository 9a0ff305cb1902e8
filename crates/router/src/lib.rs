// Host-runtime interface surface for log adapters.

// Data model
pub mod message;
pub mod route;

// Registration & errors
pub mod error;
pub mod registry;
