pub mod connection;
pub mod endpoints;

// Re-export the pieces callers actually touch.
pub use connection::{ApiConnectionError, GEMINI_KEY_ENV_VARS};
pub use endpoints::{GenerateContentRequest, GenerateContentResponse, Provider};
