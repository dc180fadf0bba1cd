//! Centralized error handling for the channel catalog
//!
//! Errors are split by the layer that raises them:
//!
//! - **Catalog errors**: SeaORM failures, missing rows (`NotFound`)
//! - **Resolution errors**: a requested stream is missing from its provider listing
//! - **Tuner errors**: the Tvheadend API is unreachable, slow, or rejects a call
//! - **Validation errors**: malformed operator requests
//!
//! # Usage
//!
//! ```rust
//! use tvh_iptv_config::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Tuner client Results
pub type TunerResult<T> = Result<T, TunerError>;
