//! Configuration utility types.
//!
//! | Module  | Purpose                                   |
//! |---------|-------------------------------------------|
//! | `error` | Configuration error types                 |
//! | `list`  | Delimited-text or array list settings     |

mod error;
pub mod list;

pub use error::ConfigError;
