//! docqa common - shared types for the document QA client
//!
//! Wire types for the REST API, the error taxonomy the controllers report
//! with, configuration loading and XDG path discovery.

pub mod api;
pub mod config;
pub mod error;
pub mod paths;

pub use api::*;
pub use config::DocqaConfig;
pub use error::{ClientError, ErrorKind, ValidationError};
