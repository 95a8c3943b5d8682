//! Application helpers: domain input handling and terminal output.

pub mod report;
pub mod url;

pub use report::{ProgressPrinter, TurnPrinter};
pub use url::normalize_domain;
