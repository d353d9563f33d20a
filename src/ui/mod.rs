//! UI module for consistent CLI output
//!
//! Fancy output (glyphs, progress bars) in an interactive terminal, with
//! automatic fallback to plain bracketed prefixes in CI.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{header, key_value, key_value_status, step_info, step_ok, step_skip, step_warn};
pub use progress::DownloadProgress;
