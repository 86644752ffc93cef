//! Utility functions for common operations.
//!
//! This module provides reusable utilities for:
//!
//! - **Text safety**: stripping terminal control sequences from remote text
//! - **Text layout**: Unicode-aware truncation for fixed-width rows
//! - **Formatting**: human-readable byte sizes for media placeholders
//!
//! # Examples
//!
//! ```
//! use gram::util::{format_size, strip_control_chars, truncate_to_width};
//!
//! // Sanitize a caption before it touches the terminal
//! let clean = strip_control_chars("golden hour\x1b[2J");
//!
//! // Fit it to a list row
//! let short = truncate_to_width(&clean, 30);
//!
//! // Annotate a resolved photo with its size
//! let label = format_size(35_021); // "34.2 KB"
//! ```

mod text;

pub use text::{format_size, strip_control_chars, truncate_to_width};
