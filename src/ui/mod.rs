//! Terminal User Interface module.
//!
//! This module provides the TUI for the feed client, including:
//! - Main event loop (`run`)
//! - Input handling for the feed and detail views
//! - Rendering for the post list, the detail view, and the status bar
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch
//! - `helpers` - Background task spawning
//! - `feed_view` - Scrolling post list widget
//! - `detail` - Full-screen single post widget
//! - `status` - Status bar widget

// Submodules for UI components
mod detail;
mod events;
mod feed_view;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

/// Frames for the in-flight spinner, advanced on each tick.
pub(crate) const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

// Re-export the public API
pub use loop_runner::{run, Action};
