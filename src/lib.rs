//! Terminal client for a photo-sharing feed.
//!
//! The crate is organized around a single-threaded event loop:
//!
//! - [`client`] — HTTP client for the feed backend (pages, media, logout)
//! - [`feed`] — post model, pagination state machine, row presentation
//! - [`media`] — deduplicating media cache and per-row image bindings
//! - [`app`] — central application state mutated only on the event loop
//! - [`ui`] — terminal rendering and input handling
//!
//! Background tasks never touch state directly; they report through an
//! `AppEvent` channel and the event loop applies the results.

pub mod app;
pub mod client;
pub mod config;
pub mod feed;
pub mod media;
pub mod theme;
pub mod ui;
pub mod util;
