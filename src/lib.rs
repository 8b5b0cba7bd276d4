//! Purpose: Library crate behind the `doclib` CLI: document API client plus headless UI state.
//! Exports: `api` (records, `DocumentApi`, `DocumentClient`, errors), `app` (controllers, views),
//!          `core` (input rules and text formatting).
//! Role: Everything except argument parsing and terminal I/O lives here so it can be tested.
//! Invariants: `api` is the import path for records and errors; `core` holds pure helpers.
//! Invariants: Controllers prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod app;
pub mod core;
