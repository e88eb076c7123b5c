//! # devblog Architecture
//!
//! devblog is a **UI-agnostic blog client library**. The terminal binary is one
//! client of it; the feed pipeline, ownership check and session handling know
//! nothing about terminals.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Owns the backend, config and AuthContext                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One function per operation, returns CmdResult            │
//! │  - Drives the feed pipeline (feed/)                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backend Layer (backend/)                                   │
//! │  - Abstract BlogBackend trait                               │
//! │  - HttpBackend (production), InMemoryBackend (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Time is an argument
//!
//! The search box debounce and the suggestion dropdown's blur grace are
//! timers in a browser. Here they are state machines that take `Instant`s,
//! so the same code runs in tests, in a one-shot CLI call or in an event loop.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Logic for each operation
//! - [`feed`]: Store, debouncer, filter, paginator, suggestions, highlighting
//! - [`backend`]: Service abstraction and implementations
//! - [`auth`]: Token decoding, `Session` and `AuthContext`
//! - [`model`]: Wire types (`Post`, `Author`) and form types (`PostDraft`)
//! - [`config`]: Configuration management
//! - [`editor`]: External editor integration
//! - [`error`]: Error types

pub mod api;
pub mod auth;
pub mod backend;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod feed;
pub mod model;
