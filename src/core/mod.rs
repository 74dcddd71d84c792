//! # Core Application Logic
//!
//! This module contains PostsApp's session logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • SessionState         │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • storage observers    │
//!                    └───────────┬─────────────┘
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!          ┌────────────┐                ┌────────────┐
//!          │    TUI     │                │    API     │
//!          │  Adapter   │                │  (reqwest) │
//!          │ (ratatui)  │                │            │
//!          └────────────┘                └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `SessionState` and `User`
//! - [`action`]: the `Action` enum and the pure `update()` reducer
//! - [`storage`]: durable key/value storage for credentials
//! - [`persist`]: keeps storage in step with `logged_in`
//! - [`store`]: state + storage behind a single `dispatch`
//! - [`startup`]: one-shot validation of a stored token
//! - [`config`]: layered configuration

pub mod action;
pub mod config;
pub mod persist;
pub mod startup;
pub mod state;
pub mod storage;
pub mod store;
