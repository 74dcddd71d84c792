pub mod client;
pub mod request;
pub mod types;

pub use client::{ApiError, HttpBackend, PostsBackend};
pub use request::{CancelHandle, spawn_cancellable};
pub use types::{Author, Post};
