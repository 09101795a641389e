//! Shared WebSocket adapter state.
//!
//! The WebSocket entry point depends on domain ports instead of concrete
//! adapters so the session loop can be exercised with in-memory doubles.

use std::sync::Arc;

use crate::domain::ports::UserRepository;

/// Dependency bundle for the WebSocket adapter.
#[derive(Clone)]
pub struct WsState {
    pub users: Arc<dyn UserRepository>,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}
