//! API failure types and the shared error classifiers.
//!
//! Two failure kinds exist: the server rejected an otherwise
//! successful exchange (`resultCode != 0`, user-visible messages in
//! the envelope), or the exchange itself failed (transport, bad
//! status, undecodable body). Every remote call site routes its
//! failure through the same classifier, so both kinds surface
//! identically no matter which workflow hit them.

use thiserror::Error;

use crate::state::{Action, RequestStatus};
use crate::store::StoreHandle;

/// Fallback message when the server gives us nothing usable.
pub const GENERIC_ERROR: &str = "Some error occurred";

/// Failures raised by the HTTP layer before a well-formed response
/// envelope exists.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, including body decode errors.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The exchange completed but with a non-success HTTP status.
    #[error("server returned status {0}")]
    Status(u16),

    /// Client is missing required configuration.
    #[error("missing configuration: {0}")]
    Config(&'static str),

    /// Failure with a bare message (test doubles, wrappers).
    #[error("{0}")]
    Other(String),
}

/// Server-rejection classifier: the exchange succeeded but the server
/// refused the operation. Surfaces the first server message, then
/// fails the request status.
pub fn handle_server_error<S: StoreHandle + ?Sized>(store: &S, messages: &[String]) {
    let message = messages
        .first()
        .filter(|m| !m.is_empty())
        .cloned()
        .unwrap_or_else(|| GENERIC_ERROR.to_string());
    store.dispatch(Action::SetError {
        message: Some(message),
    });
    store.dispatch(Action::SetStatus {
        status: RequestStatus::Failed,
    });
}

/// Network-failure classifier: no usable envelope came back. Surfaces
/// the error's display form, then fails the request status.
pub fn handle_network_error<S: StoreHandle + ?Sized>(store: &S, err: &ApiError) {
    let message = match err.to_string() {
        m if m.is_empty() => GENERIC_ERROR.to_string(),
        m => m,
    };
    store.dispatch(Action::SetError {
        message: Some(message),
    });
    store.dispatch(Action::SetStatus {
        status: RequestStatus::Failed,
    });
}

// ── Tests ──────────────────────────────────────────────────────
