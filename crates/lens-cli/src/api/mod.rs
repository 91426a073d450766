//! HTTP surface served by `lens serve`.
//!
//! [`route`] turns a method and URL into a route; [`Api`] executes it
//! against the store and pipeline and produces a JSON [`ApiResponse`]. The
//! transport lives in [`crate::server`].

mod handler;
mod route;

pub use handler::Api;

use serde::Serialize;
use serde_json::{Value, json};

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok<T: Serialize>(value: &T) -> Self {
        Self::with_status(200, value)
    }

    pub fn with_status<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self { status, body },
            Err(e) => Self::error(500, format!("failed to serialize response: {e}")),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}
