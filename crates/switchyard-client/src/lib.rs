//! # switchyard-client
//!
//! Concrete adapters for the ports defined in `switchyard-core`:
//!
//! - [`HttpParameterStore`]: remote parameter store (`GetParametersByPath`)
//! - [`FileConfigStore`]: entries from a local TOML/JSON file
//! - [`HttpFunctionInvoker`]: remote function invoke API

#![warn(clippy::all)]

pub mod error;
pub mod file_store;
pub mod function_invoker;
pub mod parameter_store;

pub use error::{Error, Result};
pub use file_store::FileConfigStore;
pub use function_invoker::HttpFunctionInvoker;
pub use parameter_store::HttpParameterStore;

/// Build an [`Error::Status`] from a non-success response.
///
/// Services report failures as JSON with a `message`/`Message` field; the
/// raw body is used when there is none.
pub(crate) async fn status_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "Message", "errorMessage"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or(body);
    Error::Status { status, message }
}
