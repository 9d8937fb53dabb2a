//! Compute adapter for the function `Invoke` REST API.
//!
//! `POST {endpoint}/2015-03-31/functions/{unit}/invocations` with the
//! payload as body and the invocation context base64-encoded in
//! `X-Amz-Client-Context`. A function-level failure is flagged with the
//! `X-Amz-Function-Error` response header.

use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;
use switchyard_core::ComputeInvoker;
use url::Url;

const FUNCTION_ERROR_HEADER: &str = "X-Amz-Function-Error";
const CLIENT_CONTEXT_HEADER: &str = "X-Amz-Client-Context";

/// Body of a function error, when the platform provides one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionErrorBody {
    error_type: Option<String>,
}

/// Compute invoker backed by the function invoke endpoint.
#[derive(Clone, Debug)]
pub struct HttpFunctionInvoker {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFunctionInvoker {
    /// Create an invoker for the given base URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Create an invoker using a preconfigured HTTP client.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of the invoke call for `unit_id`, which is encoded as a single
    /// path segment.
    pub fn invocation_url(&self, unit_id: &str) -> Result<Url> {
        let invalid = |message: String| Error::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            message,
        };
        let mut url = Url::parse(&self.endpoint).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["2015-03-31", "functions", unit_id, "invocations"]);
        Ok(url)
    }

    async fn call(&self, unit_id: &str, payload: &Value, side_channel: &Value) -> Result<Vec<u8>> {
        let client_context = STANDARD.encode(serde_json::to_vec(side_channel)?);

        let response = self
            .client
            .post(self.invocation_url(unit_id)?)
            .header("X-Amz-Invocation-Type", "RequestResponse")
            .header(CLIENT_CONTEXT_HEADER, client_context)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(crate::status_error(response).await);
        }

        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        if let Some(kind) = function_error {
            log::debug!("Compute unit '{unit_id}' reported a function error ({kind})");
            // Described errors are decoded downstream; bare ones stop here.
            let described = serde_json::from_slice::<FunctionErrorBody>(&body)
                .ok()
                .and_then(|b| b.error_type)
                .is_some();
            if !described {
                return Err(Error::Core(switchyard_core::Error::invocation(format!(
                    "Function error: {kind}"
                ))));
            }
        }

        Ok(body)
    }
}

#[async_trait]
impl ComputeInvoker for HttpFunctionInvoker {
    async fn invoke(
        &self,
        unit_id: &str,
        payload: &Value,
        side_channel: &Value,
    ) -> switchyard_core::Result<Vec<u8>> {
        self.call(unit_id, payload, side_channel)
            .await
            .map_err(Error::into_invocation_error)
    }
}
