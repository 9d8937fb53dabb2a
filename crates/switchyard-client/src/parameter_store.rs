//! Parameter store adapter speaking the JSON `GetParametersByPath` protocol.
//!
//! Requests are plain JSON POSTs with an `X-Amz-Target` header. They are not
//! signed; point `endpoint` at a local emulator or a signing proxy.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use switchyard_core::{ConfigEntry, ConfigPage, ConfigStore};

const TARGET: &str = "AmazonSSM.GetParametersByPath";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersByPathRequest<'a> {
    path: &'a str,
    recursive: bool,
    with_decryption: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersByPathResponse {
    #[serde(default)]
    parameters: Vec<Parameter>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Parameter {
    name: String,
    value: String,
}

/// Config store backed by a remote parameter store.
#[derive(Clone, Debug)]
pub struct HttpParameterStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpParameterStore {
    /// Create a store for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Create a store using a preconfigured HTTP client.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch_page(&self, namespace: &str, next_token: Option<&str>) -> Result<ConfigPage> {
        let request = GetParametersByPathRequest {
            path: namespace,
            recursive: true,
            with_decryption: true,
            next_token,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Amz-Target", TARGET)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(crate::status_error(response).await);
        }

        let body = response.bytes().await?;
        let page: GetParametersByPathResponse = serde_json::from_slice(&body)?;
        log::debug!(
            "Parameter store returned {} entr(ies) under '{namespace}'",
            page.parameters.len()
        );

        Ok(ConfigPage {
            entries: page
                .parameters
                .into_iter()
                .map(|p| ConfigEntry::new(p.name, p.value))
                .collect(),
            next_token: page.next_token.filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait]
impl ConfigStore for HttpParameterStore {
    async fn list_entries(
        &self,
        namespace: &str,
        next_token: Option<&str>,
    ) -> switchyard_core::Result<ConfigPage> {
        self.fetch_page(namespace, next_token).await.map_err(|e: Error| {
            e.into_store_error(&format!("Failed to list entries under '{namespace}'"))
        })
    }
}
