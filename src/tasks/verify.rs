//! Explorer verification lookups.
//!
//! # Responsibilities
//! - Build explorer API requests from a resolved `VerificationDescriptor`
//! - Ask whether a contract's source is verified (`getsourcecode`)
//! - Refuse to send requests with an empty API key

use std::time::Duration;

use alloy::primitives::Address;
use serde::Deserialize;
use url::Url;

use crate::config::loader::ConfigError;
use crate::registry::VerificationDescriptor;
use crate::tasks::TaskError;

/// Source verification state of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Verified {
        contract_name: String,
        compiler_version: String,
    },
    Unverified,
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SourceEntry {
    #[serde(default)]
    source_code: String,
    #[serde(default)]
    contract_name: String,
    #[serde(default)]
    compiler_version: String,
}

/// Client for one network's explorer API.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    descriptor: VerificationDescriptor,
}

impl ExplorerClient {
    pub fn new(descriptor: VerificationDescriptor, timeout: Duration) -> Result<Self, TaskError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TaskError::Explorer(e.to_string()))?;
        Ok(Self { http, descriptor })
    }

    pub fn descriptor(&self) -> &VerificationDescriptor {
        &self.descriptor
    }

    /// Request URL for a source code lookup.
    pub fn source_code_url(&self, address: Address) -> Url {
        let mut url = self.descriptor.api_url.clone();
        url.query_pairs_mut()
            .append_pair("module", "contract")
            .append_pair("action", "getsourcecode")
            .append_pair("address", &address.to_string())
            .append_pair("apikey", self.descriptor.api_key.expose());
        url
    }

    /// Ask the explorer whether `address` has verified source.
    pub async fn source_status(&self, address: Address) -> Result<SourceStatus, TaskError> {
        if self.descriptor.api_key.is_empty() {
            return Err(ConfigError::MissingSecret {
                network: self.descriptor.network.clone(),
                reference: "explorer API key".to_string(),
            }
            .into());
        }

        tracing::info!(
            network = %self.descriptor.network,
            api = %self.descriptor.api_url,
            address = %address,
            "Querying explorer"
        );
        // The URL carries the API key; keep it out of error messages.
        let response = self
            .http
            .get(self.source_code_url(address))
            .send()
            .await
            .map_err(|e| TaskError::Explorer(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TaskError::Explorer(e.without_url().to_string()))?;
        if !status.is_success() {
            return Err(TaskError::Explorer(format!("explorer returned HTTP {}", status)));
        }
        parse_source_response(&body)
    }
}

/// Interpret a `getsourcecode` response body.
pub fn parse_source_response(body: &str) -> Result<SourceStatus, TaskError> {
    let response: ExplorerResponse = serde_json::from_str(body)
        .map_err(|e| TaskError::Explorer(format!("malformed explorer response: {}", e)))?;

    if response.status != "1" {
        let detail = response
            .result
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| response.result.to_string());
        return Err(TaskError::Explorer(format!("{}: {}", response.message, detail)));
    }

    let entries: Vec<SourceEntry> = serde_json::from_value(response.result)
        .map_err(|e| TaskError::Explorer(format!("malformed explorer result: {}", e)))?;

    match entries.into_iter().next() {
        Some(entry) if !entry.source_code.is_empty() => Ok(SourceStatus::Verified {
            contract_name: entry.contract_name,
            compiler_version: entry.compiler_version,
        }),
        _ => Ok(SourceStatus::Unverified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secrets::SecretRef;
    use crate::registry::EndpointSource;
    use std::collections::HashMap;

    fn descriptor(key: &str) -> VerificationDescriptor {
        VerificationDescriptor {
            network: "blast_mainnet".into(),
            chain_id: 81457,
            api_key: SecretRef::literal(key).resolve(&HashMap::new()),
            api_url: "https://api.blastscan.io/api".parse().unwrap(),
            browser_url: "https://blastscan.io".into(),
            source: EndpointSource::Custom,
        }
    }

    #[test]
    fn test_source_code_url() {
        let client = ExplorerClient::new(descriptor("KEY"), Duration::from_secs(5)).unwrap();
        let url = client.source_code_url(Address::ZERO);
        assert_eq!(url.host_str(), Some("api.blastscan.io"));
        assert_eq!(url.path(), "/api");
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["module"], "contract");
        assert_eq!(query["action"], "getsourcecode");
        assert_eq!(query["apikey"], "KEY");
        assert_eq!(query["address"], Address::ZERO.to_string());
    }

    #[test]
    fn test_browser_link() {
        let d = descriptor("KEY");
        assert_eq!(d.address_url("0xabc"), "https://blastscan.io/address/0xabc");
    }

    #[test]
    fn test_parse_verified() {
        let body = r#"{"status":"1","message":"OK","result":[{"SourceCode":"pragma solidity ^0.8.4;","ContractName":"Archetype","CompilerVersion":"v0.8.4+commit.c7e474f2"}]}"#;
        assert_eq!(
            parse_source_response(body).unwrap(),
            SourceStatus::Verified {
                contract_name: "Archetype".into(),
                compiler_version: "v0.8.4+commit.c7e474f2".into(),
            }
        );
    }

    #[test]
    fn test_parse_unverified() {
        let body = r#"{"status":"1","message":"OK","result":[{"SourceCode":"","ContractName":"","CompilerVersion":""}]}"#;
        assert_eq!(parse_source_response(body).unwrap(), SourceStatus::Unverified);
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        let err = parse_source_response(body).unwrap_err();
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn test_empty_key_is_refused() {
        let client = ExplorerClient::new(descriptor(""), Duration::from_secs(5)).unwrap();
        let err = client.source_status(Address::ZERO).await.unwrap_err();
        assert!(matches!(err, TaskError::Config(ConfigError::MissingSecret { .. })));
    }
}
