// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::credentials::{ApiSurface, Credentials};
use crate::signing::{EscapePolicy, Tag, TAG_FIELD, canonical_body, compute_tag};
use crate::types::ApiResponse;
use reqwest::{Client as ReqwestClient, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Default gateway API root
pub const DEFAULT_BASE_URL: &str = "https://api.heleket.com/v1";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the merchant identifier
pub const MERCHANT_HEADER: &str = "merchant";

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Server error: {0}")]
	Server(String),
	#[error("Signing error: {0}")]
	Signing(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// A request body together with the headers that authenticate it
#[derive(Debug, Clone)]
pub struct SignedRequest {
	/// Exact bytes to send; the tag was computed over these
	pub body: Vec<u8>,
	pub sign: Tag,
	pub merchant: String,
}

/// Client for the gateway API
///
/// Every call is signed with the key of the API surface it targets.
pub struct Client {
	base_url: String,
	client: ReqwestClient,
	credentials: Credentials,
	policy: EscapePolicy,
}

impl Client {
	/// Create a new client against the default API root
	pub fn new(credentials: Credentials) -> Result<Self, ClientError> {
		Self::with_config(
			credentials,
			DEFAULT_BASE_URL,
			Duration::from_secs(DEFAULT_TIMEOUT_SECS),
		)
	}

	/// Create a new client with custom configuration
	pub fn with_config(
		credentials: Credentials,
		base_url: impl Into<String>,
		timeout: Duration,
	) -> Result<Self, ClientError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			base_url: base_url.into(),
			client,
			credentials,
			policy: EscapePolicy::default(),
		})
	}

	/// Override the escaping applied to request bodies before signing
	pub fn with_escape_policy(mut self, policy: EscapePolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Serialize and sign a request body
	///
	/// `None` signs the empty string, which is what the gateway expects for
	/// requests without a body.
	pub fn signed_request<T: Serialize + ?Sized>(
		&self,
		surface: ApiSurface,
		payload: Option<&T>,
	) -> Result<SignedRequest, ClientError> {
		let body = canonical_body(payload, self.policy)
			.map_err(|e| ClientError::Signing(e.to_string()))?;
		let sign = compute_tag(&body, self.credentials.key_for(surface));

		Ok(SignedRequest {
			body,
			sign,
			merchant: self.credentials.merchant.clone(),
		})
	}

	/// POST a signed JSON body and decode the `result` of the response
	pub async fn post<T, R>(
		&self,
		endpoint: &str,
		payload: Option<&T>,
		surface: ApiSurface,
	) -> Result<R, ClientError>
	where
		T: Serialize + ?Sized,
		R: DeserializeOwned,
	{
		let signed = self.signed_request(surface, payload)?;
		self.send(Method::POST, endpoint, signed, surface).await
	}

	/// GET an endpoint; the tag covers the empty body
	pub async fn get<R: DeserializeOwned>(
		&self,
		endpoint: &str,
		surface: ApiSurface,
	) -> Result<R, ClientError> {
		let signed = self.signed_request::<()>(surface, None)?;
		self.send(Method::GET, endpoint, signed, surface).await
	}

	async fn send<R: DeserializeOwned>(
		&self,
		method: Method,
		endpoint: &str,
		signed: SignedRequest,
		surface: ApiSurface,
	) -> Result<R, ClientError> {
		let url = format!("{}{}", self.base_url, endpoint);
		tracing::debug!(%method, %url, %surface, "sending signed request");

		let mut request = self
			.client
			.request(method.clone(), &url)
			.header(reqwest::header::CONTENT_TYPE, "application/json")
			.header(MERCHANT_HEADER, signed.merchant.as_str())
			.header(TAG_FIELD, signed.sign.as_str());
		if method != Method::GET {
			request = request.body(signed.body);
		}

		let response = request
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		if !response.status().is_success() {
			let status = response.status();
			let error_text = response
				.text()
				.await
				.unwrap_or_else(|_| format!("HTTP {}", status));
			return Err(ClientError::Server(format!("{}: {}", status, error_text)));
		}

		let bytes = response
			.bytes()
			.await
			.map_err(|e| ClientError::Network(format!("Failed to read response: {}", e)))?;

		let envelope: ApiResponse<R> = serde_json::from_slice(&bytes)
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))?;

		if envelope.state != 0 {
			return Err(ClientError::Server(envelope.message.unwrap_or_else(|| {
				format!("gateway returned state {}", envelope.state)
			})));
		}

		envelope
			.result
			.ok_or_else(|| ClientError::InvalidResponse("missing result".to_string()))
	}
}
