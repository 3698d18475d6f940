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

//! Webhook parsing
//!
//! Pass the request body exactly as read from the socket. Verification runs
//! on those bytes before anything is decoded.

use thiserror::Error;

use crate::credentials::SecretKey;
use crate::types::WebhookEvent;
use crate::verify::{VerifyError, verify};

/// Error types for webhook handling
#[derive(Debug, Error)]
pub enum WebhookError {
	#[error(transparent)]
	Verify(#[from] VerifyError),
	#[error("Failed to decode webhook: {0}")]
	Decode(String),
}

/// Parse a webhook body, verifying its tag first when a key is given
pub fn parse_webhook(raw: &[u8], key: Option<&SecretKey>) -> Result<WebhookEvent, WebhookError> {
	if let Some(key) = key {
		verify(raw, key)?;
	}

	let event: WebhookEvent =
		serde_json::from_slice(raw).map_err(|e| WebhookError::Decode(e.to_string()))?;

	tracing::info!(
		kind = ?event.kind,
		uuid = event.uuid.as_deref().unwrap_or("-"),
		status = event.status.as_deref().unwrap_or("-"),
		verified = key.is_some(),
		"webhook received"
	);
	Ok(event)
}
