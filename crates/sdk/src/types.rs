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

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope wrapping every gateway response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<R> {
	/// 0 on success
	#[serde(default)]
	pub state: i64,
	/// Endpoint-specific payload
	pub result: Option<R>,
	/// Error description when `state` is non-zero
	#[serde(default)]
	pub message: Option<String>,
}

/// Kind of event a webhook reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookKind {
	Payment,
	Payout,
	Wallet,
	#[serde(other)]
	Unknown,
}

/// Inbound webhook
///
/// Only the envelope fields are typed; everything else is kept as received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
	#[serde(rename = "type")]
	pub kind: WebhookKind,
	#[serde(default)]
	pub uuid: Option<String>,
	#[serde(default)]
	pub order_id: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub is_final: Option<bool>,
	/// Claimed tag
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sign: Option<String>,
	/// Remaining payload fields
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}
