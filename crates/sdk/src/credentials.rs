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

//! Merchant credentials and API key selection
//!
//! The gateway issues one API key per API surface. Requests against the
//! payment endpoints and webhooks about payments are signed with the payment
//! key; payout endpoints and payout webhooks use the payout key. Using the
//! wrong key does not fail loudly, it just produces tags that never match.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable prefix for credentials (`HELEKET_MERCHANT`, ...)
pub const ENV_PREFIX: &str = "HELEKET";

/// Error types for credential loading
#[derive(Debug, Error)]
pub enum CredentialsError {
	#[error("Configuration error: {0}")]
	Config(#[from] config::ConfigError),
	#[error("Empty credential: {0}")]
	EmptyKey(&'static str),
}

/// API surface a request or webhook belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiSurface {
	#[default]
	Payment,
	Payout,
}

impl fmt::Display for ApiSurface {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiSurface::Payment => f.write_str("payment"),
			ApiSurface::Payout => f.write_str("payout"),
		}
	}
}

/// Opaque API key
///
/// Never printed: `Debug` is redacted so the key cannot leak through
/// error values or structured log fields.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
	pub fn new(key: impl Into<String>) -> Result<Self, CredentialsError> {
		let key = key.into();
		if key.is_empty() {
			return Err(CredentialsError::EmptyKey("secret key"));
		}
		Ok(Self(key))
	}

	pub fn expose_secret(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SecretKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretKey(<redacted>)")
	}
}

/// Merchant identity plus one key per API surface
#[derive(Debug, Clone)]
pub struct Credentials {
	pub merchant: String,
	pub payment_key: SecretKey,
	pub payout_key: SecretKey,
}

/// Shape of the credentials as they appear in config files and env vars
#[derive(Debug, Deserialize)]
struct RawCredentials {
	merchant: String,
	payment_key: String,
	payout_key: String,
}

impl Credentials {
	pub fn new(
		merchant: impl Into<String>,
		payment_key: impl Into<String>,
		payout_key: impl Into<String>,
	) -> Result<Self, CredentialsError> {
		let merchant = merchant.into();
		if merchant.is_empty() {
			return Err(CredentialsError::EmptyKey("merchant"));
		}

		let payment_key =
			SecretKey::new(payment_key).map_err(|_| CredentialsError::EmptyKey("payment_key"))?;
		let payout_key =
			SecretKey::new(payout_key).map_err(|_| CredentialsError::EmptyKey("payout_key"))?;

		Ok(Self {
			merchant,
			payment_key,
			payout_key,
		})
	}

	/// Select the key for the given API surface
	pub fn key_for(&self, surface: ApiSurface) -> &SecretKey {
		match surface {
			ApiSurface::Payment => &self.payment_key,
			ApiSurface::Payout => &self.payout_key,
		}
	}

	/// Load credentials from `HELEKET_MERCHANT`, `HELEKET_PAYMENT_KEY`
	/// and `HELEKET_PAYOUT_KEY`
	pub fn from_env() -> Result<Self, CredentialsError> {
		let cfg = config::Config::builder()
			.add_source(config::Environment::with_prefix(ENV_PREFIX))
			.build()?;

		Self::from_raw(cfg.try_deserialize()?)
	}

	/// Load credentials from file, with environment variables taking precedence
	pub fn from_file(path: &str) -> Result<Self, CredentialsError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(config::Environment::with_prefix(ENV_PREFIX))
			.build()?;

		Self::from_raw(cfg.try_deserialize()?)
	}

	fn from_raw(raw: RawCredentials) -> Result<Self, CredentialsError> {
		Self::new(raw.merchant, raw.payment_key, raw.payout_key)
	}
}
