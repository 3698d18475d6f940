// Copyright 2025 chenjjiaa
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

//! Request signing
//!
//! A tag is `md5(base64(canonical_bytes) + api_key)` rendered as 32 lowercase
//! hex characters. On the outbound path this crate is the only producer of the
//! canonical bytes: they are simply the serializer's compact output for the
//! request payload, with the configured [`EscapePolicy`] applied.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use md5::{Digest, Md5};
use serde::Serialize;
use serde::de::IgnoredAny;

use crate::credentials::SecretKey;

/// Name of the tag field inside webhook bodies and of the request header
pub const TAG_FIELD: &str = "sign";

/// Error types for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Payload is not a JSON object")]
	NotAnObject,
	#[error("Payload already carries a `sign` field")]
	TagFieldPresent,
	#[error("Invalid tag: {0}")]
	InvalidTag(String),
}

/// Hex-encoded 128-bit authentication tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
	/// Number of hex characters in a tag
	pub const LEN: usize = 32;

	/// Parse a tag, accepting only 32 lowercase hex characters
	pub fn parse(s: &str) -> Result<Self, SigningError> {
		let well_formed = s.len() == Self::LEN
			&& s
				.bytes()
				.all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
		if !well_formed {
			return Err(SigningError::InvalidTag(s.to_string()));
		}
		Ok(Self(s.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Tag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Escaping applied to serializer output before it is signed
///
/// The gateway's own encoder escapes forward slashes and every non-ASCII
/// character. Which policy an integration uses is fixed per integration,
/// never decided per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapePolicy {
	/// Serializer output as-is: `/` unescaped, non-ASCII as raw UTF-8
	#[default]
	Plain,
	/// `/` as `\/`, non-ASCII as `\uXXXX` (UTF-16 units, lowercase hex)
	Php,
}

impl EscapePolicy {
	/// Apply the policy to compact JSON text.
	///
	/// Both `/` and non-ASCII characters can only occur inside string
	/// literals of serializer output, so a plain character rewrite is exact.
	fn apply(self, json: String) -> String {
		match self {
			EscapePolicy::Plain => json,
			EscapePolicy::Php => {
				let mut out = String::with_capacity(json.len() + json.len() / 8);
				let mut units = [0u16; 2];
				for c in json.chars() {
					if c == '/' {
						out.push_str("\\/");
					} else if c.is_ascii() {
						out.push(c);
					} else {
						for unit in c.encode_utf16(&mut units) {
							// Writing into a String cannot fail
							let _ = write!(out, "\\u{:04x}", unit);
						}
					}
				}
				out
			}
		}
	}
}

/// Compute the tag over already-canonical bytes
pub fn compute_tag(canonical: &[u8], key: &SecretKey) -> Tag {
	let encoded = STANDARD.encode(canonical);
	let digest = Md5::new()
		.chain_update(encoded.as_bytes())
		.chain_update(key.expose_secret().as_bytes())
		.finalize();
	Tag(hex::encode(digest))
}

/// Serialize a request payload into the bytes that get signed and sent
///
/// `None` is a request without a body and yields an empty byte string.
/// `Some(&json!({}))` yields `{}`. The two produce different tags.
pub fn canonical_body<T: Serialize + ?Sized>(
	payload: Option<&T>,
	policy: EscapePolicy,
) -> Result<Vec<u8>, SigningError> {
	let Some(payload) = payload else {
		return Ok(Vec::new());
	};

	let json =
		serde_json::to_string(payload).map_err(|e| SigningError::Serialization(e.to_string()))?;
	Ok(policy.apply(json).into_bytes())
}

/// Sign a request payload
pub fn sign<T: Serialize + ?Sized>(
	payload: Option<&T>,
	key: &SecretKey,
	policy: EscapePolicy,
) -> Result<Tag, SigningError> {
	let body = canonical_body(payload, policy)?;
	let tag = compute_tag(&body, key);
	tracing::debug!(body_len = body.len(), tag = %tag, "signed payload");
	Ok(tag)
}

/// Produce a wire object carrying its own tag, the way the gateway sends webhooks
///
/// The tag is computed over the canonical bytes of `payload`, then a
/// `"sign"` member is appended as the last member of the object.
pub fn seal<T: Serialize + ?Sized>(
	payload: &T,
	key: &SecretKey,
	policy: EscapePolicy,
) -> Result<Vec<u8>, SigningError> {
	let value =
		serde_json::to_value(payload).map_err(|e| SigningError::Serialization(e.to_string()))?;
	let has_members = check_sealable(&value)?;

	let canonical = canonical_body(Some(payload), policy)?;
	let tag = compute_tag(&canonical, key);
	append_tag(&canonical, &tag, has_members)
}

/// Seal a JSON object given as raw bytes, signing those bytes verbatim
///
/// Surrounding whitespace is dropped; everything inside the object,
/// including its formatting and escapes, is signed as-is.
pub fn seal_raw(raw: &[u8], key: &SecretKey) -> Result<Vec<u8>, SigningError> {
	serde_json::from_slice::<IgnoredAny>(raw)
		.map_err(|e| SigningError::Serialization(e.to_string()))?;

	let canonical = raw.trim_ascii();
	if canonical.first() != Some(&b'{') {
		return Err(SigningError::NotAnObject);
	}
	let members: BTreeMap<String, IgnoredAny> = serde_json::from_slice(canonical)
		.map_err(|e| SigningError::Serialization(e.to_string()))?;
	if members.contains_key(TAG_FIELD) {
		return Err(SigningError::TagFieldPresent);
	}

	let tag = compute_tag(canonical, key);
	append_tag(canonical, &tag, !members.is_empty())
}

/// Returns whether the object has members
fn check_sealable(value: &serde_json::Value) -> Result<bool, SigningError> {
	let map = value.as_object().ok_or(SigningError::NotAnObject)?;
	if map.contains_key(TAG_FIELD) {
		return Err(SigningError::TagFieldPresent);
	}
	Ok(!map.is_empty())
}

/// Insert the tag member right after the last value, before any whitespace
/// preceding the closing brace, so that excising it restores `canonical`
fn append_tag(canonical: &[u8], tag: &Tag, has_members: bool) -> Result<Vec<u8>, SigningError> {
	let close = canonical
		.iter()
		.rposition(|&b| b == b'}')
		.ok_or(SigningError::NotAnObject)?;
	let insert_at = canonical[..close].trim_ascii_end().len();

	let mut wire = Vec::with_capacity(canonical.len() + Tag::LEN + 10);
	wire.extend_from_slice(&canonical[..insert_at]);
	if has_members {
		wire.push(b',');
	}
	wire.push(b'"');
	wire.extend_from_slice(TAG_FIELD.as_bytes());
	wire.extend_from_slice(b"\":\"");
	wire.extend_from_slice(tag.as_str().as_bytes());
	wire.push(b'"');
	wire.extend_from_slice(&canonical[insert_at..]);
	Ok(wire)
}
