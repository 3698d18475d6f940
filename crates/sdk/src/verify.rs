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

//! Webhook signature verification
//!
//! Verification recomputes the tag over the payload bytes the gateway signed
//! and compares it with the tag embedded in the payload.
//!
//! # Verification Steps
//!
//! 1. Locate the top-level `sign` member in the raw body (see [`crate::canonical`])
//! 2. Excise it, keeping every other byte exactly as received
//! 3. Recompute the tag over the remaining bytes with the surface's API key
//! 4. Compare both tags in constant time
//!
//! The body handed to [`verify`] must be the exact bytes read off the wire.
//! Anything that parsed and re-encoded it on the way in (key reordering,
//! dropping `\/` escapes, unescaping `\uXXXX`) makes every tag mismatch.

use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::canonical::canonicalize;
use crate::credentials::SecretKey;
use crate::signing::compute_tag;

/// Error types for verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
	#[error("Malformed payload: {0}")]
	MalformedPayload(String),
	#[error("Missing signature field in payload")]
	MissingTag,
	#[error("Signature mismatch: expected {expected}, received {received}")]
	SignatureMismatch { expected: String, received: String },
}

/// Verify a webhook body against the API key it should have been signed with
pub fn verify(raw: &[u8], key: &SecretKey) -> Result<(), VerifyError> {
	let canonical = canonicalize(raw)?;
	let expected = compute_tag(&canonical.bytes, key);

	if !constant_time_eq(expected.as_str().as_bytes(), canonical.claimed.as_bytes()) {
		tracing::warn!(
			expected = %expected,
			received = %canonical.claimed,
			canonical_len = canonical.bytes.len(),
			"webhook signature mismatch"
		);
		return Err(VerifyError::SignatureMismatch {
			expected: expected.to_string(),
			received: canonical.claimed,
		});
	}

	tracing::debug!(tag = %expected, "webhook signature verified");
	Ok(())
}

/// Constant-time byte comparison
///
/// Lengths are compared first. Equal-length inputs are then compared with
/// `subtle`, which folds the XOR of every byte pair into one accumulator and
/// never exits early, so the position of the first differing byte does not
/// show up in the timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}
	a.ct_eq(b).into()
}
