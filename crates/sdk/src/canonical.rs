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

//! Canonical bytes of an inbound webhook
//!
//! The gateway signs its own encoding of the webhook object *without* the
//! `sign` member and then sends the object *with* it. The canonical bytes on
//! the verify path are therefore the received bytes with the `sign` member cut
//! out, and nothing else changed.
//!
//! Decoding the object and encoding it again is not equivalent. The gateway
//! emits `\/` for slashes and `\uXXXX` for non-ASCII text, and its key order
//! is whatever its application code inserted. A re-encode here agrees with it
//! only for payloads that happen to contain none of those.
//!
//! # Separator Rule
//!
//! Exactly one separator is removed together with the member:
//!
//! - member followed by another member: cut from the member's opening quote
//!   up to the next member's opening quote (member, comma, whitespace)
//! - last of several members: cut from the end of the previous value through
//!   the end of the member (whitespace, comma, member)
//! - only member: cut the member itself

use std::ops::Range;

use serde::de::IgnoredAny;

use crate::signing::TAG_FIELD;
use crate::verify::VerifyError;

/// Byte spans of one top-level object member
#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
	/// Key including its quotes
	key: Range<usize>,
	value: Range<usize>,
}

/// Location of the tag member inside a raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
	/// Bytes to remove to obtain the canonical form
	pub excise: Range<usize>,
	/// Decoded value of the `sign` member
	pub claimed: String,
}

/// Canonical bytes plus the tag claimed by the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
	pub bytes: Vec<u8>,
	pub claimed: String,
}

/// Validate the payload, find its tag and cut it out
pub fn canonicalize(raw: &[u8]) -> Result<Canonical, VerifyError> {
	let span = locate_tag(raw)?;
	let bytes = excise(raw, &span);
	Ok(Canonical {
		bytes,
		claimed: span.claimed,
	})
}

/// Remove the tag span, keeping every other byte verbatim
pub fn excise(raw: &[u8], span: &TagSpan) -> Vec<u8> {
	let mut out = Vec::with_capacity(raw.len() - span.excise.len());
	out.extend_from_slice(&raw[..span.excise.start]);
	out.extend_from_slice(&raw[span.excise.end..]);
	out
}

/// Find the `sign` member of a top-level JSON object
pub fn locate_tag(raw: &[u8]) -> Result<TagSpan, VerifyError> {
	// Full validation first: the scanner below assumes well-formed input.
	// Values are skipped, not built, so out-of-range numbers still pass.
	serde_json::from_slice::<IgnoredAny>(raw)
		.map_err(|e| VerifyError::MalformedPayload(e.to_string()))?;

	let members = Scanner::new(raw).top_level_members()?;

	let mut found = None;
	for (index, member) in members.iter().enumerate() {
		let key: String = serde_json::from_slice(&raw[member.key.clone()])
			.map_err(|e| VerifyError::MalformedPayload(e.to_string()))?;
		if key != TAG_FIELD {
			continue;
		}
		if found.is_some() {
			tracing::warn!("webhook payload carries more than one sign field");
			return Err(VerifyError::MalformedPayload(
				"duplicate sign field".to_string(),
			));
		}
		found = Some(index);
	}

	let index = found.ok_or(VerifyError::MissingTag)?;
	let member = &members[index];

	let value = &raw[member.value.clone()];
	if value.first() != Some(&b'"') {
		return Err(VerifyError::MissingTag);
	}
	let claimed: String = serde_json::from_slice(value)
		.map_err(|e| VerifyError::MalformedPayload(e.to_string()))?;

	let excise = if let Some(next) = members.get(index + 1) {
		member.key.start..next.key.start
	} else if let Some(previous) = index.checked_sub(1).map(|i| &members[i]) {
		previous.value.end..member.value.end
	} else {
		member.key.start..member.value.end
	};

	Ok(TagSpan { excise, claimed })
}

/// Single-pass scanner that records member spans of the outermost object
///
/// Nested values are skipped, not interpreted. Input has already been
/// validated, so errors here only guard against truncated buffers.
struct Scanner<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Scanner<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	fn top_level_members(mut self) -> Result<Vec<Member>, VerifyError> {
		let mut members = Vec::new();

		self.skip_whitespace();
		self.expect(b'{')?;
		self.skip_whitespace();
		if self.peek()? == b'}' {
			return Ok(members);
		}

		loop {
			self.skip_whitespace();
			let key = self.string()?;
			self.skip_whitespace();
			self.expect(b':')?;
			self.skip_whitespace();
			let value = self.value()?;
			members.push(Member { key, value });

			self.skip_whitespace();
			match self.next()? {
				b',' => continue,
				b'}' => break,
				other => return Err(unexpected(other, self.pos - 1)),
			}
		}

		Ok(members)
	}

	fn value(&mut self) -> Result<Range<usize>, VerifyError> {
		match self.peek()? {
			b'"' => self.string(),
			b'{' | b'[' => self.container(),
			_ => Ok(self.scalar()),
		}
	}

	fn string(&mut self) -> Result<Range<usize>, VerifyError> {
		let start = self.pos;
		self.expect(b'"')?;
		loop {
			match self.next()? {
				b'\\' => {
					self.next()?;
				}
				b'"' => return Ok(start..self.pos),
				_ => {}
			}
		}
	}

	fn container(&mut self) -> Result<Range<usize>, VerifyError> {
		let start = self.pos;
		let mut depth = 0usize;
		loop {
			match self.peek()? {
				b'"' => {
					self.string()?;
					continue;
				}
				b'{' | b'[' => depth += 1,
				b'}' | b']' => {
					depth -= 1;
					if depth == 0 {
						self.pos += 1;
						return Ok(start..self.pos);
					}
				}
				_ => {}
			}
			self.pos += 1;
		}
	}

	/// Numbers, `true`, `false` and `null`
	fn scalar(&mut self) -> Range<usize> {
		let start = self.pos;
		while let Some(&b) = self.bytes.get(self.pos) {
			if matches!(b, b',' | b'}' | b']') || is_whitespace(b) {
				break;
			}
			self.pos += 1;
		}
		start..self.pos
	}

	fn skip_whitespace(&mut self) {
		while self.bytes.get(self.pos).is_some_and(|&b| is_whitespace(b)) {
			self.pos += 1;
		}
	}

	fn peek(&self) -> Result<u8, VerifyError> {
		self.bytes
			.get(self.pos)
			.copied()
			.ok_or_else(|| VerifyError::MalformedPayload("unexpected end of payload".to_string()))
	}

	fn next(&mut self) -> Result<u8, VerifyError> {
		let b = self.peek()?;
		self.pos += 1;
		Ok(b)
	}

	fn expect(&mut self, want: u8) -> Result<(), VerifyError> {
		let got = self.next()?;
		if got != want {
			return Err(unexpected(got, self.pos - 1));
		}
		Ok(())
	}
}

fn is_whitespace(b: u8) -> bool {
	matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn unexpected(b: u8, at: usize) -> VerifyError {
	VerifyError::MalformedPayload(format!(
		"unexpected byte {:?} at offset {}",
		b as char, at
	))
}
