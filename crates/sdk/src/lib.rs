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

//! Heleket SDK - Client library for the Heleket crypto payment gateway
//!
//! This crate signs outbound API requests and verifies inbound webhooks.
//!
//! - Signing: `md5(base64(body) + api_key)` as lowercase hex, sent in the
//!   `sign` header
//! - Verification: the `sign` member is cut out of the raw webhook bytes and
//!   the tag is recomputed over what remains
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background threads
//! - No global state
//! - No environment or configuration loading unless asked for

pub mod canonical;
pub mod client;
pub mod credentials;
pub mod signing;
pub mod types;
pub mod verify;
pub mod webhook;

pub use canonical::{Canonical, TagSpan, canonicalize};
pub use client::{Client, ClientError, SignedRequest};
pub use credentials::{ApiSurface, Credentials, CredentialsError, SecretKey};
pub use signing::{EscapePolicy, SigningError, Tag, compute_tag, seal, seal_raw, sign};
pub use types::*;
pub use verify::{VerifyError, constant_time_eq, verify};
pub use webhook::{WebhookError, parse_webhook};
