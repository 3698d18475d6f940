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

//! Subcommand handlers
//!
//! Input bytes are signed as read, minus surrounding ASCII whitespace, so
//! a trailing newline left by an editor does not change the tag. Empty
//! input signs the empty body used by bodiless requests.

use std::{
	io::{self, Write},
	path::Path,
};

use anyhow::{Context, Result};
use heleket_sdk::{ApiSurface, Tag, WebhookEvent, compute_tag, parse_webhook, seal_raw};
use tracing::info;

use crate::config::{CliConfig, read_input};

pub fn sign(cfg: &CliConfig, surface: ApiSurface, input: Option<&Path>) -> Result<()> {
	let raw = read_input(input)?;
	let tag = sign_body(cfg, surface, &raw);
	info!(target: "cli", %surface, body_len = raw.trim_ascii().len(), "body signed");

	println!("{}", tag);
	Ok(())
}

pub fn verify(cfg: &CliConfig, surface: ApiSurface, input: Option<&Path>) -> Result<()> {
	let raw = read_input(input)?;
	let event = verify_body(cfg, surface, &raw)?;

	let rendered =
		serde_json::to_string_pretty(&event).context("Failed to render webhook envelope")?;
	println!("{}", rendered);
	Ok(())
}

pub fn seal(cfg: &CliConfig, surface: ApiSurface, input: Option<&Path>) -> Result<()> {
	let raw = read_input(input)?;
	let wire = seal_body(cfg, surface, &raw)?;
	info!(target: "cli", %surface, wire_len = wire.len(), "payload sealed");

	let mut stdout = io::stdout().lock();
	stdout
		.write_all(&wire)
		.and_then(|_| stdout.write_all(b"\n"))
		.context("Failed to write sealed payload")?;
	Ok(())
}

fn sign_body(cfg: &CliConfig, surface: ApiSurface, raw: &[u8]) -> Tag {
	compute_tag(raw.trim_ascii(), cfg.credentials.key_for(surface))
}

fn verify_body(cfg: &CliConfig, surface: ApiSurface, raw: &[u8]) -> Result<WebhookEvent> {
	parse_webhook(raw.trim_ascii(), Some(cfg.credentials.key_for(surface)))
		.context("Webhook rejected")
}

fn seal_body(cfg: &CliConfig, surface: ApiSurface, raw: &[u8]) -> Result<Vec<u8>> {
	seal_raw(raw, cfg.credentials.key_for(surface)).context("Input is not a sealable JSON object")
}
