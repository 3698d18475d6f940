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

//! Heleket signing tool
//!
//! Signs request bodies, verifies webhook bodies and seals test webhooks,
//! using the merchant's API keys. Input is read verbatim from a file or
//! stdin; results go to stdout, logs to stderr.
//!
//! Credentials come from `--config FILE` or from `HELEKET_MERCHANT`,
//! `HELEKET_PAYMENT_KEY` and `HELEKET_PAYOUT_KEY` (a `.env` file is honoured).

mod commands;
mod config;
mod logging;

use std::{
	ffi::OsString,
	path::{Path, PathBuf},
};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use heleket_sdk::ApiSurface;
use tracing::info;

use crate::{config::CliConfig, logging::init_logging};

#[derive(Parser)]
#[command(name = "heleket", version, about = "Sign and verify Heleket gateway payloads")]
struct Args {
	/// Credentials file (toml, yaml or json); defaults to HELEKET_* env vars
	#[arg(long, global = true, env = "HELEKET_CONFIG")]
	config: Option<PathBuf>,

	/// API surface whose key is used
	#[arg(long, global = true, value_enum, default_value_t = Surface::Payment)]
	surface: Surface,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Print the tag for a raw request body
	Sign {
		/// Input file; stdin when omitted
		#[arg(long)]
		input: Option<PathBuf>,
	},
	/// Verify a raw webhook body and print its envelope
	Verify {
		#[arg(long)]
		input: Option<PathBuf>,
	},
	/// Append a `sign` member to a JSON object and print the wire payload
	Seal {
		#[arg(long)]
		input: Option<PathBuf>,
	},
}

#[derive(Clone, Copy, ValueEnum)]
enum Surface {
	Payment,
	Payout,
}

impl From<Surface> for ApiSurface {
	fn from(surface: Surface) -> Self {
		match surface {
			Surface::Payment => ApiSurface::Payment,
			Surface::Payout => ApiSurface::Payout,
		}
	}
}

/// Load the env file into the environment, then parse `argv`
///
/// The env file must be loaded first so it can supply `HELEKET_CONFIG`.
fn parse_args<I, T>(env_file: Option<&Path>, argv: I) -> Result<Args, clap::Error>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString> + Clone,
{
	if let Some(path) = env_file {
		dotenv::from_path(path).ok();
	} else {
		dotenv::dotenv().ok();
	}
	Args::try_parse_from(argv)
}

fn main() -> Result<()> {
	let args = parse_args(None, std::env::args_os()).unwrap_or_else(|e| e.exit());

	// Initialize logging first
	init_logging()?;

	let cfg = CliConfig::load(args.config.as_deref())?;
	let surface = ApiSurface::from(args.surface);
	info!(
		target: "cli",
		merchant = %cfg.credentials.merchant,
		%surface,
		"credentials loaded"
	);

	match args.command {
		Command::Sign { input } => commands::sign(&cfg, surface, input.as_deref()),
		Command::Verify { input } => commands::verify(&cfg, surface, input.as_deref()),
		Command::Seal { input } => commands::seal(&cfg, surface, input.as_deref()),
	}
}
