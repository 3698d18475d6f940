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

use std::{
	fs,
	io::{self, Read},
	path::Path,
};

use anyhow::{Context, Result};
use heleket_sdk::Credentials;

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log file name prefix, used when LOG_DIR is set
pub const LOG_COMPONENT_NAME: &str = "heleket";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = true;

#[derive(Debug, Clone)]
pub struct CliConfig {
	pub credentials: Credentials,
}

impl CliConfig {
	/// Load credentials from `path` if given, otherwise from `HELEKET_*` variables
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let credentials = match path {
			Some(path) => {
				let path_str = path
					.to_str()
					.with_context(|| format!("Non UTF-8 config path: {}", path.display()))?;
				Credentials::from_file(path_str)
					.with_context(|| format!("Failed to load credentials from {}", path.display()))?
			}
			None => Credentials::from_env()
				.context("Failed to load credentials from HELEKET_* environment variables")?,
		};

		Ok(Self { credentials })
	}
}

/// Read the whole input verbatim, from a file or stdin
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
	match path {
		Some(path) => {
			fs::read(path).with_context(|| format!("Failed to read input file {}", path.display()))
		}
		None => {
			let mut buf = Vec::new();
			io::stdin()
				.read_to_end(&mut buf)
				.context("Failed to read stdin")?;
			Ok(buf)
		}
	}
}
