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

//! Logging initialization for the CLI
//!
//! # Configuration
//!
//! - `RUST_LOG`: Log level filter (default: `info`)
//!   - Example: `RUST_LOG=heleket_sdk=debug` shows computed tags
//!
//! - `LOG_TO_CONSOLE`: Console output on stderr (default: `true`)
//!   - Set to `false`, `0`, or `no` to disable
//!
//! - `LOG_DIR`: When set, logs are also written to `{LOG_DIR}/heleket.{date}.log`
//!   - Rotation: one file per day (UTC)
//!   - ANSI colors disabled in file output
//!
//! Stdout is reserved for command output (tags, wire payloads).

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use tracing::debug;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, Layer, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

// Store log guard to prevent log loss on program exit
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Setup daily-rolling file logging layer in `log_dir`
fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	std::fs::create_dir_all(log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix("log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize logging with stderr output and optional file output
pub fn init_logging() -> Result<()> {
	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let log_to_console = env::var("LOG_TO_CONSOLE")
		.map(|v| v == "true" || v == "1" || v == "yes")
		.unwrap_or(DEFAULT_LOG_TO_CONSOLE);

	let console_layer = log_to_console.then(|| {
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_thread_ids(true)
			.with_target(true)
			.with_thread_names(false)
			.with_ansi(true)
	});

	let log_dir = env::var("LOG_DIR").ok();
	let file_layer = match &log_dir {
		Some(dir) => {
			let writer = setup_file_logging(Path::new(dir))?;
			Some(
				fmt::layer()
					.with_writer(writer)
					.with_timer(fmt::time::UtcTime::rfc_3339())
					.with_thread_ids(true)
					.with_target(true)
					.with_thread_names(false)
					.with_ansi(false)
					.boxed(),
			)
		}
		None => None,
	};

	Registry::default()
		.with(filter)
		.with(console_layer)
		.with(file_layer)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	debug!(target: "cli", "Log level: {}", log_level);
	if let Some(dir) = log_dir {
		debug!(
			target: "cli",
			"Log file base name: {}/{}.YYYY-MM-DD.log (daily rolling)",
			dir,
			LOG_COMPONENT_NAME
		);
	}

	Ok(())
}
