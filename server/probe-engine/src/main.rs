//! Binary entrypoint: read agent output from stdin, write JSON to stdout.
//!
//! Modes (first argument, default `dump`):
//! - `dump`: stdin is an `agentctl dump -f json` payload; emits a ProbeSummary.
//! - `version`: stdin is `show version verbose` output; emits VersionInfo.
//! - `clock`: stdin is `show clock` output; emits ClockInfo.
//! - `log`: stdin is `show log` output; emits the log lines.
//!
//! Hard failures emit an ErrorOutput line and exit 1. Diagnostics go to
//! stderr, filtered by RUST_LOG (default `warn`).

use probe_engine::error::ProbeError;
use probe_engine::types::ErrorOutput;
use probe_engine::{cli, decode_dump, report, KeyPrefixRegistry};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();
}

fn main() {
  init_tracing();

  let mode = std::env::args().nth(1).unwrap_or_else(|| "dump".to_string());
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  if let Err(e) = run(&mode, &mut out) {
    let err = ErrorOutput::new(e.to_string());
    let _ = serde_json::to_writer(&mut out, &err);
    let _ = writeln!(out);
    let _ = out.flush();
    std::process::exit(1);
  }

  let _ = out.flush();
}

fn run(mode: &str, out: &mut impl Write) -> Result<(), ProbeError> {
  let mut raw = Vec::new();
  io::stdin().lock().read_to_end(&mut raw)?;
  emit(mode, &raw, out)
}

fn emit(mode: &str, raw: &[u8], out: &mut impl Write) -> Result<(), ProbeError> {
  match mode {
    "dump" => {
      let extraction = decode_dump(raw, &KeyPrefixRegistry::default())?;
      serde_json::to_writer(&mut *out, &report::summarize(&extraction))?;
    }
    "version" => {
      let text = String::from_utf8_lossy(raw);
      serde_json::to_writer(&mut *out, &cli::parse_version_info(&text))?;
    }
    "clock" => {
      let text = String::from_utf8_lossy(raw);
      serde_json::to_writer(&mut *out, &cli::parse_clock(&text))?;
    }
    "log" => {
      let text = String::from_utf8_lossy(raw).into_owned();
      serde_json::to_writer(&mut *out, &cli::parse_logs(text))?;
    }
    other => {
      return Err(ProbeError::usage(format!(
        "unknown mode {:?} (expected dump|version|clock|log)",
        other
      )));
    }
  }
  writeln!(out)?;
  Ok(())
}
