//! Extract scalar fields from VPP CLI output.
//!
//! CLI text differs between VPP releases, so a missing or unparsable field
//! yields its zero value and a debug diagnostic, never an error. Only running
//! the command can fail.

use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::Config;
use crate::error::ProbeError;
use crate::exec::{run_cli, CliExecutor};
use crate::types::{ClockInfo, LogLines, VersionInfo};

// vpp# show version verbose
// Version:                  v20.09-rc0~399-gef80ad6bf~b1658
// Compiled by:              root
// Compile host:             31cb557be35c
// Compile date:             2020-09-09T11:13:09
// Compile location:         /w/workspace/vpp-merge-master-ubuntu1804
// Compiler:                 Clang/LLVM 9.0.0 (tags/RELEASE_900/final)
// Current PID:              170

static SHOW_VERSION: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"Version:\s+(\S+)").expect("version pattern"));
static SHOW_VERSION_PID: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"PID:\s+([0-9]+)").expect("pid pattern"));

// vpp# show clock
// Time now 3180.278756, Tue, 1 Dec 2020 11:52:45 GMT

static SHOW_CLOCK: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"Time\s+now\s+([0-9.]+),\s*([^\r\n]*)").expect("clock pattern"));

/// Version string and PID; empty / zero when absent.
pub fn parse_version_info(text: &str) -> VersionInfo {
  let mut info = VersionInfo::default();

  if let Some(caps) = SHOW_VERSION.captures(text) {
    info.version = caps[1].to_string();
  }

  if let Some(caps) = SHOW_VERSION_PID.captures(text) {
    match caps[1].parse::<u32>() {
      Ok(pid) => info.pid = pid,
      Err(e) => debug!("parse pid {:?} error: {}", &caps[1], e),
    }
  }

  info
}

/// Uptime and wall clock; zero uptime and no time when absent.
pub fn parse_clock(text: &str) -> ClockInfo {
  let mut clock = ClockInfo::default();

  let caps = match SHOW_CLOCK.captures(text) {
    Some(caps) => caps,
    None => return clock,
  };

  let raw_uptime = &caps[1];
  match raw_uptime.parse::<f64>() {
    Ok(secs) => match Duration::try_from_secs_f64(secs) {
      Ok(uptime) => clock.uptime = uptime,
      Err(e) => debug!("uptime {} out of range: {}", raw_uptime, e),
    },
    Err(e) => debug!("parse float {:?} error: {}", raw_uptime, e),
  }

  let raw_time = caps[2].trim();
  if !raw_time.is_empty() {
    match DateTime::parse_from_rfc2822(raw_time) {
      Ok(t) => clock.time = Some(t.with_timezone(&Utc)),
      Err(e) => debug!("parse clock time {:?} error: {}", raw_time, e),
    }
  }

  clock
}

/// Uptime only; see [`parse_clock`].
pub fn parse_uptime(text: &str) -> Duration {
  parse_clock(text).uptime
}

// vpp# show log
// 2020/12/01 10:59:44:837 notice     plugin/load    Loaded plugin: abf_plugin.so (Access Control List (ACL) Based Forwarding)
// 2020/12/01 10:59:44:841 notice     plugin/load    Loaded plugin: acl_plugin.so (Access Control Lists (ACL))

/// Log output as lines. Individual entries are not parsed.
pub fn parse_logs(text: impl Into<String>) -> LogLines {
  LogLines::new(text)
}

pub fn version_info(cli: &dyn CliExecutor, config: &Config) -> Result<VersionInfo, ProbeError> {
  let out = run_cli(cli, &config.version_command)?;
  Ok(parse_version_info(&out))
}

pub fn clock(cli: &dyn CliExecutor, config: &Config) -> Result<ClockInfo, ProbeError> {
  let out = run_cli(cli, &config.clock_command)?;
  Ok(parse_clock(&out))
}

pub fn uptime(cli: &dyn CliExecutor, config: &Config) -> Result<Duration, ProbeError> {
  Ok(clock(cli, config)?.uptime)
}

pub fn dump_logs(cli: &dyn CliExecutor, config: &Config) -> Result<LogLines, ProbeError> {
  let out = run_cli(cli, &config.log_command)?;
  Ok(parse_logs(out))
}
