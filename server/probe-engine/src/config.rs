//! Probe configuration with sane defaults.

/// Commands issued against the agent and the VPP CLI.
#[derive(Debug, Clone)]
pub struct Config {
  /// Agent control binary used for dumps.
  pub agentctl: String,
  /// Dump view selector ("SB" = southbound/observed, "NB" = northbound/intended, "cached").
  pub dump_view: String,
  /// CLI command printing the build version and PID.
  pub version_command: String,
  /// CLI command printing the clock line used for uptime.
  pub clock_command: String,
  /// CLI command printing the VPP log.
  pub log_command: String,
}

impl Config {
  /// Arguments for a full JSON dump of the configured view.
  pub fn dump_args(&self) -> Vec<&str> {
    vec!["dump", "-f", "json", "--view", &self.dump_view, "all"]
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      agentctl: "agentctl".to_string(),
      dump_view: "SB".to_string(),
      version_command: "show version verbose".to_string(),
      clock_command: "show clock".to_string(),
      log_command: "show log".to_string(),
    }
  }
}
