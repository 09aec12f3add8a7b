//! Retrieve and decode the agent's configuration.

use crate::config::Config;
use crate::decode::decode_dump;
use crate::error::ProbeError;
use crate::exec::{run_command, CommandRunner};
use crate::model::ModelResolver;
use crate::types::Extraction;

/// Dump everything the agent knows in the configured view and decode it.
pub fn retrieve_config(
  runner: &dyn CommandRunner,
  resolver: &dyn ModelResolver,
  config: &Config,
) -> Result<Extraction, ProbeError> {
  let dump = run_command(runner, &config.agentctl, &config.dump_args())?;
  decode_dump(dump.as_bytes(), resolver)
}
