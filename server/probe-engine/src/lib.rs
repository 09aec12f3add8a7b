//! Dataplane Probe Engine — typed state from raw VPP agent output.
//!
//! Decodes an agent key/value dump into a typed, read-only [`AgentConfig`],
//! answers correlation queries over it, and mines version/uptime/log fields
//! out of VPP CLI text.
//!
//! No DB, no network; the caller supplies command execution and model resolution.

pub mod agent;
pub mod cli;
pub mod config;
pub mod correlate;
pub mod decode;
pub mod error;
pub mod exec;
pub mod model;
pub mod models;
pub mod report;
pub mod types;

pub use agent::retrieve_config;
pub use config::Config;
pub use decode::{decode_dump, decode_records};
pub use error::{ProbeError, UnknownModel};
pub use exec::{CliExecutor, CommandRunner};
pub use model::{KeyPrefixRegistry, ModelResolver};
pub use models::InterfaceType;
pub use types::{AgentConfig, Extraction, RawRecord};
