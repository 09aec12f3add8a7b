//! Core types for the probe engine (dump JSON contract + typed aggregate).

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::models::{
  Interface, LinuxInterface, SecurityAssociation, SecurityPolicyDatabase, TunnelProtection,
  XConnectPair,
};

/// Origin-specific annotations attached to a record.
pub type Metadata = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the agent dumps)
// ---------------------------------------------------------------------------

/// Whether a record reflects intended (northbound) or observed (southbound) state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Origin {
  #[default]
  Unknown,
  FromNorthbound,
  FromSouthbound,
}

impl Origin {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Unknown => "unknown",
      Self::FromNorthbound => "from-NB",
      Self::FromSouthbound => "from-SB",
    }
  }

  /// Lenient parse; anything unrecognized is `Unknown`.
  pub fn from_str_loose(s: &str) -> Self {
    match s.to_ascii_lowercase().as_str() {
      "from-nb" | "nb" | "northbound" => Self::FromNorthbound,
      "from-sb" | "sb" | "southbound" => Self::FromSouthbound,
      _ => Self::Unknown,
    }
  }

  pub fn from_number(n: u64) -> Self {
    match n {
      1 => Self::FromNorthbound,
      2 => Self::FromSouthbound,
      _ => Self::Unknown,
    }
  }
}

impl fmt::Display for Origin {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for Origin {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

struct OriginVisitor;

impl<'de> Visitor<'de> for OriginVisitor {
  type Value = Origin;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("value origin as number or string")
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Origin, E> {
    Ok(Origin::from_number(v))
  }

  fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Origin, E> {
    Ok(Origin::Unknown)
  }

  fn visit_f64<E: de::Error>(self, v: f64) -> Result<Origin, E> {
    if v >= 0.0 && v.fract() == 0.0 {
      Ok(Origin::from_number(v as u64))
    } else {
      Ok(Origin::Unknown)
    }
  }

  fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Origin, E> {
    Ok(Origin::Unknown)
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<Origin, E> {
    Ok(Origin::from_str_loose(v))
  }

  fn visit_unit<E: de::Error>(self) -> Result<Origin, E> {
    Ok(Origin::Unknown)
  }

  fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Origin, A::Error> {
    while seq.next_element::<de::IgnoredAny>()?.is_some() {}
    Ok(Origin::Unknown)
  }

  fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Origin, A::Error> {
    while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
    Ok(Origin::Unknown)
  }
}

impl<'de> Deserialize<'de> for Origin {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(OriginVisitor)
  }
}

/// One key/value entry of a dump. Value schema depends on the key's model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
  #[serde(rename = "Key", default, deserialize_with = "string_or_empty")]
  pub key: String,
  #[serde(rename = "Value", default)]
  pub value: Value,
  #[serde(rename = "Metadata", default, deserialize_with = "null_as_empty")]
  pub metadata: Metadata,
  #[serde(rename = "Origin", default)]
  pub origin: Origin,
}

/// Keys that are not strings never resolve to a model, so they become empty.
fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(key)) => Ok(key),
    _ => Ok(String::new()),
  }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Metadata, D::Error> {
  Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Typed records + aggregate
// ---------------------------------------------------------------------------

/// A dump record whose value decoded into `T`. Keeps key, metadata and origin
/// of the raw record for traceability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
  pub key: String,
  pub value: T,
  #[serde(skip_serializing_if = "Metadata::is_empty")]
  pub metadata: Metadata,
  pub origin: Origin,
}

impl<T: DeserializeOwned> Record<T> {
  /// Decode the raw value into `T`. Fails if the payload does not match `T`'s shape.
  pub fn decode(raw: RawRecord) -> Result<Self, serde_json::Error> {
    let value = T::deserialize(&raw.value)?;
    Ok(Self {
      key: raw.key,
      value,
      metadata: raw.metadata,
      origin: raw.origin,
    })
  }
}

pub type VppInterface = Record<Interface>;
pub type LinuxInterfaceRecord = Record<LinuxInterface>;
pub type VppL2XConnect = Record<XConnectPair>;
pub type VppIpsecTunProtect = Record<TunnelProtection>;
pub type VppIpsecSa = Record<SecurityAssociation>;
pub type VppIpsecSpd = Record<SecurityPolicyDatabase>;

/// Dataplane-side records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VppConfig {
  pub interfaces: Vec<VppInterface>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub l2_xconnects: Vec<VppL2XConnect>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub ipsec_tun_protects: Vec<VppIpsecTunProtect>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub ipsec_sas: Vec<VppIpsecSa>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub ipsec_spds: Vec<VppIpsecSpd>,
}

/// Host-side records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinuxConfig {
  pub interfaces: Vec<LinuxInterfaceRecord>,
}

/// Typed snapshot of one dump. Built once by the decoder, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentConfig {
  pub vpp: VppConfig,
  pub linux: LinuxConfig,
}

impl AgentConfig {
  /// Total number of typed records across all sequences.
  pub fn len(&self) -> usize {
    self.vpp.interfaces.len()
      + self.vpp.l2_xconnects.len()
      + self.vpp.ipsec_tun_protects.len()
      + self.vpp.ipsec_sas.len()
      + self.vpp.ipsec_spds.len()
      + self.linux.interfaces.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

// ---------------------------------------------------------------------------
// Soft failures
// ---------------------------------------------------------------------------

/// Why a dump record did not make it into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
  /// The model registry has no model for the key.
  UnknownModel { error: String },
  /// The model is known but the probe does not decode it.
  Unhandled { model: String },
  /// The payload does not match the model's shape.
  Malformed { model: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
  pub key: String,
  #[serde(flatten)]
  pub reason: SkipReason,
}

/// Result of decoding a dump: the aggregate plus every record left out of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
  pub config: AgentConfig,
  pub skipped: Vec<Skipped>,
}

impl Extraction {
  pub(crate) fn skip(&mut self, key: String, reason: SkipReason) {
    self.skipped.push(Skipped { key, reason });
  }

  /// Skipped records whose payload was malformed (the ones worth a warning).
  pub fn malformed(&self) -> impl Iterator<Item = &Skipped> {
    self
      .skipped
      .iter()
      .filter(|s| matches!(s.reason, SkipReason::Malformed { .. }))
  }
}

// ---------------------------------------------------------------------------
// CLI values
// ---------------------------------------------------------------------------

/// Build version and process id from `show version verbose`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
  pub version: String,
  pub pid: u32,
}

/// Uptime and wall clock from `show clock`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClockInfo {
  #[serde(rename = "uptime_secs", serialize_with = "serialize_secs")]
  pub uptime: Duration,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub time: Option<DateTime<Utc>>,
}

impl ClockInfo {
  /// When the dataplane process started, if both clock fields were found.
  pub fn started_at(&self) -> Option<DateTime<Utc>> {
    let uptime = chrono::Duration::from_std(self.uptime).ok()?;
    self.time?.checked_sub_signed(uptime)
  }
}

fn serialize_secs<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_f64(d.as_secs_f64())
}

/// Raw `show log` output, split into lines on demand.
///
/// Lines are returned verbatim; iterating again starts from the first line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogLines {
  raw: String,
}

impl LogLines {
  pub fn new(raw: impl Into<String>) -> Self {
    Self { raw: raw.into() }
  }

  pub fn iter(&self) -> std::str::SplitTerminator<'_, char> {
    self.raw.split_terminator('\n')
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }
}

impl<'a> IntoIterator for &'a LogLines {
  type Item = &'a str;
  type IntoIter = std::str::SplitTerminator<'a, char>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl Serialize for LogLines {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(self.iter())
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// Structured error output for the binary.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
    }
  }
}
