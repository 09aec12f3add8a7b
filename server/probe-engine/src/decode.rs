//! Classify dump records by model and decode them into typed sequences.
//!
//! A record that cannot be resolved, is of a model the probe does not decode,
//! or whose payload does not match its model's shape is skipped and reported
//! in [`Extraction::skipped`]. Only an undecodable dump as a whole is an error.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::error::ProbeError;
use crate::model::{names, ModelResolver};
use crate::types::{AgentConfig, Extraction, RawRecord, Record, SkipReason};

/// Target sequence of a decoded record. The set is closed: a model not listed
/// here is ignored, never guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
  VppInterface,
  LinuxInterface,
  VppL2XConnect,
  VppIpsecTunProtect,
  VppIpsecSa,
  VppIpsecSpd,
}

static DISPATCH: Lazy<HashMap<&'static str, RecordKind>> = Lazy::new(|| {
  RecordKind::ALL
    .iter()
    .map(|kind| (kind.model_name(), *kind))
    .collect()
});

impl RecordKind {
  pub const ALL: [RecordKind; 6] = [
    Self::VppInterface,
    Self::LinuxInterface,
    Self::VppL2XConnect,
    Self::VppIpsecTunProtect,
    Self::VppIpsecSa,
    Self::VppIpsecSpd,
  ];

  pub fn model_name(self) -> &'static str {
    match self {
      Self::VppInterface => names::VPP_INTERFACE,
      Self::LinuxInterface => names::LINUX_INTERFACE,
      Self::VppL2XConnect => names::VPP_L2_XCONNECT,
      Self::VppIpsecTunProtect => names::VPP_IPSEC_TUN_PROTECT,
      Self::VppIpsecSa => names::VPP_IPSEC_SA,
      Self::VppIpsecSpd => names::VPP_IPSEC_SPD,
    }
  }

  pub fn for_model(model: &str) -> Option<Self> {
    DISPATCH.get(model).copied()
  }

  /// Decode `raw` into this kind's shape and append it to its sequence.
  fn append(self, config: &mut AgentConfig, raw: RawRecord) -> Result<(), serde_json::Error> {
    match self {
      Self::VppInterface => push(&mut config.vpp.interfaces, raw),
      Self::LinuxInterface => push(&mut config.linux.interfaces, raw),
      Self::VppL2XConnect => push(&mut config.vpp.l2_xconnects, raw),
      Self::VppIpsecTunProtect => push(&mut config.vpp.ipsec_tun_protects, raw),
      Self::VppIpsecSa => push(&mut config.vpp.ipsec_sas, raw),
      Self::VppIpsecSpd => push(&mut config.vpp.ipsec_spds, raw),
    }
  }
}

fn push<T: DeserializeOwned>(
  seq: &mut Vec<Record<T>>,
  raw: RawRecord,
) -> Result<(), serde_json::Error> {
  seq.push(Record::decode(raw)?);
  Ok(())
}

/// Parse a JSON dump (array of key/value records) and decode it.
///
/// Fails only when the dump itself is not a JSON array of records; nothing is
/// partially decoded in that case.
pub fn decode_dump(dump: &[u8], resolver: &dyn ModelResolver) -> Result<Extraction, ProbeError> {
  debug!("dump response {} bytes", dump.len());

  let records: Vec<RawRecord> = serde_json::from_slice(dump).map_err(|e| {
    trace!("json data: {}", String::from_utf8_lossy(dump));
    ProbeError::Dump(e)
  })?;
  debug!("dumped {} items", records.len());

  Ok(decode_records(records, resolver))
}

/// Classify and decode already-parsed records, preserving their order.
pub fn decode_records(records: Vec<RawRecord>, resolver: &dyn ModelResolver) -> Extraction {
  let mut extraction = Extraction::default();

  for raw in records {
    let model = match resolver.resolve_model(&raw.key) {
      Ok(model) => model,
      Err(e) => {
        debug!("resolving model failed: {}", e);
        extraction.skip(raw.key, SkipReason::UnknownModel { error: e.to_string() });
        continue;
      }
    };

    let kind = match RecordKind::for_model(&model) {
      Some(kind) => kind,
      None => {
        debug!("ignoring value for key {:?} (model {})", raw.key, model);
        extraction.skip(raw.key, SkipReason::Unhandled { model });
        continue;
      }
    };

    let key = raw.key.clone();
    if let Err(e) = kind.append(&mut extraction.config, raw) {
      warn!("unmarshal value for key {:?} (model {}) failed: {}", key, model, e);
      extraction.skip(
        key,
        SkipReason::Malformed {
          model,
          error: e.to_string(),
        },
      );
    }
  }

  debug!(
    "decoded {} records, skipped {}",
    extraction.config.len(),
    extraction.skipped.len()
  );
  extraction
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::KeyPrefixRegistry;
  use crate::models::InterfaceType;
  use crate::types::Origin;
  use serde_json::json;

  fn record(key: &str, value: serde_json::Value) -> RawRecord {
    RawRecord {
      key: key.into(),
      value,
      metadata: Default::default(),
      origin: Origin::FromSouthbound,
    }
  }

  fn decode(records: Vec<RawRecord>) -> Extraction {
    decode_records(records, &KeyPrefixRegistry::default())
  }

  #[test]
  fn every_model_lands_in_its_own_sequence() {
    let out = decode(vec![
      record("config/vpp/v2/interfaces/loop0", json!({"name": "loop0", "type": "SOFTWARE_LOOPBACK"})),
      record("config/linux/interfaces/v2/interface/veth1", json!({"name": "veth1", "type": "VETH"})),
      record("config/vpp/l2/v2/xconnect/loop0", json!({"receiveInterface": "loop0", "transmitInterface": "tap0"})),
      record("config/vpp/ipsec/v2/tun-protect/ipip0", json!({"interface": "ipip0", "saOut": [1], "saIn": [2]})),
      record("config/vpp/ipsec/v2/sa/1", json!({"index": 1, "spi": 1001, "protocol": "ESP"})),
      record("config/vpp/ipsec/v2/spd/1", json!({"index": 1, "interfaces": [{"name": "ipip0"}]})),
    ]);

    assert!(out.skipped.is_empty());
    assert_eq!(out.config.len(), 6);
    assert_eq!(out.config.vpp.interfaces[0].value.kind, InterfaceType::SoftwareLoopback);
    assert_eq!(out.config.linux.interfaces[0].value.name, "veth1");
    assert_eq!(out.config.vpp.l2_xconnects[0].value.transmit_interface, "tap0");
    assert_eq!(out.config.vpp.ipsec_tun_protects[0].value.sa_in, vec![2]);
    assert_eq!(out.config.vpp.ipsec_sas[0].value.spi, 1001);
    assert_eq!(out.config.vpp.ipsec_spds[0].value.interfaces[0].name, "ipip0");
  }

  #[test]
  fn unknown_key_is_skipped_not_fatal() {
    let out = decode(vec![
      record("vpp/interface/loop0/link-state/UP", json!({})),
      record("config/vpp/v2/interfaces/loop0", json!({"name": "loop0"})),
    ]);
    assert_eq!(out.config.vpp.interfaces.len(), 1);
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].key, "vpp/interface/loop0/link-state/UP");
    assert!(matches!(out.skipped[0].reason, SkipReason::UnknownModel { .. }));
  }

  #[test]
  fn odd_record_header_does_not_abort_the_dump() {
    let loop0 = r#"{"Key": "config/vpp/v2/interfaces/loop0", "Value": {"name": "loop0"}}"#;
    let firsts = [
      r#"{"Key": null, "Value": {}}"#,
      r#"{"Key": "config/vpp/v2/arp/loop0", "Value": {}, "Origin": 1.0}"#,
      r#"{"Key": "config/vpp/v2/arp/loop0", "Value": {}, "Origin": true}"#,
    ];
    for first in firsts {
      let dump = format!("[{}, {}]", first, loop0);
      let out = decode_dump(dump.as_bytes(), &KeyPrefixRegistry::default())
        .unwrap_or_else(|e| panic!("{} aborted the dump: {}", first, e));
      assert_eq!(out.config.vpp.interfaces.len(), 1, "{}", first);
      assert_eq!(out.config.vpp.interfaces[0].value.name, "loop0");
      assert_eq!(out.skipped.len(), 1, "{}", first);
    }

    let dump = format!(r#"[{{"Key": null, "Value": {{}}}}, {}]"#, loop0);
    let out = decode_dump(dump.as_bytes(), &KeyPrefixRegistry::default()).unwrap();
    assert_eq!(out.skipped[0].key, "");
    assert!(matches!(out.skipped[0].reason, SkipReason::UnknownModel { .. }));
  }

  #[test]
  fn malformed_payload_is_skipped_with_reason() {
    let out = decode(vec![
      record("config/vpp/v2/interfaces/bad", json!({"name": 42})),
      record("config/vpp/v2/interfaces/worse", json!("loop0")),
      record("config/vpp/v2/interfaces/good", json!({"name": "good"})),
    ]);
    assert_eq!(out.config.vpp.interfaces.len(), 1);
    assert_eq!(out.config.vpp.interfaces[0].value.name, "good");
    assert_eq!(out.malformed().count(), 2);
    match &out.skipped[0].reason {
      SkipReason::Malformed { model, error } => {
        assert_eq!(model, names::VPP_INTERFACE);
        assert!(!error.is_empty());
      }
      other => panic!("unexpected reason {:?}", other),
    }
  }

  #[test]
  fn known_but_unhandled_model_is_ignored() {
    let out = decode(vec![record(
      "config/vpp/v2/route/vrf/0/dst/10.0.0.0/24/gw/10.0.0.1",
      json!({"dstNetwork": "10.0.0.0/24"}),
    )]);
    assert!(out.config.is_empty());
    assert_eq!(
      out.skipped[0].reason,
      SkipReason::Unhandled {
        model: "vpp.route".into()
      }
    );
  }

  #[test]
  fn arrival_order_is_preserved() {
    let names = ["c", "a", "b"];
    let records = names
      .iter()
      .map(|n| record(&format!("config/vpp/v2/interfaces/{}", n), json!({"name": n})))
      .collect();
    let out = decode(records);
    let decoded: Vec<&str> = out
      .config
      .vpp
      .interfaces
      .iter()
      .map(|r| r.value.name.as_str())
      .collect();
    assert_eq!(decoded, names);
  }

  #[test]
  fn dump_that_is_not_an_array_is_a_hard_error() {
    let registry = KeyPrefixRegistry::default();
    let err = decode_dump(br#"{"Key": "config/vpp/v2/interfaces/x"}"#, &registry).unwrap_err();
    assert!(matches!(err, ProbeError::Dump(_)));
    assert!(decode_dump(b"agentctl: command not found", &registry).is_err());
  }

  #[test]
  fn empty_dump_gives_empty_aggregate() {
    let out = decode_dump(b"[]", &KeyPrefixRegistry::default()).unwrap();
    assert!(out.config.is_empty());
    assert!(out.skipped.is_empty());
  }

  #[test]
  fn dispatch_table_covers_every_kind() {
    for kind in RecordKind::ALL {
      assert_eq!(RecordKind::for_model(kind.model_name()), Some(kind));
    }
    assert_eq!(RecordKind::for_model("vpp.route"), None);
  }
}
