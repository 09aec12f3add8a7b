//! Summarize an extraction: per-interface correlation and record counts.

use serde::Serialize;

use crate::correlate::{find_tun_protect_for, find_xconnect_for, has_any_ipsec_config, has_interface_of_type};
use crate::models::InterfaceType;
use crate::types::{Extraction, Origin, Skipped};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
  pub vpp_interfaces: usize,
  pub linux_interfaces: usize,
  pub l2_xconnects: usize,
  pub ipsec_tun_protects: usize,
  pub ipsec_sas: usize,
  pub ipsec_spds: usize,
  pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunnelProtectionSummary {
  pub sa_in: Vec<u32>,
  pub sa_out: Vec<u32>,
}

/// One VPP interface with whatever other records refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceSummary {
  pub name: String,
  #[serde(rename = "type")]
  pub kind: InterfaceType,
  pub enabled: bool,
  pub origin: Origin,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub xconnect_peer: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tunnel_protection: Option<TunnelProtectionSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeSummary {
  pub counts: RecordCounts,
  /// Interface types present, in proto order.
  pub interface_types: Vec<InterfaceType>,
  pub has_ipsec: bool,
  pub interfaces: Vec<InterfaceSummary>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub skipped: Vec<Skipped>,
}

pub fn summarize(extraction: &Extraction) -> ProbeSummary {
  let config = &extraction.config;
  let vpp = &config.vpp;

  let counts = RecordCounts {
    vpp_interfaces: vpp.interfaces.len(),
    linux_interfaces: config.linux.interfaces.len(),
    l2_xconnects: vpp.l2_xconnects.len(),
    ipsec_tun_protects: vpp.ipsec_tun_protects.len(),
    ipsec_sas: vpp.ipsec_sas.len(),
    ipsec_spds: vpp.ipsec_spds.len(),
    skipped: extraction.skipped.len(),
  };

  let interface_types = InterfaceType::all()
    .filter(|kind| has_interface_of_type(config, *kind))
    .collect();

  let interfaces = vpp
    .interfaces
    .iter()
    .map(|iface| {
      let name = &iface.value.name;
      let xconnect_peer = find_xconnect_for(name, &vpp.l2_xconnects)
        .and_then(|xc| xc.value.peer_of(name))
        .map(str::to_string);
      let tunnel_protection =
        find_tun_protect_for(name, &vpp.ipsec_tun_protects).map(|tp| TunnelProtectionSummary {
          sa_in: tp.value.sa_in.clone(),
          sa_out: tp.value.sa_out.clone(),
        });

      InterfaceSummary {
        name: name.clone(),
        kind: iface.value.kind,
        enabled: iface.value.enabled,
        origin: iface.origin,
        xconnect_peer,
        tunnel_protection,
      }
    })
    .collect();

  ProbeSummary {
    counts,
    interface_types,
    has_ipsec: has_any_ipsec_config(Some(config)),
    interfaces,
    skipped: extraction.skipped.clone(),
  }
}
