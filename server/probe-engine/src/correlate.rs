//! Queries relating one configuration domain to another.
//!
//! Lookups return the first match in stored (dump) order. Callers rely on
//! that when a dump pathologically holds several matching records.

use crate::models::InterfaceType;
use crate::types::{AgentConfig, VppIpsecTunProtect, VppL2XConnect};

/// Does any VPP interface have the given type?
pub fn has_interface_of_type(config: &AgentConfig, kind: InterfaceType) -> bool {
  config
    .vpp
    .interfaces
    .iter()
    .any(|iface| iface.value.kind == kind)
}

/// First cross-connect receiving on or transmitting to `interface`.
pub fn find_xconnect_for<'a>(
  interface: &str,
  xconnects: &'a [VppL2XConnect],
) -> Option<&'a VppL2XConnect> {
  xconnects.iter().find(|xc| xc.value.involves(interface))
}

/// First tunnel protection bound to `interface`.
pub fn find_tun_protect_for<'a>(
  interface: &str,
  tun_protects: &'a [VppIpsecTunProtect],
) -> Option<&'a VppIpsecTunProtect> {
  tun_protects.iter().find(|tp| tp.value.interface == interface)
}

/// Any tunnel protection, security association or SPD present? `None` is false.
pub fn has_any_ipsec_config(config: Option<&AgentConfig>) -> bool {
  match config {
    Some(c) => {
      !c.vpp.ipsec_tun_protects.is_empty()
        || !c.vpp.ipsec_sas.is_empty()
        || !c.vpp.ipsec_spds.is_empty()
    }
    None => false,
  }
}

impl AgentConfig {
  pub fn has_interface_of_type(&self, kind: InterfaceType) -> bool {
    has_interface_of_type(self, kind)
  }

  pub fn has_any_ipsec_config(&self) -> bool {
    has_any_ipsec_config(Some(self))
  }
}
