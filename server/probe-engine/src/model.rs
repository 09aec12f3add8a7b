//! Model resolution: which model a dump key belongs to.

use crate::error::UnknownModel;

/// Maps a record key to the name of the model describing its value.
pub trait ModelResolver {
  fn resolve_model(&self, key: &str) -> Result<String, UnknownModel>;
}

/// Model names the decoder knows how to handle.
pub mod names {
  pub const VPP_INTERFACE: &str = "vpp.interfaces";
  pub const LINUX_INTERFACE: &str = "linux.interfaces.interface";
  pub const VPP_L2_XCONNECT: &str = "vpp.l2.xconnect";
  pub const VPP_IPSEC_TUN_PROTECT: &str = "vpp.ipsec.tun-protect";
  pub const VPP_IPSEC_SA: &str = "vpp.ipsec.sa";
  pub const VPP_IPSEC_SPD: &str = "vpp.ipsec.spd";
}

/// Agent key prefixes and the models they belong to.
const WELL_KNOWN: &[(&str, &str)] = &[
  ("config/vpp/v2/interfaces/", names::VPP_INTERFACE),
  ("config/linux/interfaces/v2/interface/", names::LINUX_INTERFACE),
  ("config/vpp/l2/v2/xconnect/", names::VPP_L2_XCONNECT),
  ("config/vpp/ipsec/v2/tun-protect/", names::VPP_IPSEC_TUN_PROTECT),
  ("config/vpp/ipsec/v2/sa/", names::VPP_IPSEC_SA),
  ("config/vpp/ipsec/v2/spd/", names::VPP_IPSEC_SPD),
  ("config/vpp/l2/v2/bridge-domain/", "vpp.l2.bridge-domain"),
  ("config/vpp/l2/v2/fib/", "vpp.l2.fib"),
  ("config/vpp/v2/route/", "vpp.route"),
  ("config/vpp/v2/arp/", "vpp.arp"),
  ("config/vpp/v2/proxyarp-global/", "vpp.proxyarp-global"),
  ("config/vpp/acls/v2/acl/", "vpp.acls.acl"),
  ("config/vpp/nat/v2/nat44-global", "vpp.nat.nat44-global"),
  ("config/linux/l3/v2/route/", "linux.l3.route"),
  ("config/linux/l3/v2/arp/", "linux.l3.arp"),
];

/// Resolves models by key prefix; the longest registered prefix wins.
#[derive(Debug, Clone)]
pub struct KeyPrefixRegistry {
  prefixes: Vec<(String, String)>,
}

impl KeyPrefixRegistry {
  /// A registry with no prefixes; every key is unknown.
  pub fn empty() -> Self {
    Self {
      prefixes: Vec::new(),
    }
  }

  pub fn register(&mut self, prefix: impl Into<String>, model: impl Into<String>) -> &mut Self {
    self.prefixes.push((prefix.into(), model.into()));
    self
  }
}

impl Default for KeyPrefixRegistry {
  fn default() -> Self {
    let mut registry = Self::empty();
    for (prefix, model) in WELL_KNOWN {
      registry.register(*prefix, *model);
    }
    registry
  }
}

impl ModelResolver for KeyPrefixRegistry {
  fn resolve_model(&self, key: &str) -> Result<String, UnknownModel> {
    self
      .prefixes
      .iter()
      .filter(|(prefix, _)| key.starts_with(prefix.as_str()) && key.len() > prefix.len())
      .max_by_key(|(prefix, _)| prefix.len())
      .map(|(_, model)| model.clone())
      .ok_or_else(|| UnknownModel::new(key))
  }
}

/// Adapts a closure into a resolver.
pub struct FnResolver<F>(pub F);

impl<F> ModelResolver for FnResolver<F>
where
  F: Fn(&str) -> Option<String>,
{
  fn resolve_model(&self, key: &str) -> Result<String, UnknownModel> {
    (self.0)(key).ok_or_else(|| UnknownModel::new(key))
  }
}
