//! Payload shapes of the agent models the probe understands.
//!
//! Values arrive as protobuf JSON: lowerCamelCase field names (the original
//! snake_case names are accepted too), zero values omitted, enums as names or
//! numbers. Unknown fields are ignored so newer agents still decode.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Protobuf enums
// ---------------------------------------------------------------------------

/// A closed protobuf enum. `VARIANTS` is indexed by proto number and lists
/// (variant, canonical name, short name).
pub trait ProtoEnum: Copy + 'static {
  const NAME: &'static str;
  const VARIANTS: &'static [(Self, &'static str, &'static str)];

  fn from_name(name: &str) -> Option<Self> {
    Self::VARIANTS
      .iter()
      .find(|(_, canonical, short)| {
        name.eq_ignore_ascii_case(canonical) || name.eq_ignore_ascii_case(short)
      })
      .map(|(v, _, _)| *v)
  }

  fn from_number(n: u64) -> Option<Self> {
    usize::try_from(n)
      .ok()
      .and_then(|i| Self::VARIANTS.get(i))
      .map(|(v, _, _)| *v)
  }
}

struct ProtoEnumVisitor<T>(PhantomData<T>);

impl<'de, T: ProtoEnum> Visitor<'de> for ProtoEnumVisitor<T> {
  type Value = T;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} name or number", T::NAME)
  }

  fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
    T::from_name(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
    T::from_number(v).ok_or_else(|| E::invalid_value(Unexpected::Unsigned(v), &self))
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
    u64::try_from(v)
      .ok()
      .and_then(T::from_number)
      .ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
  }

  // Explicit null means the zero value, as in protobuf JSON.
  fn visit_unit<E: de::Error>(self) -> Result<T, E> {
    Ok(T::VARIANTS[0].0)
  }
}

fn deserialize_proto_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: ProtoEnum,
{
  deserializer.deserialize_any(ProtoEnumVisitor(PhantomData))
}

fn canonical_name<T: ProtoEnum + PartialEq>(value: T) -> &'static str {
  T::VARIANTS
    .iter()
    .find(|(v, _, _)| *v == value)
    .map(|(_, canonical, _)| *canonical)
    .unwrap_or("UNKNOWN")
}

macro_rules! proto_enum_serde {
  ($ty:ty) => {
    impl<'de> Deserialize<'de> for $ty {
      fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_proto_enum(deserializer)
      }
    }

    impl Serialize for $ty {
      fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
      }
    }

    impl $ty {
      /// Canonical protobuf name.
      pub fn as_str(self) -> &'static str {
        canonical_name(self)
      }

      /// Every variant, in proto number order.
      pub fn all() -> impl Iterator<Item = Self> {
        Self::VARIANTS.iter().map(|(v, _, _)| *v)
      }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }
  };
}

/// VPP interface type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InterfaceType {
  #[default]
  UndefinedType,
  SubInterface,
  SoftwareLoopback,
  Dpdk,
  Memif,
  Tap,
  AfPacket,
  VxlanTunnel,
  IpsecTunnel,
  Vmxnet3Interface,
  BondInterface,
  GreTunnel,
  GtpuTunnel,
  IpipTunnel,
  WireguardTunnel,
  Rdma,
}

impl ProtoEnum for InterfaceType {
  const NAME: &'static str = "vpp interface type";
  const VARIANTS: &'static [(Self, &'static str, &'static str)] = &[
    (Self::UndefinedType, "UNDEFINED_TYPE", "undefined"),
    (Self::SubInterface, "SUB_INTERFACE", "sub"),
    (Self::SoftwareLoopback, "SOFTWARE_LOOPBACK", "loopback"),
    (Self::Dpdk, "DPDK", "dpdk"),
    (Self::Memif, "MEMIF", "memif"),
    (Self::Tap, "TAP", "tap"),
    (Self::AfPacket, "AF_PACKET", "afpacket"),
    (Self::VxlanTunnel, "VXLAN_TUNNEL", "vxlan"),
    (Self::IpsecTunnel, "IPSEC_TUNNEL", "ipsec"),
    (Self::Vmxnet3Interface, "VMXNET3_INTERFACE", "vmxnet3"),
    (Self::BondInterface, "BOND_INTERFACE", "bond"),
    (Self::GreTunnel, "GRE_TUNNEL", "gre"),
    (Self::GtpuTunnel, "GTPU_TUNNEL", "gtpu"),
    (Self::IpipTunnel, "IPIP_TUNNEL", "ipip"),
    (Self::WireguardTunnel, "WIREGUARD_TUNNEL", "wireguard"),
    (Self::Rdma, "RDMA", "rdma"),
  ];
}

proto_enum_serde!(InterfaceType);

/// Linux interface type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LinuxInterfaceType {
  #[default]
  Undefined,
  Veth,
  TapToVpp,
  Loopback,
  Existing,
  VrfDevice,
}

impl ProtoEnum for LinuxInterfaceType {
  const NAME: &'static str = "linux interface type";
  const VARIANTS: &'static [(Self, &'static str, &'static str)] = &[
    (Self::Undefined, "UNDEFINED", "undefined"),
    (Self::Veth, "VETH", "veth"),
    (Self::TapToVpp, "TAP_TO_VPP", "tap"),
    (Self::Loopback, "LOOPBACK", "lo"),
    (Self::Existing, "EXISTING", "existing"),
    (Self::VrfDevice, "VRF_DEVICE", "vrf"),
  ];
}

proto_enum_serde!(LinuxInterfaceType);

// ---------------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------------

/// VPP-side interface (`vpp.interfaces`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Interface {
  pub name: String,
  #[serde(rename = "type")]
  pub kind: InterfaceType,
  pub enabled: bool,
  #[serde(alias = "phys_address")]
  pub phys_address: String,
  #[serde(alias = "ip_addresses")]
  pub ip_addresses: Vec<String>,
  pub vrf: u32,
  pub mtu: u32,
}

/// Host-side interface (`linux.interfaces.interface`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinuxInterface {
  pub name: String,
  #[serde(rename = "type")]
  pub kind: LinuxInterfaceType,
  #[serde(alias = "host_if_name")]
  pub host_if_name: String,
  pub enabled: bool,
  #[serde(alias = "phys_address")]
  pub phys_address: String,
  #[serde(alias = "ip_addresses")]
  pub ip_addresses: Vec<String>,
  pub mtu: u32,
}

// ---------------------------------------------------------------------------
// L2
// ---------------------------------------------------------------------------

/// L2 cross-connect between two interfaces (`vpp.l2.xconnect`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XConnectPair {
  #[serde(alias = "receive_interface")]
  pub receive_interface: String,
  #[serde(alias = "transmit_interface")]
  pub transmit_interface: String,
}

impl XConnectPair {
  pub fn involves(&self, interface: &str) -> bool {
    self.receive_interface == interface || self.transmit_interface == interface
  }

  /// The other side of the pair, if `interface` is one of its ends.
  pub fn peer_of(&self, interface: &str) -> Option<&str> {
    if self.receive_interface == interface {
      Some(&self.transmit_interface)
    } else if self.transmit_interface == interface {
      Some(&self.receive_interface)
    } else {
      None
    }
  }
}

// ---------------------------------------------------------------------------
// IPSec
// ---------------------------------------------------------------------------

/// IPSec tunnel protection bound to an interface (`vpp.ipsec.tun-protect`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TunnelProtection {
  pub interface: String,
  #[serde(alias = "sa_out")]
  pub sa_out: Vec<u32>,
  #[serde(alias = "sa_in")]
  pub sa_in: Vec<u32>,
  #[serde(alias = "next_hop_addr")]
  pub next_hop_addr: String,
}

/// IPSec security association (`vpp.ipsec.sa`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityAssociation {
  pub index: u32,
  pub spi: u32,
  pub protocol: String,
  #[serde(alias = "crypto_alg")]
  pub crypto_alg: String,
  #[serde(alias = "integ_alg")]
  pub integ_alg: String,
  #[serde(alias = "tunnel_src_addr")]
  pub tunnel_src_addr: String,
  #[serde(alias = "tunnel_dst_addr")]
  pub tunnel_dst_addr: String,
  #[serde(alias = "enable_udp_encap")]
  pub enable_udp_encap: bool,
}

/// IPSec security policy database (`vpp.ipsec.spd`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityPolicyDatabase {
  pub index: u32,
  pub interfaces: Vec<SpdInterface>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpdInterface {
  pub name: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn interface_type_accepts_canonical_short_and_numeric_forms() {
    for raw in [json!("SOFTWARE_LOOPBACK"), json!("software_loopback"), json!("loopback"), json!(2)] {
      let kind: InterfaceType = serde_json::from_value(raw.clone()).unwrap();
      assert_eq!(kind, InterfaceType::SoftwareLoopback, "input {}", raw);
    }
  }

  #[test]
  fn unknown_interface_type_is_rejected() {
    assert!(serde_json::from_value::<InterfaceType>(json!("FROBNICATOR")).is_err());
    assert!(serde_json::from_value::<InterfaceType>(json!(99)).is_err());
    assert!(serde_json::from_value::<InterfaceType>(json!(-1)).is_err());
  }

  #[test]
  fn interface_type_serializes_canonical_name() {
    assert_eq!(serde_json::to_value(InterfaceType::Memif).unwrap(), json!("MEMIF"));
    assert_eq!(InterfaceType::AfPacket.to_string(), "AF_PACKET");
  }

  #[test]
  fn interface_decodes_protojson_with_omitted_zero_values() {
    let iface: Interface = serde_json::from_value(json!({
      "name": "memif1",
      "type": "MEMIF",
      "ipAddresses": ["10.0.0.1/24"],
      "somethingNewer": {"ignored": true}
    }))
    .unwrap();
    assert_eq!(iface.name, "memif1");
    assert_eq!(iface.kind, InterfaceType::Memif);
    assert!(!iface.enabled);
    assert_eq!(iface.ip_addresses, vec!["10.0.0.1/24"]);
    assert_eq!(iface.mtu, 0);
  }

  #[test]
  fn missing_type_is_undefined() {
    let iface: Interface = serde_json::from_value(json!({"name": "x"})).unwrap();
    assert_eq!(iface.kind, InterfaceType::UndefinedType);
  }

  #[test]
  fn snake_case_field_names_are_accepted() {
    let xc: XConnectPair = serde_json::from_value(json!({
      "receive_interface": "a",
      "transmit_interface": "b"
    }))
    .unwrap();
    assert_eq!(xc.receive_interface, "a");
    assert_eq!(xc.transmit_interface, "b");
  }

  #[test]
  fn wrongly_typed_field_does_not_match_shape() {
    assert!(serde_json::from_value::<TunnelProtection>(json!({"saOut": "one"})).is_err());
    assert!(serde_json::from_value::<XConnectPair>(json!("not an object")).is_err());
    assert!(serde_json::from_value::<Interface>(json!(null)).is_err());
  }

  #[test]
  fn xconnect_peer_lookup() {
    let xc = XConnectPair {
      receive_interface: "memif1".into(),
      transmit_interface: "tap0".into(),
    };
    assert_eq!(xc.peer_of("memif1"), Some("tap0"));
    assert_eq!(xc.peer_of("tap0"), Some("memif1"));
    assert_eq!(xc.peer_of("loop0"), None);
    assert!(xc.involves("tap0"));
  }
}
