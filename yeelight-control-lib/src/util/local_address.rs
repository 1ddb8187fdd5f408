use std::net::{IpAddr, Ipv4Addr};

use log::debug;
use pnet::datalink;

use crate::util::error::{Result, YeelightError};

/// Source of the addresses assigned to this host.
///
/// Discovery asks a provider instead of the operating system directly, so the
/// address selection can be exercised without real interfaces.
pub trait LocalAddressProvider {
    fn local_addresses(&self) -> Result<Vec<IpAddr>>;
}

/// Reads the addresses of every interface on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAddressProvider;

impl LocalAddressProvider for SystemAddressProvider {
    fn local_addresses(&self) -> Result<Vec<IpAddr>> {
        Ok(datalink::interfaces()
            .into_iter()
            .flat_map(|iface| iface.ips)
            .map(|network| network.ip())
            .collect())
    }
}

/// A provider returning a fixed list of addresses.
#[derive(Debug, Default, Clone)]
pub struct FixedAddressProvider(pub Vec<IpAddr>);

impl LocalAddressProvider for FixedAddressProvider {
    fn local_addresses(&self) -> Result<Vec<IpAddr>> {
        Ok(self.0.clone())
    }
}

/// True for 10/8, 172.16/12 and 192.168/16, never for loopback or link-local.
pub fn is_lan_address(ip: &Ipv4Addr) -> bool {
    ip.is_private() && !ip.is_loopback() && !ip.is_link_local()
}

/// Picks the first private IPv4 address reported by `provider`.
pub fn select_local_address<P: LocalAddressProvider + ?Sized>(provider: &P) -> Result<Ipv4Addr> {
    let addresses = provider.local_addresses()?;
    debug!("Local addresses: {:?}", addresses);
    addresses
        .into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(v4) if is_lan_address(&v4) => Some(v4),
            _ => None,
        })
        .ok_or(YeelightError::NoLocalAddress)
}
