use std::cmp::max;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr, SocketAddrV4, Ipv4Addr};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::util::error::{Result, YeelightError};
use crate::util::local_address::{select_local_address, LocalAddressProvider, SystemAddressProvider};

/// Multicast group the bulbs listen on for search requests.
pub const MULTICAST_ADDRESS: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1982);
/// Service type token the bulbs answer to.
pub const SEARCH_TARGET: &str = "wifi_bulb";
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// A controllable bulb, either discovered or described by hand.
///
/// The JSON form uses the keys `id`, `name`, `addr`, `model` and `support`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    /// Display label. Discovery fills it with the device id.
    pub name: String,
    /// `host:port` accepting command connections.
    #[serde(rename = "addr")]
    pub address: String,
    pub model: String,
    /**
    Methods the device advertised, in the order it listed them.

    An empty list means the device did not report any, not that it supports none.
    */
    #[serde(rename = "support", default)]
    pub capabilities: Vec<String>,
}

impl DeviceDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        model: impl Into<String>,
        capabilities: Vec<String>,
    ) -> Self {
        DeviceDescriptor {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            model: model.into(),
            capabilities,
        }
    }

    /// Checks that `address` is a `host:port` pair with a numeric port.
    pub fn validate_address(&self) -> Result<()> {
        let valid = match self.address.rsplit_once(':') {
            Some((host, port)) => {
                let host_ok = if host.starts_with('[') {
                    host.len() > 2 && host.ends_with(']')
                } else {
                    !host.is_empty() && !host.contains(':')
                };
                host_ok && port.parse::<u16>().is_ok()
            }
            None => false,
        };
        if valid {
            Ok(())
        } else {
            Err(YeelightError::InvalidAddress(self.address.clone()))
        }
    }

    /// Whether `method` was advertised. Returns `None` when nothing was reported.
    pub fn supports(&self, method: &str) -> Option<bool> {
        if self.capabilities.is_empty() {
            None
        } else {
            Some(self.capabilities.iter().any(|c| c == method))
        }
    }
}

impl Display for DeviceDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", json)
    }
}

/// Settings for a single discovery round.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Where the search request is sent.
    pub target: SocketAddr,
    /// How long to wait for the reply.
    pub timeout: Duration,
    /// Largest reply accepted; longer datagrams are truncated.
    pub buffer_size: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            target: SocketAddr::V4(MULTICAST_ADDRESS),
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

pub struct Discovery;

impl Discovery {
    /// The search request sent to the multicast group.
    pub fn search_message() -> String {
        format!(
            "M-SEARCH * HTTP/1.1\r\nHOST: {}\r\nMAN: \"ssdp:discover\"\r\nST: {}\r\n",
            MULTICAST_ADDRESS, SEARCH_TARGET
        )
    }

    /// Finds one bulb on the local network using the host's interfaces and default settings.
    pub async fn discover() -> Result<DeviceDescriptor> {
        Self::discover_with(&SystemAddressProvider, &DiscoveryConfig::default()).await
    }

    pub async fn discover_with<P: LocalAddressProvider + ?Sized>(
        provider: &P,
        config: &DiscoveryConfig,
    ) -> Result<DeviceDescriptor> {
        let local_ip = select_local_address(provider)?;
        debug!("Discovering from local address {}", local_ip);
        Self::probe_from(IpAddr::V4(local_ip), config).await
    }

    /**
    Sends the search request from an ephemeral port on `local_ip` and parses
    the first datagram that comes back.

    Fails with [`YeelightError::Timeout`] if nothing arrives within `config.timeout`.
    */
    pub async fn probe_from(local_ip: IpAddr, config: &DiscoveryConfig) -> Result<DeviceDescriptor> {
        let socket = UdpSocket::bind(SocketAddr::new(local_ip, 0))
            .await
            .map_err(|e| YeelightError::transport("udp bind", e))?;

        let message = Self::search_message();
        debug!("Sending search request to {}:\n{}", config.target, message);
        socket
            .send_to(message.as_bytes(), config.target)
            .await
            .map_err(|e| YeelightError::transport("udp send", e))?;

        let mut buffer = vec![0u8; config.buffer_size];
        let (size, source) = match timeout(config.timeout, socket.recv_from(&mut buffer)).await {
            Ok(Ok(received)) => received,
            Ok(Err(e)) => return Err(YeelightError::transport("udp receive", e)),
            Err(_) => return Err(YeelightError::Timeout(config.timeout)),
        };

        let response = String::from_utf8_lossy(&buffer[..size]);
        debug!("Reply from {}:\n{}", source, response);
        let device = Self::parse_discovery_response(&response);
        info!("Found device: {}", device);
        Ok(device)
    }

    /**
    Turns a search reply into a descriptor.

    Lines of the form `Key: Value` are collected (leading tabs on the key are
    dropped), every other line is ignored. Missing headers produce empty
    fields rather than an error.
    */
    pub fn parse_discovery_response(response: &str) -> DeviceDescriptor {
        let headers: HashMap<&str, &str> = response
            .lines()
            .filter_map(|line| line.split_once(": "))
            .map(|(key, value)| (key.trim_start_matches('\t'), value))
            .collect();
        let header = |key: &str| headers.get(key).copied().unwrap_or_default();

        let address = header("Location")
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or_default();
        let capabilities = header("support")
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        DeviceDescriptor::new(header("id"), header("id"), address, header("model"), capabilities)
    }

    pub fn pretty_print_device(device: &DeviceDescriptor) {
        let id_width = max(device.id.len(), "Device ID".len()) + 2;
        let address_width = max(device.address.len(), "Address".len()) + 2;
        let model_width = max(device.model.len(), "Model".len()) + 2;

        println!(
            "{:<id_width$} {:<address_width$} {:<model_width$} Supports",
            "Device ID", "Address", "Model",
        );
        println!(
            "{:<id_width$} {:<address_width$} {:<model_width$} --------",
            "-".repeat(id_width - 2),
            "-".repeat(address_width - 2),
            "-".repeat(model_width - 2),
        );
        println!(
            "{:<id_width$} {:<address_width$} {:<model_width$} {}",
            device.id,
            device.address,
            device.model,
            device.capabilities.join(" "),
        );
    }
}
