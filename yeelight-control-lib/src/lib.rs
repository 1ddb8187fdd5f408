//! # Yeelight Control Library
//!
//! `yeelight-control-lib` discovers Yeelight smart bulbs on the local network and
//! sends them control commands over the bulbs' LAN protocol.
//!
//! Discovery multicasts a search request to `239.255.255.250:1982` and parses the
//! header-style reply into a [`DeviceDescriptor`](util::discovery::DeviceDescriptor).
//! Commands are single JSON lines written over a fresh TCP connection to the
//! address the bulb advertised. The protocol is plaintext and unauthenticated,
//! and bulbs are not asked to acknowledge commands.
//!
//! ## Example
//!
//! ```no_run
//! use yeelight_control_lib::control_interface::{ControlInterface, PowerState};
//! use yeelight_control_lib::util::discovery::Discovery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Waits up to 3 seconds for a bulb to answer
//!     let device = Discovery::discover().await?;
//!     println!("Found device: {}", device);
//!
//!     let control = ControlInterface::new(device)?;
//!     control.set_power(PowerState::On).await?;
//!     control.toggle().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Disclaimer
//!
//! This project is not affiliated with, authorized by, endorsed by, or in any way officially connected
//! with Yeelight or its affiliates.
//!
//! ## License
//!
//! This project is dual-licensed under the MIT License and the Apache License, Version 2.0.
//! You may choose to use either license, depending on your project needs.

// The `control_interface` module encodes commands and delivers them to a device.
//
// Example usage:
//
// ```
// use yeelight_control_lib::control_interface::ControlInterface;
// use yeelight_control_lib::util::discovery::DeviceDescriptor;
//
// #[tokio::main]
// async fn main() {
//     let device = DeviceDescriptor::new("1", "1", "192.168.1.100:55443", "color", Vec::new());
//     let control = ControlInterface::new(device).unwrap();
//     control.toggle().await.unwrap();
// }
// ```
pub mod control_interface;

// The `util` module holds device discovery, local address selection and the
// error type shared by the library.
pub mod util;
