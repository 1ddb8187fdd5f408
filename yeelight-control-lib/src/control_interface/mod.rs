use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::util::discovery::DeviceDescriptor;
use crate::util::error::{Result, YeelightError};

pub mod command;

pub use command::{Command, CommandParam, PowerState};

/// Default bound on establishing the command connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/**
Sends commands to a single device.

Every command opens its own TCP connection, writes one line and closes the
connection again. Nothing is read back from the device.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct ControlInterface {
    device: DeviceDescriptor,
    connect_timeout: Option<Duration>,
}

impl ControlInterface {
    /// Fails with [`YeelightError::InvalidAddress`] unless the device address is `host:port`.
    pub fn new(device: DeviceDescriptor) -> Result<Self> {
        device.validate_address()?;
        Ok(ControlInterface {
            device,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
        })
    }

    /**
    Sets the bound on connecting to the device.

    `None` leaves the connect attempt to the operating system's own timeout.
    */
    pub fn with_connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    /// Writes `command` to the device. Success only means the bytes were written.
    pub async fn send_command(&self, command: &Command) -> Result<()> {
        if self.device.supports(&command.method) == Some(false) {
            warn!(
                "Device {} does not advertise `{}`, sending anyway",
                self.device.id, command.method
            );
        }
        let packet = command.to_wire_bytes()?;

        let mut stream = self.connect().await?;
        debug!(
            "Sending to {}: {}",
            self.device.address,
            String::from_utf8_lossy(&packet).trim_end()
        );
        stream
            .write_all(&packet)
            .await
            .map_err(|e| YeelightError::transport("tcp write", e))?;

        info!("Sent `{}` to {}", command.method, self.device.address);
        Ok(())
    }

    pub async fn set_power(&self, state: PowerState) -> Result<()> {
        self.send_command(&Command::set_power(state)).await
    }

    pub async fn toggle(&self) -> Result<()> {
        self.send_command(&Command::toggle()).await
    }

    async fn connect(&self) -> Result<TcpStream> {
        let address = self.device.address.as_str();
        let connecting = TcpStream::connect(address);
        let result = match self.connect_timeout {
            Some(limit) => match timeout(limit, connecting).await {
                Ok(result) => result,
                Err(_) => Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("no connection to {} within {:?}", address, limit),
                )),
            },
            None => connecting.await,
        };
        result.map_err(|e| YeelightError::transport("tcp connect", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn device_at(address: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(
            "0x0000000007fe356e",
            "0x0000000007fe356e",
            address,
            "color",
            vec!["set_power".to_string(), "toggle".to_string()],
        )
    }

    async fn capture_one(listener: TcpListener) -> Vec<u8> {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        // Reaching EOF means the sender closed its end.
        stream.read_to_end(&mut received).await.unwrap();
        received
    }

    #[tokio::test]
    async fn test_toggle_writes_one_line() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let receiver = tokio::spawn(capture_one(listener));

        let control = ControlInterface::new(device_at(&address)).unwrap();
        control.toggle().await.unwrap();

        let received = receiver.await.unwrap();
        assert_eq!(received, b"{\"id\":1,\"method\":\"toggle\",\"params\":[]}\r\n");
    }

    #[tokio::test]
    async fn test_set_power_writes_one_line() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let receiver = tokio::spawn(capture_one(listener));

        let control = ControlInterface::new(device_at(&address))
            .unwrap()
            .with_connect_timeout(None);
        control.set_power(PowerState::Off).await.unwrap();

        let received = receiver.await.unwrap();
        assert_eq!(
            received,
            b"{\"id\":1,\"method\":\"set_power\",\"params\":[\"off\",\"smooth\",200]}\r\n"
        );
    }

    #[tokio::test]
    async fn test_unadvertised_method_is_still_sent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let receiver = tokio::spawn(capture_one(listener));

        let control = ControlInterface::new(device_at(&address)).unwrap();
        let command = Command::new(42, "set_bright", vec![50i64.into()]);
        control.send_command(&command).await.unwrap();

        let received = receiver.await.unwrap();
        assert_eq!(received, b"{\"id\":42,\"method\":\"set_bright\",\"params\":[50]}\r\n");
    }

    #[tokio::test]
    async fn test_toggle_without_listener_is_transport_error() {
        // Grab a free port, then release it so nothing is listening there.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let control = ControlInterface::new(device_at(&address.to_string())).unwrap();
        let err = control.toggle().await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");

        // The port is free again, so no socket was kept bound to it.
        let rebound = TcpListener::bind(address).await;
        assert!(rebound.is_ok());
    }

    #[test]
    fn test_rejects_invalid_address() {
        let result = ControlInterface::new(device_at("192.168.15.58"));
        assert!(matches!(result, Err(YeelightError::InvalidAddress(a)) if a == "192.168.15.58"));
    }
}
