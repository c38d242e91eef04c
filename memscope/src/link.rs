use std::io::Read;

use log::{debug, warn};
use memscope_traits::LinkError;
use serialport::SerialPort;

use crate::config::LinkConfig;

const READ_BUF_LEN: usize = 1024;

/// Owns the serial device handle for one session.
///
/// State machine: `Closed -> (open ok) -> Open -> (close | io error) ->
/// Closed`, nothing else. `read_available` is only meaningful while open.
pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialLink {
    pub fn new() -> Self {
        SerialLink { port: None }
    }

    /// Lists candidate device paths for the settings dialog.
    pub fn available_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }

    /// Single attempt to acquire the device at the configured path and
    /// settings. On failure the link stays closed.
    pub fn open(&mut self, config: &LinkConfig) -> Result<(), LinkError> {
        if self.port.is_some() {
            return Err(LinkError::Io("link already open".to_string()));
        }
        let port = serialport::new(config.path.as_str(), config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.read_timeout)
            .open()?;
        debug!("opened {} at {} baud", config.path, config.baud_rate);
        self.port = Some(port);
        Ok(())
    }

    /// Releases the device handle. Closing a closed link is a no-op.
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("serial link closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Returns whatever bytes the transport has buffered, waiting at most the
    /// configured read timeout; empty when nothing arrived in time. A
    /// transport error closes the link before it is returned.
    pub fn read_available(&mut self) -> Result<Vec<u8>, LinkError> {
        let port = match self.port.as_mut() {
            Some(port) => port,
            None => return Err(LinkError::Io("link is not open".to_string())),
        };
        let mut buf = [0u8; READ_BUF_LEN];
        match port.read(&mut buf) {
            Ok(n) => Ok(buf[..n].to_vec()),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Ok(Vec::new())
            }
            Err(e) => {
                warn!("serial read failed: {}", e);
                self.close();
                Err(LinkError::Io(e.to_string()))
            }
        }
    }
}

impl Default for SerialLink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> LinkConfig {
        LinkConfig {
            path: "/dev/memscope-test-missing".to_string(),
            ..LinkConfig::default()
        }
    }

    #[test]
    fn test_open_missing_device_fails_closed() {
        let mut link = SerialLink::new();
        let result = link.open(&unreachable_config());
        assert!(matches!(result, Err(LinkError::DeviceUnavailable(_))));
        assert!(!link.is_open());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut link = SerialLink::new();
        link.close();
        link.close();
        assert!(!link.is_open());
    }

    #[test]
    fn test_read_on_closed_link_is_an_error() {
        let mut link = SerialLink::new();
        assert!(matches!(link.read_available(), Err(LinkError::Io(_))));
    }
}
