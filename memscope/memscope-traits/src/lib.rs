use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of scalar channels in one decoded record: accelerometer X/Y/Z
/// followed by gyroscope X/Y/Z, fixed by the firmware frame layout.
pub const CHANNEL_COUNT: usize = 6;

/// One decoded observation from the sensor firmware.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Elapsed seconds since acquisition start. Strictly increasing within a
    /// session; resets to zero on a new open.
    pub timestamp: f64,
    /// Accelerometer X/Y/Z (m/s²) then gyroscope X/Y/Z (deg/s).
    pub channels: [f32; CHANNEL_COUNT],
}

/// Link-level failures. A single corrupt frame is not represented here: the
/// parser resynchronizes locally and never reports it upward.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The device path is missing or the port is held by another process.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    /// The transport rejected the requested port parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The open session failed (cable pulled, device reset). Fatal to the
    /// session; recoverable by a fresh open.
    #[error("serial I/O error: {0}")]
    Io(String),
}

impl From<serialport::Error> for LinkError {
    fn from(err: serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::NoDevice => LinkError::DeviceUnavailable(err.to_string()),
            serialport::ErrorKind::InvalidInput => {
                LinkError::InvalidConfiguration(err.to_string())
            }
            serialport::ErrorKind::Io(kind)
                if kind == std::io::ErrorKind::NotFound
                    || kind == std::io::ErrorKind::PermissionDenied =>
            {
                LinkError::DeviceUnavailable(err.to_string())
            }
            _ => LinkError::Io(err.to_string()),
        }
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::Io(err.to_string())
    }
}

/// Events published by the acquisition worker, in causal emission order.
#[derive(Debug, Clone)]
pub enum AcquisitionEvent {
    /// The serial link opened and the read loop is running.
    PortOpened,
    /// One decoded record, delivered in device arrival order.
    NewData(SampleRecord),
    /// The serial link was released.
    PortClosed,
    /// A fatal condition, delivered as data rather than a panic.
    PortError(String),
    /// Terminal event; the worker's thread is done. Emitted exactly once.
    Finished,
}

/// Foreground consumer of acquisition events.
///
/// All methods run on the context that drains the event queue, never on the
/// read loop's thread.
pub trait Subscriber {
    fn on_new_data(&mut self, record: SampleRecord);
    fn on_port_opened(&mut self) {}
    fn on_port_closed(&mut self) {}
    fn on_port_error(&mut self, _message: &str) {}
    fn on_finished(&mut self) {}
}

impl AcquisitionEvent {
    /// Routes a drained event onto a subscriber.
    pub fn dispatch(self, subscriber: &mut dyn Subscriber) {
        match self {
            AcquisitionEvent::PortOpened => subscriber.on_port_opened(),
            AcquisitionEvent::NewData(record) => subscriber.on_new_data(record),
            AcquisitionEvent::PortClosed => subscriber.on_port_closed(),
            AcquisitionEvent::PortError(message) => subscriber.on_port_error(&message),
            AcquisitionEvent::Finished => subscriber.on_finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        records: Vec<SampleRecord>,
        opened: usize,
        closed: usize,
        errors: Vec<String>,
        finished: usize,
    }

    impl Subscriber for Recording {
        fn on_new_data(&mut self, record: SampleRecord) {
            self.records.push(record);
        }
        fn on_port_opened(&mut self) {
            self.opened += 1;
        }
        fn on_port_closed(&mut self) {
            self.closed += 1;
        }
        fn on_port_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
        fn on_finished(&mut self) {
            self.finished += 1;
        }
    }

    #[test]
    fn test_dispatch_routes_every_event() {
        let record = SampleRecord {
            timestamp: 0.5,
            channels: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        };
        let mut subscriber = Recording::default();

        AcquisitionEvent::PortOpened.dispatch(&mut subscriber);
        AcquisitionEvent::NewData(record).dispatch(&mut subscriber);
        AcquisitionEvent::PortError("cable pulled".to_string()).dispatch(&mut subscriber);
        AcquisitionEvent::PortClosed.dispatch(&mut subscriber);
        AcquisitionEvent::Finished.dispatch(&mut subscriber);

        assert_eq!(subscriber.opened, 1);
        assert_eq!(subscriber.records, vec![record]);
        assert_eq!(subscriber.errors, vec!["cable pulled".to_string()]);
        assert_eq!(subscriber.closed, 1);
        assert_eq!(subscriber.finished, 1);
    }

    #[test]
    fn test_no_device_maps_to_unavailable() {
        let err = serialport::Error::new(serialport::ErrorKind::NoDevice, "port busy");
        assert!(matches!(LinkError::from(err), LinkError::DeviceUnavailable(_)));
    }

    #[test]
    fn test_invalid_input_maps_to_configuration() {
        let err = serialport::Error::new(serialport::ErrorKind::InvalidInput, "bad baud");
        assert!(matches!(
            LinkError::from(err),
            LinkError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn test_missing_path_maps_to_unavailable() {
        let err = serialport::Error::new(
            serialport::ErrorKind::Io(std::io::ErrorKind::NotFound),
            "no such file",
        );
        assert!(matches!(LinkError::from(err), LinkError::DeviceUnavailable(_)));
    }

    #[test]
    fn test_other_io_maps_to_io() {
        let err = serialport::Error::new(
            serialport::ErrorKind::Io(std::io::ErrorKind::BrokenPipe),
            "device reset",
        );
        assert!(matches!(LinkError::from(err), LinkError::Io(_)));
    }
}
