use std::str::FromStr;
use std::time::Duration;

use memscope_traits::LinkError;
use serialport::{DataBits, FlowControl, Parity, StopBits};

/// Serial link parameters for one acquisition session.
///
/// Owned by the caller and passed by value at `start`; immutable for the
/// lifetime of the session. Changing any field requires close + reopen.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub path: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    /// Bound on one `read_available` wait.
    pub read_timeout: Duration,
    /// Firmware streaming rate, used to timestamp decoded records.
    pub sample_rate_hz: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            path: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            read_timeout: Duration::from_millis(50),
            sample_rate_hz: 100.0,
        }
    }
}

impl LinkConfig {
    /// Builds a config from the key-value settings store, read once at start.
    ///
    /// Recognized keys: `port`, `baud_rate`, `data_bits`, `parity`,
    /// `stop_bits`, `flow_control`, `read_timeout_ms`, `sample_rate_hz`.
    /// Keys the store holds for other components are ignored; a value that
    /// does not parse fails the whole config.
    pub fn from_settings<'a, I>(settings: I) -> Result<Self, LinkError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = LinkConfig::default();
        for (key, value) in settings {
            match key {
                "port" => config.path = value.to_string(),
                "baud_rate" => config.baud_rate = parse(key, value)?,
                "data_bits" => {
                    config.data_bits = match value {
                        "5" => DataBits::Five,
                        "6" => DataBits::Six,
                        "7" => DataBits::Seven,
                        "8" => DataBits::Eight,
                        _ => return Err(invalid(key, value)),
                    }
                }
                "parity" => {
                    config.parity = match value {
                        "none" => Parity::None,
                        "even" => Parity::Even,
                        "odd" => Parity::Odd,
                        _ => return Err(invalid(key, value)),
                    }
                }
                "stop_bits" => {
                    config.stop_bits = match value {
                        "1" => StopBits::One,
                        "2" => StopBits::Two,
                        _ => return Err(invalid(key, value)),
                    }
                }
                "flow_control" => {
                    config.flow_control = match value {
                        "none" => FlowControl::None,
                        "software" => FlowControl::Software,
                        "hardware" => FlowControl::Hardware,
                        _ => return Err(invalid(key, value)),
                    }
                }
                "read_timeout_ms" => {
                    config.read_timeout = Duration::from_millis(parse(key, value)?)
                }
                "sample_rate_hz" => {
                    let rate: f64 = parse(key, value)?;
                    if !rate.is_finite() || rate <= 0.0 {
                        return Err(invalid(key, value));
                    }
                    config.sample_rate_hz = rate;
                }
                _ => {}
            }
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, LinkError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> LinkError {
    LinkError::InvalidConfiguration(format!("bad value for {}: {:?}", key, value))
}
