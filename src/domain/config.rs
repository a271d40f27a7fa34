use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Serial transport configuration
///
/// Every field the underlying serial backend can honor, with the
/// conventional instrument-link defaults (9600 8N1, one second read
/// timeout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device name, e.g. `/dev/ttyUSB0` or `COM3`
    pub port: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Number of data bits per character
    #[serde(default)]
    pub data_bits: DataBitsConfig,
    /// Parity checking mode
    #[serde(default)]
    pub parity: ParityConfig,
    /// Number of stop bits
    #[serde(default)]
    pub stop_bits: StopBitsConfig,
    /// Flow control mode
    #[serde(default)]
    pub flow_control: FlowControlConfig,
    /// Read timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl SerialConfig {
    /// Configuration for `port` with all other fields at their defaults.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: default_baud_rate(),
            data_bits: DataBitsConfig::default(),
            parity: ParityConfig::default(),
            stop_bits: StopBitsConfig::default(),
            flow_control: FlowControlConfig::default(),
            timeout: default_timeout(),
        }
    }
}

/// Telnet transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelnetConfig {
    /// Host name or IP address of the instrument
    pub host: String,
    /// TCP port of the telnet service
    pub port: u16,
    /// Connect and read timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl TelnetConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: default_timeout(),
        }
    }
}

/// Data bits configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataBitsConfig {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    None,
    Odd,
    Even,
}

/// Stop bits configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBitsConfig {
    One,
    Two,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    None,
    Software,
    Hardware,
}

// Default value functions
fn default_baud_rate() -> u32 {
    9600
}

fn default_timeout() -> Duration {
    Duration::from_secs(1)
}

impl Default for DataBitsConfig {
    fn default() -> Self {
        DataBitsConfig::Eight
    }
}

impl Default for ParityConfig {
    fn default() -> Self {
        ParityConfig::None
    }
}

impl Default for StopBitsConfig {
    fn default() -> Self {
        StopBitsConfig::One
    }
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        FlowControlConfig::None
    }
}

impl From<DataBitsConfig> for serialport::DataBits {
    fn from(value: DataBitsConfig) -> Self {
        match value {
            DataBitsConfig::Five => serialport::DataBits::Five,
            DataBitsConfig::Six => serialport::DataBits::Six,
            DataBitsConfig::Seven => serialport::DataBits::Seven,
            DataBitsConfig::Eight => serialport::DataBits::Eight,
        }
    }
}

impl From<ParityConfig> for serialport::Parity {
    fn from(value: ParityConfig) -> Self {
        match value {
            ParityConfig::None => serialport::Parity::None,
            ParityConfig::Odd => serialport::Parity::Odd,
            ParityConfig::Even => serialport::Parity::Even,
        }
    }
}

impl From<StopBitsConfig> for serialport::StopBits {
    fn from(value: StopBitsConfig) -> Self {
        match value {
            StopBitsConfig::One => serialport::StopBits::One,
            StopBitsConfig::Two => serialport::StopBits::Two,
        }
    }
}

impl From<FlowControlConfig> for serialport::FlowControl {
    fn from(value: FlowControlConfig) -> Self {
        match value {
            FlowControlConfig::None => serialport::FlowControl::None,
            FlowControlConfig::Software => serialport::FlowControl::Software,
            FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
        }
    }
}
