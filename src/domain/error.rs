use thiserror::Error;

/// LabCom unified error type
#[derive(Error, Debug)]
pub enum LabComError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Device not connected")]
    NotConnected,
}

pub type LabComResult<T> = Result<T, LabComError>;
