//! LabCom Library
//!
//! Laboratory instrument communication library providing a uniform
//! line-framed command/response abstraction over serial and telnet
//! transports.

pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::communication::{Communicator, TransportKind, DEFAULT_RECV_CHUNK};
pub use crate::domain::config::{SerialConfig, TelnetConfig};
pub use crate::domain::error::{LabComError, LabComResult};
pub use crate::infrastructure::serial::SerialCommunicator;
pub use crate::infrastructure::telnet::TelnetCommunicator;
