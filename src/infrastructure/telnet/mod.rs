// Telnet module - Telnet transport realization
pub mod client;
pub mod session;

pub use client::TelnetCommunicator;
pub use session::TelnetSession;
