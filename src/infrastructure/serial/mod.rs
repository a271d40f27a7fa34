// Serial module - Serial transport realization
pub mod client;

pub use client::SerialCommunicator;
