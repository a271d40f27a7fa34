// Domain module - Core types and error definitions
pub mod config;
pub mod error;
