// Core module - Transport-agnostic communication logic
pub mod communication;
