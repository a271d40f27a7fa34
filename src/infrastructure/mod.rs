// Infrastructure module - Transport backends and adapters
pub mod logging;
pub mod serial;
pub mod telnet;
