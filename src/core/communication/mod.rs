// Communication module - Communicator contract and wire framing
pub mod communicator;
pub mod framing;

pub use communicator::{Communicator, TransportKind, DEFAULT_RECV_CHUNK};
pub use framing::{frame_message, split_lines};
