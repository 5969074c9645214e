pub mod message;
pub mod envelope;
pub mod gateway;

pub use message::{Message, WireData, WireMessage};
pub use envelope::{DispatchOptions, Envelope, WireEnvelope};
pub use gateway::GatewayClient;
