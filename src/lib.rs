pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod interactive;
pub mod local;
pub mod logging;
pub mod push;

pub use config::PushConfig;
pub use dispatch::DispatchResult;
pub use error::{PushError, Result};
pub use local::{DeviceState, GdbusBus, LocalSimulator, MockBus, NotificationBus, SuiteCase};
pub use push::{DispatchOptions, Envelope, GatewayClient, Message};
