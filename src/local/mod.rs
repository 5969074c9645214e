pub mod bus;
pub mod state;
pub mod simulator;

pub use bus::{BusCall, GdbusBus, MockBus, NotificationBus, NotifyRequest};
pub use state::DeviceState;
pub use simulator::{LocalSimulator, SuiteCase, SuiteReport};
