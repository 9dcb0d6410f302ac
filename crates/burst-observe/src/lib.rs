mod logger;
pub use logger::*;

mod subscriber;
pub use subscriber::{LogSubscriber, log_event, message_for};
