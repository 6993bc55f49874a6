mod service;
mod sink;

pub use service::NotificationService;
pub use sink::{LogSink, NotificationSink};
