mod advisory;
mod availability;
mod notification_log;
mod refresh_token;
mod user;

pub use advisory::*;
pub use availability::*;
pub use notification_log::*;
pub use refresh_token::*;
pub use user::*;
