mod advisory_repository;
mod availability_repository;
mod notification_log_repository;
mod refresh_token_repository;
mod user_repository;

pub use advisory_repository::AdvisoryRepository;
pub use availability_repository::AvailabilityRepository;
pub use notification_log_repository::NotificationLogRepository;
pub use refresh_token_repository::RefreshTokenRepository;
pub use user_repository::UserRepository;
