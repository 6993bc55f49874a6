mod handlers;
mod routes;
mod service;

pub use routes::availability_routes;
pub use service::AvailabilityService;
