mod handlers;
mod routes;
mod service;

pub use routes::advisory_routes;
pub use service::AdvisoryService;
