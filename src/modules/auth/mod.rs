mod handlers;
mod jwt;
mod routes;
mod service;

pub use jwt::{Claims, JwtService};
pub use routes::auth_routes;
pub use service::{SessionTokens, TokenService};
