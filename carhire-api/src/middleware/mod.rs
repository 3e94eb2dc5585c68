pub mod auth;
pub mod rate_limit;

pub use auth::{issue_token, owner_auth_middleware, user_auth_middleware, UserClaims};
pub use rate_limit::rate_limit_middleware;
