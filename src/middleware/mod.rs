pub mod auth;
pub mod response;

pub use auth::{access_token_middleware, AuthUser, ACCESS_TOKEN_HEADER};
pub use response::{ApiResponse, ApiResult};
