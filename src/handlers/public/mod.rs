// Public handlers: no access token required.
// Input is untrusted, validate everything before touching the database.
pub mod session;

pub use session::{sign_in, sign_up, update_token};
