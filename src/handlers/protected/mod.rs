// Protected handlers: routed behind `access_token_middleware`, which injects `AuthUser`.
pub mod notes;
pub mod session;

pub use notes::{add_note, delete_note, get_all_notes, update_note};
pub use session::log_out;
