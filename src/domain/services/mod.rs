mod assistant_registry;
mod chat_session;
mod file_registry;
mod run_waiter;
mod upload_candidates;

pub use assistant_registry::*;
pub use chat_session::*;
pub use file_registry::*;
pub use run_waiter::*;
pub use upload_candidates::*;
