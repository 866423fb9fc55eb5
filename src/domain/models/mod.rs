mod api;
mod assistant;
mod file;
mod message;
mod poll_policy;
mod thread;

pub use api::*;
pub use assistant::*;
pub use file::*;
pub use message::*;
pub use poll_policy::*;
pub use thread::*;
