mod meeting_session;
mod negotiation_task;

pub use meeting_session::*;
pub use negotiation_task::*;
