mod actor;
mod file;
pub mod models;

pub use actor::{files, StateCommand, StateStoreActor, StateStoreHandle};
pub use models::{
    Decision, PendingResponse, PendingResponses, ResponseLog, ResponseLogEntry, SentEvents,
};
