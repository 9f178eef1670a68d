pub mod search;

pub use search::{SearchMessagesError, SearchMessagesQuery, SearchMessagesResponse};
