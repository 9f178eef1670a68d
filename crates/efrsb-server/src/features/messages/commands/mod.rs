pub mod parse_page;
pub mod schedule_batch;

pub use parse_page::{ParsePageCommand, ParsePageError, ParsePageResponse};
pub use schedule_batch::{ScheduleBatchCommand, ScheduleBatchError, ScheduleBatchResponse};
