pub mod job;
pub mod response;

pub use job::{JobMatch, SaveKey, SavedJob};
pub use response::{filename_from_disposition, ApiMessage, CoverLetter};
