pub mod client;
pub mod error;
pub mod types;

pub use client::WordPressClient;
pub use error::WordPressError;
pub use types::{WpMeeting, WpRendered};
