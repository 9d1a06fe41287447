pub mod client;
pub mod error;
pub mod types;

pub use client::BmltClient;
pub use error::BmltError;
pub use types::{Format, FormatIndex, FormatTranslation, MeetingPayload, VenueType};
