pub mod media;
pub mod types;

pub use media::{Episode, MediaContent, MediaDescriptor, Season};
pub use types::{ContentType, MediaRef, UnknownContentType};
