pub mod log_sanitizer;
pub mod slug;

pub use log_sanitizer::*;
pub use slug::slugify;
