pub mod admin;
pub mod auth;
pub mod error_handling;
pub mod request_id;

pub use admin::*;
pub use auth::*;
pub use error_handling::*;
pub use request_id::*;
