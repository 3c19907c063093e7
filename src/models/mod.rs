pub mod bulk_import;
pub mod catalog;
pub mod notification;
pub mod user;
