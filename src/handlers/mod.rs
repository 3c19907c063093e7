pub mod bulk_import;
pub mod catalog;
pub mod health;
