pub mod catalog_store;
pub mod category_repo;
pub mod notification_repo;
pub mod product_repo;
pub mod sequence_repo;

pub use catalog_store::*;
pub use category_repo::*;
pub use notification_repo::*;
pub use product_repo::*;
pub use sequence_repo::*;
