pub mod bulk_import_service;
pub mod file_parser_service;
pub mod row_normalizer_service;

pub use bulk_import_service::BulkImportService;
pub use file_parser_service::FileParserService;
pub use row_normalizer_service::RowNormalizerService;
