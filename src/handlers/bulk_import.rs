/// REST API handlers for spreadsheet product import

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Extension,
    Json,
};
use crate::{
    config::AppConfig,
    middleware::{
        error_handling::{AppError, Result},
        Claims, RequestId,
    },
    models::{
        bulk_import::{BulkUploadResponse, ImportResult},
        notification::{NotificationPayload, NotificationType},
    },
    repositories::{NotificationRepository, PgCatalogStore},
    services::{BulkImportService, FileParserService},
    utils::sanitize_for_log,
};

/// Column order of the downloadable template
pub const TEMPLATE_HEADERS: [&str; 11] = [
    "name",
    "slug",
    "price",
    "category_name",
    "sub_category_name",
    "zodiac_sign",
    "is_bestseller",
    "stock",
    "description",
    "tags",
    "image_url",
];

const TEMPLATE_EXAMPLE_ROW: [&str; 11] = [
    "Moonstone Ring",
    "",
    "1999.00",
    "Crystals",
    "Rings",
    "Cancer",
    "true",
    "10",
    "Sterling silver ring with a rainbow moonstone",
    "silver, gift",
    "",
];

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// POST /api/admin/products/bulk-upload
/// Import products from a CSV or Excel file sent as multipart field `file`
pub async fn bulk_upload(
    State(config): State<AppConfig>,
    Extension(claims): Extension<Claims>,
    request_id: Option<Extension<RequestId>>,
    multipart: Multipart,
) -> Result<Json<BulkUploadResponse>> {
    let request_id = request_id.map(|Extension(id)| id.to_string()).unwrap_or_default();

    let upload = read_upload(multipart).await?;

    if !FileParserService::is_accepted_upload(upload.content_type.as_deref(), &upload.filename) {
        return Err(AppError::InvalidInput(
            "Invalid file type. Only Excel (.xlsx, .xls) and CSV files are allowed.".to_string(),
        ));
    }

    if upload.data.len() > config.max_upload_bytes {
        return Err(AppError::InvalidInput(format!(
            "File too large. Maximum size is {}MB",
            config.max_upload_bytes / 1024 / 1024
        )));
    }

    tracing::info!(
        "Bulk upload [{}] by user {}: {} ({} bytes)",
        request_id,
        claims.user_id,
        sanitize_for_log(&upload.filename),
        upload.data.len()
    );

    let parsed = FileParserService::parse(&upload.data, &upload.filename)?;
    for warning in &parsed.metadata.parsing_warnings {
        tracing::warn!("Bulk upload [{}]: {}", request_id, sanitize_for_log(warning));
    }

    let rows = parsed.to_raw_rows();

    let store = PgCatalogStore::new(config.database_pool.clone());
    let results = BulkImportService::new(&store).import_rows(&rows).await?;

    notify_uploader(&config, claims.user_id, &results).await;

    Ok(Json(BulkUploadResponse {
        message: "Bulk upload completed".to_string(),
        results,
    }))
}

/// GET /api/admin/products/bulk-upload/template
/// CSV with the canonical headers and one example row
pub async fn bulk_upload_template() -> Result<impl IntoResponse> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TEMPLATE_HEADERS).map_err(anyhow::Error::from)?;
    writer.write_record(TEMPLATE_EXAMPLE_ROW).map_err(anyhow::Error::from)?;

    let body = writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build template: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"product_import_template.csv\""),
        ],
        body,
    ))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart data: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?
            .to_vec();

        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::InvalidInput("No file uploaded".to_string()))
}

async fn notify_uploader(config: &AppConfig, user_id: i64, results: &ImportResult) {
    let payload = NotificationPayload {
        user_id,
        notification_type: NotificationType::BulkImport,
        title: "Bulk product import finished".to_string(),
        message: format!(
            "{} of {} products imported, {} failed",
            results.successful, results.total, results.failed
        ),
        related_id: None,
        related_type: Some("product".to_string()),
    };

    let repo = NotificationRepository::new(config.database_pool.clone());
    if let Err(e) = repo.create_notification(&payload).await {
        tracing::error!("Failed to record bulk import notification for user {}: {}", user_id, e);
    }
}
