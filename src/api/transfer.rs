//! CSV export/import handlers

use super::{AppState, error::ApiError};
use crate::transfer;
use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use chrono::Local;
use serde_json::{Value, json};
use tracing::{info, warn};

pub async fn export_purchases(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let purchases = state.store.list_all();
    if purchases.is_empty() {
        return Err(ApiError::BadRequest(
            "No purchase data to export".to_string(),
        ));
    }

    let body = transfer::export_csv(&purchases).map_err(ApiError::from)?;
    let filename = format!(
        "gold_purchases_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    );
    info!(count = purchases.len(), "Exporting purchases to CSV");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}

pub async fn import_purchases(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {e}")))?;
            file = Some((filename, bytes.to_vec()));
        }
    }

    let (filename, content) =
        file.ok_or_else(|| ApiError::BadRequest("No file part".to_string()))?;
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No selected file".to_string()));
    }
    if !filename.ends_with(".csv") {
        return Err(ApiError::BadRequest(
            "Only CSV files are supported".to_string(),
        ));
    }

    let report =
        transfer::parse_csv(&content).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut imported_count = 0usize;
    let mut error_count = report.error_count;
    for record in report.records {
        match state.store.add(record) {
            Ok(_) => imported_count += 1,
            Err(e) => {
                warn!(error = %e, "Failed to store imported row");
                error_count += 1;
            }
        }
    }

    info!(imported_count, error_count, "Imported purchases from CSV");

    let message = if error_count > 0 {
        format!("Successfully imported {imported_count} purchases with {error_count} errors")
    } else {
        format!("Successfully imported {imported_count} purchases")
    };
    Ok(Json(json!({
        "success": true,
        "imported_count": imported_count,
        "error_count": error_count,
        "message": message,
    })))
}
