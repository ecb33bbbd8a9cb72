/// Document upload and index management handlers
use axum::extract::Multipart;
use axum::extract::State;
use axum::Json;
use tracing::error;
use tracing::info;

use super::ApiError;
use super::ApiResult;
use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::DocumentsResponse;
use crate::api::types::MessageResponse;
use crate::api::types::UploadResponse;
use crate::errors::PdfRagError;
use crate::extract::is_pdf_filename;

/// Upload and index a PDF (POST /api/upload, multipart field `file`)
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let mut received = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Could not read upload: {e}")))?;
        received = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = received else {
        return Err(ApiError::bad_request("No file provided"));
    };
    info!("POST /api/upload: {} ({} bytes)", file_name, bytes.len());

    if !is_pdf_filename(&file_name) {
        return Err(ApiError::bad_request("Only PDF files are allowed"));
    }

    match state.service.ingest_pdf(&bytes, &file_name).await {
        Ok(document_count) => Ok(Json(ApiResponse::success(UploadResponse {
            message: format!("Successfully processed {file_name}"),
            document_count,
        }))),
        Err(PdfRagError::Extraction(cause)) => {
            info!("Could not extract text from {}: {}", file_name, cause);
            Err(ApiError::bad_request("Could not extract text from PDF"))
        }
        Err(e) if e.is_client_error() => Err(ApiError::from(e)),
        Err(e) => {
            error!("Error processing {}: {}", file_name, e);
            Err(ApiError::internal(format!("Error processing PDF: {e}")))
        }
    }
}

/// Index statistics (GET /api/documents)
pub async fn list_documents(
    State(state): State<AppState>,
) -> Json<ApiResponse<DocumentsResponse>> {
    let stats = state.service.stats().await;
    Json(ApiResponse::success(DocumentsResponse {
        document_count: stats.fragments,
        sources: stats.sources,
        available_models: state.service.available_models().to_vec(),
    }))
}

/// Drop every indexed fragment (DELETE /api/documents)
pub async fn clear_documents(
    State(state): State<AppState>,
) -> Json<ApiResponse<MessageResponse>> {
    info!("DELETE /api/documents");
    state.service.clear_all().await;
    Json(ApiResponse::success(MessageResponse::new(
        "All documents cleared successfully",
    )))
}
