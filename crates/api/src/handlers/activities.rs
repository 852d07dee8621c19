//! Activity handlers: CRUD, bulk create, and CSV import/export.
//!
//! Create accepts either `multipart/form-data` (one activity, optional
//! proof file) or `application/json` (one activity object, or an array for
//! transactional bulk creation). Proof files are written before the insert
//! and removed again if the insert fails, so the store never accumulates
//! orphans from failed requests.

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::body::Bytes;
use axum::Json;
use serde::Deserialize;

use logbook_core::activity::{ActivityDraft, ActivityPatch};
use logbook_core::error::CoreError;
use logbook_core::types::ActivityId;
use logbook_core::pagination::{clamp_limit, clamp_page};
use logbook_core::validation::{validate_batch, validate_draft, validate_patch, BatchError};
use logbook_db::models::activity::Activity;
use logbook_db::repositories::ActivityRepo;

use crate::error::{AppError, AppResult};
use crate::response::{ApiResponse, Pagination};
use crate::state::AppState;

/// Page selection for [`list`]. Out-of-range values are clamped, never
/// rejected.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A file part lifted out of a multipart body.
struct UploadedFile {
    filename: String,
    data: Bytes,
}

/// GET `/api/activities/{author}` -- paginated list, newest first.
///
/// An author with no records at all is a 404. A page past the end is not:
/// it returns an empty list under the same pagination block.
pub async fn list(
    State(state): State<AppState>,
    Path(author): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<Activity>>>> {
    let total = ActivityRepo::count_by_author(&state.pool, &author).await?;
    if total == 0 {
        return Err(CoreError::NotFound {
            entity: "Activity",
            id: author,
        }
        .into());
    }

    let limit = clamp_limit(query.limit);
    let page = clamp_page(query.page);
    let activities =
        ActivityRepo::list_by_author(&state.pool, &author, Some(page), Some(limit)).await?;

    Ok(Json(ApiResponse::paginated(
        activities,
        "Activities retrieved successfully",
        Pagination::new(page, limit, total),
    )))
}

/// POST `/api/activities` -- create one or many activities.
///
/// Dispatches on the request's content type:
/// - `multipart/form-data`: one activity, text fields plus an optional
///   `proof` file part.
/// - `application/json`: a single activity object, or an array of them
///   for all-or-nothing bulk creation.
pub async fn create(State(state): State<AppState>, req: Request) -> AppResult<Response> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?;
        create_from_form(&state, multipart).await
    } else if content_type.starts_with("application/json") {
        let Json(value) = Json::<serde_json::Value>::from_request(req, &state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
        create_from_json(&state, value).await
    } else {
        Err(AppError::BadRequest(
            "Content-Type must be multipart/form-data or application/json".to_string(),
        ))
    }
}

async fn create_from_form(state: &AppState, multipart: Multipart) -> AppResult<Response> {
    let (draft, file) = collect_form(multipart).await?;
    let mut record = validate_draft(&draft).map_err(CoreError::Validation)?;

    if let Some(file) = &file {
        let reference = state
            .uploads
            .save(&file.data, &file.filename)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store proof file: {e}")))?;
        record.proof = Some(reference);
    }

    match ActivityRepo::create(&state.pool, &record).await {
        Ok(activity) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::ok(activity, "Activity created successfully")),
        )
            .into_response()),
        Err(err) => {
            // The insert failed after the file was written; take it back out.
            if let Some(reference) = &record.proof {
                state.uploads.remove(reference).await;
            }
            Err(err.into())
        }
    }
}

async fn create_from_json(state: &AppState, value: serde_json::Value) -> AppResult<Response> {
    match value {
        serde_json::Value::Array(_) => {
            let drafts: Vec<ActivityDraft> = serde_json::from_value(value)
                .map_err(|e| AppError::BadRequest(format!("Invalid activity array: {e}")))?;
            let records = validate_batch(&drafts).map_err(batch_error)?;
            let created = ActivityRepo::create_many(&state.pool, &records).await?;
            let message = format!("{} activities created successfully", created.len());
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(created, message)),
            )
                .into_response())
        }
        serde_json::Value::Object(_) => {
            let draft: ActivityDraft = serde_json::from_value(value)
                .map_err(|e| AppError::BadRequest(format!("Invalid activity object: {e}")))?;
            let record = validate_draft(&draft).map_err(CoreError::Validation)?;
            let created = ActivityRepo::create(&state.pool, &record).await?;
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(created, "Activity created successfully")),
            )
                .into_response())
        }
        _ => Err(AppError::BadRequest(
            "Request body must be an activity object or an array of activities".to_string(),
        )),
    }
}

/// PUT `/api/activities/update/{id}` -- partial update via multipart form.
///
/// Only submitted fields change; a new `proof` file replaces the old one,
/// whose stored file is removed after the row update lands.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Activity>>> {
    let (draft, file) = collect_form(multipart).await?;
    let patch = ActivityPatch {
        author: draft.author,
        date: draft.date,
        title: draft.title,
        category: draft.category,
        start_time: draft.start_time,
        end_time: draft.end_time,
        work_mode: draft.work_mode,
        location: draft.location,
        description: draft.description,
        proof: None,
    };
    if patch.is_empty() && file.is_none() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    let mut update = validate_patch(&patch).map_err(CoreError::Validation)?;

    let existing = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(file) = &file {
        let reference = state
            .uploads
            .save(&file.data, &file.filename)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store proof file: {e}")))?;
        update.proof = Some(reference);
    }

    match ActivityRepo::update(&state.pool, id, &update).await {
        Ok(Some(activity)) => {
            if update.proof.is_some() {
                if let Some(old) = &existing.proof {
                    state.uploads.remove(old).await;
                }
            }
            Ok(Json(ApiResponse::ok(
                activity,
                "Activity updated successfully",
            )))
        }
        // The row vanished between the lookup and the update.
        Ok(None) => {
            if let Some(reference) = &update.proof {
                state.uploads.remove(reference).await;
            }
            Err(not_found(id).into())
        }
        Err(err) => {
            if let Some(reference) = &update.proof {
                state.uploads.remove(reference).await;
            }
            Err(err.into())
        }
    }
}

/// DELETE `/api/activities/delete/{id}` -- delete a record and its proof.
///
/// File removal is best-effort; the record is gone either way.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
) -> AppResult<Json<ApiResponse<()>>> {
    match ActivityRepo::delete(&state.pool, id).await? {
        None => Err(not_found(id).into()),
        Some(proof) => {
            if let Some(reference) = proof {
                state.uploads.remove(&reference).await;
            }
            Ok(Json(ApiResponse::message("Activity deleted successfully")))
        }
    }
}

/// GET `/api/activities/{author}/export` -- download all records as CSV.
pub async fn export_csv(
    State(state): State<AppState>,
    Path(author): Path<String>,
) -> AppResult<Response> {
    let activities = ActivityRepo::list_all_by_author(&state.pool, &author).await?;
    if activities.is_empty() {
        return Err(CoreError::NotFound {
            entity: "Activity",
            id: author,
        }
        .into());
    }

    let csv = logbook_core::csv::to_csv(activities.iter().map(Activity::csv_row));
    let filename = format!(
        "logbook-activities-{}.csv",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// POST `/api/activities/import` -- bulk create from an uploaded CSV.
///
/// The file must follow the export grammar exactly; malformed rows are
/// reported by line number and nothing is created. Parsed rows then go
/// through the same validation and transactional insert as a JSON bulk
/// create.
pub async fn import_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut author: Option<String> = None;
    let mut text: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("author") => author = Some(field.text().await.map_err(bad_multipart)?),
            Some("file") => text = Some(field.text().await.map_err(bad_multipart)?),
            _ => {}
        }
    }

    let author = author.ok_or_else(|| AppError::BadRequest("author field is required".into()))?;
    let text = text.ok_or_else(|| AppError::BadRequest("file field is required".into()))?;

    let drafts = logbook_core::csv::parse_csv(&text, &author).map_err(AppError::CsvImport)?;
    let records = validate_batch(&drafts).map_err(batch_error)?;
    let created = ActivityRepo::create_many(&state.pool, &records).await?;

    let message = format!("Imported {} activities", created.len());
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created, message))).into_response())
}

/// Pull text fields and the optional `proof` file part out of a form.
///
/// Unknown parts are ignored; an empty `proof` part (no filename) counts
/// as absent so browsers posting an untouched file input do not attach an
/// empty file.
async fn collect_form(
    mut multipart: Multipart,
) -> AppResult<(ActivityDraft, Option<UploadedFile>)> {
    let mut draft = ActivityDraft::default();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("author") => draft.author = Some(field.text().await.map_err(bad_multipart)?),
            Some("date") => draft.date = Some(field.text().await.map_err(bad_multipart)?),
            Some("title") => draft.title = Some(field.text().await.map_err(bad_multipart)?),
            Some("category") => draft.category = Some(field.text().await.map_err(bad_multipart)?),
            Some("start_time") => {
                draft.start_time = Some(field.text().await.map_err(bad_multipart)?)
            }
            Some("end_time") => draft.end_time = Some(field.text().await.map_err(bad_multipart)?),
            Some("work_mode") => {
                draft.work_mode = Some(field.text().await.map_err(bad_multipart)?)
            }
            Some("location") => draft.location = Some(field.text().await.map_err(bad_multipart)?),
            Some("description") => {
                draft.description = Some(field.text().await.map_err(bad_multipart)?)
            }
            Some("proof") => {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(bad_multipart)?;
                if let Some(filename) = filename {
                    if !filename.is_empty() && !data.is_empty() {
                        file = Some(UploadedFile { filename, data });
                    }
                }
            }
            _ => {}
        }
    }

    Ok((draft, file))
}

fn not_found(id: ActivityId) -> CoreError {
    CoreError::NotFound {
        entity: "Activity",
        id: id.to_string(),
    }
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {err}"))
}

fn batch_error(err: BatchError) -> AppError {
    match err {
        BatchError::Empty => CoreError::Validation(vec![
            logbook_core::validation::FieldViolation::new(
                "items",
                "at least one activity is required",
            ),
        ])
        .into(),
        BatchError::Item { index, violations } => {
            CoreError::BatchValidation { index, violations }.into()
        }
    }
}
