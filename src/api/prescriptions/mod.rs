//! Prescription endpoints over the in-memory mock list

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use tracing::info;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, DataResponse, Json, ListResponse};
use crate::domain::prescription::{
    NewPrescription, Prescription, PrescriptionFilter, PrescriptionUpdate,
};

pub fn create_prescriptions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_prescriptions).post(create_prescription))
        .route(
            "/{id}",
            get(get_prescription)
                .put(update_prescription)
                .delete(delete_prescription),
        )
}

type PrescriptionResponse = Result<Json<DataResponse<Prescription>>, ApiError>;

fn found(prescription: Option<Prescription>, id: &str) -> PrescriptionResponse {
    prescription
        .map(|rx| Json(DataResponse::new(rx)))
        .ok_or_else(|| ApiError::not_found(format!("Prescription '{}' not found", id)))
}

/// GET /api/prescriptions?patientId=&status=
pub async fn list_prescriptions(
    State(state): State<AppState>,
    _user: RequireUser,
    query: Result<Query<PrescriptionFilter>, QueryRejection>,
) -> Result<Json<ListResponse<Prescription>>, ApiError> {
    let Query(filter) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let prescriptions = state.prescriptions.list(&filter).await?;

    Ok(Json(ListResponse::new(prescriptions)))
}

/// GET /api/prescriptions/{id}
pub async fn get_prescription(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(id): Path<String>,
) -> PrescriptionResponse {
    found(state.prescriptions.get(&id).await?, &id)
}

/// POST /api/prescriptions
pub async fn create_prescription(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<NewPrescription>,
) -> Result<(StatusCode, Json<DataResponse<Prescription>>), ApiError> {
    let prescription = state.prescriptions.create(request).await?;

    info!(
        prescription_id = %prescription.id,
        created_by = %user.id(),
        "Prescription created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(prescription))))
}

/// PUT /api/prescriptions/{id}
pub async fn update_prescription(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(id): Path<String>,
    Json(update): Json<PrescriptionUpdate>,
) -> PrescriptionResponse {
    found(state.prescriptions.update(&id, update).await?, &id)
}

/// DELETE /api/prescriptions/{id}
pub async fn delete_prescription(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(id): Path<String>,
) -> PrescriptionResponse {
    found(state.prescriptions.delete(&id).await?, &id)
}
