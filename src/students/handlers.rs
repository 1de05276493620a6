use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::AppError,
    model::{to_public, Attributes},
    state::AppState,
};

use super::{dto::Pagination, model::Student};

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(get_student).patch(update_student).delete(delete_student),
        )
}

fn public(student: &Student) -> Result<Value, AppError> {
    to_public(student).map_err(|e| AppError::Internal(e.into()))
}

#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Value>>, AppError> {
    let (limit, offset) = p.clamped();
    let students = state.students.list(limit, offset).await?;
    let items = students.iter().map(public).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_student(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let attrs = Attributes::fill_value::<Student>(&payload)?;
    let fields = attrs.len();
    let student = state.students.create(attrs).await?;
    info!(student_id = %student.id, fields, "student created");
    Ok((StatusCode::CREATED, Json(public(&student)?)))
}

#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let student = state
        .students
        .find(id)
        .await?
        .ok_or(AppError::NotFound("student"))?;
    Ok(Json(public(&student)?))
}

#[instrument(skip(state, payload))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let attrs = Attributes::fill_value::<Student>(&payload)?;
    let fields = attrs.len();
    let student = state
        .students
        .update(id, attrs)
        .await?
        .ok_or(AppError::NotFound("student"))?;
    info!(student_id = %student.id, fields, "student updated");
    Ok(Json(public(&student)?))
}

#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.students.delete(id).await? {
        info!(student_id = %id, "student deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("student"))
    }
}
