//! Answer history endpoints under `/users`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::answer::{AnswerId, UserAnswer};
use crate::domain::user::UserId;

use super::types::{AnswerPayload, AnswerQuery, AnswerResponse};

fn to_responses(answers: &[UserAnswer]) -> Vec<AnswerResponse> {
    answers.iter().map(AnswerResponse::from).collect()
}

/// GET /users/answers?question=&quiz=&event=
pub async fn list_all_answers(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Query(query): Query<AnswerQuery>,
) -> Result<Json<Vec<AnswerResponse>>, ApiError> {
    state
        .user_validator
        .access_admin_or_instructor(Some(&principal))
        .await?;

    let answers = state.answer_service.all(query.into()).await?;
    Ok(Json(to_responses(&answers)))
}

/// GET /users/{id}/answers?question=&quiz=&event=
pub async fn list_user_answers(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<i64>,
    Query(query): Query<AnswerQuery>,
) -> Result<Json<Vec<AnswerResponse>>, ApiError> {
    let id = UserId::new(id);
    state
        .user_validator
        .access_admin_instructor_or_specific_user(id, Some(&principal))
        .await?;

    let answers = state.answer_service.history(id, query.into()).await?;
    Ok(Json(to_responses(&answers)))
}

/// POST /users/{id}/answers
pub async fn record_answer(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<i64>,
    Json(payload): Json<AnswerPayload>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    let id = UserId::new(id);
    state
        .user_validator
        .access_admin_instructor_or_specific_user(id, Some(&principal))
        .await?;

    let answer = state.answer_service.record(id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(AnswerResponse::from(&answer))))
}

/// DELETE /users/{id}/answers/{answer_id}
pub async fn delete_answer(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path((id, answer_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let id = UserId::new(id);
    state
        .user_validator
        .access_admin_instructor_or_specific_user(id, Some(&principal))
        .await?;

    state
        .answer_service
        .delete(id, AnswerId::new(answer_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
