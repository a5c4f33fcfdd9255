use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::adapters::in_memory::MemberRegistryError;
use crate::application::lending::LendingError;
use crate::application::registration::RegistrationError;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Lending(LendingError),
    Registration(RegistrationError),
    /// 会員登録されていないIDで操作しようとした
    UnknownMember(Uuid),
}

impl From<LendingError> for ApiError {
    fn from(err: LendingError) -> Self {
        ApiError::Lending(err)
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        ApiError::Registration(err)
    }
}

impl From<MemberRegistryError> for ApiError {
    fn from(err: MemberRegistryError) -> Self {
        match err {
            MemberRegistryError::UsernameTaken(username) => {
                ApiError::Registration(RegistrationError::UsernameTaken(username))
            }
            MemberRegistryError::UnknownMember(member_id) => {
                ApiError::UnknownMember(member_id.value())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Lending(err) => {
                let (status, error_type) = lending_status(&err);
                (status, error_type, err.to_string())
            }
            ApiError::Registration(err) => {
                let (status, error_type) = registration_status(&err);
                (status, error_type, err.to_string())
            }
            ApiError::UnknownMember(id) => (
                StatusCode::NOT_FOUND,
                "MEMBER_NOT_FOUND",
                format!("Member {} is not registered", id),
            ),
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}

fn lending_status(err: &LendingError) -> (StatusCode, &'static str) {
    match err {
        // 404 Not Found - リクエストされたリソースが存在しない
        LendingError::BookNotFound(_) => (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND"),
        LendingError::NoOfferFound(_) => (StatusCode::NOT_FOUND, "NO_OFFER_FOUND"),
        LendingError::NoActiveLoan(_) => (StatusCode::NOT_FOUND, "NO_ACTIVE_LOAN"),
        LendingError::NotQueued(_) => (StatusCode::NOT_FOUND, "NOT_QUEUED"),

        // 409 Conflict - 既に存在する
        LendingError::DuplicateIsbn(_) => (StatusCode::CONFLICT, "DUPLICATE_ISBN"),
        LendingError::DuplicateOffer(_) => (StatusCode::CONFLICT, "DUPLICATE_OFFER"),
        LendingError::AlreadyBorrowed(_) => (StatusCode::CONFLICT, "ALREADY_BORROWED"),

        // 422 Unprocessable Entity - ビジネスルール違反
        LendingError::NotPhysical(_) => (StatusCode::UNPROCESSABLE_ENTITY, "NOT_PHYSICAL"),
        LendingError::UserBanned(_) => (StatusCode::UNPROCESSABLE_ENTITY, "USER_BANNED"),
        LendingError::ExtensionLimitExceeded { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "EXTENSION_LIMIT_EXCEEDED",
        ),
        LendingError::DateOutOfRange { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "DATE_OUT_OF_RANGE")
        }

        // 500 Internal Server Error - 台帳の不整合（検出時に記録済み）
        LendingError::InvariantViolation { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INVARIANT_VIOLATION")
        }
    }
}

fn registration_status(err: &RegistrationError) -> (StatusCode, &'static str) {
    match err {
        RegistrationError::DuplicateIsbn(_) => (StatusCode::CONFLICT, "DUPLICATE_ISBN"),
        RegistrationError::UsernameTaken(_) => (StatusCode::CONFLICT, "USERNAME_TAKEN"),
        _ => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED"),
    }
}
