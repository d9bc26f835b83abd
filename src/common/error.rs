use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    Unexpected,
    Unauthorized,

    ConversationsNotFound,
    ConversationsNotParticipant,
    ConversationsWithSelf,
    /// A conversation row without a second participant. No legitimate path
    /// creates one; surfaced as a generic failure.
    ConversationsMissingCounterpart,

    MessagesEmptyContent,
    MessagesTooLong,

    UsersNotFound,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::Unauthorized => "unauthorized",

            AppError::ConversationsNotFound => "conversations.not_found",
            AppError::ConversationsNotParticipant => "conversations.not_participant",
            AppError::ConversationsWithSelf => "conversations.with_self",
            AppError::ConversationsMissingCounterpart => "internal_server_error",

            AppError::MessagesEmptyContent => "messages.empty_content",
            AppError::MessagesTooLong => "messages.too_long",

            AppError::UsersNotFound => "users.not_found",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::Unauthorized => "You are not authorized to perform this action.",

            AppError::ConversationsNotFound => "Conversation could not be found.",
            AppError::ConversationsNotParticipant => {
                "You are not a participant of this conversation."
            }
            AppError::ConversationsWithSelf => "You cannot start a conversation with yourself.",
            AppError::ConversationsMissingCounterpart => "An internal server error has occurred.",

            AppError::MessagesEmptyContent => "Message content must not be empty.",
            AppError::MessagesTooLong => "Your message was too long. It has not been sent.",

            AppError::UsersNotFound => "This user does not exist.",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::ConversationsWithSelf
            | AppError::MessagesEmptyContent
            | AppError::MessagesTooLong => StatusCode::BAD_REQUEST,

            AppError::Unauthorized => StatusCode::UNAUTHORIZED,

            AppError::ConversationsNotParticipant => StatusCode::FORBIDDEN,

            AppError::ConversationsNotFound | AppError::UsersNotFound => StatusCode::NOT_FOUND,

            AppError::Unexpected | AppError::ConversationsMissingCounterpart => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}
