use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

use crate::schemas::MemberId;

/// Reasons a group cannot be settled as submitted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("expense {expense_id} is paid by unknown member {member_id}")]
    UnknownPayer {
        expense_id: String,
        member_id: MemberId,
    },

    #[error("expense {expense_id} is split with unknown member {member_id}")]
    UnknownSplitMember {
        expense_id: String,
        member_id: MemberId,
    },

    #[error("expense {expense_id} is not split between anyone")]
    EmptySplit { expense_id: String },

    #[error("expense {expense_id} must have a positive amount")]
    NonPositiveAmount { expense_id: String },

    #[error("expense {expense_id} pushes a balance beyond the supported range")]
    AmountTooLarge { expense_id: String },

    #[error("expense {expense_id} has no description")]
    EmptyDescription { expense_id: String },

    #[error("member {0} already exists in the group")]
    DuplicateMember(MemberId),

    #[error("expense {0} already exists in the group")]
    DuplicateExpense(String),
}

impl ResponseError for ValidationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
