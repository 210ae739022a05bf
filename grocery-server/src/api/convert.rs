//! Repository error to API error mapping
//!
//! Repositories only know "row not found" and "duplicate"; handlers know
//! which resource was meant.

use serde_json::Value;

use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};

/// Map a missing row to `code` with the id in the details
pub fn not_found_as(code: ErrorCode, id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound(msg) => AppError::with_message(code, msg).with_detail("id", id),
        other => other.into(),
    }
}

/// Map a unique violation to `code`
pub fn duplicate_as(code: ErrorCode, detail: (&'static str, Value)) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::Duplicate(_) => AppError::new(code).with_detail(detail.0, detail.1),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_matching_case_is_remapped() {
        let err = not_found_as(ErrorCode::BannerNotFound, 7)(RepoError::NotFound("gone".into()));
        assert_eq!(err.code, ErrorCode::BannerNotFound);
        assert_eq!(err.details.unwrap()["id"], 7);

        let err = not_found_as(ErrorCode::BannerNotFound, 7)(RepoError::Duplicate("x".into()));
        assert_eq!(err.code, ErrorCode::AlreadyExists);

        let err = duplicate_as(ErrorCode::EmailAlreadyRegistered, ("email", "a@b.c".into()))(
            RepoError::Duplicate("Email a@b.c".into()),
        );
        assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);
    }
}
