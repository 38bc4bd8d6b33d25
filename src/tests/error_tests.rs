#[cfg(test)]
mod tests {
    use crate::error::{AppError, AppResult, OptionExt};
    use crate::tests::body_text;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::io;

    #[test]
    fn test_app_error_display() {
        let error = AppError::BadRequest("Invalid input".to_string());
        assert_eq!(format!("{}", error), "Bad request: Invalid input");

        let error = AppError::NotFound("Student not found".to_string());
        assert_eq!(format!("{}", error), "Not found: Student not found");

        let error = AppError::Conflict("Duplicate value".to_string());
        assert_eq!(format!("{}", error), "Conflict: Duplicate value");
    }

    #[test]
    fn test_app_error_into_response() {
        let cases = [
            (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidInput("bad segment".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("missing".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
            (AppError::ServiceUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::IoError("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal(anyhow::anyhow!("oops")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AppError::Conflict("Student s0001 is still referenced by 1 enrollments".into()).into_response();
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["status"], 409);
        assert!(body["error"]["message"].as_str().unwrap().contains("s0001"));
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();

        match app_error {
            AppError::IoError(msg) => assert!(msg.contains("File not found")),
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let app_error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(app_error, AppError::NotFound(_)));

        let app_error: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(app_error, AppError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_option_ext() {
        let some_value: Option<i32> = Some(42);
        let result: AppResult<i32> = some_value.ok_or_not_found("Course");
        assert_eq!(result.unwrap(), 42);

        let none_value: Option<i32> = None;
        match none_value.ok_or_not_found("Course").unwrap_err() {
            AppError::NotFound(msg) => assert_eq!(msg, "Course not found"),
            _ => panic!("Expected NotFound error"),
        }
    }
}
