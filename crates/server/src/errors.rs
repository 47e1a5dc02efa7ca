use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use marvel_etl::{JobError, JobOutcome};
use tracing::error;

/// A custom error type for the server application.
///
/// Every failure is reported to the caller as the same generic string; the cause
/// is only logged.
pub enum AppError {
    /// A job run failed.
    Job(JobError),
}

/// Conversion from `JobError` to `AppError`.
impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        AppError::Job(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Job(err) => {
                error!("Error is: {err} (failed after stage {})", err.stage());
            }
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            JobOutcome::Failure.as_str(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use marvel_etl::errors::SecretError;

    #[tokio::test]
    async fn test_job_error_becomes_generic_500() {
        let err = JobError::Credentials(SecretError::NotFound("marvel_private_key".into()));

        let response = AppError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Error");
    }
}
