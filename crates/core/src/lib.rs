pub mod config;
pub mod models;
pub mod util;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Body returned for every failed card request.
pub const CARD_FAILURE_MESSAGE: &str = "Failed to generate the image";

/// Everything that can go wrong while producing a card. Callers only ever see
/// the uniform 500 response; the variants exist for logging and tests.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("No post found for slug {0:?}")]
    NotFound(String),
    #[error("Upstream request failed: {0:#}")]
    Upstream(anyhow::Error),
    #[error("Render failed: {0:#}")]
    Render(anyhow::Error),
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref())],
            CARD_FAILURE_MESSAGE,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_is_uniform() {
        let errors = [
            CardError::NotFound("missing".to_string()),
            CardError::Upstream(anyhow::anyhow!("connection refused")),
            CardError::Render(anyhow::anyhow!("bad svg")),
        ];
        for err in errors {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "text/plain; charset=utf-8"
            );
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CardError::NotFound("hello".to_string()).to_string(),
            "No post found for slug \"hello\""
        );
        let err = anyhow::anyhow!("inner").context("outer");
        assert_eq!(CardError::Upstream(err).to_string(), "Upstream request failed: outer: inner");
    }
}
