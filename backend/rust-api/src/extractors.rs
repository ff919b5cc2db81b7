use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::Validate;

/// JSON body that must also pass `validator` rules.
///
/// Malformed JSON is rejected with 400, rule violations with 422. Both carry a JSON body.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => value,
            Err(rejection) => {
                let message = format!("Failed to parse JSON request body: {}", rejection);
                tracing::warn!("{}", message);
                return Err(error_response(StatusCode::BAD_REQUEST, message));
            }
        };

        if let Err(errors) = value.validate() {
            let message = format!("Validation error: {}", errors);
            tracing::warn!("{}", message);
            return Err(error_response(StatusCode::UNPROCESSABLE_ENTITY, message));
        }

        Ok(ValidatedJson(value))
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(json!({
            "message": message,
            "status": status.as_u16()
        })),
    )
        .into_response()
}
