//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; responses are JSON `{"error": "..."}` bodies, with a
//! `fields` list for form validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mercato_core::checkout::{CheckoutError, FieldError};
use serde::Serialize;
use thiserror::Error;

use crate::cart::CartError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout transition failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::Unauthenticated => StatusCode::UNAUTHORIZED,
                CartError::ProductLookupFailed { .. } if err.is_product_not_found() => {
                    StatusCode::NOT_FOUND
                }
                CartError::ProductLookupFailed { .. } => StatusCode::BAD_GATEWAY,
                CartError::InvalidQuantity => StatusCode::BAD_REQUEST,
                CartError::AuthUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                CartError::Mirror(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::WrongStep { .. }
                | CheckoutError::StepLocked(_)
                | CheckoutError::Incomplete
                | CheckoutError::EmptyCart => StatusCode::CONFLICT,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        match self {
            Self::Cart(err) => match err {
                CartError::Unauthenticated => "Sign in required".to_string(),
                CartError::ProductLookupFailed { product_id, .. } if err.is_product_not_found() => {
                    format!("Product not found: {product_id}")
                }
                CartError::ProductLookupFailed { .. } => "Product catalog unavailable".to_string(),
                CartError::InvalidQuantity => err.to_string(),
                CartError::AuthUnavailable => "Sign-in status unavailable".to_string(),
                CartError::Mirror(_) => "Internal server error".to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) => "Please correct the highlighted fields".to_string(),
                other => other.to_string(),
            },
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let fields = match &self {
            Self::Checkout(CheckoutError::Validation(fields)) => Some(fields.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.public_message(),
            fields,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this once the signed-in user is known to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added line", Some(&[("product_id", "sku-1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mercato_core::ProductId;
    use mercato_core::checkout::CheckoutStep;

    use super::*;
    use crate::cart::{LookupError, MirrorError};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn lookup_failed(source: LookupError) -> AppError {
        AppError::Cart(CartError::ProductLookupFailed {
            product_id: ProductId::parse("sku-9").unwrap(),
            source,
        })
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order".to_string());
        assert_eq!(err.to_string(), "Not found: order");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_cart_error_status_codes() {
        assert_eq!(
            get_status(CartError::Unauthenticated.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(CartError::InvalidQuantity.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartError::AuthUnavailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(CartError::Mirror(MirrorError::Backend("down".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(lookup_failed(LookupError::NotFound(
                ProductId::parse("sku-9").unwrap()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(lookup_failed(LookupError::Unavailable("timeout".into()))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_checkout_error_status_codes() {
        assert_eq!(
            get_status(CheckoutError::Validation(vec![]).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(CheckoutError::StepLocked(CheckoutStep::Review).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CheckoutError::EmptyCart.into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_other_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let body = body_json(lookup_failed(LookupError::Unavailable(
            "10.0.0.3:8080 connection refused".into(),
        )))
        .await;
        assert_eq!(body["error"], "Product catalog unavailable");

        let body = body_json(AppError::Internal("pool exhausted".into())).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let body = body_json(
            CheckoutError::Validation(vec![FieldError::new("city", "City is required")]).into(),
        )
        .await;
        assert_eq!(body["fields"][0]["field"], "city");
        assert_eq!(body["fields"][0]["message"], "City is required");

        let body = body_json(AppError::BadRequest("nope".into())).await;
        assert!(body.get("fields").is_none());
    }
}
