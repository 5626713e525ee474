use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// JSON body extractor that also runs `validator` rules. Every rejection is a
/// `400` in the shared error shape.
pub struct SimpleValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for SimpleValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, axum::Json<Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(json_value) =
            axum::Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    let payload = json!({
                        "status": "error",
                        "code": "BAD_REQUEST",
                        "message": rejection.body_text(),
                    });
                    (StatusCode::BAD_REQUEST, axum::Json(payload))
                })?;

        json_value.validate().map_err(|validation_errors| {
            let payload = json!({
                "status": "error",
                "code": "VALIDATION_ERROR",
                "message": format_validation_errors(&validation_errors),
                "details": format_validation_errors_detailed(&validation_errors)
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload))
        })?;

        Ok(Self(json_value))
    }
}

/// Path extractor whose rejections use the same error shape as
/// [`SimpleValidatedJson`], e.g. a malformed id in `/products/{id}`.
pub struct SimpleValidatedPath<T>(pub T);

impl<S, T> FromRequestParts<S> for SimpleValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, axum::Json<Value>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                let payload = json!({
                    "status": "error",
                    "code": "VALIDATION_ERROR",
                    "message": "Request validation failed",
                    "details": { "path": [rejection.body_text()] }
                });
                (rejection.status(), axum::Json(payload))
            })?;

        Ok(Self(value))
    }
}

fn describe(field: &str, error: &validator::ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| match error.code.as_ref() {
            "email" => "Invalid email format".to_string(),
            "length" => "Invalid length".to_string(),
            "range" => "Value out of range".to_string(),
            _ => format!("Invalid {field}"),
        })
}

/// Flattens nested and list errors into `path -> messages`, e.g.
/// `items[0].quantity`.
fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    out.push((path.clone(), describe(field, error)));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect(nested, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut collected = Vec::new();
    collect(errors, "", &mut collected);

    if collected.is_empty() {
        "Request validation failed".to_string()
    } else {
        collected
            .iter()
            .map(|(path, message)| format!("{path}: {message}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn format_validation_errors_detailed(errors: &ValidationErrors) -> Value {
    let mut collected = Vec::new();
    collect(errors, "", &mut collected);

    let mut error_map = serde_json::Map::new();
    for (path, message) in collected {
        let entry = error_map.entry(path).or_insert_with(|| json!([]));
        if let Value::Array(messages) = entry {
            messages.push(Value::String(message));
        }
    }

    Value::Object(error_map)
}
