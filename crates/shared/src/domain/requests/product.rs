use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn default_currency() -> String {
    "USD".to_string()
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    #[schema(example = "Espresso beans 1kg")]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    #[schema(example = 1999)]
    pub price_cents: i64,

    #[serde(default = "default_currency")]
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    #[schema(example = "USD")]
    pub currency: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i32,

    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_description"))]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: Option<i64>,

    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,

    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i32>,

    pub active: Option<bool>,
}

fn validate_update_description(req: &UpdateProductRequest) -> Result<(), ValidationError> {
    match &req.description {
        Some(Some(text)) if text.chars().count() > 2000 => {
            let mut err = ValidationError::new("length");
            err.message = Some("Description must be at most 2000 characters".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_currency_and_stock() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"name":"Mug","priceCents":500}"#).unwrap();
        assert_eq!(req.currency, "USD");
        assert_eq!(req.stock, 0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_rejects_bad_currency_and_negative_price() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"name":"Mug","priceCents":-1,"currency":"EURO"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price_cents"));
        assert!(fields.contains_key("currency"));
    }

    #[test]
    fn update_distinguishes_null_from_absent_description() {
        let cleared: UpdateProductRequest =
            serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let untouched: UpdateProductRequest = serde_json::from_str(r#"{"stock":3}"#).unwrap();
        assert_eq!(untouched.description, None);
        assert_eq!(untouched.stock, Some(3));
    }

    #[test]
    fn update_rejects_overlong_description() {
        let req = UpdateProductRequest {
            description: Some(Some("x".repeat(2001))),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
