//! Response-shape extraction for inference backends.
//!
//! Backends answer in several shapes. Matchers are tried in priority order
//! and the first hit wins; when none match, the whole body is serialized
//! to text so the user still sees something.

use serde_json::Value;

use chatrelay_types::error::InferenceError;

type ShapeMatcher = fn(&Value) -> Option<&str>;

/// Ordered matcher table: plain string, `response`, `description`,
/// OpenAI-style `choices[0].message.content`.
const SHAPE_MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("string", plain_string),
    ("response", response_field),
    ("description", description_field),
    ("choices", first_choice_content),
];

fn plain_string(value: &Value) -> Option<&str> {
    value.as_str()
}

fn response_field(value: &Value) -> Option<&str> {
    value.get("response")?.as_str()
}

fn description_field(value: &Value) -> Option<&str> {
    value.get("description")?.as_str()
}

fn first_choice_content(value: &Value) -> Option<&str> {
    value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

/// Extract the generated text from a backend response body.
///
/// A `null` body means the backend returned nothing and is reported as
/// [`InferenceError::EmptyResponse`].
pub fn extract_text(value: &Value) -> Result<String, InferenceError> {
    if value.is_null() {
        return Err(InferenceError::EmptyResponse);
    }

    for (shape, matcher) in SHAPE_MATCHERS {
        if let Some(text) = matcher(value) {
            tracing::trace!(shape, "Matched inference response shape");
            return Ok(text.to_string());
        }
    }

    tracing::warn!(body = %value, "Unexpected inference response shape, using raw body");
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_string_body() {
        assert_eq!(extract_text(&json!("hello")).unwrap(), "hello");
    }

    #[test]
    fn response_field_body() {
        assert_eq!(
            extract_text(&json!({"response": "from response"})).unwrap(),
            "from response"
        );
    }

    #[test]
    fn description_field_body() {
        assert_eq!(
            extract_text(&json!({"description": "from description"})).unwrap(),
            "from description"
        );
    }

    #[test]
    fn openai_choices_body() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "from choices"}}]
        });
        assert_eq!(extract_text(&body).unwrap(), "from choices");
    }

    #[test]
    fn response_wins_over_description_and_choices() {
        let body = json!({
            "description": "second",
            "choices": [{"message": {"content": "third"}}],
            "response": "first",
        });
        assert_eq!(extract_text(&body).unwrap(), "first");
    }

    #[test]
    fn non_string_response_field_falls_through() {
        let body = json!({"response": 42, "description": "fallback"});
        assert_eq!(extract_text(&body).unwrap(), "fallback");
    }

    #[test]
    fn unknown_shape_serializes_body() {
        let body = json!({"text": "elsewhere"});
        assert_eq!(extract_text(&body).unwrap(), r#"{"text":"elsewhere"}"#);
    }

    #[test]
    fn null_body_is_empty_response() {
        assert!(matches!(
            extract_text(&Value::Null),
            Err(InferenceError::EmptyResponse)
        ));
    }
}
