//! Request-scoped value types shared by the validator, the remote client and the API.

use serde::Serialize;

/// Optional knobs forwarded to the remote convert task.
///
/// Serializes to exactly the fields the convert task accepts; absent values are omitted.
///
/// Values are already range-checked by the time this struct exists; build it through
/// `pixform_processing::validate_options` rather than by hand in request handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_serialize_to_empty_object() {
        let options = ConversionOptions::default();
        assert_eq!(serde_json::to_value(options).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_options_serialize_only_present_fields() {
        let options = ConversionOptions {
            quality: Some(80),
            width: None,
            height: Some(600),
        };
        assert_eq!(
            serde_json::to_value(options).unwrap(),
            serde_json::json!({"quality": 80, "height": 600})
        );
    }
}
