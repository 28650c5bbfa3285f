//! Strict decoding of interpreter output into a [`CommandCandidate`]
//!
//! Language models return loosely shaped JSON. Nothing reaches the pipeline
//! until every field has been checked here; anything that does not conform
//! becomes an [`InterpretError`].

use crate::error::InterpretError;
use crate::types::{Action, CommandCandidate, Magnitude};
use serde_json::{Map, Value};

/// Decode the JSON object produced by the model.
///
/// Required: `action` (known label) and `confidence` (number in [0, 1]).
/// `magnitude` may be absent or null, which means MID. Other keys are ignored.
pub fn decode_candidate(content: &str) -> Result<CommandCandidate, InterpretError> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| InterpretError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| InterpretError::MalformedResponse("expected a JSON object".into()))?;

    let action: Action = required_str(object, "action")?.parse()?;
    let magnitude = match object.get("magnitude") {
        None | Some(Value::Null) => Magnitude::Mid,
        Some(Value::String(label)) => label.parse()?,
        Some(other) => {
            return Err(InterpretError::MalformedResponse(format!(
                "magnitude must be a string, got {other}"
            )))
        }
    };
    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| InterpretError::MalformedResponse("missing numeric confidence".into()))?;

    Ok(CommandCandidate::new(action, magnitude, confidence)?)
}

/// Pull the message content out of a chat-completions response body.
///
/// A non-null `refusal` on the message is reported as [`InterpretError::Refused`].
pub fn extract_chat_content(body: &Value) -> Result<&str, InterpretError> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| InterpretError::MalformedResponse("response has no choices".into()))?;

    if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
        return Err(InterpretError::Refused(refusal.to_string()));
    }

    message
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| InterpretError::MalformedResponse("message has no content".into()))
}

fn required_str<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a str, InterpretError> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| InterpretError::MalformedResponse(format!("missing string field `{key}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_well_formed() {
        let candidate = decode_candidate(
            r#"{"action": "MOVE_UP", "magnitude": "SMALL", "confidence": 0.95, "frame": "CAMERA"}"#,
        )
        .unwrap();
        assert_eq!(candidate.action(), Action::MoveUp);
        assert_eq!(candidate.magnitude(), Magnitude::Small);
        assert!((candidate.confidence() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_missing_or_null_magnitude_is_mid() {
        let stop = decode_candidate(r#"{"action": "STOP", "magnitude": null, "confidence": 0.99}"#)
            .unwrap();
        assert_eq!(stop.action(), Action::Stop);
        assert_eq!(stop.magnitude(), Magnitude::Mid);

        let left = decode_candidate(r#"{"action": "MOVE_LEFT", "confidence": 1}"#).unwrap();
        assert_eq!(left.magnitude(), Magnitude::Mid);
        assert_eq!(left.confidence(), 1.0);
    }

    #[test]
    fn test_confidence_keeps_full_precision() {
        let near_gate =
            decode_candidate(r#"{"action": "MOVE_UP", "confidence": 0.69999999}"#).unwrap();
        assert!(near_gate.confidence() < 0.7);

        let near_escalation =
            decode_candidate(r#"{"action": "MOVE_UP", "confidence": 0.49999999}"#).unwrap();
        assert!(near_escalation.confidence() < 0.5);

        assert!(matches!(
            decode_candidate(r#"{"action": "MOVE_UP", "confidence": 1.00000001}"#),
            Err(InterpretError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_rejects_nonconforming_shapes() {
        let bad = [
            "not json",
            "[1, 2]",
            r#"{"magnitude": "MID", "confidence": 0.8}"#,
            r#"{"action": "FLY_AWAY", "magnitude": "MID", "confidence": 0.8}"#,
            r#"{"action": "move_up", "confidence": 0.8}"#,
            r#"{"action": "MOVE_UP", "magnitude": "HUGE", "confidence": 0.8}"#,
            r#"{"action": "MOVE_UP", "magnitude": 3, "confidence": 0.8}"#,
            r#"{"action": "MOVE_UP", "confidence": "high"}"#,
            r#"{"action": "MOVE_UP"}"#,
            r#"{"action": "MOVE_UP", "confidence": 1.5}"#,
            r#"{"action": "MOVE_UP", "confidence": -0.2}"#,
        ];
        for content in bad {
            assert!(
                matches!(
                    decode_candidate(content),
                    Err(InterpretError::MalformedResponse(_))
                ),
                "content: {content}"
            );
        }
    }

    #[test]
    fn test_extract_chat_content() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"action\":\"STOP\",\"confidence\":1.0}", "refusal": null}}]
        });
        let content = extract_chat_content(&body).unwrap();
        assert_eq!(decode_candidate(content).unwrap().action(), Action::Stop);

        let refused = json!({
            "choices": [{"message": {"content": null, "refusal": "I can't help with that"}}]
        });
        assert_eq!(
            extract_chat_content(&refused),
            Err(InterpretError::Refused("I can't help with that".into()))
        );

        assert!(matches!(
            extract_chat_content(&json!({"choices": []})),
            Err(InterpretError::MalformedResponse(_))
        ));
    }
}
