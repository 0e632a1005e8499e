//! Pull the candidate object out of a model reply.

use std::sync::LazyLock;

use jot_core::Candidate;
use regex::Regex;
use serde_json::Value;

use crate::error::ModelError;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("fence regex")
});

/// Parse a reply as one JSON task object.
///
/// Accepts a bare object, one wrapped in a markdown code fence, or one
/// surrounded by stray prose. Arrays, scalars, broken JSON and objects without
/// a non-empty string `title` are rejected.
pub fn extract_candidate(text: &str) -> Result<Candidate, ModelError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    let body = FENCE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str());

    let value = match serde_json::from_str::<Value>(body) {
        Ok(v) => v,
        Err(first) => {
            let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
                return Err(ModelError::Malformed(first.to_string()));
            };
            if end < start {
                return Err(ModelError::Malformed(first.to_string()));
            }
            serde_json::from_str::<Value>(&body[start..=end])
                .map_err(|e| ModelError::Malformed(e.to_string()))?
        }
    };

    if !value.is_object() {
        return Err(ModelError::Malformed("expected a JSON object".to_string()));
    }
    // `{}` or an error envelope is not a task
    let has_title = value
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());
    if !has_title {
        return Err(ModelError::Malformed("reply has no task title".to_string()));
    }

    Candidate::from_json(value)
        .ok_or_else(|| ModelError::Malformed("reply fields have the wrong shape".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object() {
        let c = extract_candidate(r#"{"title":"Buy milk","priority":"low"}"#).unwrap();
        assert_eq!(c.title, "Buy milk");
        assert_eq!(c.priority, "low");
    }

    #[test]
    fn fenced_object() {
        let c = extract_candidate("```json\n{\"title\":\"Buy milk\"}\n```").unwrap();
        assert_eq!(c.title, "Buy milk");
    }

    #[test]
    fn object_inside_prose() {
        let reply = "Sure! Here it is: {\"title\":\"Buy milk\"} Hope that helps.";
        let c = extract_candidate(reply).unwrap();
        assert_eq!(c.title, "Buy milk");
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(extract_candidate(""), Err(ModelError::EmptyResponse)));
        assert!(matches!(extract_candidate("[1,2,3]"), Err(ModelError::Malformed(_))));
        assert!(matches!(extract_candidate("\"title\""), Err(ModelError::Malformed(_))));
        assert!(matches!(
            extract_candidate("I could not parse that."),
            Err(ModelError::Malformed(_))
        ));
        assert!(matches!(extract_candidate("{\"title\": "), Err(ModelError::Malformed(_))));
        assert!(matches!(extract_candidate("} oops {"), Err(ModelError::Malformed(_))));
    }

    #[test]
    fn rejects_objects_without_a_title() {
        for reply in [
            "{}",
            r#"{"error":"rate limited"}"#,
            r#"{"title":"   ","priority":"high"}"#,
            r#"{"title":null}"#,
            r#"{"title":42}"#,
        ] {
            assert!(
                matches!(extract_candidate(reply), Err(ModelError::Malformed(_))),
                "accepted {reply}"
            );
        }
    }
}
