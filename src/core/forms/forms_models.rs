// Domain types for the Forms tools.
//
// Two families live here:
// - Question descriptors (what callers send) and the `createItem` requests
//   they turn into. The request structs serialize straight into the
//   batchUpdate body, so their serde attributes ARE the wire format.
// - Plain models for forms and responses coming back from the API. These
//   carry no HTTP types; the infra layer maps its own API structs into them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// QUESTION DESCRIPTORS (input)
// ============================================================================

/// A simplified question as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct QuestionDescriptor {
    pub kind: QuestionKind,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
}

/// One variant per supported question kind, each carrying only its own fields.
///
/// Anything the decoder doesn't recognise lands in `Unsupported` with the raw
/// tag, so a bad entry never fails the whole list.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    Text,
    MultipleChoice {
        options: Vec<String>,
    },
    Scale {
        min: Option<i64>,
        max: Option<i64>,
        labels: HashMap<String, String>,
    },
    Checkbox {
        options: Vec<String>,
    },
    Date {
        include_time: bool,
        include_year: bool,
    },
    Time,
    Unsupported(String),
}

impl QuestionKind {
    /// Canonical tag name, or the raw tag for unsupported kinds.
    pub fn tag(&self) -> &str {
        match self {
            QuestionKind::Text => "TEXT_QUESTION",
            QuestionKind::MultipleChoice { .. } => "MULTIPLE_CHOICE_QUESTION",
            QuestionKind::Scale { .. } => "SCALE_QUESTION",
            QuestionKind::Checkbox { .. } => "CHECKBOX_QUESTION",
            QuestionKind::Date { .. } => "DATE_QUESTION",
            QuestionKind::Time => "TIME_QUESTION",
            QuestionKind::Unsupported(raw) => raw,
        }
    }
}

/// Loose wire shape of a descriptor. Every field is optional and a field of
/// the wrong JSON type reads as absent, so one bad entry can't fail the list.
#[derive(Debug, Default, Deserialize)]
struct RawQuestion {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    required: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    options: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    scale_min: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    scale_max: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    scale_labels: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "lenient")]
    include_time: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    include_year: Option<bool>,
}

/// Reads any JSON value and keeps it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Non-object entries decode to an empty descriptor, which is unsupported.
impl From<Value> for QuestionDescriptor {
    fn from(value: Value) -> Self {
        RawQuestion::deserialize(value).unwrap_or_default().into()
    }
}

impl From<RawQuestion> for QuestionDescriptor {
    fn from(raw: RawQuestion) -> Self {
        let tag = match raw.kind {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(tag)) => tag,
            Some(other) => other.to_string(),
        };
        let kind = match tag.as_str() {
            "TEXT_QUESTION" | "TEXT" => QuestionKind::Text,
            "MULTIPLE_CHOICE_QUESTION" | "MULTIPLE_CHOICE" => QuestionKind::MultipleChoice {
                options: raw.options.unwrap_or_default(),
            },
            "SCALE_QUESTION" | "SCALE" => QuestionKind::Scale {
                min: raw.scale_min,
                max: raw.scale_max,
                labels: raw.scale_labels.unwrap_or_default(),
            },
            "CHECKBOX_QUESTION" | "CHECKBOX" => QuestionKind::Checkbox {
                options: raw.options.unwrap_or_default(),
            },
            "DATE_QUESTION" | "DATE" => QuestionKind::Date {
                include_time: raw.include_time.unwrap_or(false),
                include_year: raw.include_year.unwrap_or(true),
            },
            "TIME_QUESTION" | "TIME" => QuestionKind::Time,
            _ => QuestionKind::Unsupported(tag),
        };

        Self {
            kind,
            title: raw.title.unwrap_or_default(),
            description: raw.description,
            required: raw.required.unwrap_or(false),
        }
    }
}

// ============================================================================
// BATCH UPDATE REQUESTS (output)
// ============================================================================

/// One entry of a batchUpdate `requests` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub create_item: CreateItemRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateItemRequest {
    pub item: Item,
    pub location: Location,
}

/// Where the remote service should insert the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub question_item: QuestionItem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionItem {
    pub question: Question,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub required: bool,
    #[serde(flatten)]
    pub payload: QuestionPayload,
}

/// The oneOf part of a question. Externally tagged, so each variant shows up
/// as a sibling key of `required` (e.g. `"textQuestion": {}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionPayload {
    TextQuestion(EmptyAnswer),
    ChoiceQuestion(ChoiceQuestion),
    ScaleQuestion(ScaleQuestion),
    DateQuestion(DateQuestion),
    TimeQuestion(EmptyAnswer),
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmptyAnswer {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChoiceType {
    Radio,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceQuestion {
    #[serde(rename = "type")]
    pub choice_type: ChoiceType,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleQuestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateQuestion {
    pub include_time: bool,
    pub include_year: bool,
}

impl CreateItemRequest {
    /// The insertion index.
    pub fn position(&self) -> usize {
        self.location.index
    }
}

// ============================================================================
// FORMS API DOMAIN MODELS
// ============================================================================

/// Form metadata sent on creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
}

/// A form as returned by the API, trimmed to what the summaries use.
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub form_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub document_title: Option<String>,
    pub responder_uri: Option<String>,
    pub items: Vec<FormItem>,
}

#[derive(Debug, Clone, Default)]
pub struct FormItem {
    pub title: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishSettings {
    pub publish_as_template: bool,
    pub require_authentication: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FormResponse {
    pub response_id: Option<String>,
    pub create_time: Option<String>,
    pub last_submitted_time: Option<String>,
    /// Sorted by question id.
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Default)]
pub struct Answer {
    pub question_id: String,
    pub text_answers: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResponsePage {
    pub responses: Vec<FormResponse>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_defaults_are_applied() {
        let q: QuestionDescriptor = serde_json::from_value(json!({
            "type": "DATE_QUESTION",
            "title": "When?"
        }))
        .unwrap();

        assert_eq!(q.title, "When?");
        assert!(!q.required);
        assert_eq!(q.description, None);
        assert_eq!(
            q.kind,
            QuestionKind::Date {
                include_time: false,
                include_year: true
            }
        );
    }

    #[test]
    fn unknown_or_missing_tag_is_unsupported() {
        let unknown: QuestionDescriptor =
            serde_json::from_value(json!({ "type": "GRID_QUESTION", "title": "x" })).unwrap();
        assert_eq!(
            unknown.kind,
            QuestionKind::Unsupported("GRID_QUESTION".to_string())
        );

        let missing: QuestionDescriptor = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(missing.kind, QuestionKind::Unsupported(String::new()));
    }

    #[test]
    fn non_string_tag_is_unsupported() {
        let questions: Vec<QuestionDescriptor> = serde_json::from_value(json!([
            { "type": "TEXT_QUESTION", "title": "Name" },
            { "type": 7, "title": "Seven" }
        ]))
        .unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].kind, QuestionKind::Text);
        assert_eq!(questions[1].kind, QuestionKind::Unsupported("7".to_string()));
        assert_eq!(questions[1].title, "Seven");
    }

    #[test]
    fn badly_typed_field_on_unsupported_entry_keeps_the_list() {
        let questions: Vec<QuestionDescriptor> = serde_json::from_value(json!([
            { "type": "TEXT_QUESTION", "title": "Name" },
            { "type": "GRID_QUESTION", "title": "Grid", "options": { "rows": ["x"] } }
        ]))
        .unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(
            questions[1].kind,
            QuestionKind::Unsupported("GRID_QUESTION".to_string())
        );
    }

    #[test]
    fn badly_typed_unused_field_is_ignored() {
        let questions: Vec<QuestionDescriptor> = serde_json::from_value(json!([
            { "type": "TEXT_QUESTION", "title": "Name", "scale_min": "1", "required": "yes" }
        ]))
        .unwrap();

        assert_eq!(questions[0].kind, QuestionKind::Text);
        assert_eq!(questions[0].title, "Name");
        assert!(!questions[0].required);
    }

    #[test]
    fn badly_typed_used_field_falls_back_to_default() {
        let q: QuestionDescriptor = serde_json::from_value(json!({
            "type": "SCALE_QUESTION",
            "title": "Rate",
            "scale_min": "1",
            "scale_max": 5,
            "scale_labels": ["Low"]
        }))
        .unwrap();

        assert_eq!(
            q.kind,
            QuestionKind::Scale {
                min: None,
                max: Some(5),
                labels: HashMap::new(),
            }
        );
    }

    #[test]
    fn non_object_entry_is_unsupported() {
        let questions: Vec<QuestionDescriptor> =
            serde_json::from_value(json!(["TEXT_QUESTION", null])).unwrap();

        assert_eq!(questions.len(), 2);
        assert!(questions
            .iter()
            .all(|q| q.kind == QuestionKind::Unsupported(String::new())));
    }

    #[test]
    fn questions_must_be_a_list() {
        let result: Result<Vec<QuestionDescriptor>, _> =
            serde_json::from_value(json!({ "type": "TEXT_QUESTION" }));
        assert!(result.is_err());
    }

    #[test]
    fn short_aliases_are_accepted() {
        let q: QuestionDescriptor = serde_json::from_value(json!({
            "type": "CHECKBOX",
            "title": "Pick",
            "options": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(q.kind.tag(), "CHECKBOX_QUESTION");
    }

    #[test]
    fn text_question_serializes_to_api_shape() {
        let request = BatchRequest {
            create_item: CreateItemRequest {
                item: Item {
                    title: "Name".to_string(),
                    description: None,
                    question_item: QuestionItem {
                        question: Question {
                            required: true,
                            payload: QuestionPayload::TextQuestion(EmptyAnswer::default()),
                        },
                    },
                },
                location: Location { index: 3 },
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "createItem": {
                    "item": {
                        "title": "Name",
                        "questionItem": {
                            "question": { "required": true, "textQuestion": {} }
                        }
                    },
                    "location": { "index": 3 }
                }
            })
        );
    }

    #[test]
    fn choice_type_uses_api_enum_names() {
        assert_eq!(serde_json::to_value(ChoiceType::Radio).unwrap(), json!("RADIO"));
        assert_eq!(
            serde_json::to_value(ChoiceType::Checkbox).unwrap(),
            json!("CHECKBOX")
        );
    }
}
