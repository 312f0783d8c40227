// Turns simplified question descriptors into Forms batchUpdate requests.
//
// This is a pure transform: no I/O, no logging of its own. Descriptors with an
// unsupported kind are reported to the caller-supplied sink and dropped; the
// surviving requests keep the ORIGINAL input index as their location, so
// skipped slots are not renumbered.

use super::forms_models::{
    BatchRequest, ChoiceOption, ChoiceQuestion, ChoiceType, CreateItemRequest, DateQuestion,
    EmptyAnswer, Item, Location, Question, QuestionDescriptor, QuestionItem, QuestionKind,
    QuestionPayload, ScaleQuestion,
};

/// A descriptor the builder dropped because its kind isn't supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedQuestion {
    pub index: usize,
    pub kind: String,
    pub title: String,
}

/// Builds one request per supported descriptor, in input order.
///
/// `on_skip` is called once for every descriptor that produces no request.
pub fn build_question_requests<F>(
    questions: &[QuestionDescriptor],
    mut on_skip: F,
) -> Vec<BatchRequest>
where
    F: FnMut(&SkippedQuestion),
{
    let mut requests = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let Some(payload) = build_payload(&question.kind) else {
            on_skip(&SkippedQuestion {
                index,
                kind: question.kind.tag().to_string(),
                title: question.title.clone(),
            });
            continue;
        };

        requests.push(BatchRequest {
            create_item: CreateItemRequest {
                item: Item {
                    title: question.title.clone(),
                    description: question.description.clone(),
                    question_item: QuestionItem {
                        question: Question {
                            required: question.required,
                            payload,
                        },
                    },
                },
                location: Location { index },
            },
        });
    }

    requests
}

fn build_payload(kind: &QuestionKind) -> Option<QuestionPayload> {
    let payload = match kind {
        QuestionKind::Text => QuestionPayload::TextQuestion(EmptyAnswer::default()),
        QuestionKind::MultipleChoice { options } => {
            QuestionPayload::ChoiceQuestion(choice(ChoiceType::Radio, options))
        }
        QuestionKind::Checkbox { options } => {
            QuestionPayload::ChoiceQuestion(choice(ChoiceType::Checkbox, options))
        }
        QuestionKind::Scale { min, max, labels } => {
            // Labels are keyed by the stringified bound ("1" -> "Low").
            let label_for = |bound: &Option<i64>| {
                bound.and_then(|b| labels.get(&b.to_string()).cloned())
            };
            QuestionPayload::ScaleQuestion(ScaleQuestion {
                low: *min,
                high: *max,
                low_label: label_for(min),
                high_label: label_for(max),
            })
        }
        QuestionKind::Date {
            include_time,
            include_year,
        } => QuestionPayload::DateQuestion(DateQuestion {
            include_time: *include_time,
            include_year: *include_year,
        }),
        QuestionKind::Time => QuestionPayload::TimeQuestion(EmptyAnswer::default()),
        QuestionKind::Unsupported(_) => return None,
    };

    Some(payload)
}

fn choice(choice_type: ChoiceType, options: &[String]) -> ChoiceQuestion {
    ChoiceQuestion {
        choice_type,
        options: options
            .iter()
            .map(|value| ChoiceOption {
                value: value.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn question(kind: QuestionKind, title: &str) -> QuestionDescriptor {
        QuestionDescriptor {
            kind,
            title: title.to_string(),
            description: None,
            required: false,
        }
    }

    fn build(questions: &[QuestionDescriptor]) -> (Vec<BatchRequest>, Vec<SkippedQuestion>) {
        let mut skipped = Vec::new();
        let requests = build_question_requests(questions, |s| skipped.push(s.clone()));
        (requests, skipped)
    }

    fn payload(request: &BatchRequest) -> &QuestionPayload {
        &request.create_item.item.question_item.question.payload
    }

    #[test]
    fn empty_input_yields_no_requests() {
        let (requests, skipped) = build(&[]);
        assert!(requests.is_empty());
        assert!(skipped.is_empty());
    }

    #[test]
    fn unsupported_kind_is_skipped_without_renumbering() {
        let questions = vec![
            question(QuestionKind::Text, "Name"),
            question(QuestionKind::Unsupported("UNKNOWN_KIND".into()), "Grid"),
            question(
                QuestionKind::Checkbox {
                    options: vec!["a".into()],
                },
                "Pick",
            ),
        ];

        let (requests, skipped) = build(&questions);

        let positions: Vec<usize> = requests.iter().map(|r| r.create_item.position()).collect();
        assert_eq!(positions, vec![0, 2]);
        assert_eq!(
            skipped,
            vec![SkippedQuestion {
                index: 1,
                kind: "UNKNOWN_KIND".to_string(),
                title: "Grid".to_string(),
            }]
        );
    }

    #[test]
    fn output_count_matches_supported_descriptors() {
        let questions = vec![
            question(QuestionKind::Unsupported("A".into()), "a"),
            question(QuestionKind::Time, "t"),
            question(QuestionKind::Unsupported("B".into()), "b"),
            question(QuestionKind::Text, "x"),
            question(QuestionKind::Unsupported("C".into()), "c"),
        ];

        let (requests, skipped) = build(&questions);
        assert_eq!(requests.len(), 2);
        assert_eq!(skipped.len(), 3);
        assert_eq!(requests[0].create_item.position(), 1);
        assert_eq!(requests[1].create_item.position(), 3);
    }

    #[test]
    fn choice_options_keep_their_order() {
        let options = vec!["zebra".to_string(), "apple".to_string(), "mango".to_string()];
        let questions = vec![
            question(
                QuestionKind::MultipleChoice {
                    options: options.clone(),
                },
                "Radio",
            ),
            question(
                QuestionKind::Checkbox {
                    options: options.clone(),
                },
                "Boxes",
            ),
        ];

        let (requests, _) = build(&questions);

        let expected = [ChoiceType::Radio, ChoiceType::Checkbox];
        for (request, expected_type) in requests.iter().zip(expected) {
            match payload(request) {
                QuestionPayload::ChoiceQuestion(choice) => {
                    assert_eq!(choice.choice_type, expected_type);
                    let values: Vec<&str> =
                        choice.options.iter().map(|o| o.value.as_str()).collect();
                    assert_eq!(values, vec!["zebra", "apple", "mango"]);
                }
                other => panic!("expected choice question, got {:?}", other),
            }
        }
    }

    #[test]
    fn missing_options_degrade_to_empty_list() {
        let q: QuestionDescriptor =
            serde_json::from_value(json!({ "type": "MULTIPLE_CHOICE_QUESTION", "title": "?" }))
                .unwrap();
        let (requests, skipped) = build(&[q]);

        assert!(skipped.is_empty());
        match payload(&requests[0]) {
            QuestionPayload::ChoiceQuestion(choice) => assert!(choice.options.is_empty()),
            other => panic!("expected choice question, got {:?}", other),
        }
    }

    #[test]
    fn scale_labels_are_looked_up_by_bound() {
        let labels = HashMap::from([
            ("1".to_string(), "Low".to_string()),
            ("5".to_string(), "High".to_string()),
        ]);
        let (requests, _) = build(&[question(
            QuestionKind::Scale {
                min: Some(1),
                max: Some(5),
                labels,
            },
            "Rate us",
        )]);

        assert_eq!(
            payload(&requests[0]),
            &QuestionPayload::ScaleQuestion(ScaleQuestion {
                low: Some(1),
                high: Some(5),
                low_label: Some("Low".to_string()),
                high_label: Some("High".to_string()),
            })
        );
    }

    #[test]
    fn scale_without_labels_omits_label_fields() {
        let (requests, _) = build(&[question(
            QuestionKind::Scale {
                min: Some(0),
                max: Some(10),
                labels: HashMap::new(),
            },
            "NPS",
        )]);

        let value = serde_json::to_value(&requests[0]).unwrap();
        assert_eq!(
            value["createItem"]["item"]["questionItem"]["question"]["scaleQuestion"],
            json!({ "low": 0, "high": 10 })
        );
    }

    #[test]
    fn date_defaults_to_year_without_time() {
        let q: QuestionDescriptor =
            serde_json::from_value(json!({ "type": "DATE_QUESTION", "title": "Birthday" }))
                .unwrap();
        let (requests, _) = build(&[q]);

        assert_eq!(
            payload(&requests[0]),
            &QuestionPayload::DateQuestion(DateQuestion {
                include_time: false,
                include_year: true,
            })
        );
    }

    #[test]
    fn common_fields_are_copied() {
        let q = QuestionDescriptor {
            kind: QuestionKind::Time,
            title: "Arrival".to_string(),
            description: Some("Local time".to_string()),
            required: true,
        };
        let (requests, _) = build(&[q]);

        let value = serde_json::to_value(&requests[0]).unwrap();
        assert_eq!(
            value,
            json!({
                "createItem": {
                    "item": {
                        "title": "Arrival",
                        "description": "Local time",
                        "questionItem": {
                            "question": { "required": true, "timeQuestion": {} }
                        }
                    },
                    "location": { "index": 0 }
                }
            })
        );
    }
}
