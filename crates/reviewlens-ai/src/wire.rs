//! Request and response bodies for the hosted providers, and their
//! translation into the provider contract types.

use serde::{Deserialize, Serialize};
use tracing::warn;

use reviewlens_core::SentimentLabel;

use crate::provider::{
    Assessment, ChatRequest, DocumentOutcome, DocumentSentiment, Opinion, ScoreTriple,
    TextDocument, document_label,
};

// ── Text analytics (v3.1 sentiment) ──

#[derive(Debug, Serialize)]
pub struct SentimentRequest<'a> {
    pub documents: Vec<RequestDocument<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RequestDocument<'a> {
    pub id: &'a str,
    pub language: &'a str,
    pub text: &'a str,
}

impl<'a> SentimentRequest<'a> {
    pub fn new(documents: &'a [TextDocument]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|d| RequestDocument {
                    id: &d.id,
                    language: &d.language,
                    text: &d.text,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SentimentResponse {
    #[serde(default)]
    pub documents: Vec<WireDocument>,
    #[serde(default)]
    pub errors: Vec<WireDocumentError>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct WireScores {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
    #[serde(default)]
    pub neutral: f64,
}

impl From<WireScores> for ScoreTriple {
    fn from(s: WireScores) -> Self {
        Self {
            positive: s.positive,
            negative: s.negative,
            neutral: s.neutral,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    pub id: String,
    pub sentiment: String,
    pub confidence_scores: WireScores,
    #[serde(default)]
    pub sentences: Vec<WireSentence>,
}

#[derive(Debug, Deserialize)]
pub struct WireSentence {
    #[serde(default)]
    pub targets: Vec<WireTarget>,
    #[serde(default)]
    pub assessments: Vec<WireAssessment>,
}

#[derive(Debug, Deserialize)]
pub struct WireTarget {
    pub text: String,
    #[serde(default)]
    pub relations: Vec<WireRelation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRelation {
    #[serde(default)]
    pub relation_type: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAssessment {
    pub text: String,
    pub sentiment: String,
    #[serde(default)]
    pub confidence_scores: WireScores,
}

#[derive(Debug, Deserialize)]
pub struct WireDocumentError {
    pub id: String,
    pub error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct WireErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Parse `#/documents/{d}/sentences/{s}/assessments/{a}` into `(s, a)`.
pub fn parse_assessment_ref(reference: &str) -> Option<(usize, usize)> {
    let parts: Vec<&str> = reference.trim_start_matches("#/").split('/').collect();
    match parts.as_slice() {
        ["documents", _, "sentences", s, "assessments", a] => Some((s.parse().ok()?, a.parse().ok()?)),
        _ => None,
    }
}

fn opinions_of(doc: &WireDocument) -> Vec<Opinion> {
    let mut out = Vec::new();
    for sentence in &doc.sentences {
        for target in &sentence.targets {
            let assessments = target
                .relations
                .iter()
                .filter(|r| r.relation_type.is_empty() || r.relation_type == "assessment")
                .filter_map(|r| {
                    let (s, a) = parse_assessment_ref(&r.reference)?;
                    doc.sentences.get(s)?.assessments.get(a)
                })
                .map(|wa| Assessment {
                    text: wa.text.clone(),
                    label: document_label(&wa.sentiment).unwrap_or(SentimentLabel::Neutral),
                    scores: wa.confidence_scores.into(),
                })
                .collect();
            out.push(Opinion {
                target: target.text.clone(),
                assessments,
            });
        }
    }
    out
}

impl SentimentResponse {
    pub fn into_outcomes(self, opinion_mining: bool) -> Vec<DocumentOutcome> {
        let mut out = Vec::with_capacity(self.documents.len() + self.errors.len());
        for doc in self.documents {
            let Some(label) = document_label(&doc.sentiment) else {
                warn!(id = %doc.id, sentiment = %doc.sentiment, "unrecognised document sentiment");
                out.push(DocumentOutcome::Failed {
                    message: format!("unrecognised sentiment {:?}", doc.sentiment),
                    id: doc.id,
                });
                continue;
            };
            let opinions = if opinion_mining {
                opinions_of(&doc)
            } else {
                Vec::new()
            };
            out.push(DocumentOutcome::Analyzed(DocumentSentiment {
                id: doc.id,
                label,
                scores: doc.confidence_scores.into(),
                opinions,
            }));
        }
        for err in self.errors {
            out.push(DocumentOutcome::Failed {
                id: err.id,
                message: format!("{}: {}", err.error.code, err.error.message),
            });
        }
        out
    }
}

// ── Chat completions ──

#[derive(Debug, Serialize)]
pub struct ChatBody<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 2],
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatBody<'a> {
    pub fn new(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if it has any.
    pub fn first_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r##"{
      "documents": [
        {
          "id": "r1",
          "sentiment": "mixed",
          "confidenceScores": {"positive": 0.45, "neutral": 0.1, "negative": 0.45},
          "sentences": [
            {
              "sentiment": "positive",
              "confidenceScores": {"positive": 0.9, "neutral": 0.05, "negative": 0.05},
              "text": "The staff were friendly.",
              "targets": [
                {
                  "sentiment": "positive",
                  "confidenceScores": {"positive": 0.99, "negative": 0.01},
                  "text": "staff",
                  "relations": [
                    {"relationType": "assessment", "ref": "#/documents/0/sentences/0/assessments/0"}
                  ]
                }
              ],
              "assessments": [
                {"sentiment": "positive", "confidenceScores": {"positive": 0.99, "negative": 0.01}, "text": "friendly", "isNegated": false}
              ]
            },
            {
              "sentiment": "negative",
              "confidenceScores": {"positive": 0.0, "neutral": 0.1, "negative": 0.9},
              "text": "The wait was long.",
              "targets": [
                {
                  "text": "wait",
                  "relations": [
                    {"relationType": "assessment", "ref": "#/documents/0/sentences/1/assessments/0"},
                    {"relationType": "assessment", "ref": "#/documents/0/sentences/9/assessments/0"}
                  ]
                }
              ],
              "assessments": [
                {"sentiment": "negative", "confidenceScores": {"positive": 0.02, "negative": 0.98}, "text": "long"}
              ]
            }
          ],
          "warnings": []
        }
      ],
      "errors": [
        {"id": "r2", "error": {"code": "InvalidArgument", "message": "Document text is empty."}}
      ],
      "modelVersion": "2022-11-01"
    }"##;

    #[test]
    fn parses_assessment_refs() {
        assert_eq!(
            parse_assessment_ref("#/documents/0/sentences/1/assessments/2"),
            Some((1, 2))
        );
        assert_eq!(parse_assessment_ref("#/documents/0/sentences/x/assessments/2"), None);
        assert_eq!(parse_assessment_ref("#/documents/0/sentences/1"), None);
    }

    #[test]
    fn decodes_documents_opinions_and_errors() {
        let resp: SentimentResponse = serde_json::from_str(RESPONSE).unwrap();
        let outcomes = resp.into_outcomes(true);
        assert_eq!(outcomes.len(), 2);

        let DocumentOutcome::Analyzed(doc) = &outcomes[0] else {
            panic!("expected analyzed document");
        };
        assert_eq!(doc.label, SentimentLabel::Neutral);
        assert_eq!(doc.scores.positive, 0.45);
        assert_eq!(doc.opinions.len(), 2);
        assert_eq!(doc.opinions[0].target, "staff");
        assert_eq!(doc.opinions[0].assessments[0].text, "friendly");
        assert_eq!(doc.opinions[0].assessments[0].label, SentimentLabel::Positive);
        // Dangling reference is dropped.
        assert_eq!(doc.opinions[1].assessments.len(), 1);
        assert_eq!(doc.opinions[1].assessments[0].scores.negative, 0.98);

        assert!(matches!(
            &outcomes[1],
            DocumentOutcome::Failed { id, message } if id == "r2" && message.contains("empty")
        ));
    }

    #[test]
    fn opinions_skipped_without_mining() {
        let resp: SentimentResponse = serde_json::from_str(RESPONSE).unwrap();
        let DocumentOutcome::Analyzed(doc) = &resp.into_outcomes(false)[0] else {
            panic!("expected analyzed document");
        };
        assert!(doc.opinions.is_empty());
    }

    #[test]
    fn chat_body_shape() {
        let req = ChatRequest {
            system: "sys".into(),
            user: "hello".into(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.1,
            max_tokens: 500,
        };
        let value = serde_json::to_value(ChatBody::new(&req)).unwrap();
        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert_eq!(value["max_tokens"], 500);
    }

    #[test]
    fn chat_response_first_text() {
        let resp: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#)
                .unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("hi"));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.first_text(), None);
    }
}
