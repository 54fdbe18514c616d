//! Adapter for the chat-completion provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use reviewlens_core::{
    LocationSummary, Provider, ProviderScores, Review, SentimentRecord, clean_text,
    summarize_records,
};

use crate::analyzer::SentimentAnalyzer;
use crate::prompts::{
    NARRATIVE_SYSTEM_PROMPT, REVIEW_SYSTEM_PROMPT, build_narrative_prompt, build_review_prompt,
};
use crate::provider::{ChatCompletion, ChatRequest};
use crate::verdict::{ChatVerdict, parse_verdict};

/// Reviews per logged batch. Reviews are still sent one at a time.
pub const BATCH_SIZE: usize = 5;

pub const NARRATIVE_FALLBACK: &str = "Unable to generate AI summary due to technical issues.";

const REVIEW_TEMPERATURE: f32 = 0.1;
const REVIEW_MAX_TOKENS: u32 = 500;
const NARRATIVE_TEMPERATURE: f32 = 0.3;
const NARRATIVE_MAX_TOKENS: u32 = 800;

pub struct ChatAnalyzer {
    client: Arc<dyn ChatCompletion>,
    model: String,
}

impl ChatAnalyzer {
    pub fn new(client: Arc<dyn ChatCompletion>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn request(&self, system: &str, user: String, temperature: f32, max_tokens: u32) -> ChatRequest {
        ChatRequest {
            system: system.to_string(),
            user,
            model: self.model.clone(),
            temperature,
            max_tokens,
        }
    }

    async fn analyze_review(&self, review: &Review) -> Option<SentimentRecord> {
        let Some(text) = clean_text(&review.content) else {
            warn!(review_id = %review.id, "skipping review with too little text");
            return None;
        };

        let request = self.request(
            REVIEW_SYSTEM_PROMPT,
            build_review_prompt(&text),
            REVIEW_TEMPERATURE,
            REVIEW_MAX_TOKENS,
        );
        let completion = match self.client.complete(&request).await {
            Ok(text) => text,
            Err(e) => {
                error!(review_id = %review.id, error = %e, "chat completion failed");
                return None;
            }
        };

        match parse_verdict(&completion) {
            ChatVerdict::Parsed(a) => Some(SentimentRecord::for_review(
                review,
                Provider::Chat,
                a.sentiment,
                a.confidence,
                ProviderScores::Chat {
                    reasoning: a.reasoning,
                    key_points: a.key_points,
                    pros: a.pros,
                    cons: a.cons,
                },
            )),
            ChatVerdict::Malformed(reason) => {
                warn!(review_id = %review.id, reason = %reason, "unusable chat verdict");
                None
            }
        }
    }

    /// One or two paragraphs synthesising the location's reviews. Falls back
    /// to [`NARRATIVE_FALLBACK`] when the provider call fails.
    pub async fn narrate(&self, location: &str, records: &[SentimentRecord]) -> String {
        let request = self.request(
            NARRATIVE_SYSTEM_PROMPT,
            build_narrative_prompt(location, records),
            NARRATIVE_TEMPERATURE,
            NARRATIVE_MAX_TOKENS,
        );
        match self.client.complete(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                error!(location, error = %e, "narrative generation failed");
                NARRATIVE_FALLBACK.to_string()
            }
        }
    }
}

#[async_trait]
impl SentimentAnalyzer for ChatAnalyzer {
    fn provider(&self) -> Provider {
        Provider::Chat
    }

    async fn analyze(&self, reviews: &[Review]) -> Vec<SentimentRecord> {
        if reviews.is_empty() {
            warn!("no reviews to analyze");
            return Vec::new();
        }
        info!(count = reviews.len(), model = %self.model, "starting chat sentiment analysis");

        let mut records = Vec::with_capacity(reviews.len());
        for (batch_no, batch) in reviews.chunks(BATCH_SIZE).enumerate() {
            for review in batch {
                if let Some(record) = self.analyze_review(review).await {
                    records.push(record);
                }
            }
            debug!(batch = batch_no, size = batch.len(), "chat batch done");
        }

        info!(analyzed = records.len(), "chat sentiment analysis complete");
        records
    }

    async fn summarize(&self, location: &str, records: &[SentimentRecord]) -> LocationSummary {
        let mut summary = summarize_records(location, Provider::Chat, records);
        if summary.is_empty() {
            warn!(location, "no chat records for location");
            return summary;
        }

        let matched: Vec<SentimentRecord> = records
            .iter()
            .filter(|r| r.location.to_lowercase() == location.to_lowercase())
            .cloned()
            .collect();
        summary.narrative = Some(self.narrate(location, &matched).await);

        info!(
            location,
            sentiment = %summary.overall_sentiment,
            total = summary.total_reviews,
            "chat summary generated"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use reviewlens_core::SentimentLabel;

    use crate::provider::ProviderError;

    /// Replays scripted completions in order and records every request.
    #[derive(Default)]
    struct ScriptedChat {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedChat {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::default(),
            })
        }
    }

    #[async_trait]
    impl ChatCompletion for ScriptedChat {
        async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyCompletion))
        }
    }

    fn verdict(sentiment: &str, confidence: f64, pros: &[&str], cons: &[&str]) -> Result<String, ProviderError> {
        Ok(serde_json::json!({
            "sentiment": sentiment,
            "confidence": confidence,
            "reasoning": "because",
            "keyPoints": ["k"],
            "pros": pros,
            "cons": cons,
        })
        .to_string())
    }

    fn reviews(texts: &[&str]) -> Vec<Review> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Review::new(&format!("r{i}"), "NYC", 5, t))
            .collect()
    }

    #[tokio::test]
    async fn analyzes_each_review_with_low_temperature() {
        let chat = ScriptedChat::new(vec![
            verdict("positive", 0.9, &["Helpful staff"], &[]),
            Ok(format!("```json\n{}\n```", verdict("negative", 0.7, &[], &["Long wait"]).unwrap())),
        ]);
        let a = ChatAnalyzer::new(chat.clone(), "gpt-test");
        let records = a
            .analyze(&reviews(&["Helpful staff all round", "Waited an hour, awful"]))
            .await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sentiment, SentimentLabel::Positive);
        assert_eq!(records[0].pros(), ["Helpful staff".to_string()]);
        assert_eq!(records[1].sentiment, SentimentLabel::Negative);
        assert_eq!(records[1].confidence, 0.7);

        let requests = chat.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].model, "gpt-test");
        assert_eq!(requests[0].temperature, REVIEW_TEMPERATURE);
        assert_eq!(requests[0].max_tokens, REVIEW_MAX_TOKENS);
        assert!(requests[0].user.contains("Helpful staff all round"));
    }

    #[tokio::test]
    async fn malformed_and_failed_reviews_are_skipped() {
        let chat = ScriptedChat::new(vec![
            Ok("I would say positive overall.".into()),
            Err(ProviderError::Server {
                status: 429,
                body: "rate limited".into(),
            }),
            verdict("neutral", 0.5, &[], &[]),
            verdict("positive", 1.7, &[], &[]),
        ]);
        let a = ChatAnalyzer::new(chat.clone(), "gpt-test");
        let records = a
            .analyze(&reviews(&[
                "First review text",
                "Second review text",
                "short",
                "Third review text",
                "Fourth review text",
            ]))
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].review_id, "r3");
        assert_eq!(records[0].sentiment, SentimentLabel::Neutral);
        // The short review never reached the provider.
        assert_eq!(chat.requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn summary_carries_narrative() {
        let chat = ScriptedChat::new(vec![
            verdict("positive", 0.9, &["Friendly staff"], &[]),
            verdict("positive", 0.8, &["friendly staff", "Clean"], &["Crowded"]),
            Ok("  Customers praise the **staff**.  ".into()),
        ]);
        let a = ChatAnalyzer::new(chat.clone(), "gpt-test");
        let records = a.analyze(&reviews(&["Lovely people here", "Clean but crowded store"])).await;
        let summary = a.summarize("NYC", &records).await;

        assert_eq!(summary.overall_sentiment, SentimentLabel::Positive);
        assert_eq!(summary.top_pros, vec!["Friendly staff", "Clean"]);
        assert_eq!(summary.top_cons, vec!["Crowded"]);
        assert_eq!(summary.narrative.as_deref(), Some("Customers praise the **staff**."));

        let requests = chat.requests.lock().unwrap();
        let narrative = &requests[2];
        assert_eq!(narrative.temperature, NARRATIVE_TEMPERATURE);
        assert_eq!(narrative.max_tokens, NARRATIVE_MAX_TOKENS);
        assert!(narrative.user.contains("Rating: 5/5\nReview: Lovely people here\nSentiment: Positive"));
    }

    #[tokio::test]
    async fn narrative_failure_uses_fallback() {
        let chat = ScriptedChat::new(vec![verdict("negative", 0.9, &[], &["Rude"])]);
        let a = ChatAnalyzer::new(chat, "gpt-test");
        let records = a.analyze(&reviews(&["Rude and dismissive"])).await;
        let summary = a.summarize("NYC", &records).await;
        assert_eq!(summary.narrative.as_deref(), Some(NARRATIVE_FALLBACK));
    }

    #[tokio::test]
    async fn empty_summary_skips_narration() {
        let chat = ScriptedChat::new(vec![]);
        let a = ChatAnalyzer::new(chat.clone(), "gpt-test");
        let summary = a.summarize("NYC", &[]).await;
        assert!(summary.narrative.is_none());
        assert!(chat.requests.lock().unwrap().is_empty());
    }
}
