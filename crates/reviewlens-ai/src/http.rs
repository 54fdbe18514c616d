//! HTTP clients for the hosted text-analytics and chat-completion services.

use async_trait::async_trait;
use tracing::debug;

use crate::provider::{
    ChatCompletion, ChatRequest, DocumentOutcome, ProviderError, TextAnalytics, TextDocument,
};
use crate::wire::{ChatBody, ChatResponse, SentimentRequest, SentimentResponse};

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Server {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Client for the v3.1 text-analytics sentiment endpoint.
pub struct TextAnalyticsClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
}

impl TextAnalyticsClient {
    /// `endpoint` is the resource root, e.g. `https://myres.cognitiveservices.azure.com`.
    pub fn new(endpoint: String, key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
        }
    }

    pub fn sentiment_url(&self, opinion_mining: bool) -> String {
        let mut url = format!("{}/text/analytics/v3.1/sentiment", self.endpoint);
        if opinion_mining {
            url.push_str("?opinionMining=true");
        }
        url
    }
}

#[async_trait]
impl TextAnalytics for TextAnalyticsClient {
    async fn analyze_sentiment(
        &self,
        documents: &[TextDocument],
        opinion_mining: bool,
    ) -> Result<Vec<DocumentOutcome>, ProviderError> {
        let url = self.sentiment_url(opinion_mining);
        debug!(url = %url, count = documents.len(), "requesting sentiment");
        let resp = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&SentimentRequest::new(documents))
            .send()
            .await?;
        let body: SentimentResponse = check(resp).await?.json().await?;
        Ok(body.into_outcomes(opinion_mining))
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ChatClient {
    /// `base_url` should be like `https://api.openai.com/v1`.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let url = self.completions_url();
        debug!(url = %url, model = %request.model, "requesting completion");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatBody::new(request))
            .send()
            .await?;
        let body: ChatResponse = check(resp).await?.json().await?;
        let text = body.first_text().ok_or(ProviderError::EmptyCompletion)?;
        debug!(model = %request.model, chars = text.len(), "completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_analytics_url_trims_trailing_slash() {
        let client = TextAnalyticsClient::new("https://res.example.com/".into(), "k".into());
        assert_eq!(
            client.sentiment_url(false),
            "https://res.example.com/text/analytics/v3.1/sentiment"
        );
        assert_eq!(
            client.sentiment_url(true),
            "https://res.example.com/text/analytics/v3.1/sentiment?opinionMining=true"
        );
    }

    #[test]
    fn chat_url_trims_trailing_slash() {
        let client = ChatClient::new("https://api.openai.com/v1/".into(), "k".into());
        assert_eq!(client.completions_url(), "https://api.openai.com/v1/chat/completions");
    }
}
