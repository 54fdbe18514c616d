use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use chrono::Utc;
use tracing::{info, warn};

use reviewlens_ai::{ChatAnalyzer, ChatClient, TextAnalyticsAnalyzer, TextAnalyticsClient};
use reviewlens_core::{OpinionNormalizer, OpinionVocabulary, Provider, Review};
use reviewlens_engine::ComparisonEngine;
use reviewlens_store::{DuckStore, ReviewRepository, ReviewWindow};

use crate::cli::{ImportArgs, ProviderArgs, RunArgs, ShowArgs, WindowArgs};
use crate::display;
use crate::import::read_reviews;

/// Opened store and loaded vocabulary shared by every command.
pub struct Context {
    repo: ReviewRepository,
    normalizer: OpinionNormalizer,
}

impl Context {
    pub fn open(db: &Path, vocabulary: Option<&Path>) -> Result<Self> {
        let store = DuckStore::open_persistent(db)
            .with_context(|| format!("opening database {}", db.display()))?;
        let vocab = match vocabulary {
            Some(path) => {
                let vocab = OpinionVocabulary::from_json_file(path)?;
                info!(path = %path.display(), "loaded opinion vocabulary");
                vocab
            }
            None => OpinionVocabulary::default(),
        };
        Ok(Self {
            repo: ReviewRepository::new(Arc::new(store)),
            normalizer: OpinionNormalizer::new(Arc::new(vocab)),
        })
    }

    fn engine(&self, providers: &ProviderArgs) -> Result<ComparisonEngine> {
        let endpoint = required(&providers.text_analytics_endpoint, "TEXT_ANALYTICS_ENDPOINT")?;
        let key = required(&providers.text_analytics_key, "TEXT_ANALYTICS_KEY")?;
        let chat_key = required(&providers.chat_api_key, "CHAT_API_KEY")?;

        let text_analytics = TextAnalyticsAnalyzer::new(
            Arc::new(TextAnalyticsClient::new(endpoint, key)),
            Arc::new(self.repo.clone()),
            self.normalizer.clone(),
            providers.text_analytics_language.clone(),
        );
        let chat = ChatAnalyzer::new(
            Arc::new(ChatClient::new(providers.chat_base_url.clone(), chat_key)),
            providers.chat_model.clone(),
        );
        Ok(ComparisonEngine::new(
            Arc::new(text_analytics),
            Arc::new(chat),
            self.repo.clone(),
        ))
    }

    /// The requested location, or every stored one.
    async fn locations(&self, location: Option<&str>) -> Result<Vec<String>> {
        match location {
            Some(loc) => Ok(vec![loc.to_string()]),
            None => Ok(self.repo.locations().await?),
        }
    }

    async fn window_reviews(&self, location: &str, window: &WindowArgs) -> Result<Vec<Review>> {
        let window = ReviewWindow {
            max_months: window.max_months,
            max_reviews: window.max_reviews,
        };
        let reviews = self
            .repo
            .reviews_within(location, window, Utc::now().naive_utc())
            .await?;
        if reviews.is_empty() {
            warn!(location, "no dated reviews inside the window");
        }
        Ok(reviews)
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String> {
    value
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("{name} is not set"))
}

pub async fn import(ctx: &Context, args: &ImportArgs) -> Result<()> {
    let reviews = read_reviews(&args.file, args.location.as_deref())?;
    let outcome = ctx.repo.store_reviews(&reviews).await;
    println!(
        "Imported {} reviews from {} ({} failed)",
        outcome.written,
        args.file.display(),
        outcome.failed
    );
    if !outcome.is_complete() {
        warn!(failed = outcome.failed, "import was incomplete");
    }
    Ok(())
}

pub async fn analyze(ctx: &Context, args: &RunArgs) -> Result<()> {
    let engine = ctx.engine(&args.providers)?;
    for location in ctx.locations(args.location.as_deref()).await? {
        let reviews = ctx.window_reviews(&location, &args.window).await?;
        let run = engine.analyze_location(&location, &reviews).await;
        display::print_summary_card(&run.summary);
    }
    Ok(())
}

pub async fn compare(ctx: &Context, args: &RunArgs) -> Result<()> {
    let engine = ctx.engine(&args.providers)?;
    for location in ctx.locations(args.location.as_deref()).await? {
        let reviews = ctx.window_reviews(&location, &args.window).await?;
        let result = engine.compare(&location, &reviews).await;
        display::print_summary_card(&result.text_analytics_results);
        display::print_summary_card(&result.chat_results);
        display::print_comparison_card(&result);
    }
    Ok(())
}

pub async fn hybrid(ctx: &Context, args: &RunArgs) -> Result<()> {
    let engine = ctx.engine(&args.providers)?;
    for location in ctx.locations(args.location.as_deref()).await? {
        let reviews = ctx.window_reviews(&location, &args.window).await?;
        let report = engine.hybrid(&location, &reviews).await;
        display::print_summary_card(&report.summary);
        if let Some(narrative) = &report.narrative_summary.narrative {
            println!("Narrative\n  {}\n", narrative.replace('\n', "\n  "));
        }
    }
    Ok(())
}

pub async fn show(ctx: &Context, args: &ShowArgs) -> Result<()> {
    let mut shown = 0usize;
    for location in ctx.locations(args.location.as_deref()).await? {
        if let Some(comparison) = ctx.repo.comparison(&location).await? {
            display::print_comparison_card(&comparison);
            shown += 1;
        }
        for provider in [Provider::TextAnalytics, Provider::Chat] {
            if let Some(summary) = ctx.repo.summary(provider, &location).await? {
                display::print_summary_card(&summary);
                shown += 1;
            }
        }
    }
    if shown == 0 {
        println!("No stored results. Run `reviewlens analyze` or `reviewlens compare` first.");
    }
    Ok(())
}

pub async fn status(ctx: &Context) -> Result<()> {
    if !ctx.repo.has_reviews().await? {
        println!("No reviews imported.");
        return Ok(());
    }
    println!("Reviews: {}", ctx.repo.review_count().await?);
    for location in ctx.repo.locations().await? {
        let reviews = ctx.repo.reviews(Some(&location)).await?;
        let processed = reviews.iter().filter(|r| r.processed).count();
        let ta = ctx.repo.records(Provider::TextAnalytics, Some(&location)).await?.len();
        let chat = ctx.repo.records(Provider::Chat, Some(&location)).await?.len();
        println!(
            "  {:<26} {} reviews, {} processed, {} text-analytics / {} chat records",
            location,
            reviews.len(),
            processed,
            ta,
            chat
        );
    }
    Ok(())
}
