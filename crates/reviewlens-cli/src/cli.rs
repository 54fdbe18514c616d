use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "reviewlens",
    version,
    about = "Compare customer-review sentiment across two analysis providers"
)]
pub struct Cli {
    /// DuckDB database file holding reviews and results.
    #[arg(long, env = "REVIEWLENS_DB", default_value = "reviewlens.duckdb", global = true)]
    pub db: PathBuf,

    /// JSON file overriding the built-in opinion vocabulary.
    #[arg(long, env = "REVIEWLENS_VOCABULARY", global = true)]
    pub vocabulary: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load reviews from a CSV export, a JSON array or a JSON-lines file.
    Import(ImportArgs),
    /// Analyze reviews with the text-analytics provider only.
    Analyze(RunArgs),
    /// Run both providers and compare their results.
    Compare(RunArgs),
    /// Text-analytics labels with a chat-written narrative.
    Hybrid(RunArgs),
    /// Print stored summaries and comparisons.
    Show(ShowArgs),
    /// Print review and result counts.
    Status,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    pub file: PathBuf,

    /// Location for reviews that carry none. Defaults to the file name with
    /// any `Apple-` prefix removed.
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Location to analyze. Every stored location when omitted.
    #[arg(long)]
    pub location: Option<String>,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub providers: ProviderArgs,
}

#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    #[arg(long, default_value_t = 12)]
    pub max_months: u32,

    #[arg(long, default_value_t = 1000)]
    pub max_reviews: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    #[arg(long, env = "TEXT_ANALYTICS_ENDPOINT")]
    pub text_analytics_endpoint: Option<String>,

    #[arg(long, env = "TEXT_ANALYTICS_KEY", hide_env_values = true)]
    pub text_analytics_key: Option<String>,

    #[arg(long, env = "TEXT_ANALYTICS_LANGUAGE", default_value = "en")]
    pub text_analytics_language: String,

    #[arg(long, env = "CHAT_API_KEY", hide_env_values = true)]
    pub chat_api_key: Option<String>,

    #[arg(long, env = "CHAT_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub chat_base_url: String,

    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-3.5-turbo")]
    pub chat_model: String,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Location to show. Every stored location when omitted.
    #[arg(long)]
    pub location: Option<String>,
}
