//! Vertical card display for summaries and comparisons.

use std::fmt::Write;

use reviewlens_core::{ComparisonResult, LocationSummary};

const LABEL_WIDTH: usize = 26;

// ── Public API ──

pub fn print_summary_card(summary: &LocationSummary) {
    print!("{}", summary_card(summary));
}

pub fn print_comparison_card(result: &ComparisonResult) {
    print!("{}", comparison_card(result));
}

pub fn summary_card(s: &LocationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ({}) ===", s.location, s.provider.display_name());
    let _ = writeln!(out);

    let _ = writeln!(out, "Sentiment");
    field(&mut out, "overall", s.overall_sentiment);
    field(&mut out, "reviews", s.total_reviews);
    field(
        &mut out,
        "positive / negative / neutral",
        format!("{} / {} / {}", s.positive_count, s.negative_count, s.neutral_count),
    );
    field(&mut out, "average confidence", format!("{:.2}", s.average_confidence));
    field(&mut out, "average star rating", format!("{:.1}", s.average_star_rating));
    if let Some(avg) = &s.average_scores {
        field(
            &mut out,
            "average scores",
            format!(
                "+{:.2} -{:.2} ~{:.2}",
                avg.positive, avg.negative, avg.neutral
            ),
        );
    }
    let _ = writeln!(out);

    list(&mut out, "Top pros", &s.top_pros);
    list(&mut out, "Top cons", &s.top_cons);

    if let Some(narrative) = &s.narrative {
        let _ = writeln!(out, "Narrative");
        for line in narrative.lines() {
            let _ = writeln!(out, "  {line}");
        }
        let _ = writeln!(out);
    }
    out
}

pub fn comparison_card(r: &ComparisonResult) -> String {
    let m = &r.comparison_metrics;
    let mut out = String::new();
    let _ = writeln!(out, "=== Comparison: {} ===", r.location);
    let _ = writeln!(out);

    let _ = writeln!(out, "Agreement");
    field(&mut out, "sentiment agreement", format!("{:.1}%", m.sentiment_agreement));
    field(&mut out, "confidence difference", format!("{:.3}", m.confidence_difference));
    field(&mut out, "pros overlap", format!("{:.1}%", m.pros_overlap));
    field(&mut out, "cons overlap", format!("{:.1}%", m.cons_overlap));
    let _ = writeln!(out);

    let _ = writeln!(out, "Overall");
    field(
        &mut out,
        r.text_analytics_results.provider.display_name(),
        r.text_analytics_results.overall_sentiment,
    );
    field(&mut out, r.chat_results.provider.display_name(), r.chat_results.overall_sentiment);
    let _ = writeln!(out);

    let _ = writeln!(out, "Cost & Time");
    field(
        &mut out,
        "text analytics",
        format!(
            "{:.1} ms, ${:.4}",
            m.processing_time_text_analytics_ms, m.text_analytics_cost_estimate
        ),
    );
    field(
        &mut out,
        "chat model",
        format!("{:.1} ms, ${:.4}", m.processing_time_chat_ms, m.chat_cost_estimate),
    );
    field(&mut out, "total cost", format!("${:.4}", m.total_cost_estimate));
    let _ = writeln!(out);

    list(&mut out, "Recommendations", &m.recommendations);
    out
}

// ── Helpers ──

fn field(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {:<width$} {}", label, value, width = LABEL_WIDTH);
}

fn list(out: &mut String, header: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{header}");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
    let _ = writeln!(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewlens_core::{ComparisonMetrics, Provider, SentimentLabel};

    fn summary(provider: Provider) -> LocationSummary {
        let mut s = LocationSummary::empty("NYC", provider);
        s.overall_sentiment = SentimentLabel::Positive;
        s.total_reviews = 3;
        s.positive_count = 2;
        s.negative_count = 1;
        s.top_pros = vec!["battery life is excellent".into()];
        s
    }

    #[test]
    fn summary_card_sections() {
        let mut s = summary(Provider::Chat);
        s.narrative = Some("Customers love the **staff**.".into());
        let card = summary_card(&s);
        assert!(card.starts_with("=== NYC (Chat model) ===\n"));
        assert!(card.contains("  overall                    Positive\n"));
        assert!(card.contains("2 / 1 / 0"));
        assert!(card.contains("Top pros\n  - battery life is excellent\n"));
        assert!(!card.contains("Top cons"));
        assert!(card.contains("Narrative\n  Customers love the **staff**.\n"));
    }

    #[test]
    fn comparison_card_lists_recommendations() {
        let result = ComparisonResult::new(
            "NYC",
            summary(Provider::TextAnalytics),
            summary(Provider::Chat),
            ComparisonMetrics {
                sentiment_agreement: 80.0,
                recommendations: vec!["Consider using both models for comprehensive analysis".into()],
                ..Default::default()
            },
        );
        let card = comparison_card(&result);
        assert!(card.contains("sentiment agreement        80.0%"));
        assert!(card.contains("Text Analytics             Positive"));
        assert!(card.contains("Recommendations\n  - Consider using both models"));
    }
}
