//! Prompt templates for the chat provider.

use reviewlens_core::SentimentRecord;

/// Records included in a narrative prompt.
pub const NARRATIVE_SAMPLE: usize = 10;

pub const REVIEW_SYSTEM_PROMPT: &str = "\
You are an expert sentiment analysis assistant specialising in retail store customer reviews. \
Analyse reviews and respond with structured JSON containing sentiment, confidence, reasoning, \
key points, pros and cons focused on the in-store experience.";

pub const NARRATIVE_SYSTEM_PROMPT: &str = "\
You are an expert retail analyst. Analyse customer reviews and provide concise, actionable \
insights with bold keywords for important terms.";

pub fn build_review_prompt(cleaned_text: &str) -> String {
    format!(
        "Analyze this retail store customer review and provide a structured response.\n\
         \n\
         Review: \"{cleaned_text}\"\n\
         \n\
         Please provide a JSON response with the following structure:\n\
         {{\n  \
           \"sentiment\": \"positive\", \"negative\", or \"neutral\",\n  \
           \"confidence\": 0.0-1.0,\n  \
           \"reasoning\": \"Brief explanation of why this sentiment was chosen\",\n  \
           \"keyPoints\": [\"key point 1\", \"key point 2\"],\n  \
           \"pros\": [\"positive aspect 1\", \"positive aspect 2\"],\n  \
           \"cons\": [\"negative aspect 1\", \"negative aspect 2\"]\n\
         }}\n\
         \n\
         Focus on store-specific aspects like:\n\
         - Customer service quality\n\
         - Staff knowledge and helpfulness\n\
         - Wait times and appointment availability\n\
         - Product availability and selection\n\
         - Store layout and atmosphere\n\
         - Technical support and repairs\n\
         - Overall shopping experience\n\
         \n\
         Be objective and analytical."
    )
}

/// Narrative prompt over the first [`NARRATIVE_SAMPLE`] records.
pub fn build_narrative_prompt(location: &str, records: &[SentimentRecord]) -> String {
    let reviews = records
        .iter()
        .take(NARRATIVE_SAMPLE)
        .map(|r| {
            format!(
                "Rating: {}/5\nReview: {}\nSentiment: {}",
                r.star_rating, r.review_content, r.sentiment
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Based on these customer reviews for {location}, provide a concise summary:\n\
         \n\
         {reviews}\n\
         \n\
         Please provide a brief summary (1-2 paragraphs) that includes:\n\
         1. Overall customer satisfaction and sentiment\n\
         2. Key strengths and positive aspects\n\
         3. Main concerns and areas for improvement\n\
         \n\
         Format the response with **bold keywords** for important terms like: \
         **customer service**, **staff**, **wait times**, **product availability**, \
         **store layout**, **technical support**, etc.\n\
         \n\
         Focus on store-specific insights and be concise."
    )
}
