//! Prompt assembly for the research commands and free-text chat.
//!
//! Every function is pure: templates are fixed text, the caller supplies the
//! user's argument and whatever history it wants the model to see.

use researchbot_core::ConversationEntry;

/// `!research <topic>`
pub fn research(topic: &str) -> String {
    format!(
        "You are a deep research assistant. Conduct thorough research on: {topic}\n\
         \n\
         Provide a comprehensive analysis including:\n\
         1. Key findings and insights\n\
         2. Current trends and developments\n\
         3. Important statistics or data points\n\
         4. Expert opinions or notable quotes\n\
         5. Future implications or predictions\n\
         6. Reliable sources and references\n\
         \n\
         Format your response in a clear, structured manner with bullet points and sections."
    )
}

/// `!analyze <subject>`
pub fn analysis(subject: &str) -> String {
    format!(
        "You are an expert data analyst. Provide a detailed analysis of: {subject}\n\
         \n\
         Include:\n\
         1. Data breakdown and key metrics\n\
         2. Patterns and correlations\n\
         3. Comparative analysis\n\
         4. Risk assessment\n\
         5. Actionable insights\n\
         6. Recommendations\n\
         \n\
         Use analytical thinking and provide specific, data-driven insights."
    )
}

/// `!summarize <text>`
pub fn summary(text: &str) -> String {
    format!("Provide a concise, well-structured summary of: {text}")
}

/// `!summarize` with no argument: summarize the given slice of channel history.
pub fn conversation_summary(entries: &[ConversationEntry]) -> String {
    format!("Summarize this conversation concisely:\n{}", transcript(entries))
}

/// `!report <topic>`
pub fn report(topic: &str) -> String {
    format!(
        "Create a comprehensive professional report on: {topic}\n\
         \n\
         Structure the report with:\n\
         1. Executive Summary\n\
         2. Introduction and Background\n\
         3. Current State Analysis\n\
         4. Key Findings\n\
         5. Challenges and Opportunities\n\
         6. Recommendations\n\
         7. Conclusion\n\
         \n\
         Make it detailed, professional, and actionable."
    )
}

/// Free-text chat: general assistant framing around recent context.
pub fn assistant(context: &[ConversationEntry], message: &str) -> String {
    let context = context_block(context);
    format!(
        "You are a Sentient Research Assistant - an intelligent, helpful AI that specializes in \
         research, analysis, and providing detailed information.\n\
         \n\
         {context}\n\
         \n\
         User message: {message}\n\
         \n\
         Respond helpfully and mention that you can do deep research with commands like \
         !research, !analyze, !summarize, and !report.\n\
         Be knowledgeable, professional, and engaging."
    )
}

/// `Recent conversation:` header plus one `author: content` line per entry.
/// Empty when there is no history.
pub fn context_block(entries: &[ConversationEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    format!("Recent conversation:\n{}", transcript(entries))
}

fn transcript(entries: &[ConversationEntry]) -> String {
    entries
        .iter()
        .map(ConversationEntry::as_transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}
