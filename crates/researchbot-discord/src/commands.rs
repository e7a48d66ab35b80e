//! `!`-prefixed text commands: `!research`, `!analyze`, `!summarize`,
//! `!report`, `!help`.
//!
//! The set is closed. Parsing splits the message into a lower-cased token
//! and the free-text remainder; lookup maps the token onto [`Command`].

/// Prefix that marks a message as a command.
pub const COMMAND_PREFIX: char = '!';

/// Sent when a `!`-prefixed token is not a known command.
pub const UNKNOWN_COMMAND: &str = "\u{2753} Unknown command. Use `!help` to see available commands.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Research,
    Analyze,
    Summarize,
    Report,
    Help,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Research,
        Command::Analyze,
        Command::Summarize,
        Command::Report,
        Command::Help,
    ];

    /// The literal token users type, including the `!`.
    pub fn token(self) -> &'static str {
        match self {
            Command::Research => "!research",
            Command::Analyze => "!analyze",
            Command::Summarize => "!summarize",
            Command::Report => "!report",
            Command::Help => "!help",
        }
    }

    /// Case-insensitive lookup of a full token such as `!Research`.
    pub fn lookup(token: &str) -> Option<Command> {
        Command::ALL
            .into_iter()
            .find(|c| c.token().eq_ignore_ascii_case(token))
    }

    /// Verb used in the failure notice: `❌ <action> failed: <error>`.
    pub fn action(self) -> &'static str {
        match self {
            Command::Research => "Research",
            Command::Analyze => "Analysis",
            Command::Summarize => "Summarization",
            Command::Report => "Report generation",
            Command::Help => "Help",
        }
    }

    /// Hint sent when a required argument is missing.
    pub fn usage(self) -> &'static str {
        match self {
            Command::Research => {
                "\u{1f4da} Please provide a research topic. Example: `!research artificial intelligence trends 2024`"
            }
            Command::Analyze => {
                "\u{1f4c8} Please provide something to analyze. Example: `!analyze market trends in renewable energy`"
            }
            Command::Summarize => {
                "\u{1f4dd} No recent conversation to summarize. Provide text to summarize: `!summarize [text]`"
            }
            Command::Report => {
                "\u{1f4cb} Please specify a report topic. Example: `!report cryptocurrency market analysis`"
            }
            Command::Help => HELP_TEXT,
        }
    }

    /// Progress notice sent before the model call.
    pub fn working_notice(self, query: &str) -> String {
        match self {
            Command::Research => {
                format!("\u{1f50d} **Researching:** {query}\n\u{23f3} Gathering information...")
            }
            Command::Analyze => {
                format!("\u{1f4ca} **Analyzing:** {query}\n\u{23f3} Processing data...")
            }
            Command::Summarize => "\u{1f4dd} **Summarizing...**".to_string(),
            Command::Report => {
                format!("\u{1f4cb} **Generating Report:** {query}\n\u{23f3} This may take a moment...")
            }
            Command::Help => String::new(),
        }
    }
}

/// Split a command message into `(lower-cased token, query)`.
///
/// Returns `None` for messages that do not start with [`COMMAND_PREFIX`].
/// The token ends at the first whitespace; the query is the trimmed
/// remainder and may be empty.
pub fn parse(content: &str) -> Option<(String, &str)> {
    if !content.starts_with(COMMAND_PREFIX) {
        return None;
    }

    let (token, query) = match content.find(char::is_whitespace) {
        Some(idx) => (&content[..idx], content[idx..].trim()),
        None => (content, ""),
    };
    Some((token.to_lowercase(), query))
}

pub const HELP_TEXT: &str = "\u{1f916} **Sentient Research Agent - Commands**
\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}

\u{1f50d} **!research [topic]** - Deep research on any topic
\u{1f4ca} **!analyze [subject]** - Detailed analysis with insights
\u{1f4dd} **!summarize [text]** - Summarize text or recent conversation
\u{1f4cb} **!report [topic]** - Generate comprehensive professional report
\u{2753} **!help** - Show this help message

**Examples:**
\u{2022} `!research blockchain technology trends 2024`
\u{2022} `!analyze Tesla stock performance`
\u{2022} `!summarize` (summarizes recent chat)
\u{2022} `!report artificial intelligence in healthcare`

\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}
\u{1f680} **Built for Sentient Builder Program**
\u{1f4a1} Powered by advanced AI research capabilities";
