/// Errors produced by the Discord adapter and the dispatcher's send path.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("serenity error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("no bot token configured")]
    NoToken,

    #[error("invalid channel id: {0}")]
    InvalidChannel(String),
}
