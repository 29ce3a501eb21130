#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BotError {
    #[error("This command can only be used in a server.")]
    GuildOnlyCommand,

    #[error("{0}")]
    PermissionDenied(String),
}
