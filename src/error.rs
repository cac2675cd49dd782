use thiserror::Error;

/// Errors surfaced by hooked command execution
#[derive(Debug, Error)]
pub enum HookError {
    /// A hook refused to let the command proceed
    #[error("hook error: {0}")]
    Hook(String),

    /// The command itself failed
    #[error(transparent)]
    Command(#[from] redis::RedisError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HookError>;
