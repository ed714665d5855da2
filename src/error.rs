use thiserror::Error;

/// How a command failed. `main` turns this into the process exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Config or portal checks failed; the details were already logged.
    #[error("configuration or portal validation failed")]
    Precondition,

    /// The lint run itself failed; the details were already logged.
    #[error("linting failed for portal {portal_id}: {error:#}")]
    Lint {
        portal_id: u64,
        error: anyhow::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Precondition | CommandError::Lint { .. } => 1,
            CommandError::Other(_) => 2,
        }
    }

    /// Whether the error still has to be shown to the user.
    pub fn is_reported(&self) -> bool {
        !matches!(self, CommandError::Other(_))
    }
}
