use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid {what}: {message}")]
    InvalidInput { what: String, message: String },

    #[error("pin name \"{name}\" defined more than once")]
    DuplicateName { name: String },

    #[error("\"{from}\" references unknown pin \"{target}\"")]
    UnresolvedAlias { from: String, target: String },

    #[error("pin \"{alias}\" references \"{target}\", which is itself a reference to another pin")]
    IllegalAliasChain { alias: String, target: String },

    #[error("invalid schematic position \"{value}\" for pin \"{pin}\"")]
    InvalidSchematicPosition { pin: String, value: String },
}

impl Error {
    pub fn invalid_input(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            what: what.into(),
            message: message.into(),
        }
    }
}
