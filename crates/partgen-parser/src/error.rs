use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Part(#[from] partgen_core::Error),

    #[error("\"{field}\" is required for {kind} boards")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("\"{field}\" is not supported on {kind} boards")]
    UnexpectedField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("bus group references unknown row \"{name}\"")]
    UnknownRow { name: String },

    #[error("layout entry #{index} must have exactly one of \"outer\" or \"inner\"")]
    LayoutEntry { index: usize },

    #[error("meta key \"{key}\" is not a valid XML element name")]
    InvalidMetaKey { key: String },

    #[error("\"{key}\" must be a string, number or boolean")]
    NonScalar { key: String },
}
