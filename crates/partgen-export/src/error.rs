use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Part(#[from] partgen_core::Error),

    #[error("{view} view has no element \"{id}\" referenced by the descriptor")]
    DanglingReference { view: &'static str, id: String },

    #[error("failed to serialize XML: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write bundle: {0}")]
    Zip(#[from] zip::result::ZipError),
}
