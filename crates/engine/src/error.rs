use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Could not recognize the export format; choose one explicitly.")]
    UnrecognizedFormat,

    #[error("No unrecognized upload is waiting for a format choice.")]
    NoPendingUpload,

    #[error("Failed to read export file: {0}")]
    Io(#[from] std::io::Error),
}
