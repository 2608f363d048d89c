use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record error: {0}")]
    Record(#[from] timer_core::RecordError),

    #[error("no data directory available")]
    NoDataDir,
}
