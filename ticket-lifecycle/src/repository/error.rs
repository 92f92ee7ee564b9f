#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ticket was modified concurrently")]
    VersionConflict,

    #[error("invalid document: {0}")]
    InvalidDocument(&'static str),

    #[error("mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}
