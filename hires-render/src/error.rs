use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockRenderError {
    /// A model, texture or other resource for the block does not exist.
    #[error("no such resource: {0}")]
    NoSuchResource(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
