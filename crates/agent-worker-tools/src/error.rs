use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolsError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
