/// Failure of one of the service's own persistence backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored csv is malformed: {0}")]
    Csv(#[from] csv::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        Self::Unavailable("store lock poisoned".to_string())
    }
}

/// Creates the parent directory of a store file when it does not exist yet.
pub(crate) fn ensure_parent(path: &std::path::Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
