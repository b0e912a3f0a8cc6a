use std::path::{Path, PathBuf};

/// Where model artifacts live: a local directory or a HuggingFace repo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    kind: ModelSourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ModelSourceKind {
    Directory {
        path: PathBuf,
    },
    HuggingFace {
        repo_id: String,
        revision: Option<String>,
    },
}

impl ModelSource {
    /// Classify a model identifier.
    ///
    /// Existing directories and identifiers spelled as filesystem paths are
    /// local; everything else is treated as a HuggingFace repo id.
    pub fn from_identifier(identifier: &str) -> Self {
        if Path::new(identifier).is_dir() || looks_like_path(identifier) {
            Self::from_dir(identifier)
        } else {
            Self::from_hf(identifier)
        }
    }

    /// Create a source backed by a local model directory.
    pub fn from_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ModelSourceKind::Directory { path: path.into() },
        }
    }

    /// Create a source backed by a HuggingFace repo.
    pub fn from_hf(repo_id: impl Into<String>) -> Self {
        Self {
            kind: ModelSourceKind::HuggingFace {
                repo_id: repo_id.into(),
                revision: None,
            },
        }
    }

    /// Set the HuggingFace revision (branch, tag, or commit SHA).
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        if let ModelSourceKind::HuggingFace { revision: slot, .. } = &mut self.kind {
            *slot = Some(revision.into());
        }
        self
    }

    /// Resolve a file inside the source, downloading if necessary.
    pub fn resolve_file(&self, filename: &str) -> Result<PathBuf, ModelSourceError> {
        if filename.is_empty() {
            return Err(ModelSourceError::MissingFilename);
        }
        match &self.kind {
            ModelSourceKind::Directory { path } => {
                if !path.is_dir() {
                    return Err(ModelSourceError::MissingLocalDirectory(path.clone()));
                }
                let file = path.join(filename);
                if file.is_file() {
                    Ok(file)
                } else {
                    Err(ModelSourceError::MissingLocalFile(file))
                }
            }
            ModelSourceKind::HuggingFace { repo_id, revision } => {
                resolve_hf(repo_id, filename, revision.as_deref())
            }
        }
    }

    /// Resolve a file that a model may legitimately omit.
    ///
    /// Returns `Ok(None)` only when the file is known to be absent: missing
    /// from the local directory, or not listed in the HuggingFace repo. A
    /// missing local directory or an unreachable hub is still an error.
    pub fn resolve_optional_file(
        &self,
        filename: &str,
    ) -> Result<Option<PathBuf>, ModelSourceError> {
        if filename.is_empty() {
            return Err(ModelSourceError::MissingFilename);
        }
        match &self.kind {
            ModelSourceKind::Directory { .. } => match self.resolve_file(filename) {
                Ok(path) => Ok(Some(path)),
                Err(ModelSourceError::MissingLocalFile(path)) => {
                    log::debug!("optional model file not present: {}", path.display());
                    Ok(None)
                }
                Err(err) => Err(err),
            },
            ModelSourceKind::HuggingFace { repo_id, revision } => {
                resolve_hf_optional(repo_id, filename, revision.as_deref())
            }
        }
    }

    /// Return the local directory when the source is a directory.
    pub fn local_dir(&self) -> Option<&Path> {
        match &self.kind {
            ModelSourceKind::Directory { path } => Some(path.as_path()),
            _ => None,
        }
    }

    /// Return the HuggingFace repo ID if applicable.
    pub fn repo_id(&self) -> Option<&str> {
        match &self.kind {
            ModelSourceKind::HuggingFace { repo_id, .. } => Some(repo_id.as_str()),
            _ => None,
        }
    }

    /// Return the HuggingFace revision if one was set.
    pub fn revision(&self) -> Option<&str> {
        match &self.kind {
            ModelSourceKind::HuggingFace { revision, .. } => revision.as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ModelSourceKind::Directory { path } => write!(f, "{}", path.display()),
            ModelSourceKind::HuggingFace {
                repo_id,
                revision: Some(revision),
            } => write!(f, "{repo_id}@{revision}"),
            ModelSourceKind::HuggingFace { repo_id, .. } => write!(f, "{repo_id}"),
        }
    }
}

fn looks_like_path(identifier: &str) -> bool {
    identifier == "."
        || identifier == ".."
        || identifier.starts_with("./")
        || identifier.starts_with("../")
        || Path::new(identifier).is_absolute()
}

#[derive(Debug, thiserror::Error)]
pub enum ModelSourceError {
    #[error("Model directory not found: {0}")]
    MissingLocalDirectory(PathBuf),
    #[error("Model file not found: {0}")]
    MissingLocalFile(PathBuf),
    #[error("HuggingFace support is not enabled; enable the `model-hf` feature")]
    HuggingFaceDisabled,
    #[error("HuggingFace download failed: {0}")]
    HuggingFaceDownload(String),
    #[error("HuggingFace repo id is required")]
    MissingRepoId,
    #[error("Model filename is required")]
    MissingFilename,
}

#[cfg(feature = "model-hf")]
fn resolve_hf(
    repo_id: &str,
    filename: &str,
    revision: Option<&str>,
) -> Result<PathBuf, ModelSourceError> {
    let repo = hf_repo(repo_id, revision)?;
    let api = hf_api(std::env::var("HF_ENDPOINT").ok(), hf_hub::Cache::from_env())?;
    log::debug!("fetching {filename} from {repo_id}@{}", revision.unwrap_or("main"));
    api.repo(repo).get(filename).map_err(|err| {
        ModelSourceError::HuggingFaceDownload(format!("{repo_id}/{filename}: {err}"))
    })
}

#[cfg(feature = "model-hf")]
fn resolve_hf_optional(
    repo_id: &str,
    filename: &str,
    revision: Option<&str>,
) -> Result<Option<PathBuf>, ModelSourceError> {
    let cache = hf_hub::Cache::from_env();
    if let Some(path) = cache.repo(hf_repo(repo_id, revision)?).get(filename) {
        return Ok(Some(path));
    }
    let api = hf_api(std::env::var("HF_ENDPOINT").ok(), cache)?;
    fetch_optional(&api, repo_id, revision, filename)
}

/// Download `filename` if the repo lists it.
#[cfg(feature = "model-hf")]
fn fetch_optional(
    api: &hf_hub::api::sync::Api,
    repo_id: &str,
    revision: Option<&str>,
    filename: &str,
) -> Result<Option<PathBuf>, ModelSourceError> {
    let label = format!("{repo_id}@{}", revision.unwrap_or("main"));
    let api_repo = api.repo(hf_repo(repo_id, revision)?);
    let info = api_repo
        .info()
        .map_err(|err| ModelSourceError::HuggingFaceDownload(format!("{label}: {err}")))?;

    if !info.siblings.iter().any(|file| file.rfilename == filename) {
        log::debug!("optional model file '{filename}' not in {label}");
        return Ok(None);
    }
    api_repo.get(filename).map(Some).map_err(|err| {
        ModelSourceError::HuggingFaceDownload(format!("{label}/{filename}: {err}"))
    })
}

#[cfg(feature = "model-hf")]
fn hf_repo(repo_id: &str, revision: Option<&str>) -> Result<hf_hub::Repo, ModelSourceError> {
    if repo_id.is_empty() {
        return Err(ModelSourceError::MissingRepoId);
    }
    Ok(hf_hub::Repo::with_revision(
        repo_id.to_string(),
        hf_hub::RepoType::Model,
        revision.unwrap_or("main").to_string(),
    ))
}

#[cfg(feature = "model-hf")]
fn hf_api(
    endpoint: Option<String>,
    cache: hf_hub::Cache,
) -> Result<hf_hub::api::sync::Api, ModelSourceError> {
    let mut api_builder = hf_hub::api::sync::ApiBuilder::from_cache(cache);
    if let Some(endpoint) = endpoint {
        api_builder = api_builder.with_endpoint(endpoint);
    }
    if let Some(token) = hf_token() {
        api_builder = api_builder.with_token(Some(token));
    }
    api_builder
        .build()
        .map_err(|err| ModelSourceError::HuggingFaceDownload(err.to_string()))
}

#[cfg(not(feature = "model-hf"))]
fn resolve_hf(
    _repo_id: &str,
    _filename: &str,
    _revision: Option<&str>,
) -> Result<PathBuf, ModelSourceError> {
    Err(ModelSourceError::HuggingFaceDisabled)
}

#[cfg(not(feature = "model-hf"))]
fn resolve_hf_optional(
    _repo_id: &str,
    _filename: &str,
    _revision: Option<&str>,
) -> Result<Option<PathBuf>, ModelSourceError> {
    Err(ModelSourceError::HuggingFaceDisabled)
}

#[cfg(feature = "model-hf")]
fn hf_token() -> Option<String> {
    std::env::var("HUGGINGFACE_HUB_TOKEN")
        .ok()
        .or_else(|| std::env::var("HF_TOKEN").ok())
        .or_else(|| std::env::var("HUGGINGFACE_TOKEN").ok())
}
