//! Lazy converter initialization.
//!
//! A [`ConverterLoader`] owns the converter handle and its initialization
//! state. When the converter is missing, the loader issues a single request
//! for its resource path through a [`ConverterSource`]; once the request
//! completes the rendering pass runs. A loader that starts out ready never
//! issues a request.

use crate::config::Config;
use crate::converter::{Converter, ConverterOptions, MarkdownConverter};
use crate::document::Document;
use crate::error::{LoadError, Result};
use crate::transform::{transform, PassReport};
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a converter comes from.
pub trait ConverterSource {
    /// Load the converter described by `resource`.
    fn load(&self, resource: &str) -> std::result::Result<Arc<dyn Converter>, LoadError>;
}

impl<F> ConverterSource for F
where
    F: Fn(&str) -> std::result::Result<Arc<dyn Converter>, LoadError>,
{
    fn load(&self, resource: &str) -> std::result::Result<Arc<dyn Converter>, LoadError> {
        self(resource)
    }
}

/// Reads the resource as a TOML converter profile relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl ConverterSource for FileSource {
    fn load(&self, resource: &str) -> std::result::Result<Arc<dyn Converter>, LoadError> {
        let path = self.base_dir.join(resource);
        let shown = path.display().to_string();

        let profile = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::NotFound {
                path: shown.clone(),
            },
            _ => LoadError::Read {
                path: shown.clone(),
                message: e.to_string(),
            },
        })?;

        let options: ConverterOptions =
            toml::from_str(&profile).map_err(|e| LoadError::InvalidProfile {
                path: shown.clone(),
                message: e.to_string(),
            })?;

        debug!(path = %shown, "loaded converter profile");
        Ok(Arc::new(MarkdownConverter::new(options)))
    }
}

/// Builds the converter from in-memory options, ignoring the resource path.
#[derive(Debug, Clone, Default)]
pub struct BuiltinSource {
    options: ConverterOptions,
}

impl BuiltinSource {
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }
}

impl ConverterSource for BuiltinSource {
    fn load(&self, _resource: &str) -> std::result::Result<Arc<dyn Converter>, LoadError> {
        Ok(Arc::new(MarkdownConverter::new(self.options.clone())))
    }
}

/// Initialization state of the converter.
#[derive(Clone)]
pub enum LoadState {
    Uninitialized,
    /// A request has been issued and not completed.
    Loading,
    Ready(Arc<dyn Converter>),
    /// The last request failed; the message is kept for diagnostics.
    Failed(String),
}

impl fmt::Debug for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Uninitialized => f.write_str("Uninitialized"),
            LoadState::Loading => f.write_str("Loading"),
            LoadState::Ready(converter) => write!(f, "Ready({})", converter.name()),
            LoadState::Failed(message) => f.debug_tuple("Failed").field(message).finish(),
        }
    }
}

/// A load request the caller is expected to fulfil and pass to
/// [`ConverterLoader::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub path: String,
}

/// Owner of the converter handle.
#[derive(Debug)]
pub struct ConverterLoader {
    resource_path: String,
    state: LoadState,
    requests: usize,
}

impl ConverterLoader {
    /// A loader with no converter yet.
    pub fn new(resource_path: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            state: LoadState::Uninitialized,
            requests: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resource_path.clone())
    }

    /// A loader whose converter is already present.
    pub fn ready(converter: Arc<dyn Converter>) -> Self {
        Self {
            resource_path: String::new(),
            state: LoadState::Ready(converter),
            requests: 0,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready(_))
    }

    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// Number of load requests issued over the loader's lifetime.
    pub fn requests_issued(&self) -> usize {
        self.requests
    }

    /// Start loading if nothing is loaded or in flight.
    ///
    /// Returns `None` when the converter is ready or a request is pending.
    pub fn request(&mut self) -> Option<LoadRequest> {
        match self.state {
            LoadState::Uninitialized | LoadState::Failed(_) => {
                self.state = LoadState::Loading;
                self.requests += 1;
                debug!(path = %self.resource_path, "requesting converter");
                Some(LoadRequest {
                    path: self.resource_path.clone(),
                })
            }
            LoadState::Loading | LoadState::Ready(_) => None,
        }
    }

    /// Record the result of a load request.
    pub fn complete(
        &mut self,
        result: std::result::Result<Arc<dyn Converter>, LoadError>,
    ) -> std::result::Result<Arc<dyn Converter>, LoadError> {
        match result {
            Ok(converter) => {
                debug!(converter = converter.name(), "converter ready");
                self.state = LoadState::Ready(Arc::clone(&converter));
                Ok(converter)
            }
            Err(error) => {
                warn!(path = %self.resource_path, %error, "converter failed to load");
                self.state = LoadState::Failed(error.to_string());
                Err(error)
            }
        }
    }

    /// The converter, loading it from `source` first if needed.
    pub fn ensure_converter(
        &mut self,
        source: &dyn ConverterSource,
    ) -> std::result::Result<Arc<dyn Converter>, LoadError> {
        if let LoadState::Ready(converter) = &self.state {
            return Ok(Arc::clone(converter));
        }

        let request = self.request().ok_or(LoadError::InProgress)?;
        let result = source.load(&request.path);
        self.complete(result)
    }

    /// Make sure the converter is available, then run the rendering pass.
    ///
    /// A failed load returns the error and leaves the document untouched.
    pub fn ensure_converter_then_run<D: Document>(
        &mut self,
        source: &dyn ConverterSource,
        document: &mut D,
        config: &Config,
    ) -> Result<PassReport> {
        let converter = self.ensure_converter(source)?;
        transform(document, converter.as_ref(), config)
    }
}

/// A page-wide loader whose converter is built from [`ConverterOptions`].
///
/// Passes whose options match the loaded converter reuse it. Passes with other
/// options get a converter of their own and leave the loaded one in place.
#[derive(Debug)]
pub struct PageConverter {
    loader: ConverterLoader,
    loaded: Option<ConverterOptions>,
}

impl PageConverter {
    pub fn new(resource_path: impl Into<String>) -> Self {
        Self {
            loader: ConverterLoader::new(resource_path),
            loaded: None,
        }
    }

    pub fn loader(&self) -> &ConverterLoader {
        &self.loader
    }

    /// Options the loaded converter was built from.
    pub fn loaded_options(&self) -> Option<&ConverterOptions> {
        self.loaded.as_ref()
    }

    /// Run the rendering pass with a converter matching `config.converter`.
    pub fn render<D: Document>(&mut self, document: &mut D, config: &Config) -> Result<PassReport> {
        match &self.loaded {
            Some(loaded) if *loaded != config.converter => {
                debug!("converter options differ from the loaded ones");
                let converter = MarkdownConverter::new(config.converter.clone());
                transform(document, &converter, config)
            }
            _ => {
                let source = BuiltinSource::new(config.converter.clone());
                let report = self
                    .loader
                    .ensure_converter_then_run(&source, document, config)?;
                self.loaded.get_or_insert_with(|| config.converter.clone());
                Ok(report)
            }
        }
    }
}
