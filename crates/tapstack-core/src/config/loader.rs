//! Assembles the context map from files and command-line overrides

use std::path::{Path, PathBuf};

use super::context::ContextMap;
use super::traits::ConfigResult;
use crate::debug_log;

/// Where a context layer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextLayer {
    /// `~/.tapstack/context.yaml`
    User,
    /// `cdk.json` in the project directory
    Project,
    /// `cdk.context.json` in the project directory
    ProjectCache,
    /// A file passed explicitly with `--context-file`
    Explicit,
    /// `--context key=value` pairs
    CommandLine,
}

impl ContextLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextLayer::User => "user",
            ContextLayer::Project => "project",
            ContextLayer::ProjectCache => "project-cache",
            ContextLayer::Explicit => "explicit",
            ContextLayer::CommandLine => "command-line",
        }
    }
}

/// Builds a [`ContextMap`] by layering sources, later layers winning
///
/// Layer order: user file, project `cdk.json`, project `cdk.context.json`,
/// explicit context file, then command-line overrides.
///
/// # Example
///
/// ```no_run
/// use tapstack_core::config::ContextLoader;
///
/// let context = ContextLoader::new(".")
///     .with_override("environment=staging")
///     .load()
///     .unwrap();
/// assert_eq!(context.get_string("environment").as_deref(), Some("staging"));
/// ```
#[derive(Debug, Clone)]
pub struct ContextLoader {
    project_dir: PathBuf,
    user_file: Option<PathBuf>,
    explicit_file: Option<PathBuf>,
    overrides: Vec<String>,
}

impl ContextLoader {
    /// Loader for a project directory, including the user-level file
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            user_file: Self::default_user_file(),
            explicit_file: None,
            overrides: Vec::new(),
        }
    }

    /// `~/.tapstack/context.yaml`, if a home directory is known
    pub fn default_user_file() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tapstack").join("context.yaml"))
    }

    /// Replace (or drop, with `None`) the user-level file
    pub fn with_user_file(mut self, path: Option<PathBuf>) -> Self {
        self.user_file = path;
        self
    }

    pub fn with_context_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    pub fn with_override(mut self, raw: impl Into<String>) -> Self {
        self.overrides.push(raw.into());
        self
    }

    pub fn with_overrides<I, S>(mut self, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.extend(raw.into_iter().map(Into::into));
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Files that would be consulted, in layer order, with their existence
    pub fn list_files(&self) -> Vec<(ContextLayer, PathBuf, bool)> {
        let mut files = Vec::new();
        if let Some(user) = &self.user_file {
            files.push((ContextLayer::User, user.clone(), user.exists()));
        }
        let project = self.project_dir.join("cdk.json");
        files.push((ContextLayer::Project, project.clone(), project.exists()));
        let cache = self.project_dir.join("cdk.context.json");
        files.push((ContextLayer::ProjectCache, cache.clone(), cache.exists()));
        if let Some(explicit) = &self.explicit_file {
            files.push((ContextLayer::Explicit, explicit.clone(), explicit.exists()));
        }
        files
    }

    /// Load and merge every layer
    ///
    /// Missing files are skipped; unparseable files and malformed overrides
    /// are errors.
    pub fn load(&self) -> ConfigResult<ContextMap> {
        let mut context = ContextMap::new();

        for (layer, path, exists) in self.list_files() {
            if !exists {
                continue;
            }
            let layer_map = match layer {
                ContextLayer::Project => ContextMap::from_cdk_json(&path)?,
                _ => ContextMap::from_file(&path)?,
            };
            debug_log!("{} layer {}: {} keys", layer.as_str(), path.display(), layer_map.len());
            context.merge(layer_map);
        }

        for raw in &self.overrides {
            context.apply_override(raw)?;
        }

        Ok(context)
    }
}
