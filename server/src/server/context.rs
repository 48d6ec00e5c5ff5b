use std::path::{Path, PathBuf};

use super::ServerConfig;
use crate::bundler::BuildConfig;
use crate::dev::Mode;
use fs_err::create_dir_all;
use kiln_shared::KilnError::FileNotFound;
use kiln_shared::{KilnResult, canonicalize_with_strip};

/// Name of the directory under the output dir that holds bundled scripts.
pub const ASSETS_DIR: &str = "assets";

/// Context holds all the application-wide data including configuration
/// and canonicalized paths.
#[derive(Debug, Clone)]
pub struct Context {
    /// The server configuration (host, port, etc.)
    config: ServerConfig,
    /// The canonicalized root directory path
    root: PathBuf,
    /// The canonicalized output directory path
    out_dir: PathBuf,
}

impl Context {
    /// Creates a new Context from the given ServerConfig.
    /// The output directory is created when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path cannot be canonicalized or the
    /// output directory cannot be created.
    pub fn new(config: ServerConfig) -> KilnResult<Self> {
        let root = canonicalize_with_strip(&config.root)
            .map_err(|_| FileNotFound(config.root.to_string_lossy().to_string()))?;

        let out_dir_path = root.join(&config.out_dir);
        if !out_dir_path.exists() {
            create_dir_all(&out_dir_path)?;
        }
        let out_dir = canonicalize_with_strip(&out_dir_path)?;

        Ok(Self {
            config,
            root,
            out_dir,
        })
    }

    /// Returns a reference to the canonicalized output directory.
    #[inline(always)]
    pub fn out_dir(&self) -> &PathBuf {
        &self.out_dir
    }

    #[inline(always)]
    pub fn assets_dir(&self) -> PathBuf {
        self.out_dir.join(ASSETS_DIR)
    }

    /// The generated HTML shell, also the single-page fallback.
    #[inline(always)]
    pub fn index_file(&self) -> PathBuf {
        self.out_dir.join("index.html")
    }

    #[inline(always)]
    pub fn template(&self) -> PathBuf {
        self.root.join(&self.config.template)
    }

    #[inline(always)]
    pub fn src_dir(&self) -> PathBuf {
        self.root.join(&self.config.src_dir)
    }

    #[inline(always)]
    pub fn import_map(&self) -> PathBuf {
        self.root.join(&self.config.import_map)
    }

    /// Returns the full address in the format `host:port`.
    #[inline(always)]
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build options for this project; watching is enabled in development.
    pub fn build_config(&self, mode: Mode) -> BuildConfig {
        BuildConfig::new(self.src_dir(), self.assets_dir())
            .with_import_map(self.import_map())
            .with_watch(mode.is_dev())
    }

    /// Maps a request path onto an existing file in the output directory.
    /// Directories resolve to their `index.html`. Returns `None` for missing
    /// files and for paths escaping the output directory.
    pub fn resolve_output_file(&self, request_path: &str) -> Option<PathBuf> {
        let relative = request_path.trim_start_matches('/');
        let mut candidate = canonicalize_with_strip(self.out_dir.join(relative)).ok()?;

        if !self.is_within_out_dir(&candidate) {
            return None;
        }

        if candidate.is_dir() {
            candidate = candidate.join("index.html");
        }

        candidate.is_file().then_some(candidate)
    }

    /// Checks if a path is within the output directory (prevents directory traversal).
    pub fn is_within_out_dir(&self, path: &Path) -> bool {
        path.starts_with(&self.out_dir)
    }
}
