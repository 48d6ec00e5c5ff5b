use crate::bundler::BuildStartHook;
use futures::future::BoxFuture;
use kiln_shared::{KilnError, KilnResult};
use log::debug;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Removes a previously generated output directory before every build so no
/// stale chunk survives a rebuild.
#[derive(Debug, Clone)]
pub struct CleanHook {
    dir: PathBuf,
}

impl CleanHook {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Deletes the directory recursively. An absent directory counts as
    /// already clean; every other failure aborts the build.
    pub async fn run(&self) -> KilnResult {
        match fs_err::tokio::remove_dir_all(&self.dir).await {
            Ok(()) => {
                debug!("removed {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(KilnError::Clean {
                path: self.dir.clone(),
                source,
            }),
        }
    }
}

impl BuildStartHook for CleanHook {
    fn name(&self) -> &str {
        "clean"
    }

    fn on_start(&self) -> BoxFuture<'_, KilnResult> {
        Box::pin(self.run())
    }
}
