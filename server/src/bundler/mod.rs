mod config;
mod remote;

pub use config::*;
pub use remote::RemoteImportPlugin;

use crate::import_map::ImportMap;
use crate::watcher::FileWatcher;
use futures::future::BoxFuture;
use kiln_shared::{KilnError, KilnResult};
use log::{debug, warn};
use rolldown::plugin::Pluginable;
use rolldown::{BundlerBuilder, BundlerOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Callback run before every build, initial or watch-triggered.
pub trait BuildStartHook: Send + Sync {
    fn name(&self) -> &str;

    fn on_start(&self) -> BoxFuture<'_, KilnResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub assets: usize,
    pub warnings: usize,
    pub duration: Duration,
}

#[derive(Debug)]
pub enum RebuildEvent {
    Rebuilt(BuildReport),
    Failed(KilnError),
}

/// Stream of rebuild outcomes produced in watch mode.
pub type RebuildEvents = UnboundedReceiver<RebuildEvent>;

/// Drives rolldown over an immutable [`BuildConfig`].
pub struct AppBundler {
    config: Arc<BuildConfig>,
    hooks: Vec<Box<dyn BuildStartHook>>,
}

impl AppBundler {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config: Arc::new(config),
            hooks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_start_hook<H: BuildStartHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Rolldown options and plugins for the next build. The import map is
    /// read again each time so edits to it apply on the following rebuild.
    async fn prepare(&self) -> KilnResult<(BundlerOptions, Vec<Arc<dyn Pluginable>>)> {
        let import_map = match &self.config.import_map {
            Some(path) => ImportMap::load(path).await?,
            None => ImportMap::default(),
        };

        let options = self.config.to_bundler_options(&import_map);
        let plugins: Vec<Arc<dyn Pluginable>> =
            vec![Arc::new(RemoteImportPlugin::new(Arc::new(import_map)))];

        Ok((options, plugins))
    }

    /// Runs the start hooks, then a full build into the output directory.
    ///
    /// Any error rolldown reports fails the build. The
    /// rolldown bundler is closed before returning so no background work
    /// outlives the call.
    pub async fn build(&self) -> KilnResult<BuildReport> {
        let started = Instant::now();

        for hook in &self.hooks {
            debug!("running {} hook", hook.name());
            hook.on_start().await?;
        }

        let (options, plugins) = self.prepare().await?;
        let mut bundler = BundlerBuilder::default()
            .with_options(options)
            .with_plugins(plugins)
            .build()?;

        let written = bundler.write().await;
        bundler.close().await?;
        let output = written?;

        for warning in &output.warnings {
            warn!("{}", warning);
        }

        let report = BuildReport {
            assets: output.assets.len(),
            warnings: output.warnings.len(),
            duration: started.elapsed(),
        };
        debug!(
            "rolldown emitted {} assets in {:.2}ms",
            report.assets,
            report.duration.as_secs_f64() * 1000.0
        );

        Ok(report)
    }

    /// Rebuilds on every change batch reported by `watcher`.
    ///
    /// The returned receiver yields one event per rebuild; dropping it stops
    /// the watch task after the build in flight.
    pub fn watch(self: Arc<Self>, mut watcher: FileWatcher) -> KilnResult<RebuildEvents> {
        if !self.config.watch {
            return Err(KilnError::Watcher("watch mode is disabled".to_string()));
        }

        let (tx, rx) = unbounded_channel();

        tokio::spawn(async move {
            while let Some(changed) = watcher.next_change().await {
                debug!("{} file(s) changed", changed.len());

                let event = match self.build().await {
                    Ok(report) => RebuildEvent::Rebuilt(report),
                    Err(e) => RebuildEvent::Failed(e),
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}
