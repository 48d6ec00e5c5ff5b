use crate::bundler::{AppBundler, RebuildEvent, RebuildEvents};
use crate::clean::CleanHook;
use crate::reload::{ReloadChannel, inject_scripts};
use crate::server::{Context, Server, ServerConfig};
use crate::watcher::FileWatcher;
use kiln_shared::{KilnResult, read_text, write_text};
use log::{debug, error, info};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Build flavor selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Watch, rebuild and serve with live reload.
    Development,
    /// Build once and exit.
    Production,
}

impl Mode {
    /// Only the literal `"true"` selects development; anything else,
    /// including a missing argument, is a production build.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("true") => Mode::Development,
            _ => Mode::Production,
        }
    }

    #[inline(always)]
    pub fn is_dev(self) -> bool {
        self == Mode::Development
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Templating,
    Building,
    Serving,
    Exited,
}

/// Top-level control flow: template the HTML shell, build, then either
/// serve with live reload or exit.
pub struct DevOrchestrator {
    ctx: Arc<Context>,
    mode: Mode,
    phase: Phase,
}

impl DevOrchestrator {
    pub fn new(config: ServerConfig, mode: Mode) -> KilnResult<Self> {
        Ok(Self {
            ctx: Arc::new(Context::new(config)?),
            mode,
            phase: Phase::Idle,
        })
    }

    #[inline(always)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        debug!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    pub async fn run(mut self) -> KilnResult {
        self.render_template().await?;
        let bundler = self.build().await?;

        match self.mode {
            Mode::Development => self.serve(bundler).await,
            Mode::Production => {
                self.enter(Phase::Exited);
                info!(target: "server", "build finished");
                Ok(())
            }
        }
    }

    /// Injects the script tags into the template and writes the result to
    /// the output directory's `index.html`, returning its path.
    pub async fn render_template(&mut self) -> KilnResult<PathBuf> {
        self.enter(Phase::Templating);

        let template = read_text(self.ctx.template()).await?;
        let html = inject_scripts(&template, self.mode.is_dev());
        let index = self.ctx.index_file();
        write_text(&index, &html).await?;

        debug!("wrote {}", index.display());
        Ok(index)
    }

    /// Runs the initial build. Failure here is fatal in both modes.
    pub async fn build(&mut self) -> KilnResult<Arc<AppBundler>> {
        self.enter(Phase::Building);

        let bundler = AppBundler::new(self.ctx.build_config(self.mode))
            .with_start_hook(CleanHook::new(self.ctx.assets_dir()));
        let report = bundler.build().await?;

        info!(
            target: "server",
            "built {} assets in {}ms",
            report.assets,
            report.duration.as_millis()
        );
        Ok(Arc::new(bundler))
    }

    async fn serve(mut self, bundler: Arc<AppBundler>) -> KilnResult {
        let reload = Arc::new(ReloadChannel::new());

        let mut watcher = FileWatcher::new()?;
        watcher.add_ignored_path(self.ctx.out_dir())?;
        watcher.watch(self.ctx.src_dir())?;
        let import_map = self.ctx.import_map();
        if import_map.exists() {
            watcher.watch(&import_map)?;
        }

        let events = bundler.watch(watcher)?;
        tokio::spawn(report_rebuilds(events, reload.clone()));

        self.enter(Phase::Serving);
        clear_console();
        info!(target: "server", "server running on http://{}", self.ctx.address());
        info!(target: "server", "watching for file changes...");

        Server::new(self.ctx.clone(), reload).serve().await
    }
}

/// Consumes rebuild events: a successful rebuild reloads every connected
/// browser, a failed one is logged and the stale output keeps being served.
pub async fn report_rebuilds(mut events: RebuildEvents, reload: Arc<ReloadChannel>) {
    while let Some(event) = events.recv().await {
        match event {
            RebuildEvent::Rebuilt(report) => {
                let notified = reload.notify_all();
                clear_console();
                info!(target: "server", "rebuilt successfully");
                debug!(
                    "{} assets in {}ms, {} client(s) reloaded",
                    report.assets,
                    report.duration.as_millis(),
                    notified
                );
            }
            RebuildEvent::Failed(err) => {
                clear_console();
                error!(target: "server", "{}", err);
            }
        }
    }
}

fn clear_console() {
    let mut stdout = std::io::stdout();
    if stdout.is_terminal() {
        let _ = write!(stdout, "\x1b[2J\x1b[1;1H");
        let _ = stdout.flush();
    }
}
