use kiln_shared::{KilnResult, canonicalize_with_strip};
use log::{trace, warn};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Watches application sources and reports batches of changed files.
///
/// Events are filtered by:
/// - File extensions (only source and asset types trigger a rebuild)
/// - Ignored paths (compared after canonicalization, e.g. the output dir)
/// - Temporary/backup files written by editors
///
/// Bursts of events arriving within the debounce window are merged into a
/// single batch so one save triggers one rebuild.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    rx: UnboundedReceiver<Result<Event, notify::Error>>,
    allowed_extensions: HashSet<String>,
    ignored_paths: Vec<PathBuf>,
    debounce: Duration,
}

impl FileWatcher {
    pub fn new() -> KilnResult<Self> {
        Self::with_debounce(Duration::from_millis(50))
    }

    pub fn with_debounce(debounce: Duration) -> KilnResult<Self> {
        let (tx, rx) = unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let allowed_extensions = [
            "js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts", // Scripts
            "css", "json", "html", "svg", // Assets bundled or copied
        ]
        .iter()
        .map(|&s| s.to_string())
        .collect();

        Ok(Self {
            watcher,
            rx,
            allowed_extensions,
            ignored_paths: Vec::new(),
            debounce,
        })
    }

    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> KilnResult {
        let path = path.as_ref();
        trace!("watching {}", path.display());
        self.watcher.watch(path, RecursiveMode::Recursive)?;
        Ok(())
    }

    /// Adds a path to the ignored paths list.
    ///
    /// The path is canonicalized first; a path that does not exist yet is
    /// stored as given.
    pub fn add_ignored_path<P: AsRef<Path>>(&mut self, path: P) -> KilnResult {
        let path = path.as_ref();
        let path = if path.exists() {
            canonicalize_with_strip(path)?
        } else {
            path.to_path_buf()
        };

        if !self.ignored_paths.contains(&path) {
            self.ignored_paths.push(path);
        }
        Ok(())
    }

    /// Waits for the next relevant change and returns the affected files.
    ///
    /// Returns `None` once the underlying watcher is gone.
    pub async fn next_change(&mut self) -> Option<Vec<PathBuf>> {
        loop {
            let mut changed = BTreeSet::new();
            let first = self.rx.recv().await?;
            self.collect(first, &mut changed);

            loop {
                let next = tokio::time::timeout(self.debounce, self.rx.recv()).await;
                match next {
                    Ok(Some(res)) => self.collect(res, &mut changed),
                    _ => break,
                }
            }

            if !changed.is_empty() {
                return Some(changed.into_iter().collect());
            }
        }
    }

    fn collect(&self, res: Result<Event, notify::Error>, changed: &mut BTreeSet<PathBuf>) {
        match res {
            Ok(event) if !matches!(event.kind, EventKind::Access(_)) => {
                changed.extend(event.paths.into_iter().filter(|path| self.is_relevant(path)));
            }
            Ok(_) => {}
            Err(e) => warn!("watch error: {}", e),
        }
    }

    fn is_relevant(&self, path: &Path) -> bool {
        self.is_allowed_file(path) && !self.is_ignored_path(path)
    }

    fn is_allowed_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.allowed_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    fn is_ignored_path(&self, path: &Path) -> bool {
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if is_temporary_file(file_name) {
                return true;
            }
        }

        // Removed files can no longer be canonicalized.
        let path = canonicalize_with_strip(path).unwrap_or_else(|_| path.to_path_buf());
        self.ignored_paths
            .iter()
            .any(|ignored| path.starts_with(ignored))
    }

    pub fn add_extension(&mut self, ext: &str) {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.allowed_extensions.insert(ext);
    }
}

fn is_temporary_file(file_name: &str) -> bool {
    // Vim swap and generic backup files
    if file_name.ends_with('~')
        || file_name.ends_with(".swp")
        || file_name.ends_with(".swo")
        || file_name.ends_with(".swx")
        || file_name.ends_with(".bak")
    {
        return true;
    }

    // Emacs auto-save files
    if file_name.starts_with('#') && file_name.ends_with('#') {
        return true;
    }

    if file_name.starts_with(".~") || file_name.ends_with(".tmp") {
        return true;
    }

    // JetBrains safe-write files
    file_name.ends_with("___jb_tmp___") || file_name.ends_with("___jb_old___")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_editor_temporaries() {
        assert!(is_temporary_file("App.tsx~"));
        assert!(is_temporary_file(".App.tsx.swp"));
        assert!(is_temporary_file("#App.tsx#"));
        assert!(is_temporary_file("App.tsx___jb_tmp___"));
        assert!(!is_temporary_file("App.tsx"));
    }

    #[tokio::test]
    async fn filters_by_extension_and_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        fs_err::create_dir_all(&dist).unwrap();

        let mut watcher = FileWatcher::new().unwrap();
        watcher.add_ignored_path(&dist).unwrap();

        let root = canonicalize_with_strip(dir.path()).unwrap();
        assert!(watcher.is_relevant(&root.join("src/App.tsx")));
        assert!(!watcher.is_relevant(&root.join("src/notes.md")));
        assert!(!watcher.is_relevant(&root.join("dist/assets/main.js")));

        watcher.add_extension(".md");
        assert!(watcher.is_relevant(&root.join("src/notes.md")));
    }

    #[tokio::test]
    async fn reports_source_changes() {
        let dir = tempfile::tempdir().unwrap();
        let src = canonicalize_with_strip(dir.path()).unwrap();
        let mut watcher = FileWatcher::new().unwrap();
        watcher.watch(&src).unwrap();

        fs_err::write(src.join("App.tsx"), "export const App = () => null;").unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(10), watcher.next_change())
            .await
            .expect("no change reported")
            .unwrap();
        assert!(changed.iter().any(|p| p.ends_with("App.tsx")));
    }
}
