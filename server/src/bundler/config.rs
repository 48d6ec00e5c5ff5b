use crate::import_map::ImportMap;
use rolldown::{BundlerOptions, InputItem, OutputFormat, RawMinifyOptions, ResolveOptions};
use rolldown_common::{BundlerTransformOptions, ChunkFilenamesOutputOption, Either, JsxOptions, LegalComments};
use std::path::{Path, PathBuf};

/// Options for one bundler invocation.
///
/// Built once by the orchestrator and shared behind an `Arc` afterwards;
/// nothing mutates it once the bundler holds it.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Entry specifiers, resolved against `cwd`.
    pub entries: Vec<String>,
    /// Working directory for module resolution.
    pub cwd: PathBuf,
    /// Directory receiving the emitted assets.
    pub out_dir: PathBuf,
    /// Split shared modules into separate chunks.
    pub splitting: bool,
    pub format: OutputFormat,
    pub minify: bool,
    /// Rebuild whenever a watched source changes.
    pub watch: bool,
    /// Import map consulted during resolution.
    pub import_map: Option<PathBuf>,
    /// File name pattern of split chunks, relative to `out_dir`.
    pub chunk_names: String,
    pub jsx: JsxRuntime,
}

/// How JSX syntax is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsxRuntime {
    /// `React.createElement` calls against the `React` binding in scope.
    #[default]
    Classic,
    /// Calls into `react/jsx-runtime`, imported automatically.
    Automatic,
}

impl JsxRuntime {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Automatic => "automatic",
        }
    }
}

impl BuildConfig {
    /// Creates a config with the defaults of a single-page app build:
    /// the `react` library, `./main.tsx` and `./App.tsx` as entries,
    /// minified ESM output with code splitting.
    pub fn new<C: Into<PathBuf>, O: Into<PathBuf>>(cwd: C, out_dir: O) -> Self {
        Self {
            entries: vec![
                "react".to_string(),
                "./main.tsx".to_string(),
                "./App.tsx".to_string(),
            ],
            cwd: cwd.into(),
            out_dir: out_dir.into(),
            splitting: true,
            format: OutputFormat::Esm,
            minify: true,
            watch: false,
            import_map: None,
            chunk_names: "chunks/[name]-[hash].js".to_string(),
            jsx: JsxRuntime::Classic,
        }
    }

    #[must_use]
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries = entries.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_splitting(mut self, splitting: bool) -> Self {
        self.splitting = splitting;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    #[must_use]
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    #[must_use]
    pub fn with_import_map<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.import_map = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_jsx(mut self, jsx: JsxRuntime) -> Self {
        self.jsx = jsx;
        self
    }

    #[must_use]
    pub fn with_chunk_names<S: Into<String>>(mut self, pattern: S) -> Self {
        self.chunk_names = pattern.into();
        self
    }

    /// Translates the config into rolldown options.
    ///
    /// Only local import map targets are handled here, as resolver aliases.
    /// Remote targets go through [`RemoteImportPlugin`](super::RemoteImportPlugin).
    pub fn to_bundler_options(&self, import_map: &ImportMap) -> BundlerOptions {
        let input = self
            .entries
            .iter()
            .map(|entry| InputItem {
                name: Some(entry_name(entry)),
                import: entry.clone(),
            })
            .collect();

        let aliases = import_map.aliases();

        BundlerOptions {
            input: Some(input),
            cwd: Some(self.cwd.clone()),
            dir: Some(self.out_dir.to_string_lossy().to_string()),
            format: Some(self.format),
            minify: Some(RawMinifyOptions::from(self.minify)),
            chunk_filenames: Some(ChunkFilenamesOutputOption::String(self.chunk_names.clone())),
            inline_dynamic_imports: Some(!self.splitting),
            legal_comments: Some(LegalComments::Inline),
            transform: Some(BundlerTransformOptions {
                jsx: Some(Either::Right(JsxOptions {
                    runtime: Some(self.jsx.as_str().to_string()),
                    ..Default::default()
                })),
                ..Default::default()
            }),
            resolve: (!aliases.is_empty()).then(|| ResolveOptions {
                alias: Some(aliases),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Output name of an entry: the file stem for path entries (`./main.tsx`
/// emits `main.js`), the specifier with separators flattened otherwise.
pub fn entry_name(entry: &str) -> String {
    let is_path = entry.starts_with('.') || entry.starts_with('/') || Path::new(entry).is_absolute();

    if is_path {
        if let Some(stem) = Path::new(entry).file_stem().and_then(|s| s.to_str()) {
            return stem.to_string();
        }
    }

    entry
        .trim_start_matches('@')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(options: &BundlerOptions) -> Vec<(Option<String>, String)> {
        options
            .input
            .as_ref()
            .unwrap()
            .iter()
            .map(|item| (item.name.clone(), item.import.clone()))
            .collect()
    }

    #[test]
    fn entry_names_follow_file_stems() {
        assert_eq!(entry_name("./main.tsx"), "main");
        assert_eq!(entry_name("./components/App.tsx"), "App");
        assert_eq!(entry_name("react"), "react");
        assert_eq!(entry_name("@scope/pkg"), "scope_pkg");
        assert_eq!(entry_name("react-dom/client"), "react-dom_client");
    }

    #[test]
    fn defaults_describe_a_minified_split_esm_build() {
        let config = BuildConfig::new("/app/src", "/app/dist/assets");

        assert_eq!(config.entries, vec!["react", "./main.tsx", "./App.tsx"]);
        assert!(config.splitting);
        assert!(config.minify);
        assert!(!config.watch);
        assert!(matches!(config.format, OutputFormat::Esm));
        assert_eq!(config.chunk_names, "chunks/[name]-[hash].js");
        assert_eq!(config.jsx, JsxRuntime::Classic);
    }

    #[test]
    fn maps_onto_rolldown_options() {
        let config = BuildConfig::new("/app/src", "/app/dist/assets");
        let options = config.to_bundler_options(&ImportMap::default());

        assert_eq!(
            inputs(&options),
            vec![
                (Some("react".to_string()), "react".to_string()),
                (Some("main".to_string()), "./main.tsx".to_string()),
                (Some("App".to_string()), "./App.tsx".to_string()),
            ]
        );
        assert_eq!(options.cwd, Some(PathBuf::from("/app/src")));
        assert_eq!(options.dir.as_deref(), Some("/app/dist/assets"));
        assert!(matches!(options.format, Some(OutputFormat::Esm)));
        assert!(options.minify.is_some());
        assert_eq!(options.inline_dynamic_imports, Some(false));
        assert!(matches!(options.legal_comments, Some(LegalComments::Inline)));
        assert!(options.external.is_none());
        assert!(options.resolve.is_none());
    }

    fn jsx_runtime(options: &BundlerOptions) -> Option<String> {
        match options.transform.as_ref()?.jsx.as_ref()? {
            Either::Right(jsx) => jsx.runtime.clone(),
            Either::Left(_) => None,
        }
    }

    #[test]
    fn jsx_compiles_to_create_element_calls() {
        let config = BuildConfig::new("/app/src", "/app/dist/assets");

        let options = config.to_bundler_options(&ImportMap::default());
        assert_eq!(jsx_runtime(&options).as_deref(), Some("classic"));

        let options = config
            .with_jsx(JsxRuntime::Automatic)
            .to_bundler_options(&ImportMap::default());
        assert_eq!(jsx_runtime(&options).as_deref(), Some("automatic"));
    }

    #[test]
    fn import_map_drives_resolution() {
        let map = ImportMap::parse(
            r#"{"imports": {"react": "./vendor/react.js", "lodash": "https://esm.sh/lodash"}}"#,
            PathBuf::from("/app"),
        )
        .unwrap();
        let config = BuildConfig::new("/app/src", "/app/dist/assets")
            .with_entries(["react", "lodash", "./main.tsx"]);

        let options = config.to_bundler_options(&map);

        assert_eq!(
            inputs(&options),
            vec![
                (Some("react".to_string()), "react".to_string()),
                (Some("lodash".to_string()), "lodash".to_string()),
                (Some("main".to_string()), "./main.tsx".to_string()),
            ]
        );
        assert!(options.external.is_none());
        let alias = options.resolve.and_then(|r| r.alias).unwrap();
        assert_eq!(alias.len(), 1);
        assert_eq!(alias[0].0, "react");
    }

    #[test]
    fn disabling_splitting_inlines_dynamic_imports() {
        let options = BuildConfig::new("/app/src", "/app/dist/assets")
            .with_entries(["./main.tsx"])
            .with_splitting(false)
            .to_bundler_options(&ImportMap::default());

        assert_eq!(options.inline_dynamic_imports, Some(true));
    }
}
