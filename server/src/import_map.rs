use kiln_shared::{KilnError, KilnResult};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Module specifier overrides read from an `import_map.json` file.
///
/// Only the top-level `imports` table is honored. Targets that point at
/// local files become resolver aliases. `http(s)` targets are rewritten to
/// their URL and left for the browser to load at runtime.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportMap {
    #[serde(default)]
    imports: BTreeMap<String, String>,

    #[serde(skip)]
    base_dir: PathBuf,
}

impl ImportMap {
    /// Loads the import map at `path`. A missing file yields an empty map.
    pub async fn load<P: AsRef<Path>>(path: P) -> KilnResult<Self> {
        let path = path.as_ref();
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let text = match fs_err::tokio::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no import map at {}", path.display());
                return Ok(Self {
                    base_dir,
                    ..Default::default()
                });
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse(&text, base_dir).map_err(|source| KilnError::ImportMap {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str, base_dir: PathBuf) -> Result<Self, serde_json::Error> {
        let mut map: Self = serde_json::from_str(text)?;
        map.base_dir = base_dir;
        Ok(map)
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Returns the raw target mapped to `specifier`, if any.
    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.imports.get(specifier).map(String::as_str)
    }

    /// The URL the browser should fetch for `specifier`, when it is remote.
    ///
    /// Exact mappings win over prefix mappings (`"lib/": "https://.../"`),
    /// and among prefixes the longest one applies. A specifier that is
    /// already an `http(s)` URL is its own target.
    pub fn remote_target(&self, specifier: &str) -> Option<String> {
        if is_remote(specifier) {
            return Some(specifier.to_string());
        }

        if let Some(target) = self.get(specifier) {
            return is_remote(target).then(|| target.to_string());
        }

        self.imports
            .iter()
            .filter(|(prefix, _)| prefix.ends_with('/') && specifier.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .filter(|(_, target)| is_remote(target))
            .map(|(prefix, target)| format!("{target}{}", &specifier[prefix.len()..]))
    }

    /// Local mappings as resolver aliases, with targets made absolute against
    /// the directory holding the import map. Prefix mappings (`"lib/"`) alias
    /// the prefix itself.
    pub fn aliases(&self) -> Vec<(String, Vec<Option<String>>)> {
        self.imports
            .iter()
            .filter(|(_, target)| !is_remote(target))
            .map(|(specifier, target)| {
                let specifier = specifier.trim_end_matches('/');
                let target = target.trim_end_matches('/');
                let target_path = Path::new(target);
                let absolute = if target_path.is_absolute() {
                    target_path.to_path_buf()
                } else {
                    self.base_dir.join(target_path)
                };

                (
                    specifier.to_string(),
                    vec![Some(absolute.to_string_lossy().to_string())],
                )
            })
            .collect()
    }
}

fn is_remote(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}
