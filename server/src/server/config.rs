use std::path::PathBuf;

/// Port the dev server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5862;

/// Configuration for the server and the project it builds.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The IP address or hostname where the server will bind.
    pub host: String,
    /// The TCP port on which the server will listen to.
    pub port: u16,
    /// The project root; every other path is relative to it.
    pub root: PathBuf,
    /// Output directory, wiped and regenerated on each build.
    pub out_dir: PathBuf,
    /// HTML shell receiving the injected script tags.
    pub template: PathBuf,
    /// Directory holding the application sources.
    pub src_dir: PathBuf,
    pub import_map: PathBuf,
}

impl ServerConfig {
    /// Creates a new `ServerConfig` with default values:
    /// host: `127.0.0.1`, port: `5862`, output in `dist`, template
    /// `index.html`, sources in `src`, import map `import_map.json`.
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            root: PathBuf::from("."),
            out_dir: PathBuf::from("dist"),
            template: PathBuf::from("index.html"),
            src_dir: PathBuf::from("src"),
            import_map: PathBuf::from("import_map.json"),
        }
    }

    /// Returns a new `ServerConfig` with the specified port.
    #[must_use]
    #[inline(always)]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Returns a new `ServerConfig` with the specified host.
    #[must_use]
    #[inline(always)]
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Returns a new `ServerConfig` with the specified root directory.
    #[must_use]
    #[inline(always)]
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    #[must_use]
    pub fn with_out_dir(mut self, out_dir: PathBuf) -> Self {
        self.out_dir = out_dir;
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: PathBuf) -> Self {
        self.template = template;
        self
    }

    #[must_use]
    pub fn with_src_dir(mut self, src_dir: PathBuf) -> Self {
        self.src_dir = src_dir;
        self
    }

    #[must_use]
    pub fn with_import_map(mut self, import_map: PathBuf) -> Self {
        self.import_map = import_map;
        self
    }

    /// Returns the full address in the format `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
