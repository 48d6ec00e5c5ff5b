pub mod bundler;
pub mod clean;
pub mod dev;
pub mod file;
pub mod import_map;
pub mod reload;
pub mod server;
pub mod watcher;
