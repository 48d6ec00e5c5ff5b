use log::{Level, Log, Metadata, Record};

/// Prints `[target] message` lines, colored by level.
///
/// Only kiln's own targets are shown below warn level so dependency chatter
/// (rolldown, notify, hyper) stays out of the console.
pub struct ColoredLogger;

impl ColoredLogger {
    /// `kiln_server::bundler` is shown as `bundler`.
    fn short_target(target: &str) -> &str {
        match target.split_once("::") {
            Some((krate, rest)) if krate.starts_with("kiln") => rest,
            _ => target,
        }
    }
}

impl Log for ColoredLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let target = metadata.target();

        target.starts_with("kiln") || target == "server" || metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let color = match record.level() {
            Level::Info => "\x1b[36m",  // Cyan
            Level::Warn => "\x1b[33m",  // Yellow
            Level::Error => "\x1b[31m", // Red
            Level::Debug => "\x1b[35m", // Magenta
            Level::Trace => "\x1b[37m", // White
        };
        let reset = "\x1b[0m";
        let bold = "\x1b[1m";
        let target = Self::short_target(record.target());
        let msg = record.args();

        if record.level() <= Level::Warn {
            eprintln!("{color}{bold}[{target}]{reset} {msg}");
        } else {
            println!("{color}{bold}[{target}]{reset} {msg}");
        }
    }

    fn flush(&self) {}
}

pub static LOGGER: ColoredLogger = ColoredLogger;
