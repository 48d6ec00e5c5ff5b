use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use kiln_server::server::DEFAULT_PORT;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Build and serve a single-page application")]
#[command(
    long_about = "kiln: bundles a single-page application into dist/ and, in development, serves it with live reload"
)]
#[command(version)]
#[command(styles = get_styles())]
pub struct Cli {
    /// Pass `true` to watch, rebuild and serve; anything else builds once
    pub dev: Option<String>,

    /// Host address to bind the dev server to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to run the dev server on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Project directory holding index.html, import_map.json and src/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn get_styles() -> Styles {
    Styles::styled()
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Red.on_default() | Effects::BOLD)
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_a_production_build() {
        let cli = Cli::parse_from(["kiln"]);

        assert_eq!(cli.dev, None);
        assert_eq!(cli.port, 5862);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn positional_flag_and_options() {
        let cli = Cli::parse_from(["kiln", "true", "--port", "3000", "-vv"]);

        assert_eq!(cli.dev.as_deref(), Some("true"));
        assert_eq!(cli.port, 3000);
        assert_eq!(cli.verbose, 2);
    }
}
