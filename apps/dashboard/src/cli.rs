//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mokart - browse recorded sessions and render their trajectories
#[derive(Parser, Debug)]
#[command(name = "mokart")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Service URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List recorded sessions
    Sessions,

    /// Fetch a session and render its trajectory (.svg or .png)
    Render {
        /// Session id
        #[arg(short, long)]
        session: String,

        /// Output image
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        size: SizeArgs,
    },

    /// Render a trajectory file (.csv, .json, .ndjson) without the service
    RenderFile {
        /// Trajectory file
        #[arg(short, long)]
        input: PathBuf,

        /// Optional stats document providing the bounds
        #[arg(short, long)]
        stats: Option<PathBuf>,

        /// Output image
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        size: SizeArgs,
    },

    /// Fetch a session's trajectory and save it (.csv, .json, .ndjson)
    Export {
        /// Session id
        #[arg(short, long)]
        session: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        vehicle_model: Option<String>,
    },

    /// Sign in with the demo account
    Demo,

    /// Forget the stored session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct SizeArgs {
    /// Surface width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Surface height in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_file_args() {
        let cli = Cli::try_parse_from([
            "mokart", "render-file", "-i", "lap.csv", "-s", "stats.json", "-o", "lap.svg", "--width", "800",
        ])
        .unwrap();
        match cli.command {
            Commands::RenderFile { input, stats, out, size } => {
                assert_eq!(input, PathBuf::from("lap.csv"));
                assert_eq!(stats, Some(PathBuf::from("stats.json")));
                assert_eq!(out, PathBuf::from("lap.svg"));
                assert_eq!(size.width, Some(800));
                assert_eq!(size.height, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn export_args() {
        let cli = Cli::try_parse_from(["mokart", "export", "-s", "abc", "-o", "abc.ndjson"]).unwrap();
        match cli.command {
            Commands::Export { session, out } => {
                assert_eq!(session, "abc");
                assert_eq!(out, PathBuf::from("abc.ndjson"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mokart", "sessions", "-v", "--api-url", "http://k:1"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("http://k:1"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
