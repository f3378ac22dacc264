use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "kairos-init",
    about = "Turn a generic Linux base image into a Kairos immutable OS image",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Console verbosity.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Progress messages.
    #[default]
    Info,
    /// Command output and per-file detail.
    Debug,
    /// Everything.
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Console log level
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        default_value_t = LogLevel::Info,
        env = "KAIROS_INIT_LOGLEVEL"
    )]
    pub loglevel: LogLevel,

    /// Root of the image being provisioned
    #[arg(long, global = true, default_value = "/", env = "KAIROS_INIT_ROOT")]
    pub root: PathBuf,

    /// os-release file to detect the distro from [default: <root>/etc/os-release]
    #[arg(long, global = true)]
    pub os_release: Option<PathBuf>,

    /// Package table file replacing the built-in tables
    #[arg(long, global = true, env = "KAIROS_INIT_PACKAGES")]
    pub packages: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply features to the image, then validate it
    Install(InstallOpts),
    /// Undo features
    Remove(FeatureOpts),
    /// Describe a feature
    Show(ShowOpts),
    /// Check the image without changing it
    Validate(ValidateOpts),
    /// Print version information
    Version,
}

/// Feature selection shared by `install` and `remove`.
#[derive(Parser, Debug, Clone)]
pub struct FeatureOpts {
    /// Features to act on, or `all`
    #[arg(short, long, value_delimiter = ',', env = "KAIROS_INIT_FEATURES")]
    pub features: Vec<String>,

    /// Log what would happen without changing anything
    #[arg(short = 'd', long, env = "KAIROS_INIT_DRY_RUN")]
    pub dry_run: bool,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    #[command(flatten)]
    pub selection: FeatureOpts,

    /// Reinstall features that are already installed
    #[arg(long, env = "KAIROS_INIT_FORCE")]
    pub force: bool,

    /// Framework archive to extract [default: <root>/usr/share/kairos/framework-<version>.tar]
    #[arg(long, env = "KAIROS_INIT_FRAMEWORK_ARCHIVE")]
    pub framework_archive: Option<PathBuf>,

    /// Do not validate the image after installing
    #[arg(long)]
    pub skip_validation: bool,
}

/// Options for the `show` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ShowOpts {
    /// Feature to describe
    pub feature: String,
}

/// Options for the `validate` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ValidateOpts {
    /// Features to check
    #[arg(short, long, value_delimiter = ',', default_value = "all")]
    pub features: Vec<String>,
}
