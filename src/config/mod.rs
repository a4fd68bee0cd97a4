pub mod cli;
pub mod toml_config;

use crate::bootstrap::BootstrapConfig;
use crate::core::reddit::DEFAULT_USER_AGENT;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use std::path::PathBuf;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "reddit-comment-exporter")]
#[command(about = "Export Reddit threads to Markdown and bootstrap the local environment")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = toml_config::DEFAULT_CONFIG_FILE)]
    pub config: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Export a thread's comments to Markdown
    Export(ExportArgs),
    /// Create the virtual environment and install the dependency manifest
    Setup(SetupArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct ExportArgs {
    /// Thread URL; prompted for when omitted
    pub url: Option<String>,

    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(long)]
    pub user_agent: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Fetch from this origin instead of reddit.com")]
    pub api_base: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct SetupArgs {
    /// Directory holding the manifest; defaults to the tool's own directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[arg(long)]
    pub env_dir: Option<String>,

    #[arg(long)]
    pub manifest: Option<String>,

    #[arg(long, help = "Python interpreter used to create the environment")]
    pub python: Option<String>,

    #[arg(
        long,
        overrides_with = "no_keep_going",
        help = "Run every step even if an earlier one failed"
    )]
    pub keep_going: bool,

    #[arg(
        long,
        overrides_with = "keep_going",
        help = "Stop at the first failed step, even if the config file says keep_going"
    )]
    pub no_keep_going: bool,
}

#[cfg(feature = "cli")]
impl ExportArgs {
    /// Layers command line flags over the file configuration.
    pub fn apply(&self, file: &TomlConfig) -> TomlConfig {
        let mut merged = file.clone();
        let export = &mut merged.export;
        if let Some(dir) = &self.output_dir {
            export.output_dir = Some(dir.clone());
        }
        if let Some(agent) = &self.user_agent {
            export.user_agent = Some(agent.clone());
        }
        if let Some(timeout) = self.timeout {
            export.timeout_seconds = Some(timeout);
        }
        if let Some(base) = &self.api_base {
            export.api_base = Some(base.clone());
        }
        merged
    }
}

#[cfg(feature = "cli")]
impl SetupArgs {
    pub fn apply(&self, file: &TomlConfig) -> TomlConfig {
        let mut merged = file.clone();
        let setup = &mut merged.setup;
        if let Some(root) = &self.root {
            setup.root = Some(root.display().to_string());
        }
        if let Some(env_dir) = &self.env_dir {
            setup.env_dir = Some(env_dir.clone());
        }
        if let Some(manifest) = &self.manifest {
            setup.manifest = Some(manifest.clone());
        }
        if let Some(python) = &self.python {
            setup.python = Some(python.clone());
        }
        if self.keep_going {
            setup.keep_going = Some(true);
        } else if self.no_keep_going {
            setup.keep_going = Some(false);
        }
        merged
    }
}

/// Fully resolved settings for one export run.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub thread_url: String,
    pub output_dir: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub api_base: Option<String>,
}

impl ExportSettings {
    pub fn new(thread_url: impl Into<String>) -> Self {
        Self::from_toml(&TomlConfig::default(), thread_url)
    }

    pub fn from_toml(config: &TomlConfig, thread_url: impl Into<String>) -> Self {
        let export = &config.export;
        Self {
            thread_url: thread_url.into(),
            output_dir: export
                .output_dir
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            user_agent: export
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout_seconds: export.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            api_base: export.api_base.clone(),
        }
    }
}

impl Validate for ExportSettings {
    fn validate(&self) -> Result<()> {
        validate_path("output_dir", &self.output_dir)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        if let Some(api_base) = &self.api_base {
            validate_url("api_base", api_base)?;
        }
        Ok(())
    }
}

impl ConfigProvider for ExportSettings {
    fn thread_url(&self) -> &str {
        &self.thread_url
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn api_base(&self) -> Option<&str> {
        self.api_base.as_deref()
    }
}

impl From<&TomlConfig> for BootstrapConfig {
    fn from(config: &TomlConfig) -> Self {
        let setup = &config.setup;
        let mut bootstrap = match &setup.root {
            Some(root) => BootstrapConfig::new(PathBuf::from(root)),
            None => BootstrapConfig::default(),
        };
        if let Some(env_dir) = &setup.env_dir {
            bootstrap.env_dir = env_dir.clone();
        }
        if let Some(manifest) = &setup.manifest {
            bootstrap.manifest = manifest.clone();
        }
        if let Some(python) = &setup.python {
            bootstrap.python = python.clone();
        }
        if let Some(keep_going) = setup.keep_going {
            bootstrap.keep_going = keep_going;
        }
        if let Some(companion) = &setup.companion {
            bootstrap.companion = companion.clone();
        }
        bootstrap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_settings_defaults() {
        let settings = ExportSettings::new("https://www.reddit.com/r/rust/comments/abc/t/");
        assert_eq!(settings.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(settings.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_bootstrap_config_from_toml() {
        let toml = TomlConfig::from_toml_str(
            "[setup]\nroot = \"/srv/tool\"\nenv_dir = \".venv\"\nkeep_going = true\n",
        )
        .unwrap();
        let bootstrap = BootstrapConfig::from(&toml);

        assert_eq!(bootstrap.root, PathBuf::from("/srv/tool"));
        assert_eq!(bootstrap.env_dir, ".venv");
        assert_eq!(bootstrap.manifest, crate::bootstrap::DEFAULT_MANIFEST);
        assert!(bootstrap.keep_going);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_flags_override_file() {
        let file = TomlConfig::from_toml_str(
            "[export]\noutput_dir = \"./from-file\"\ntimeout_seconds = 5\n",
        )
        .unwrap();
        let cli = CliConfig::parse_from([
            "reddit-comment-exporter",
            "export",
            "https://www.reddit.com/r/rust/comments/abc/t/",
            "--output-dir",
            "./from-cli",
        ]);

        let args = match cli.command {
            Some(Command::Export(args)) => args,
            other => panic!("expected export command, got {:?}", other),
        };
        let settings = ExportSettings::from_toml(&args.apply(&file), args.url.clone().unwrap());

        assert_eq!(settings.output_dir, "./from-cli");
        assert_eq!(settings.timeout_seconds, 5);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_setup_keep_going_flag() {
        let cli = CliConfig::parse_from(["reddit-comment-exporter", "setup", "--keep-going"]);
        let args = match cli.command {
            Some(Command::Setup(args)) => args,
            other => panic!("expected setup command, got {:?}", other),
        };
        let bootstrap = BootstrapConfig::from(&args.apply(&TomlConfig::default()));
        assert!(bootstrap.keep_going);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_no_keep_going_overrides_file() {
        let file = TomlConfig::from_toml_str("[setup]\nkeep_going = true\n").unwrap();

        let parse = |argv: &[&str]| match CliConfig::parse_from(argv.iter().copied()).command {
            Some(Command::Setup(args)) => BootstrapConfig::from(&args.apply(&file)),
            other => panic!("expected setup command, got {:?}", other),
        };

        assert!(parse(&["reddit-comment-exporter", "setup"]).keep_going);
        assert!(!parse(&["reddit-comment-exporter", "setup", "--no-keep-going"]).keep_going);
        // Last flag wins
        let argv = ["reddit-comment-exporter", "setup", "--no-keep-going", "--keep-going"];
        assert!(parse(&argv).keep_going);
        let argv = ["reddit-comment-exporter", "setup", "--keep-going", "--no-keep-going"];
        assert!(!parse(&argv).keep_going);
    }

    #[test]
    fn test_bootstrap_config_defaults_to_tool_directory() {
        let bootstrap = BootstrapConfig::from(&TomlConfig::default());
        assert_eq!(bootstrap.root, crate::bootstrap::default_root());
        assert!(!bootstrap.keep_going);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_no_subcommand_parses() {
        let cli = CliConfig::parse_from(["reddit-comment-exporter", "--verbose"]);
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }
}
