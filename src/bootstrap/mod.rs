//! Local environment bootstrapping.
//!
//! Creates an isolated Python environment next to the tool, activates it for the commands
//! that follow, installs the dependency manifest into it and prints how to use it afterwards.
//! Every step runs to completion before the next one starts.

pub mod activation;
pub mod runner;

use crate::utils::error::{ExporterError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_relative_path, Validate};
use activation::{activate_hint, Activation};
use runner::{CommandRunner, Invocation, COMMAND_NOT_FOUND};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENV_DIR: &str = "venv";
pub const DEFAULT_MANIFEST: &str = "requirements.txt";
pub const DEFAULT_PYTHON: &str = "python3";
pub const DEFAULT_COMPANION: &str = "reddit-comment-exporter export";

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub root: PathBuf,
    pub env_dir: String,
    pub manifest: String,
    pub python: String,
    pub keep_going: bool,
    pub companion: String,
}

impl BootstrapConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            env_dir: DEFAULT_ENV_DIR.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            python: DEFAULT_PYTHON.to_string(),
            keep_going: false,
            companion: DEFAULT_COMPANION.to_string(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self::new(default_root())
    }
}

impl Validate for BootstrapConfig {
    fn validate(&self) -> Result<()> {
        validate_relative_path("setup.env_dir", &self.env_dir)?;
        validate_relative_path("setup.manifest", &self.manifest)?;
        validate_non_empty_string("setup.python", &self.python)?;
        validate_non_empty_string("setup.companion", &self.companion)?;
        Ok(())
    }
}

/// The directory the tool ships in: the crate directory it was built from, falling back to
/// the directory holding the executable.
pub fn default_root() -> PathBuf {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if crate_dir.is_dir() {
        return crate_dir;
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateEnvironment,
    Activate,
    InstallDependencies,
}

impl Step {
    pub fn narrative(&self) -> &'static str {
        match self {
            Step::CreateEnvironment => "Creating virtual environment...",
            Step::Activate => "Activating virtual environment...",
            Step::InstallDependencies => "Installing dependencies...",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CreateEnvironment => "create environment",
            Step::Activate => "activate environment",
            Step::InstallDependencies => "install dependencies",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    pub code: i32,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.code == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub outcomes: Vec<StepOutcome>,
}

impl BootstrapReport {
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(StepOutcome::succeeded)
    }

    /// Exit code of the last step that ran, like a shell script without `set -e`.
    pub fn exit_code(&self) -> i32 {
        self.outcomes.last().map(|o| o.code).unwrap_or(0)
    }
}

pub struct Bootstrapper<R: CommandRunner> {
    config: BootstrapConfig,
    runner: R,
    root: PathBuf,
}

impl<R: CommandRunner> Bootstrapper<R> {
    /// Resolves the tool directory to an absolute path. Nothing runs if it cannot be resolved.
    pub fn new(config: BootstrapConfig, runner: R) -> Result<Self> {
        config.validate()?;

        let root = config
            .root
            .canonicalize()
            .map_err(|e| ExporterError::RootUnavailableError {
                path: config.root.display().to_string(),
                reason: e.to_string(),
            })?;
        if !root.is_dir() {
            return Err(ExporterError::RootUnavailableError {
                path: root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        tracing::debug!("Tool directory resolved to {}", root.display());
        Ok(Self {
            config,
            runner,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env_root(&self) -> PathBuf {
        self.root.join(&self.config.env_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.config.manifest)
    }

    /// Makes the tool directory the working directory of this process.
    pub fn enter(&self) -> Result<()> {
        std::env::set_current_dir(&self.root).map_err(|e| ExporterError::RootUnavailableError {
            path: self.root.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn run<W: Write>(&self, out: &mut W) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();

        writeln!(out, "{}", Step::CreateEnvironment.narrative())?;
        let outcome = self.create_environment();
        self.record(&mut report, outcome)?;

        writeln!(out, "{}", Step::Activate.narrative())?;
        let activation = Activation::for_environment(&self.env_root(), std::env::var_os("PATH"));
        let outcome = self.activate(&activation);
        self.record(&mut report, outcome)?;

        writeln!(out, "{}", Step::InstallDependencies.narrative())?;
        let outcome = self.install_dependencies(&activation);
        self.record(&mut report, outcome)?;

        self.print_instructions(out, report.succeeded())?;
        Ok(report)
    }

    fn create_environment(&self) -> StepOutcome {
        let invocation = Invocation::new(&self.config.python, &self.root)
            .arg("-m")
            .arg("venv")
            .arg(&self.config.env_dir);
        self.execute(Step::CreateEnvironment, &invocation)
    }

    fn activate(&self, activation: &Activation) -> StepOutcome {
        if activation.is_available() {
            tracing::debug!("Activated {}", activation.bin_dir().display());
            return StepOutcome {
                step: Step::Activate,
                code: 0,
            };
        }

        // Same failure a shell reports when sourcing a missing activate script
        tracing::error!("No environment at {}", activation.bin_dir().display());
        eprintln!(
            "{}: No such file or directory",
            activation.bin_dir().join("activate").display()
        );
        StepOutcome {
            step: Step::Activate,
            code: 1,
        }
    }

    fn install_dependencies(&self, activation: &Activation) -> StepOutcome {
        let manifest = self.manifest_path();
        if !manifest.is_file() {
            tracing::warn!("Manifest {} not found", manifest.display());
        }

        let mut invocation = Invocation::new(activation.executable("pip"), &self.root)
            .arg("install")
            .arg("-r")
            .arg(&self.config.manifest);
        activation.apply(&mut invocation);
        self.execute(Step::InstallDependencies, &invocation)
    }

    fn execute(&self, step: Step, invocation: &Invocation) -> StepOutcome {
        tracing::info!("Running: {}", invocation.display());

        let code = match self.runner.run(invocation) {
            Ok(code) => code,
            Err(e) => {
                tracing::error!("Could not start {}: {}", invocation.program.display(), e);
                eprintln!("{}: {}", invocation.program.display(), e);
                COMMAND_NOT_FOUND
            }
        };

        if code != 0 {
            tracing::warn!("Step '{}' exited with code {}", step, code);
        }
        StepOutcome { step, code }
    }

    fn record(&self, report: &mut BootstrapReport, outcome: StepOutcome) -> Result<()> {
        report.outcomes.push(outcome);

        if !outcome.succeeded() && !self.config.keep_going {
            return Err(ExporterError::StepFailedError {
                step: outcome.step.to_string(),
                code: outcome.code,
            });
        }
        Ok(())
    }

    fn print_instructions<W: Write>(&self, out: &mut W, succeeded: bool) -> Result<()> {
        if succeeded {
            writeln!(out, "Setup complete!")?;
        } else {
            writeln!(out, "Setup finished with errors.")?;
        }
        writeln!(out)?;
        writeln!(out, "To activate the virtual environment in the future, run:")?;
        writeln!(out, "    {}", activate_hint(Path::new(&self.config.env_dir)))?;
        writeln!(out)?;
        writeln!(out, "Then run the exporter with:")?;
        writeln!(out, "    {}", self.config.companion)?;
        writeln!(out)?;
        writeln!(out, "When you're done, deactivate the environment with:")?;
        writeln!(out, "    deactivate")?;
        Ok(())
    }
}
