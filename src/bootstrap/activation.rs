use crate::bootstrap::runner::Invocation;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const BIN_DIR: &str = "bin";

#[cfg(windows)]
const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_SEPARATOR: &str = ":";

/// Process environment of an activated virtual environment.
///
/// Mirrors what the `activate` script does to a shell: `VIRTUAL_ENV` points at the env,
/// its binary directory goes first on `PATH`, and `PYTHONHOME` is dropped.
#[derive(Debug, Clone)]
pub struct Activation {
    env_root: PathBuf,
    bin_dir: PathBuf,
    path: OsString,
}

impl Activation {
    pub fn for_environment(env_root: &Path, inherited_path: Option<OsString>) -> Self {
        let bin_dir = env_root.join(BIN_DIR);
        let path = prepend_to_path(&bin_dir, inherited_path);

        Self {
            env_root: env_root.to_path_buf(),
            bin_dir,
            path,
        }
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Whether the environment has been created, i.e. there is something to activate.
    pub fn is_available(&self) -> bool {
        self.bin_dir.is_dir()
    }

    pub fn executable(&self, name: &str) -> PathBuf {
        self.bin_dir
            .join(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
    }

    pub fn apply(&self, invocation: &mut Invocation) {
        invocation.env("VIRTUAL_ENV", self.env_root.as_os_str());
        invocation.env("PATH", self.path.clone());
        invocation.env_remove.push(OsString::from("PYTHONHOME"));
    }
}

/// Puts `bin_dir` in front of the inherited search path.
///
/// `join_paths` refuses entries that contain the separator itself. Such a directory is still
/// prepended verbatim, the same string `activate` would export.
fn prepend_to_path(bin_dir: &Path, inherited: Option<OsString>) -> OsString {
    let mut entries = vec![bin_dir.to_path_buf()];
    if let Some(inherited) = &inherited {
        entries.extend(std::env::split_paths(inherited));
    }

    match std::env::join_paths(entries) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Prepending {} to PATH as is: {}", bin_dir.display(), e);
            let mut path = bin_dir.as_os_str().to_os_string();
            if let Some(inherited) = inherited.filter(|p| !p.is_empty()) {
                path.push(PATH_SEPARATOR);
                path.push(inherited);
            }
            path
        }
    }
}

/// The command a user types to activate the environment later, relative to the tool directory.
pub fn activate_hint(env_dir: &Path) -> String {
    if cfg!(windows) {
        format!("{}\\{}\\activate", env_dir.display(), BIN_DIR)
    } else {
        format!("source {}/{}/activate", env_dir.display(), BIN_DIR)
    }
}
