use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

/// Asks for a thread URL on `output` and reads one line from `input`.
pub fn prompt_thread_url<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "Enter Reddit URL: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Creates the output directory, returning `true` if it did not exist before.
    pub fn ensure_base_dir(&self) -> Result<bool> {
        let base = Path::new(&self.base_path);
        if base.exists() {
            return Ok(false);
        }
        fs::create_dir_all(base)?;
        tracing::debug!("Created output directory {}", self.base_path);
        Ok(true)
    }
}

impl Storage for LocalStorage {
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(Path::new(&self.base_path).join(path).exists())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    fn display_path(&self, path: &str) -> String {
        format!("{}/{}", self.base_path.trim_end_matches('/'), path)
    }
}
