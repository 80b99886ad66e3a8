//! OCR providers
//!
//! [`OcrProvider`] is the seam the pipeline calls; [`TesseractProvider`]
//! pipes a PNG through the `tesseract` CLI.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::types::OcrError;
use crate::config::{OcrConfig, OCR_DPI};
use crate::text::condense_spaces;

/// Text recognition over an encoded image
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Recognise the text in a PNG; whitespace is condensed
    async fn recognize(&self, png: &[u8]) -> Result<String, OcrError>;
}

/// `tesseract stdin stdout --dpi 300 -l LANG [--tessdata-dir DIR]`
#[derive(Debug, Clone)]
pub struct TesseractProvider {
    config: OcrConfig,
}

impl TesseractProvider {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Fail unless the executable exists and knows every requested language
    pub async fn check(config: OcrConfig) -> Result<Self, OcrError> {
        if !is_available(&config.tesseract_path) {
            return Err(OcrError::NotFound(config.tesseract_path.display().to_string()));
        }
        let provider = Self::new(config);
        provider.validate_languages().await?;
        Ok(provider)
    }

    /// Every `+`-separated code in the configured language must be listed by
    /// `--list-langs`
    pub async fn validate_languages(&self) -> Result<(), OcrError> {
        let lang = &self.config.lang;
        if lang.is_empty() || !lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '_') {
            return Err(OcrError::InvalidLanguage(lang.clone()));
        }

        let mut cmd = Command::new(&self.config.tesseract_path);
        if let Some(dir) = &self.config.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        let output = cmd.arg("--list-langs").stdin(Stdio::null()).output().await?;

        // Older releases print the list on stderr
        let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
        listing.push_str(&String::from_utf8_lossy(&output.stderr));
        let available: Vec<&str> = listing.lines().map(str::trim).collect();

        match lang.split('+').find(|code| !available.contains(code)) {
            Some(missing) => Err(OcrError::InvalidLanguage(missing.to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl OcrProvider for TesseractProvider {
    async fn recognize(&self, png: &[u8]) -> Result<String, OcrError> {
        let mut cmd = Command::new(&self.config.tesseract_path);
        cmd.arg("stdin")
            .arg("stdout")
            .arg("--dpi")
            .arg(format!("{}", OCR_DPI as u32))
            .arg("-l")
            .arg(&self.config.lang);
        if let Some(dir) = &self.config.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(png).await {
                let _ = child.kill().await;
                return Err(OcrError::Spawn(e));
            }
            stdin.flush().await?;
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Failed(stderr.trim().to_string()));
        }

        let text = condense_spaces(&String::from_utf8_lossy(&output.stdout));
        debug!(bytes = png.len(), chars = text.len(), "tesseract finished");
        Ok(text)
    }
}

/// A bare command name is searched on `PATH`; anything else must exist
pub fn is_available(path: &Path) -> bool {
    if path.components().count() > 1 {
        return path.exists();
    }
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| executable_in(&dir, path))
}

fn executable_in(dir: &Path, name: &Path) -> bool {
    let candidate: PathBuf = dir.join(name);
    if candidate.is_file() {
        return true;
    }
    cfg!(windows) && candidate.with_extension("exe").is_file()
}

/// Canned answers for pipeline tests
#[cfg(test)]
pub(crate) struct MockProvider {
    pub text: String,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrProvider for MockProvider {
    async fn recognize(&self, png: &[u8]) -> Result<String, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if !png.starts_with(b"\x89PNG") {
            return Err(OcrError::Failed("not a PNG".into()));
        }
        Ok(condense_spaces(&self.text))
    }
}
