//! Tesseract engine driven through the `tesseract` command-line binary.
//!
//! Each `detect` call pipes the normalized JPEG to a fresh `tesseract` process
//! over stdin and reads TSV from stdout, so concurrent calls never share state.
//! Construction probes the binary once with `--list-langs` and fails if it is
//! missing or lacks a requested language pack.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::OcrConfig;
use crate::error::EngineInitError;

use super::normalize::NormalizedImage;
use super::recognizer::{parse_tsv, Recognizer};
use super::types::Detection;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct TesseractCli {
    binary: PathBuf,
    languages: String,
    tessdata_dir: Option<String>,
    /// Per-process deadline; the process is killed once it passes.
    timeout: Duration,
}

impl TesseractCli {
    pub fn probe(config: &OcrConfig) -> std::result::Result<Self, EngineInitError> {
        let engine = Self {
            binary: PathBuf::from(&config.tesseract_bin),
            languages: config.languages.clone(),
            tessdata_dir: config.tessdata_dir.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        };

        let mut command = Command::new(&engine.binary);
        if let Some(dir) = &engine.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }
        let output = command.arg("--list-langs").output().map_err(|e| {
            EngineInitError::ConstructionFailed(format!(
                "Tesseract process failed to start ({}): {e}. Please ensure 'tesseract-ocr' is installed and in your PATH.",
                engine.binary.display()
            ))
        })?;

        if !output.status.success() {
            return Err(EngineInitError::ConstructionFailed(format!(
                "`tesseract --list-langs` failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // Older releases print the list on stderr.
        let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
        listing.push('\n');
        listing.push_str(&String::from_utf8_lossy(&output.stderr));
        let installed = parse_language_list(&listing);

        if let Some(missing) = missing_language(&engine.languages, &installed) {
            return Err(EngineInitError::ConstructionFailed(format!(
                "Tesseract language pack '{missing}' is not installed (available: {})",
                installed.join(", ")
            )));
        }

        Ok(engine)
    }
}

impl Recognizer for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn detect(&self, image: &NormalizedImage) -> Result<Vec<Detection>> {
        let mut command = Command::new(&self.binary);
        command.arg("stdin").arg("stdout").arg("-l").arg(&self.languages);
        if let Some(dir) = &self.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }

        let mut child = command
            .arg("tsv")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Tesseract process failed to start")?;

        // Drain both pipes off-thread so a chatty process never blocks on a full pipe.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_pipe(stdout));
        let stderr_reader = thread::spawn(move || read_pipe(stderr));

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&image.encoded) {
                drop(stdin);
                kill_and_reap(&mut child);
                let stderr = stderr_reader.join().unwrap_or_default();
                return Err(anyhow::Error::new(e).context(format!(
                    "Failed to pipe image data to Tesseract stdin: {}",
                    String::from_utf8_lossy(&stderr).trim()
                )));
            }
        }

        let status = wait_with_deadline(&mut child, self.timeout)?;
        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            let err_msg = String::from_utf8_lossy(&stderr);
            anyhow::bail!("Tesseract execution failed with error: {}", err_msg.trim());
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&stdout)))
    }
}

/// Wait for `child`, killing and reaping it once `timeout` has passed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if started.elapsed() >= timeout => {
                kill_and_reap(child);
                anyhow::bail!(
                    "Tesseract timed out after {} seconds; process killed",
                    timeout.as_secs_f32()
                );
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill_and_reap(child);
                return Err(anyhow::Error::new(e).context("Failed to wait for Tesseract process"));
            }
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn read_pipe(pipe: Option<impl Read>) -> Vec<u8> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buffer);
    }
    buffer
}

fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of available languages"))
        .map(str::to_string)
        .collect()
}

fn missing_language<'a>(requested: &'a str, installed: &[String]) -> Option<&'a str> {
    requested
        .split('+')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .find(|lang| !installed.iter().any(|have| have == lang))
}
