//! Process-wide lazy handle to the recognition engine.
//!
//! The handle moves through `Uninitialized -> Initializing -> Ready | Failed`
//! exactly once. Construction runs on a blocking thread inside a detached task,
//! so a caller that gives up (timeout, dropped request) never aborts it and the
//! outcome, including a failure, is memoized for every later caller.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::OcrConfig;
use crate::error::EngineInitError;

use super::recognizer::Recognizer;
use super::tesseract::TesseractCli;

pub type EngineFactory =
    Arc<dyn Fn() -> Result<Arc<dyn Recognizer>, EngineInitError> + Send + Sync>;

type Outcome = Result<Arc<dyn Recognizer>, EngineInitError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Failed(EngineInitError),
}

impl EngineState {
    pub fn label(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initializing => "initializing",
            EngineState::Ready => "ready",
            EngineState::Failed(_) => "failed",
        }
    }
}

/// Snapshot of the handle for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub name: String,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct Inner {
    name: String,
    factory: EngineFactory,
    cell: OnceCell<Outcome>,
    initializing: AtomicBool,
}

#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Inner>,
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}

impl EngineHandle {
    pub fn new(name: impl Into<String>, factory: EngineFactory) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                factory,
                cell: OnceCell::new(),
                initializing: AtomicBool::new(false),
            }),
        }
    }

    /// Handle for the engine named by `config.engine`. Nothing is constructed
    /// until the first `acquire`.
    pub fn from_config(config: &OcrConfig) -> Self {
        let engine = config.engine.trim().to_lowercase();
        let config = config.clone();

        let factory: EngineFactory = match engine.as_str() {
            "leptess" => Arc::new(move || build_leptess(&config)),
            "tesseract" | "tesseract-cli" => Arc::new(move || {
                TesseractCli::probe(&config).map(|e| Arc::new(e) as Arc<dyn Recognizer>)
            }),
            other => {
                let reason = format!(
                    "Unknown OCR engine '{other}' (expected 'tesseract' or 'leptess')"
                );
                Arc::new(move || -> Outcome {
                    Err(EngineInitError::ConstructionFailed(reason.clone()))
                })
            }
        };

        Self::new(engine, factory)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn state(&self) -> EngineState {
        match self.inner.cell.get() {
            Some(Ok(_)) => EngineState::Ready,
            Some(Err(e)) => EngineState::Failed(e.clone()),
            None if self.inner.initializing.load(Ordering::Acquire) => EngineState::Initializing,
            None => EngineState::Uninitialized,
        }
    }

    pub fn status(&self) -> EngineStatus {
        let state = self.state();
        let error = match &state {
            EngineState::Failed(e) => Some(e.to_string()),
            _ => None,
        };
        EngineStatus {
            name: self.inner.name.clone(),
            state: state.label(),
            error,
        }
    }

    /// Returns the memoized engine, constructing it on first use.
    pub async fn acquire(&self) -> Outcome {
        if let Some(outcome) = self.inner.cell.get() {
            return outcome.clone();
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.initialize().await })
            .await
            .map_err(|e| {
                EngineInitError::ConstructionFailed(format!(
                    "engine initialization task failed: {e}"
                ))
            })?
    }

    /// Eagerly starts initialization in the background.
    pub fn warm_up(&self) {
        let handle = self.clone();
        tokio::spawn(async move {
            let _ = handle.acquire().await;
        });
    }
}

impl Inner {
    async fn initialize(&self) -> Outcome {
        self.cell
            .get_or_init(|| async {
                self.initializing.store(true, Ordering::Release);
                info!(engine = %self.name, "Initializing OCR engine...");
                let started = Instant::now();

                let factory = Arc::clone(&self.factory);
                let outcome = match tokio::task::spawn_blocking(move || factory()).await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(EngineInitError::ConstructionFailed(format!(
                        "engine construction panicked: {e}"
                    ))),
                };

                match &outcome {
                    Ok(recognizer) => info!(
                        engine = %recognizer.name(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "OCR engine ready"
                    ),
                    Err(e) => error!(
                        engine = %self.name,
                        error = %e,
                        "OCR engine initialization failed; failure is memoized until restart"
                    ),
                }
                outcome
            })
            .await
            .clone()
    }
}

#[cfg(feature = "leptess")]
fn build_leptess(config: &OcrConfig) -> Outcome {
    super::leptess::LeptessRecognizer::new(config).map(|e| Arc::new(e) as Arc<dyn Recognizer>)
}

#[cfg(not(feature = "leptess"))]
fn build_leptess(_config: &OcrConfig) -> Outcome {
    Err(EngineInitError::ConstructionFailed(
        "pixtext was built without the `leptess` feature".to_string(),
    ))
}
