use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One recognized text span as reported by the engine.
///
/// Only built through [`Detection::new`], so the confidence is always within
/// `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    text: String,
    confidence: f32,
}

impl Detection {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            text: text.into(),
            confidence,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// How detection texts are stitched into the aggregate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Texts joined verbatim by a single space.
    #[default]
    SpaceJoined,
    /// Each text trimmed, blank ones dropped, joined by newlines.
    LineCleaned,
}

impl FromStr for JoinPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "space" | "space_joined" | "spacejoined" => Ok(JoinPolicy::SpaceJoined),
            "lines" | "line_cleaned" | "linecleaned" => Ok(JoinPolicy::LineCleaned),
            other => Err(format!(
                "unknown join policy '{other}' (expected 'space' or 'lines')"
            )),
        }
    }
}

impl fmt::Display for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinPolicy::SpaceJoined => write!(f, "space_joined"),
            JoinPolicy::LineCleaned => write!(f, "line_cleaned"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub detections: Vec<Detection>,
    pub text: String,
    /// Mean detection confidence; 0 when nothing was detected.
    pub confidence: f32,
}

impl ExtractionResult {
    pub fn assemble(detections: Vec<Detection>, policy: JoinPolicy) -> Self {
        let text = match policy {
            JoinPolicy::SpaceJoined => detections
                .iter()
                .map(Detection::text)
                .collect::<Vec<_>>()
                .join(" "),
            JoinPolicy::LineCleaned => detections
                .iter()
                .map(|d| d.text().trim())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        };

        let confidence = if detections.is_empty() {
            0.0
        } else {
            detections.iter().map(Detection::confidence).sum::<f32>() / detections.len() as f32
        };

        Self {
            detections,
            text,
            confidence,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
