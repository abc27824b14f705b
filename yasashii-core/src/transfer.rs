//! Export/import documents.
//!
//! Import is field-by-field: `streak` and `progress` are overwritten when
//! present, `results` only when the document carries a `version`. Anything
//! that is not valid JSON, or whose present fields have the wrong shape, is
//! rejected as a whole so stored state is never half-written.

use serde::{Deserialize, Serialize};

use crate::{CoreError, Progress, SessionResult};

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportDocument {
    pub streak: u32,
    pub progress: Progress,
    pub results: Vec<SessionResult>,
    pub version: u32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ImportDocument {
    #[serde(default)]
    pub streak: Option<u32>,
    #[serde(default)]
    pub progress: Option<Progress>,
    #[serde(default)]
    pub results: Option<Vec<SessionResult>>,
    #[serde(default)]
    pub version: Option<u32>,
}

impl ImportDocument {
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| CoreError::ImportMalformed(e.to_string()))?;
        if !value.is_object() {
            return Err(CoreError::ImportMalformed("expected a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| CoreError::ImportMalformed(e.to_string()))
    }
}

/// The exportable part of the learner's state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub streak: u32,
    pub progress: Progress,
    pub results: Vec<SessionResult>,
}

impl Snapshot {
    pub fn export(&self) -> ExportDocument {
        ExportDocument {
            streak: self.streak,
            progress: self.progress.clone(),
            results: self.results.clone(),
            version: EXPORT_VERSION,
        }
    }

    pub fn apply(&mut self, doc: &ImportDocument) {
        if let Some(streak) = doc.streak {
            self.streak = streak;
        }
        if let Some(progress) = &doc.progress {
            self.progress = progress.clone();
        }
        if doc.version.is_some() {
            if let Some(results) = &doc.results {
                self.results = results.clone();
            }
        }
    }
}
