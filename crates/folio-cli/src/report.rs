// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The one-line JSON result record every command prints on stdout.

use std::path::{Path, PathBuf};

use folio_core::FolioError;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(flatten)]
    pub counters: Map<String, Value>,
}

impl Report {
    pub fn success(output: Option<&Path>) -> Self {
        Self {
            success: true,
            output: output.map(Path::to_path_buf),
            error: None,
            kind: None,
            counters: Map::new(),
        }
    }

    /// Failure record. The `kind` tag is filled in when the root cause is a
    /// `FolioError`.
    pub fn failure(err: &anyhow::Error) -> Self {
        let kind = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<FolioError>())
            .map(FolioError::kind);
        Self {
            success: false,
            output: None,
            error: Some(format!("{err:#}")),
            kind,
            counters: Map::new(),
        }
    }

    /// Attach a mode-specific counter or detail.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.counters.insert(key.to_string(), value);
        self
    }

    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!(r#"{{"success":false,"error":"cannot encode result: {err}"}}"#)
        })
    }
}
