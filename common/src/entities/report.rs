use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Hyperv,
    Exchange,
    S3,
    Summary,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Hyperv,
        ReportKind::Exchange,
        ReportKind::S3,
        ReportKind::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Hyperv => "hyperv",
            ReportKind::Exchange => "exchange",
            ReportKind::S3 => "s3",
            ReportKind::Summary => "summary",
        }
    }

    pub fn export_file_name(&self) -> String {
        format!("report_{}.xlsx", self.as_str())
    }
}

impl Default for ReportKind {
    fn default() -> Self {
        ReportKind::Summary
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hyperv" => Ok(ReportKind::Hyperv),
            "exchange" => Ok(ReportKind::Exchange),
            "s3" => Ok(ReportKind::S3),
            "summary" => Ok(ReportKind::Summary),
            _ => Err(anyhow::anyhow!(
                "Report kind invalid value. Accepted values are: hyperv, exchange, s3, summary"
            )),
        }
    }
}

/// One row of a report. Keys vary per report kind and are never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRow(pub Map<String, Value>);

impl ReportRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Text of a cell; a missing column or `null` gives an empty string.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(value_text).unwrap_or_default()
    }

    pub fn values(&self) -> impl Iterator<Item = String> + '_ {
        self.0.values().map(value_text)
    }

    /// `needle` must already be lowercase.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        self.values().any(|value| value.to_lowercase().contains(needle))
    }
}

impl From<Map<String, Value>> for ReportRow {
    fn from(map: Map<String, Value>) -> Self {
        ReportRow(map)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub kind: ReportKind,
    pub media_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn spreadsheet(kind: ReportKind, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            media_type: XLSX_MEDIA_TYPE,
            file_name: kind.export_file_name(),
            bytes,
        }
    }
}
