//! Registry report
//!
//! Dumps live-entry counts of every handle registry, controlled by the
//! `DYNVAL_REPORT` env var:
//! - Unset or `0` → no report
//! - `1` → human-readable to stderr
//! - `json` → JSON to stderr
//! - `json:/path` → JSON to file
//!
//! JSON output needs the `report-json` feature (enabled by default); without
//! it the human format is used.

use crate::registry::HandlePool;
use crate::runtime::Runtime;
use std::io::Write;

/// Output format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Human,
    Json,
}

/// Output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    Stderr,
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub destination: ReportDestination,
}

impl ReportConfig {
    /// Parse from the DYNVAL_REPORT environment variable
    pub fn from_env() -> Option<Self> {
        Self::parse(&std::env::var("DYNVAL_REPORT").ok()?)
    }

    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "" | "0" => None,
            "1" => Some(ReportConfig {
                format: ReportFormat::Human,
                destination: ReportDestination::Stderr,
            }),
            "json" => Some(ReportConfig {
                format: ReportFormat::Json,
                destination: ReportDestination::Stderr,
            }),
            s if s.starts_with("json:") => Some(ReportConfig {
                format: ReportFormat::Json,
                destination: ReportDestination::File(s[5..].to_string()),
            }),
            _ => {
                tracing::warn!("DYNVAL_REPORT='{}' not recognized, ignoring", val);
                None
            }
        }
    }
}

/// Live and acquired entries of one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryCounts {
    pub live: usize,
    pub acquired: usize,
}

impl RegistryCounts {
    fn of<T>(pool: &HandlePool<T>) -> Self {
        Self {
            live: pool.len(),
            acquired: pool.acquired(),
        }
    }
}

/// Snapshot of every registry of a runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportData {
    pub max_handles: usize,
    pub iterators: RegistryCounts,
    pub variants: RegistryCounts,
    pub lists: RegistryCounts,
    pub maps: RegistryCounts,
    pub linked_lists: RegistryCounts,
    pub pools: RegistryCounts,
}

impl ReportData {
    fn rows(&self) -> [(&'static str, RegistryCounts); 6] {
        [
            ("iterators", self.iterators),
            ("variants", self.variants),
            ("lists", self.lists),
            ("maps", self.maps),
            ("linked_lists", self.linked_lists),
            ("pools", self.pools),
        ]
    }
}

impl Runtime {
    pub fn report(&self) -> ReportData {
        ReportData {
            max_handles: self.config().max_handles,
            iterators: RegistryCounts::of(&self.iters),
            variants: RegistryCounts::of(&self.variants),
            lists: RegistryCounts::of(&self.lists),
            maps: RegistryCounts::of(&self.maps),
            linked_lists: RegistryCounts::of(&self.linked_lists),
            pools: RegistryCounts::of(&self.pools),
        }
    }
}

pub fn format_human(data: &ReportData) -> String {
    let mut out = String::new();
    out.push_str("=== DYNVAL REPORT ===\n");
    out.push_str(&format!("Handle limit:    {}\n", data.max_handles));
    for (name, counts) in data.rows() {
        out.push_str(&format!(
            "{:16} {} live, {} acquired\n",
            format!("{}:", name),
            counts.live,
            counts.acquired
        ));
    }
    out.push_str("=====================\n");
    out
}

#[cfg(feature = "report-json")]
pub fn format_json(data: &ReportData) -> String {
    let mut map = serde_json::Map::new();
    map.insert(
        "max_handles".into(),
        serde_json::Value::Number((data.max_handles as u64).into()),
    );
    for (name, counts) in data.rows() {
        let mut entry = serde_json::Map::new();
        entry.insert(
            "live".into(),
            serde_json::Value::Number((counts.live as u64).into()),
        );
        entry.insert(
            "acquired".into(),
            serde_json::Value::Number((counts.acquired as u64).into()),
        );
        map.insert(name.into(), serde_json::Value::Object(entry));
    }
    serde_json::to_string(&serde_json::Value::Object(map)).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(not(feature = "report-json"))]
pub fn format_json(data: &ReportData) -> String {
    tracing::warn!("DYNVAL_REPORT=json requires the 'report-json' feature, using human format");
    format_human(data)
}

/// Write the report for `runtime` if DYNVAL_REPORT asks for one
pub fn emit_report(runtime: &Runtime) {
    if let Some(config) = ReportConfig::from_env() {
        write_report(runtime, &config);
    }
}

pub fn write_report(runtime: &Runtime, config: &ReportConfig) {
    let data = runtime.report();
    let output = match config.format {
        ReportFormat::Human => format_human(&data),
        ReportFormat::Json => format_json(&data),
    };

    match &config.destination {
        ReportDestination::Stderr => {
            let _ = std::io::stderr().write_all(output.as_bytes());
        }
        ReportDestination::File(path) => {
            if let Err(e) = std::fs::write(path, output.as_bytes()) {
                tracing::warn!(path = %path, error = %e, "could not write report, using stderr");
                let _ = std::io::stderr().write_all(output.as_bytes());
            }
        }
    }
}
