//! Rapport du diagnostic
//!
//! Export CSV (défaut) ou JSON selon l'extension, et résumé console.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::analysis::{AnalysisResult, LayerStatus};

/// Séparateur des valeurs multiples dans une cellule CSV
pub const VALUE_SEPARATOR: &str = "; ";

/// En-tête du CSV
pub const CSV_HEADER: &str = "PERIMETRE,VALEUR";

/// Ligne exportée en JSON
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    perimetre: &'a str,
    valeur: &'a [String],
}

/// Rapport d'un diagnostic
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    /// Point d'accès interrogé
    pub endpoint: String,
    /// Durée du diagnostic
    pub duration_secs: f64,
    /// Résultats par couche
    pub result: AnalysisResult,
}

impl DiagnosticReport {
    pub fn new(endpoint: &str, result: AnalysisResult) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            duration_secs: 0.0,
            result,
        }
    }

    /// Définit la durée du diagnostic
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Contenu CSV: une ligne par couche, dans l'ordre de configuration
    pub fn to_csv(&self) -> String {
        let mut buf = String::with_capacity(64 * (self.result.len() + 1));
        buf.push_str(CSV_HEADER);
        buf.push('\n');
        for entry in self.result.entries() {
            push_csv_text_field(&mut buf, &entry.label);
            buf.push(',');
            push_csv_text_field(&mut buf, &entry.values.join(VALUE_SEPARATOR));
            buf.push('\n');
        }
        buf
    }

    /// Contenu JSON: `[{"perimetre": ..., "valeur": [...]}]`
    pub fn to_json(&self) -> Result<String> {
        let rows: Vec<ReportRow<'_>> = self
            .result
            .entries()
            .iter()
            .map(|e| ReportRow {
                perimetre: &e.label,
                valeur: &e.values,
            })
            .collect();
        serde_json::to_string_pretty(&rows).context("Failed to serialize report")
    }

    /// Écrit le rapport; JSON si le chemin finit par `.json`, CSV sinon
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let content = if is_json { self.to_json()? } else { self.to_csv() };
        std::fs::write(path, content)
            .context(format!("Failed to write report: {}", path.display()))?;

        info!(
            path = %path.display(),
            format = if is_json { "json" } else { "csv" },
            "Report written"
        );
        Ok(())
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("ENVIRONMENTAL DIAGNOSTIC - {}", self.endpoint);
        println!("{}", "=".repeat(60));

        println!("\nDuration: {:.2}s", self.duration_secs);
        println!("\n--- SUMMARY ---");
        println!("{}", self.summary());

        if !self.result.is_empty() {
            println!("\n--- BY LAYER ---");
            for entry in self.result.entries() {
                println!(
                    "  {:?} {}: {}",
                    entry.status,
                    entry.label,
                    entry.values.join(VALUE_SEPARATOR)
                );
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        let r = &self.result;
        format!(
            "{} layers: {} matched, {} no match, {} failed, {} malformed, {} interrupted",
            r.len(),
            r.count(LayerStatus::Matched),
            r.count(LayerStatus::NoMatch),
            r.count(LayerStatus::Failed),
            r.count(LayerStatus::Malformed),
            r.count(LayerStatus::Interrupted)
        )
    }
}

/// Champ CSV entre guillemets (RFC 4180): seuls les `"` sont doublés,
/// les retours à la ligne sont conservés tels quels
fn push_csv_text_field(buf: &mut String, value: &str) {
    buf.push('"');
    for c in value.chars() {
        if c == '"' {
            buf.push('"');
        }
        buf.push(c);
    }
    buf.push('"');
}
