//! Diagnostic: une requête WFS par couche, résultats agrégés par libellé
//!
//! Chaque couche est traitée indépendamment: l'échec de l'une n'arrête
//! jamais les suivantes. Seul un service injoignable interrompt le
//! diagnostic.

use anyhow::{Context, Result};
use geo::Geometry;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use wfs_fes::{GetFeatureRequest, SpatialFilter};

use crate::config::{Layer, LayerConfig};
use crate::wfs::{execute_query, HttpClient, QueryOutcome};

/// Valeur enregistrée quand l'aire d'étude n'intersecte pas la couche
pub const NO_MATCH_TOKEN: &str = "-";

/// Valeur enregistrée pour une réponse 200 inexploitable
pub const MALFORMED_TOKEN: &str = "malformed-response";

/// Valeur enregistrée pour une requête interrompue (délai dépassé)
pub const INTERRUPTED_TOKEN: &str = "request-error";

/// État d'une couche après le diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayerStatus {
    /// Pas encore interrogée
    Pending,
    Matched,
    NoMatch,
    Failed,
    Malformed,
    Interrupted,
}

/// Résultat d'une couche
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerResult {
    pub label: String,
    pub status: LayerStatus,
    pub values: Vec<String>,
}

/// Résultats du diagnostic, dans l'ordre de configuration des couches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    entries: Vec<LayerResult>,
}

impl AnalysisResult {
    /// Une entrée vide par libellé
    pub fn new<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entries = labels
            .into_iter()
            .map(|label| LayerResult {
                label: label.to_string(),
                status: LayerStatus::Pending,
                values: Vec::new(),
            })
            .collect();
        Self { entries }
    }

    /// Une entrée vide par couche configurée
    pub fn for_layers(config: &LayerConfig) -> Self {
        Self::new(config.layers().iter().map(|l| l.label.as_str()))
    }

    /// Enregistre l'issue d'une couche
    pub fn record(&mut self, label: &str, outcome: &QueryOutcome) {
        let index = match self.entries.iter().position(|e| e.label == label) {
            Some(i) => i,
            None => {
                self.entries.push(LayerResult {
                    label: label.to_string(),
                    status: LayerStatus::Pending,
                    values: Vec::new(),
                });
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[index];
        entry.status = status_of(outcome);
        entry.values.extend(render_outcome(outcome));
    }

    /// Valeurs d'une couche
    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.values.as_slice())
    }

    pub fn entries(&self) -> &[LayerResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nombre de couches dans un état donné
    pub fn count(&self, status: LayerStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

/// Valeurs textuelles d'une issue
pub fn render_outcome(outcome: &QueryOutcome) -> Vec<String> {
    match outcome {
        QueryOutcome::Matched(values) => values.clone(),
        QueryOutcome::NoMatch => vec![NO_MATCH_TOKEN.to_string()],
        QueryOutcome::Failed(status) => vec![status.to_string()],
        QueryOutcome::Malformed(_) => vec![MALFORMED_TOKEN.to_string()],
        QueryOutcome::Interrupted(_) => vec![INTERRUPTED_TOKEN.to_string()],
    }
}

fn status_of(outcome: &QueryOutcome) -> LayerStatus {
    match outcome {
        QueryOutcome::Matched(_) => LayerStatus::Matched,
        QueryOutcome::NoMatch => LayerStatus::NoMatch,
        QueryOutcome::Failed(_) => LayerStatus::Failed,
        QueryOutcome::Malformed(_) => LayerStatus::Malformed,
        QueryOutcome::Interrupted(_) => LayerStatus::Interrupted,
    }
}

/// Exécute le diagnostic sur un service WFS
pub struct Analyzer<'a> {
    client: &'a dyn HttpClient,
    endpoint: &'a str,
    jobs: usize,
}

impl<'a> Analyzer<'a> {
    /// Analyseur séquentiel
    pub fn new(client: &'a dyn HttpClient, endpoint: &'a str) -> Self {
        Self {
            client,
            endpoint,
            jobs: 1,
        }
    }

    /// Nombre de couches interrogées simultanément (1 = séquentiel)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Interroge chaque couche et agrège les résultats.
    ///
    /// # Errors
    ///
    /// Échoue si le service est injoignable ou si le pool de threads ne
    /// peut être créé.
    pub fn run(&self, layers: &LayerConfig, geometries: &[Option<Geometry>]) -> Result<AnalysisResult> {
        info!(
            endpoint = self.endpoint,
            layers = layers.len(),
            geometries = geometries.len(),
            jobs = self.jobs,
            "Starting diagnostic"
        );

        let outcomes: Vec<QueryOutcome> = if self.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .context("Failed to build worker pool")?;
            pool.install(|| {
                layers
                    .layers()
                    .par_iter()
                    .map(|layer| self.query_layer(layer, geometries))
                    .collect::<Result<Vec<_>>>()
            })?
        } else {
            layers
                .layers()
                .iter()
                .map(|layer| self.query_layer(layer, geometries))
                .collect::<Result<Vec<_>>>()?
        };

        // Fusion dans l'ordre de configuration
        let mut result = AnalysisResult::for_layers(layers);
        for (layer, outcome) in layers.layers().iter().zip(&outcomes) {
            result.record(&layer.label, outcome);
        }
        Ok(result)
    }

    /// Filtre → requête → exécution pour une couche
    pub fn query_layer(&self, layer: &Layer, geometries: &[Option<Geometry>]) -> Result<QueryOutcome> {
        let spec = &layer.spec;
        let filter = SpatialFilter::from_optional(&spec.geometry_field, geometries);

        if filter.is_empty() {
            warn!(
                layer = layer.label.as_str(),
                "Study area has no usable geometry, layer not queried"
            );
            return Ok(QueryOutcome::NoMatch);
        }

        let body = GetFeatureRequest::new(&spec.layer_name, &filter)
            .to_xml()
            .with_context(|| format!("Failed to encode request for layer '{}'", layer.label))?;
        debug!(
            layer = layer.label.as_str(),
            predicates = filter.predicate_count(),
            bytes = body.len(),
            "Sending GetFeature"
        );

        let outcome = execute_query(self.client, self.endpoint, &spec.attribute_of_interest, body)
            .with_context(|| format!("WFS request failed for layer '{}'", layer.label))?;

        log_outcome(&layer.label, &outcome);
        Ok(outcome)
    }
}

fn log_outcome(label: &str, outcome: &QueryOutcome) {
    match outcome {
        QueryOutcome::Matched(values) => {
            info!(layer = label, features = values.len(), "Study area intersects layer")
        }
        QueryOutcome::NoMatch => info!(layer = label, "Study area does not intersect layer"),
        QueryOutcome::Failed(status) => warn!(layer = label, status = status, "WFS request failed"),
        QueryOutcome::Malformed(reason) => {
            warn!(layer = label, reason = reason.as_str(), "Unreadable WFS response")
        }
        QueryOutcome::Interrupted(reason) => {
            warn!(layer = label, reason = reason.as_str(), "WFS request interrupted")
        }
    }
}
