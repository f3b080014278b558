//! Exécution d'une requête GetFeature et classification de la réponse

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::client::{HttpClient, HttpResponse, TransportError};

/// Paramètre d'URL demandant une réponse GeoJSON
pub const OUTPUT_FORMAT: (&str, &str) = ("outputFormat", "application/json");

/// Issue d'une requête pour une couche
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Intersection: valeurs de l'attribut, dans l'ordre des entités
    Matched(Vec<String>),
    /// Aucune entité intersectée
    NoMatch,
    /// Statut HTTP autre que 200
    Failed(u16),
    /// Statut 200 mais corps inexploitable (illisible, tronqué, non GeoJSON)
    Malformed(String),
    /// Requête interrompue pour cette couche seule (délai dépassé)
    Interrupted(String),
}

impl QueryOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Collection d'entités renvoyée par le service
#[derive(Debug, Deserialize)]
struct FeatureCollectionBody {
    features: Vec<WfsFeature>,
}

#[derive(Debug, Deserialize)]
struct WfsFeature {
    #[serde(default)]
    geometry: Option<geojson::Geometry>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
}

/// Envoie la requête et classe la réponse.
///
/// # Errors
///
/// Seul un service injoignable ([`TransportError::is_fatal`]) est une
/// erreur. Tout statut reçu, un corps illisible ou un délai dépassé sont
/// classés en [`QueryOutcome`] pour la couche concernée.
pub fn execute_query(
    client: &dyn HttpClient,
    endpoint: &str,
    attribute: &str,
    body: String,
) -> Result<QueryOutcome, TransportError> {
    match client.post_xml(endpoint, &[OUTPUT_FORMAT], body) {
        Ok(response) => Ok(classify_response(&response, attribute)),
        Err(e) if e.is_fatal() => Err(e),
        Err(TransportError::Body { reason, .. }) => Ok(QueryOutcome::Malformed(reason)),
        Err(e) => {
            warn!(endpoint = endpoint, error = %e, "Request interrupted");
            Ok(QueryOutcome::Interrupted(e.to_string()))
        }
    }
}

/// Classe une réponse HTTP
pub fn classify_response(response: &HttpResponse, attribute: &str) -> QueryOutcome {
    if response.status != 200 {
        return QueryOutcome::Failed(response.status);
    }

    let collection: FeatureCollectionBody = match serde_json::from_slice(&response.body) {
        Ok(c) => c,
        Err(e) => return QueryOutcome::Malformed(e.to_string()),
    };

    if collection.features.is_empty() {
        return QueryOutcome::NoMatch;
    }

    let with_geometry = collection
        .features
        .iter()
        .filter(|f| f.geometry.is_some())
        .count();
    let mut missing = 0usize;

    let values = collection
        .features
        .iter()
        .map(|f| {
            let value = f.properties.as_ref().and_then(|p| p.get(attribute));
            if value.is_none() {
                missing += 1;
            }
            render_value(value)
        })
        .collect::<Vec<_>>();

    if missing > 0 {
        warn!(
            attribute = attribute,
            missing = missing,
            features = values.len(),
            "Attribute missing on some features"
        );
    }
    debug!(
        features = values.len(),
        with_geometry = with_geometry,
        "Features extracted"
    );

    QueryOutcome::Matched(values)
}

/// Valeur d'attribut en texte: chaîne telle quelle, `null`/absent vide
fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
