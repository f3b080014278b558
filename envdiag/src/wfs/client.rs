//! Abstraction du client HTTP pour la testabilité

use thiserror::Error;
use tracing::trace;

/// Échec de transport: aucune réponse HTTP exploitable n'a été obtenue
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Construction du client impossible (TLS, configuration)
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// Service injoignable (DNS, connexion refusée, TLS)
    #[error("Cannot connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Requête interrompue après connexion (délai dépassé, envoi du corps)
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Corps de réponse illisible (tronqué, décodage)
    #[error("Failed to read response from {url}: {reason}")]
    Body { url: String, reason: String },
}

impl TransportError {
    /// Vrai si le service entier est injoignable: inutile d'interroger
    /// les couches suivantes
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Client(_) | Self::Connect { .. })
    }

    /// Erreur d'envoi: seul l'échec de connexion est fatal, un délai
    /// dépassé reste propre à la requête
    fn from_send(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        let reason = error.to_string();
        if error.is_connect() {
            Self::Connect { url, reason }
        } else {
            Self::Request { url, reason }
        }
    }

    /// Erreur de lecture du corps après un statut reçu
    fn from_body(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        let reason = error.to_string();
        if error.is_timeout() {
            Self::Request { url, reason }
        } else {
            Self::Body { url, reason }
        }
    }
}

/// Réponse HTTP brute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Client HTTP synchrone.
///
/// Permet d'injecter un client factice dans les tests. Les statuts non
/// 200 sont des réponses, pas des erreurs.
pub trait HttpClient: Send + Sync {
    /// Envoie un POST `Content-Type: text/xml`.
    ///
    /// # Arguments
    ///
    /// * `url` - Point d'accès
    /// * `query` - Paramètres ajoutés à l'URL
    /// * `body` - Document XML
    fn post_xml(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, TransportError>;
}

/// Implémentation réelle avec `reqwest` (bloquant)
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

/// User-Agent envoyé au service
const USER_AGENT: &str = concat!("envdiag/", env!("CARGO_PKG_VERSION"));

impl ReqwestClient {
    /// Crée un client avec la configuration de transport par défaut
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn post_xml(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: String,
    ) -> Result<HttpResponse, TransportError> {
        trace!(url = url, bytes = body.len(), "POST");

        let response = self
            .client
            .post(url)
            .query(query)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .map_err(|e| TransportError::from_send(url, e))?;

        let status = response.status().as_u16();

        // Le corps d'un statut d'erreur n'est jamais exploité
        if status != 200 {
            return Ok(HttpResponse::new(status, Vec::new()));
        }

        let body = response
            .bytes()
            .map_err(|e| TransportError::from_body(url, e))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
