//! Types d'erreurs pour le crate wfs-fes

use thiserror::Error;

/// Erreurs pouvant survenir lors de l'écriture ou de la relecture XML
#[derive(Debug, Error)]
pub enum FesError {
    /// Échec d'écriture d'un événement XML
    #[error("XML write error: {0}")]
    Write(String),

    /// Document XML illisible
    #[error("XML parse error at byte {position}: {reason}")]
    Parse { position: u64, reason: String },

    /// Document bien lu mais structurellement invalide (balises, racine)
    #[error("Malformed XML document: {0}")]
    Malformed(String),

    /// Sortie non UTF-8
    #[error("Invalid UTF-8 in XML output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl FesError {
    /// Crée une erreur de parsing avec la position dans le document
    pub fn parse_error(position: u64, reason: impl Into<String>) -> Self {
        Self::Parse {
            position,
            reason: reason.into(),
        }
    }
}
