//! Configuration des couches environnementales et du service WFS

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Variable d'environnement surchargeant l'URL du service
pub const WFS_URL_ENV: &str = "WFS_URL";

/// Une couche environnementale interrogeable
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LayerSpec {
    /// Nom du type d'objet côté serveur (`typeNames`)
    pub layer_name: String,

    /// Champ géométrique référencé par le filtre spatial
    #[serde(alias = "geometry_key")]
    pub geometry_field: String,

    /// Colonne dont on extrait les valeurs en cas d'intersection
    #[serde(alias = "interested_column")]
    pub attribute_of_interest: String,
}

/// Couche associée à son libellé
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub label: String,
    pub spec: LayerSpec,
}

/// Ensemble ordonné des couches, dans l'ordre du fichier
#[derive(Debug, Clone, Default)]
pub struct LayerConfig {
    layers: Vec<Layer>,
}

impl LayerConfig {
    /// Charge une configuration depuis un fichier JSON `{libellé: {...}}`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read layer config: {}", path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Invalid layer config: {}", path.display()))
    }

    /// Parse le JSON des couches en conservant l'ordre des clés
    pub fn from_json(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).context("Failed to parse layer config JSON")?;

        let mut layers = Vec::with_capacity(map.len());
        for (label, value) in map {
            let spec: LayerSpec = serde_json::from_value(value)
                .with_context(|| format!("Invalid definition for layer '{}'", label))?;
            layers.push(Layer { label, spec });
        }

        if layers.is_empty() {
            bail!("Layer config defines no layer");
        }

        Ok(Self { layers })
    }

    pub fn from_layers(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Récupère une couche par son libellé
    pub fn get(&self, label: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.label == label)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Fichier de configuration du service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Point d'accès WFS (POST)
    pub wfs_url: String,
}

impl ServiceConfig {
    /// Charge `{"wfs_url": "..."}` depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read service config: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse service config JSON")
    }
}

/// Résout l'URL du service: argument CLI, puis `WFS_URL`, puis fichier
pub fn resolve_wfs_url(cli_url: Option<String>, services_file: Option<&Path>) -> Result<String> {
    if let Some(url) = cli_url {
        return Ok(url);
    }
    if let Ok(url) = std::env::var(WFS_URL_ENV) {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }
    match services_file {
        Some(path) => Ok(ServiceConfig::load(path)?.wfs_url),
        None => bail!(
            "No WFS endpoint: use --wfs-url, set {} or provide --services",
            WFS_URL_ENV
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_config_keeps_file_order() {
        let json = r#"{
            "ZNIEFF 2": {"layer_name": "z2", "geometry_field": "geom", "attribute_of_interest": "nom"},
            "Natura 2000": {"layer_name": "n2k", "geometry_field": "geom", "attribute_of_interest": "sitename"},
            "Arrêtés biotope": {"layer_name": "apb", "geometry_field": "the_geom", "attribute_of_interest": "nom"}
        }"#;
        let config = LayerConfig::from_json(json).unwrap();
        let labels: Vec<_> = config.layers().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["ZNIEFF 2", "Natura 2000", "Arrêtés biotope"]);
        assert_eq!(config.get("Natura 2000").unwrap().spec.layer_name, "n2k");
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let json = r#"{
            "PPRI": {"layer_name": "ppri", "geometry_key": "the_geom", "interested_column": "zone"}
        }"#;
        let config = LayerConfig::from_json(json).unwrap();
        let spec = &config.layers()[0].spec;
        assert_eq!(spec.geometry_field, "the_geom");
        assert_eq!(spec.attribute_of_interest, "zone");
    }

    #[test]
    fn test_invalid_layer_configs() {
        assert!(LayerConfig::from_json("{}").is_err());
        assert!(LayerConfig::from_json("[]").is_err());
        assert!(LayerConfig::from_json(r#"{"X": {"layer_name": "x"}}"#).is_err());
    }

    #[test]
    fn test_resolve_wfs_url_prefers_cli() {
        let url = resolve_wfs_url(Some("https://example.org/wfs".into()), None).unwrap();
        assert_eq!(url, "https://example.org/wfs");
    }

    #[test]
    fn test_service_config_file() {
        let path = std::env::temp_dir().join("envdiag_test_services.json");
        std::fs::write(&path, r#"{"wfs_url": "https://data.geopf.fr/wfs/ows"}"#).unwrap();

        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.wfs_url, "https://data.geopf.fr/wfs/ows");

        std::fs::remove_file(path).ok();
    }
}
