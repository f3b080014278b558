//! Définition et implémentation des commandes CLI
//!
//! - `run`: diagnostic complet, export CSV/JSON
//! - `request`: affiche le corps GetFeature d'une couche sans l'envoyer

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use geo::Geometry;
use tracing::{info, warn};

use envdiag::config::{resolve_wfs_url, Layer, LayerConfig};
use envdiag::{Analyzer, DiagnosticReport, ReqwestClient, StudyArea};

#[derive(Subcommand)]
pub enum Commands {
    /// Query every configured layer and export the intersected values
    Run(RunArgs),

    /// Print the GetFeature POST body for one layer (nothing is sent)
    Request(RequestArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Study area: GeoJSON, or any OGR vector dataset (Shapefile...) with the `ogr` feature
    #[arg(short, long)]
    pub study_area: PathBuf,

    /// Layer configuration (JSON object: label → layer definition)
    #[arg(short, long)]
    pub layers: PathBuf,

    /// Service configuration (JSON: {"wfs_url": "..."})
    #[arg(long)]
    pub services: Option<PathBuf>,

    /// WFS endpoint (défaut : env WFS_URL, puis --services)
    #[arg(long)]
    pub wfs_url: Option<String>,

    /// EPSG code of the study area (défaut : CRS du fichier, sinon 4326)
    #[arg(long)]
    pub source_srid: Option<u32>,

    /// Output file, JSON if it ends with .json, CSV otherwise
    #[arg(short, long, default_value = "diagnostic.csv")]
    pub output: PathBuf,

    /// Maximum number of layers queried concurrently
    #[arg(long, alias = "threads")]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct RequestArgs {
    /// Study area: GeoJSON, or any OGR vector dataset (Shapefile...) with the `ogr` feature
    #[arg(short, long)]
    pub study_area: PathBuf,

    /// Layer configuration (JSON object: label → layer definition)
    #[arg(short, long)]
    pub layers: PathBuf,

    /// Label of the layer to encode
    #[arg(long)]
    pub layer: String,

    /// EPSG code of the study area (défaut : CRS du fichier, sinon 4326)
    #[arg(long)]
    pub source_srid: Option<u32>,
}

/// Exécute la commande run
pub fn cmd_run(args: &RunArgs) -> Result<()> {
    let start = Instant::now();

    let layers = LayerConfig::load(&args.layers)?;
    let endpoint = resolve_wfs_url(args.wfs_url.clone(), args.services.as_deref())?;
    let area = load_study_area(&args.study_area, args.source_srid)?;
    info!(
        endpoint = %endpoint,
        layers = layers.len(),
        geometries = area.non_null_count(),
        "Configuration loaded"
    );

    let client = ReqwestClient::new()?;
    let result = Analyzer::new(&client, &endpoint)
        .with_jobs(args.jobs.unwrap_or(1))
        .run(&layers, &area.geometries)?;

    let mut report = DiagnosticReport::new(&endpoint, result);
    report.set_duration(start.elapsed());
    report.save_to_file(&args.output)?;
    report.display();

    info!(
        summary = %report.summary(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Diagnostic terminé"
    );
    Ok(())
}

/// Exécute la commande request
pub fn cmd_request(args: &RequestArgs) -> Result<()> {
    let layers = LayerConfig::load(&args.layers)?;
    let layer = find_layer(&layers, &args.layer)?;
    let area = load_study_area(&args.study_area, args.source_srid)?;

    println!("{}", request_body(layer, &area.geometries)?);
    Ok(())
}

/// Charge l'aire d'étude et la ramène en EPSG:4326
fn load_study_area(path: &Path, source_srid: Option<u32>) -> Result<StudyArea> {
    let area = StudyArea::load(path, source_srid)?.into_wgs84()?;
    if area.non_null_count() == 0 {
        warn!(path = %path.display(), "Study area has no geometry, no layer will be queried");
    }
    Ok(area)
}

fn find_layer<'a>(layers: &'a LayerConfig, label: &str) -> Result<&'a Layer> {
    layers.get(label).ok_or_else(|| {
        let known: Vec<_> = layers.layers().iter().map(|l| l.label.as_str()).collect();
        anyhow!("Unknown layer '{}' (available: {})", label, known.join(", "))
    })
}

/// Corps XML GetFeature d'une couche
fn request_body(layer: &Layer, geometries: &[Option<Geometry>]) -> Result<String> {
    let spec = &layer.spec;
    wfs_fes::get_feature_body(&spec.layer_name, &spec.geometry_field, geometries)
        .with_context(|| format!("Failed to encode request for layer '{}'", layer.label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn layers() -> LayerConfig {
        LayerConfig::from_json(
            r#"{
                "Natura 2000": {"layer_name": "patrinat:n2k", "geometry_field": "the_geom", "attribute_of_interest": "sitename"},
                "PPRI": {"layer_name": "ppri", "geometry_key": "geom", "interested_column": "zone"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_layer() {
        let layers = layers();
        assert_eq!(find_layer(&layers, "PPRI").unwrap().spec.layer_name, "ppri");

        let err = find_layer(&layers, "ZNIEFF").unwrap_err().to_string();
        assert!(err.contains("ZNIEFF"));
        assert!(err.contains("Natura 2000, PPRI"));
    }

    #[test]
    fn test_request_body() {
        let layers = layers();
        let layer = find_layer(&layers, "Natura 2000").unwrap();
        let area = vec![Some(Geometry::Polygon(polygon![
            (x: 5.0, y: 45.0),
            (x: 5.1, y: 45.0),
            (x: 5.1, y: 45.1),
            (x: 5.0, y: 45.0),
        ]))];

        let body = request_body(layer, &area).unwrap();
        assert!(body.starts_with("<?xml"));
        assert!(body.contains(r#"typeNames="patrinat:n2k""#));
        assert!(body.contains("<fes:ValueReference>the_geom</fes:ValueReference>"));
        assert!(body.contains("45.000000 5.000000 45.000000 5.100000"));
    }

    #[test]
    fn test_load_study_area_file() {
        let path = std::env::temp_dir().join("envdiag_test_study_area.geojson");
        std::fs::write(&path, r#"{"type": "Point", "coordinates": [2.35, 48.85]}"#).unwrap();

        let area = load_study_area(&path, None).unwrap();
        assert_eq!(area.epsg, 4326);
        assert_eq!(area.non_null_count(), 1);

        std::fs::remove_file(path).ok();
    }
}
