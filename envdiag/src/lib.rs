//! # envdiag
//!
//! Diagnostic environnemental d'une aire d'étude par requêtes WFS 2.0.
//!
//! ## Features
//!
//! - Une requête GetFeature (filtre FES `Intersects`) par couche configurée
//! - Agrégation des valeurs d'attribut par libellé de couche
//! - Reprojection de l'aire d'étude vers EPSG:4326 (feature `reproject`)
//! - Export CSV ou JSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # Diagnostic complet
//! envdiag run --study-area ./zone.geojson --layers ./layers.json --output diag.csv
//!
//! # Corps de requête d'une couche (sans l'envoyer)
//! envdiag request --study-area ./zone.geojson --layers ./layers.json --layer "Natura 2000"
//! ```

pub mod analysis;
pub mod config;
pub mod report;
pub mod reproject;
pub mod study_area;
pub mod wfs;

pub use analysis::{AnalysisResult, Analyzer};
pub use config::{LayerConfig, ServiceConfig};
pub use report::DiagnosticReport;
pub use study_area::StudyArea;
pub use wfs::{HttpClient, QueryOutcome, ReqwestClient};
