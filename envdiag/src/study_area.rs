//! Chargement de l'aire d'étude et passage en EPSG:4326
//!
//! Le GeoJSON est lu avec `geojson`. Les autres formats vectoriels
//! (Shapefile, GeoPackage...) passent par GDAL/OGR et ne sont disponibles
//! qu'avec le feature `ogr`.

use std::path::Path;

use anyhow::{Context, Result};
use geo::Geometry;
use geojson::{GeoJson, JsonObject};
use tracing::{debug, info};

use crate::reproject::{Reprojector, TARGET_EPSG};

/// Géométries de l'aire d'étude, une entrée par entité source
#[derive(Debug, Clone, PartialEq)]
pub struct StudyArea {
    /// `None` pour une entité sans géométrie
    pub geometries: Vec<Option<Geometry>>,

    /// EPSG des coordonnées
    pub epsg: u32,
}

impl StudyArea {
    /// Charge l'aire d'étude depuis un fichier.
    ///
    /// `.geojson`/`.json`: FeatureCollection, Feature ou Geometry. Tout
    /// autre fichier est ouvert avec OGR (première couche).
    ///
    /// `source_epsg` force le CRS source; sinon celui du fichier est
    /// utilisé (membre `crs` du GeoJSON, `.prj` d'un Shapefile), et à
    /// défaut EPSG:4326.
    pub fn load(path: &Path, source_epsg: Option<u32>) -> Result<Self> {
        let area = if is_geojson(path) {
            let content = std::fs::read_to_string(path)
                .context(format!("Failed to read study area: {}", path.display()))?;
            Self::from_geojson_str(&content, source_epsg)
                .with_context(|| format!("Invalid study area: {}", path.display()))?
        } else {
            let (geometries, file_epsg) = ogr::read(path)?;
            Self {
                geometries,
                epsg: source_epsg.or(file_epsg).unwrap_or(TARGET_EPSG),
            }
        };

        info!(
            path = %path.display(),
            features = area.geometries.len(),
            epsg = area.epsg,
            "Study area loaded"
        );
        Ok(area)
    }

    /// Parse un document GeoJSON
    pub fn from_geojson_str(content: &str, source_epsg: Option<u32>) -> Result<Self> {
        let geojson: GeoJson = content.parse().context("Failed to parse GeoJSON")?;

        let (geometries, foreign) = match geojson {
            GeoJson::FeatureCollection(fc) => {
                let geometries = fc
                    .features
                    .into_iter()
                    .map(|f| f.geometry.map(convert_geometry).transpose())
                    .collect::<Result<Vec<_>>>()?;
                (geometries, fc.foreign_members)
            }
            GeoJson::Feature(f) => (
                vec![f.geometry.map(convert_geometry).transpose()?],
                f.foreign_members,
            ),
            GeoJson::Geometry(g) => {
                let foreign = g.foreign_members.clone();
                (vec![Some(convert_geometry(g)?)], foreign)
            }
        };

        let epsg = source_epsg
            .or_else(|| foreign.as_ref().and_then(crs_from_members))
            .unwrap_or(TARGET_EPSG);

        Ok(Self { geometries, epsg })
    }

    /// Retourne l'aire d'étude en EPSG:4326, reprojetée si nécessaire
    pub fn into_wgs84(self) -> Result<Self> {
        if self.epsg == TARGET_EPSG {
            return Ok(self);
        }

        let reprojector = Reprojector::to_wgs84(self.epsg)?;
        debug!(
            source = reprojector.source_epsg(),
            target = reprojector.target_epsg(),
            "Reprojecting study area"
        );

        let geometries = self
            .geometries
            .iter()
            .map(|g| {
                g.as_ref()
                    .map(|g| reprojector.transform_geometry(g))
                    .transpose()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            geometries,
            epsg: TARGET_EPSG,
        })
    }

    /// Nombre d'entités avec géométrie
    pub fn non_null_count(&self) -> usize {
        self.geometries.iter().filter(|g| g.is_some()).count()
    }
}

fn is_geojson(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("geojson") || e.eq_ignore_ascii_case("json"))
}

/// Lecture OGR (Shapefile, GeoPackage...): géométries de la première
/// couche et EPSG déclaré par le jeu de données
#[cfg(feature = "ogr")]
mod ogr {
    use std::path::Path;

    use anyhow::{Context, Result};
    use gdal::errors::GdalError;
    use gdal::spatial_ref::SpatialRef;
    use gdal::vector::LayerAccess;
    use gdal::Dataset;
    use geo::Geometry;
    use tracing::{debug, warn};

    pub fn read(path: &Path) -> Result<(Vec<Option<Geometry>>, Option<u32>)> {
        let dataset = Dataset::open(path)
            .context(format!("Failed to open study area: {}", path.display()))?;

        let layer_count = dataset.layer_count();
        if layer_count > 1 {
            warn!(
                path = %path.display(),
                layers = layer_count,
                "Dataset has several layers, only the first one is read"
            );
        }

        let mut layer = dataset
            .layer(0)
            .context(format!("No vector layer in {}", path.display()))?;
        let epsg = layer.spatial_ref().and_then(epsg_of);

        let geometries = layer
            .features()
            .map(|feature| feature.geometry().map(|g| g.to_geo()).transpose())
            .collect::<Result<Vec<_>, GdalError>>()
            .context(format!("Unsupported geometry in {}", path.display()))?;

        debug!(
            path = %path.display(),
            features = geometries.len(),
            epsg = ?epsg,
            "OGR layer read"
        );
        Ok((geometries, epsg))
    }

    /// Code EPSG d'un CRS; un `.prj` ESRI sans autorité est identifié par GDAL
    fn epsg_of(mut srs: SpatialRef) -> Option<u32> {
        if let Ok(code) = srs.auth_code() {
            return u32::try_from(code).ok();
        }
        srs.auto_identify_epsg().ok()?;
        srs.auth_code().ok().and_then(|code| u32::try_from(code).ok())
    }
}

#[cfg(not(feature = "ogr"))]
mod ogr {
    use std::path::Path;

    use anyhow::{bail, Result};
    use geo::Geometry;

    pub fn read(path: &Path) -> Result<(Vec<Option<Geometry>>, Option<u32>)> {
        bail!(
            "Reading {} requires the 'ogr' feature (GDAL); only GeoJSON is built in. \
             Build with: cargo build --features ogr",
            path.display()
        )
    }
}

fn convert_geometry(geometry: geojson::Geometry) -> Result<Geometry> {
    Geometry::<f64>::try_from(geometry).context("Unsupported GeoJSON geometry")
}

/// Lit le membre historique `"crs": {"type": "name", "properties": {"name": ...}}`
fn crs_from_members(members: &JsonObject) -> Option<u32> {
    let name = members
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;
    parse_crs_name(name)
}

/// Extrait le code EPSG d'un nom de CRS.
///
/// Formes reconnues: `EPSG:2154`, `urn:ogc:def:crs:EPSG::2154`,
/// `urn:ogc:def:crs:EPSG:6.6:2154`, `urn:ogc:def:crs:OGC:1.3:CRS84`.
pub fn parse_crs_name(name: &str) -> Option<u32> {
    let name = name.trim();
    if name.ends_with("CRS84") {
        return Some(TARGET_EPSG);
    }
    let upper = name.to_ascii_uppercase();
    if !upper.contains("EPSG") {
        return None;
    }
    name.rsplit(':').next()?.parse().ok()
}
