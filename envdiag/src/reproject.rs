//! Reprojection de l'aire d'étude vers EPSG:4326
//!
//! La reprojection réelle passe par PROJ et n'est disponible qu'avec le
//! feature `reproject`. Sans lui, seule l'identité est acceptée.

use anyhow::Result;
use geo::Geometry;

/// EPSG attendu par le service WFS
pub const TARGET_EPSG: u32 = 4326;

/// Vérifie si la reprojection est disponible
pub fn is_available() -> bool {
    cfg!(feature = "reproject")
}

#[cfg(feature = "reproject")]
mod imp {
    use anyhow::{Context, Result};
    use geo::{Coord, Geometry, MapCoords};
    use proj::Proj;

    pub struct Inner {
        proj: Option<Proj>,
    }

    impl Inner {
        pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
            if source_epsg == target_epsg {
                return Ok(Self { proj: None });
            }

            let source = format!("EPSG:{}", source_epsg);
            let target = format!("EPSG:{}", target_epsg);
            // new_known_crs normalise l'ordre des axes en x=lon, y=lat
            let proj = Proj::new_known_crs(&source, &target, None).context(format!(
                "Failed to create projection from {} to {}",
                source, target
            ))?;

            Ok(Self { proj: Some(proj) })
        }

        pub fn transform(&self, geom: &Geometry) -> Result<Geometry> {
            let Some(proj) = &self.proj else {
                return Ok(geom.clone());
            };
            geom.try_map_coords(|c: Coord| {
                proj.convert((c.x, c.y)).map(|(x, y)| Coord { x, y })
            })
            .context("Coordinate transformation failed")
        }
    }
}

#[cfg(not(feature = "reproject"))]
mod imp {
    use anyhow::{bail, Result};
    use geo::Geometry;

    pub struct Inner;

    impl Inner {
        pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
            if source_epsg == target_epsg {
                Ok(Self)
            } else {
                bail!(
                    "Reprojection from EPSG:{} to EPSG:{} requires the 'reproject' feature. \
                     Build with: cargo build --features reproject",
                    source_epsg,
                    target_epsg
                )
            }
        }

        pub fn transform(&self, geom: &Geometry) -> Result<Geometry> {
            Ok(geom.clone())
        }
    }
}

/// Reprojection de géométries entre deux systèmes de coordonnées
pub struct Reprojector {
    inner: imp::Inner,
    source_epsg: u32,
    target_epsg: u32,
}

impl Reprojector {
    /// Crée un reprojector entre deux EPSG
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        Ok(Self {
            inner: imp::Inner::new(source_epsg, target_epsg)?,
            source_epsg,
            target_epsg,
        })
    }

    /// Reprojector vers le CRS du service
    pub fn to_wgs84(source_epsg: u32) -> Result<Self> {
        Self::new(source_epsg, TARGET_EPSG)
    }

    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    pub fn is_identity(&self) -> bool {
        self.source_epsg == self.target_epsg
    }

    /// Transforme une géométrie (tous les types `geo`, trous compris)
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        self.inner.transform(geom)
    }
}
