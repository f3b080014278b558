//! # wfs-fes
//!
//! Encodage des requêtes WFS 2.0 `GetFeature` filtrées spatialement
//! (OGC Filter Encoding 2.0 + GML 3.2).
//!
//! ## Features
//!
//! - Extraction des posList en ordre lat/lon, 6 décimales (EPSG:4326)
//! - Polygon, MultiPolygon, LineString, MultiLineString, Point, MultiPoint
//! - Un `fes:Intersects` par membre, tous réunis dans un `fes:Or`
//! - Arbre XML immuable, sérialisation et relecture avec `quick-xml`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wfs_fes::{GetFeatureRequest, SpatialFilter};
//!
//! let filter = SpatialFilter::from_optional("the_geom", &study_area);
//! let body = GetFeatureRequest::new("PROTECTEDAREAS.ZNIEFF1:znieff1", &filter).to_xml()?;
//! ```

pub mod error;
pub mod filter;
pub mod gml;
pub mod poslist;
pub mod request;
pub mod types;
pub mod xml;

pub use error::FesError;
pub use filter::SpatialFilter;
pub use poslist::{poslists, Member, PosLists};
pub use request::GetFeatureRequest;
pub use types::{GeometryKind, GmlShape};
pub use xml::{XmlElement, XmlNode};

use geo::Geometry;

/// Construit directement le corps POST d'une requête `GetFeature`.
///
/// # Arguments
///
/// * `type_name` - Nom de la couche côté serveur (`typeNames`)
/// * `geometry_field` - Champ géométrique référencé par les prédicats
/// * `geometries` - Géométries de l'aire d'étude, en EPSG:4326
///
/// # Errors
///
/// Retourne `FesError` si la sérialisation XML échoue.
pub fn get_feature_body(
    type_name: &str,
    geometry_field: &str,
    geometries: &[Option<Geometry>],
) -> Result<String, FesError> {
    let filter = SpatialFilter::from_optional(geometry_field, geometries);
    GetFeatureRequest::new(type_name, &filter).to_xml()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::point;

    #[test]
    fn test_get_feature_body() {
        let geoms = vec![Some(Geometry::Point(point!(x: 5.0, y: 45.0))), None];
        let body = get_feature_body("layer", "geom", &geoms).unwrap();
        assert!(body.contains(r#"typeNames="layer""#));
        assert!(body.contains("<gml:pos>45.000000 5.000000</gml:pos>"));
    }
}
