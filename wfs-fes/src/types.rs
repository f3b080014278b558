//! Types et constantes du protocole WFS 2.0 / FES 2.0 / GML 3.2

use geo::Geometry;

/// Identifiant CRS porté par chaque élément GML (ordre des axes lat/lon)
pub const GML_SRS_NAME: &str = "urn:ogc:def:crs:EPSG::4326";

/// CRS demandé au niveau de la `wfs:Query`
pub const QUERY_SRS_NAME: &str = "EPSG:4326";

/// Emplacement du schéma WFS 2.0 déclaré sur `wfs:GetFeature`
pub const WFS_SCHEMA_LOCATION: &str =
    "http://www.opengis.net/wfs/2.0 http://schemas.opengis.net/wfs/2.0/wfs.xsd";

/// Espaces de noms OGC utilisés par les requêtes
pub mod ns {
    pub const WFS: &str = "http://www.opengis.net/wfs/2.0";
    pub const FES: &str = "http://www.opengis.net/fes/2.0";
    pub const GML: &str = "http://www.opengis.net/gml/3.2";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
}

/// Les six types de géométrie acceptés dans une aire d'étude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Polygon,
    MultiPolygon,
    LineString,
    MultiLineString,
    Point,
    MultiPoint,
}

impl GeometryKind {
    /// Détermine le type d'une géométrie, `None` si elle n'est pas supportée
    pub fn of(geometry: &Geometry) -> Option<Self> {
        match geometry {
            Geometry::Polygon(_) => Some(Self::Polygon),
            Geometry::MultiPolygon(_) => Some(Self::MultiPolygon),
            Geometry::LineString(_) => Some(Self::LineString),
            Geometry::MultiLineString(_) => Some(Self::MultiLineString),
            Geometry::Point(_) => Some(Self::Point),
            Geometry::MultiPoint(_) => Some(Self::MultiPoint),
            Geometry::Line(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_)
            | Geometry::GeometryCollection(_) => None,
        }
    }

    /// Forme GML produite pour chaque membre de ce type
    pub fn shape(self) -> GmlShape {
        match self {
            Self::Polygon | Self::MultiPolygon => GmlShape::Polygon,
            Self::LineString | Self::MultiLineString => GmlShape::LineString,
            Self::Point | Self::MultiPoint => GmlShape::Point,
        }
    }
}

/// Forme d'un élément GML: un membre de géométrie simple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GmlShape {
    Polygon,
    LineString,
    Point,
}

impl GmlShape {
    /// Nom qualifié de l'élément GML
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Polygon => "gml:Polygon",
            Self::LineString => "gml:LineString",
            Self::Point => "gml:Point",
        }
    }
}

/// Nom lisible du type d'une géométrie (pour les diagnostics)
pub fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, Rect};

    #[test]
    fn test_kind_of_supported() {
        let p = Geometry::Point(point!(x: 1.0, y: 2.0));
        assert_eq!(GeometryKind::of(&p), Some(GeometryKind::Point));

        let ls = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        assert_eq!(GeometryKind::of(&ls), Some(GeometryKind::LineString));
        assert_eq!(GeometryKind::LineString.shape(), GmlShape::LineString);
    }

    #[test]
    fn test_kind_of_unsupported() {
        let rect = Geometry::Rect(Rect::new((0.0, 0.0), (1.0, 1.0)));
        assert_eq!(GeometryKind::of(&rect), None);
        assert_eq!(geometry_type_name(&rect), "Rect");
    }

    #[test]
    fn test_multi_kinds_share_shape() {
        assert_eq!(GeometryKind::MultiPolygon.shape(), GmlShape::Polygon);
        assert_eq!(GeometryKind::MultiPoint.shape(), GmlShape::Point);
        assert_eq!(GmlShape::Polygon.element_name(), "gml:Polygon");
    }
}
