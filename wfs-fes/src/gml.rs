//! Construction des éléments GML 3.2

use crate::poslist::Member;
use crate::types::{GmlShape, GML_SRS_NAME};
use crate::xml::XmlElement;

/// Construit l'élément GML correspondant à une forme et son posList.
///
/// - `Polygon`: `gml:exterior/gml:LinearRing/gml:posList`
/// - `LineString`: `gml:posList` direct
/// - `Point`: `gml:pos` (un seul couple)
pub fn gml_element(shape: GmlShape, pos_list: &str) -> XmlElement {
    let pos_list = pos_list.trim();
    let root = XmlElement::new(shape.element_name()).with_attr("srsName", GML_SRS_NAME);

    match shape {
        GmlShape::Polygon => root.with_child(
            XmlElement::new("gml:exterior").with_child(
                XmlElement::new("gml:LinearRing")
                    .with_child(XmlElement::new("gml:posList").with_text(pos_list)),
            ),
        ),
        GmlShape::LineString => {
            root.with_child(XmlElement::new("gml:posList").with_text(pos_list))
        }
        GmlShape::Point => root.with_child(XmlElement::new("gml:pos").with_text(pos_list)),
    }
}

/// Raccourci pour un membre issu de [`crate::poslist::poslists`]
pub fn member_element(member: &Member) -> XmlElement {
    gml_element(member.shape, &member.pos_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_element() {
        let e = gml_element(GmlShape::Polygon, "1.000000 2.000000 3.000000 4.000000");
        assert_eq!(e.name(), "gml:Polygon");
        assert_eq!(e.attr("srsName"), Some("urn:ogc:def:crs:EPSG::4326"));

        let pos = e
            .child("gml:exterior")
            .and_then(|x| x.child("gml:LinearRing"))
            .and_then(|r| r.child("gml:posList"))
            .and_then(|p| p.text());
        assert_eq!(pos, Some("1.000000 2.000000 3.000000 4.000000"));
    }

    #[test]
    fn test_linestring_element() {
        let e = gml_element(GmlShape::LineString, " 1.0 2.0 3.0 4.0 ");
        assert_eq!(e.name(), "gml:LineString");
        assert_eq!(e.child("gml:posList").and_then(|p| p.text()), Some("1.0 2.0 3.0 4.0"));
        assert!(e.child("gml:exterior").is_none());
    }

    #[test]
    fn test_point_uses_pos() {
        let e = gml_element(GmlShape::Point, "48.864716 2.349014");
        assert_eq!(e.name(), "gml:Point");
        assert!(e.child("gml:posList").is_none());
        assert_eq!(e.child("gml:pos").and_then(|p| p.text()), Some("48.864716 2.349014"));
        assert_eq!(e.attr("srsName"), Some(GML_SRS_NAME));
    }
}
