//! Extraction des posList GML depuis les géométries `geo`
//!
//! Le CRS cible (urn:ogc:def:crs:EPSG::4326) déclare l'ordre des axes
//! latitude puis longitude: chaque couple est donc écrit `y x`, avec
//! exactement 6 décimales. Une erreur ici ne provoque aucune erreur
//! côté serveur, seulement des intersections fausses.

use std::slice;

use geo::{Coord, Geometry, LineString, Point, Polygon};
use tracing::warn;

use crate::types::{geometry_type_name, GmlShape};

/// Un membre de géométrie prêt à être encodé en GML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Forme GML du membre
    pub shape: GmlShape,

    /// Coordonnées `lat lon lat lon ...`
    pub pos_list: String,
}

/// Formate une coordonnée en `lat lon` à 6 décimales
pub fn format_position(coord: Coord) -> String {
    format!("{:.6} {:.6}", coord.y, coord.x)
}

/// Formate une suite de coordonnées en posList
pub fn format_pos_list<I>(coords: I) -> String
where
    I: IntoIterator<Item = Coord>,
{
    let mut out = String::new();
    for coord in coords {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format_position(coord));
    }
    out
}

/// Itérateur paresseux des membres d'une géométrie.
///
/// Clonable: un clone repart de la position courante, un nouvel appel à
/// [`poslists`] repart du début.
#[derive(Debug, Clone)]
pub struct PosLists<'a> {
    parts: Parts<'a>,
}

#[derive(Debug, Clone)]
enum Parts<'a> {
    Nothing,
    Polygons(slice::Iter<'a, Polygon>),
    Lines(slice::Iter<'a, LineString>),
    Points(slice::Iter<'a, Point>),
}

/// Décompose une géométrie en posLists, un par membre.
///
/// Les types hors des six supportés produisent une séquence vide et un
/// avertissement. Les membres vides (anneau ou ligne sans sommet) sont
/// ignorés silencieusement.
pub fn poslists(geometry: &Geometry) -> PosLists<'_> {
    let parts = match geometry {
        Geometry::Polygon(p) => Parts::Polygons(slice::from_ref(p).iter()),
        Geometry::MultiPolygon(mp) => Parts::Polygons(mp.0.iter()),
        Geometry::LineString(ls) => Parts::Lines(slice::from_ref(ls).iter()),
        Geometry::MultiLineString(mls) => Parts::Lines(mls.0.iter()),
        Geometry::Point(p) => Parts::Points(slice::from_ref(p).iter()),
        Geometry::MultiPoint(mp) => Parts::Points(mp.0.iter()),
        unsupported @ (Geometry::Line(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_)
        | Geometry::GeometryCollection(_)) => {
            warn!(
                geometry_type = geometry_type_name(unsupported),
                "Unsupported geometry type, skipped"
            );
            Parts::Nothing
        }
    };
    PosLists { parts }
}

impl Iterator for PosLists<'_> {
    type Item = Member;

    fn next(&mut self) -> Option<Member> {
        loop {
            match &mut self.parts {
                Parts::Nothing => return None,
                Parts::Polygons(it) => {
                    // Anneau extérieur uniquement, fermeture conservée telle quelle
                    let ring = it.next()?.exterior();
                    if ring.0.is_empty() {
                        continue;
                    }
                    return Some(Member {
                        shape: GmlShape::Polygon,
                        pos_list: format_pos_list(ring.coords().copied()),
                    });
                }
                Parts::Lines(it) => {
                    let line = it.next()?;
                    if line.0.is_empty() {
                        continue;
                    }
                    return Some(Member {
                        shape: GmlShape::LineString,
                        pos_list: format_pos_list(line.coords().copied()),
                    });
                }
                Parts::Points(it) => {
                    let point = it.next()?;
                    return Some(Member {
                        shape: GmlShape::Point,
                        pos_list: format_position(point.0),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeometryKind;
    use geo::{
        coord, line_string, point, polygon, GeometryCollection, Line, MultiLineString,
        MultiPoint, MultiPolygon, Rect, Triangle,
    };

    #[test]
    fn test_point_axis_order_and_precision() {
        let geom = Geometry::Point(point!(x: 2.349014, y: 48.864716));
        let members: Vec<_> = poslists(&geom).collect();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].shape, GmlShape::Point);
        assert_eq!(members[0].pos_list, "48.864716 2.349014");
    }

    #[test]
    fn test_rounding_to_six_decimals() {
        let geom = Geometry::Point(point!(x: 1.0, y: -0.12345678));
        let member = poslists(&geom).next().unwrap();
        assert_eq!(member.pos_list, "-0.123457 1.000000");
    }

    #[test]
    fn test_polygon_keeps_closing_vertex() {
        let geom = Geometry::Polygon(polygon![
            (x: 2.0, y: 48.0),
            (x: 3.0, y: 48.0),
            (x: 3.0, y: 49.0),
            (x: 2.0, y: 48.0),
        ]);
        let members: Vec<_> = poslists(&geom).collect();
        assert_eq!(members.len(), 1);
        assert_eq!(
            members[0].pos_list,
            "48.000000 2.000000 48.000000 3.000000 49.000000 3.000000 48.000000 2.000000"
        );
        assert!(!members[0].pos_list.starts_with(' '));
        assert!(!members[0].pos_list.ends_with(' '));
    }

    #[test]
    fn test_polygon_holes_are_ignored() {
        let geom = Geometry::Polygon(polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 0.0),
            ],
            interiors: [[
                (x: 1.0, y: 1.0),
                (x: 2.0, y: 1.0),
                (x: 2.0, y: 2.0),
                (x: 1.0, y: 1.0),
            ]]
        ));
        let members: Vec<_> = poslists(&geom).collect();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].pos_list.split(' ').count(), 8);
    }

    #[test]
    fn test_multi_geometries_yield_one_member_per_part() {
        let mp = Geometry::MultiPoint(MultiPoint::new(vec![
            point!(x: 1.0, y: 2.0),
            point!(x: 3.0, y: 4.0),
        ]));
        let pos: Vec<_> = poslists(&mp).map(|m| m.pos_list).collect();
        assert_eq!(pos, vec!["2.000000 1.000000", "4.000000 3.000000"]);

        let mls = Geometry::MultiLineString(MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)],
            line_string![(x: 5.0, y: 5.0), (x: 6.0, y: 6.0), (x: 7.0, y: 5.0)],
        ]));
        let members: Vec<_> = poslists(&mls).collect();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.shape == GmlShape::LineString));

        let mpoly = Geometry::MultiPolygon(MultiPolygon::new(vec![
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
            polygon![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0)],
        ]));
        assert_eq!(poslists(&mpoly).count(), 2);
    }

    #[test]
    fn test_empty_geometries_yield_nothing() {
        let empty_multi = Geometry::MultiPolygon(MultiPolygon::new(vec![]));
        assert_eq!(poslists(&empty_multi).count(), 0);

        let empty_line = Geometry::LineString(LineString::new(vec![]));
        assert_eq!(poslists(&empty_line).count(), 0);

        let empty_poly = Geometry::Polygon(Polygon::new(LineString::new(vec![]), vec![]));
        assert_eq!(poslists(&empty_poly).count(), 0);
    }

    #[test]
    fn test_unsupported_geometry_yields_nothing() {
        let gc = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
            Geometry::Point(point!(x: 1.0, y: 1.0)),
        ]));
        assert_eq!(poslists(&gc).count(), 0);

        let line = Geometry::Line(Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }));
        let rect = Geometry::Rect(Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }));
        let triangle = Geometry::Triangle(Triangle::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.0 },
            coord! { x: 0.0, y: 1.0 },
        ));
        for geom in [line, rect, triangle] {
            assert!(GeometryKind::of(&geom).is_none());
            assert_eq!(poslists(&geom).count(), 0);
        }
    }

    #[test]
    fn test_member_shape_matches_geometry_kind() {
        let geoms = vec![
            Geometry::Point(point!(x: 1.0, y: 2.0)),
            Geometry::MultiPoint(MultiPoint::new(vec![point!(x: 1.0, y: 2.0)])),
            Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
            Geometry::MultiLineString(MultiLineString::new(vec![
                line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)],
            ])),
            Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]),
            Geometry::MultiPolygon(MultiPolygon::new(vec![
                polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
            ])),
        ];
        for geom in &geoms {
            let kind = GeometryKind::of(geom).unwrap();
            let member = poslists(geom).next().unwrap();
            assert_eq!(member.shape, kind.shape(), "{:?}", kind);
        }
    }

    #[test]
    fn test_restartable() {
        let mp = Geometry::MultiPoint(MultiPoint::new(vec![
            point!(x: 1.0, y: 2.0),
            point!(x: 3.0, y: 4.0),
        ]));
        let it = poslists(&mp);
        let first: Vec<_> = it.clone().collect();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
        assert_eq!(poslists(&mp).count(), 2);
    }
}
