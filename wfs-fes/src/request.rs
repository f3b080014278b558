//! Enveloppe WFS 2.0 `GetFeature`

use crate::filter::SpatialFilter;
use crate::types::{ns, QUERY_SRS_NAME, WFS_SCHEMA_LOCATION};
use crate::xml::XmlElement;
use crate::FesError;

/// Espaces de noms déclarés sur la racine `wfs:GetFeature`
const ROOT_NAMESPACES: &[(&str, &str)] = &[
    ("wfs", ns::WFS),
    ("fes", ns::FES),
    ("gml", ns::GML),
    ("xsi", ns::XSI),
];

/// Requête `GetFeature` portant une seule `wfs:Query`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFeatureRequest {
    root: XmlElement,
}

impl GetFeatureRequest {
    /// Construit la requête pour un type d'objet (nom de couche côté
    /// serveur) et un filtre spatial.
    ///
    /// Le sous-arbre du filtre est rattaché tel quel, seules ses
    /// déclarations d'espaces de noms redondantes avec la racine sont
    /// retirées.
    pub fn new(type_name: &str, filter: &SpatialFilter) -> Self {
        let filter = filter.element().without_declared_namespaces(ROOT_NAMESPACES);

        let query = XmlElement::new("wfs:Query")
            .with_attr("typeNames", type_name)
            .with_attr("srsName", QUERY_SRS_NAME)
            .with_child(filter);

        let mut root = XmlElement::new("wfs:GetFeature");
        for (prefix, uri) in ROOT_NAMESPACES {
            root = root.with_namespace(prefix, uri);
        }
        let root = root
            .with_attr("service", "WFS")
            .with_attr("version", "2.0.0")
            .with_attr("xsi:schemaLocation", WFS_SCHEMA_LOCATION)
            .with_child(query);

        Self { root }
    }

    /// Élément racine `wfs:GetFeature`
    pub fn element(&self) -> &XmlElement {
        &self.root
    }

    /// L'unique `wfs:Query`
    pub fn query(&self) -> Option<&XmlElement> {
        self.root.child("wfs:Query")
    }

    /// Corps du POST (document XML complet)
    pub fn to_xml(&self) -> Result<String, FesError> {
        self.root.to_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Geometry};

    fn filter() -> SpatialFilter {
        let geoms = vec![Geometry::Point(point!(x: 2.349014, y: 48.864716))];
        SpatialFilter::from_geometries("geom", &geoms)
    }

    #[test]
    fn test_root_attributes() {
        let request = GetFeatureRequest::new("ns:layer", &filter());
        let root = request.element();
        assert_eq!(root.name(), "wfs:GetFeature");
        assert_eq!(root.attr("service"), Some("WFS"));
        assert_eq!(root.attr("version"), Some("2.0.0"));
        assert_eq!(root.attr("xmlns:wfs"), Some(ns::WFS));
        assert_eq!(root.attr("xmlns:xsi"), Some(ns::XSI));
        assert_eq!(root.attr("xsi:schemaLocation"), Some(WFS_SCHEMA_LOCATION));
    }

    #[test]
    fn test_query_wraps_filter() {
        let f = filter();
        let request = GetFeatureRequest::new("ns:layer", &f);
        let query = request.query().expect("wfs:Query");
        assert_eq!(query.attr("typeNames"), Some("ns:layer"));
        assert_eq!(query.attr("srsName"), Some("EPSG:4326"));

        let children: Vec<_> = query.child_elements().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name(), "fes:Filter");
        // Même sous-arbre, sans les xmlns redondants
        assert_eq!(children[0].children(), f.element().children());
        assert_eq!(children[0].attr("xmlns:fes"), None);
    }

    #[test]
    fn test_to_xml() {
        let xml = GetFeatureRequest::new("ns:layer", &filter()).to_xml().unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><wfs:GetFeature"#));
        assert!(xml.contains(r#"<wfs:Query typeNames="ns:layer" srsName="EPSG:4326">"#));
        assert!(xml.contains("<fes:ValueReference>geom</fes:ValueReference>"));
        assert_eq!(xml.matches("<wfs:Query").count(), 1);
    }
}
