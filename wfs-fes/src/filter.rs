//! Construction du filtre spatial FES 2.0
//!
//! Un filtre = une racine `fes:Filter`, un unique `fes:Or`, et un
//! `fes:Intersects` par membre non vide de chaque géométrie d'entrée.

use geo::Geometry;
use tracing::debug;

use crate::gml::member_element;
use crate::poslist::poslists;
use crate::types::ns;
use crate::xml::XmlElement;
use crate::FesError;

/// Filtre spatial disjonctif prêt à être inséré dans une requête
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialFilter {
    root: XmlElement,
    predicates: usize,
}

impl SpatialFilter {
    /// Construit le filtre pour un champ géométrique et une collection de
    /// géométries (les `None` sont ignorées).
    ///
    /// Une collection sans géométrie exploitable donne un `fes:Or` vide:
    /// à l'appelant de le traiter comme "aucune intersection".
    pub fn build<'a, I>(geometry_field: &str, geometries: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a Geometry>>,
    {
        let field = geometry_field.trim();
        let mut skipped = 0usize;

        let predicates: Vec<XmlElement> = geometries
            .into_iter()
            .filter_map(|g| {
                if g.is_none() {
                    skipped += 1;
                }
                g
            })
            .flat_map(poslists)
            .map(|member| intersects(field, member_element(&member)))
            .collect();

        debug!(
            field = field,
            predicates = predicates.len(),
            null_geometries = skipped,
            "Built spatial filter"
        );

        let count = predicates.len();
        let root = XmlElement::new("fes:Filter")
            .with_namespace("fes", ns::FES)
            .with_namespace("gml", ns::GML)
            .with_child(XmlElement::new("fes:Or").with_children(predicates));

        Self {
            root,
            predicates: count,
        }
    }

    /// Raccourci pour une collection sans géométrie nulle
    pub fn from_geometries(geometry_field: &str, geometries: &[Geometry]) -> Self {
        Self::build(geometry_field, geometries.iter().map(Some))
    }

    /// Raccourci pour une collection d'entités dont la géométrie peut manquer
    pub fn from_optional(geometry_field: &str, geometries: &[Option<Geometry>]) -> Self {
        Self::build(geometry_field, geometries.iter().map(Option::as_ref))
    }

    /// Nombre de prédicats `fes:Intersects`
    pub fn predicate_count(&self) -> usize {
        self.predicates
    }

    /// Vrai si le filtre ne peut rien sélectionner
    pub fn is_empty(&self) -> bool {
        self.predicates == 0
    }

    /// Élément racine `fes:Filter`
    pub fn element(&self) -> &XmlElement {
        &self.root
    }

    /// Document XML complet du filtre
    pub fn to_xml(&self) -> Result<String, FesError> {
        self.root.to_document()
    }
}

fn intersects(field: &str, geometry: XmlElement) -> XmlElement {
    XmlElement::new("fes:Intersects")
        .with_child(XmlElement::new("fes:ValueReference").with_text(field))
        .with_child(geometry)
}
