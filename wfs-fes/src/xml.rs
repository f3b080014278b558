//! Arbre XML immuable (construction, sérialisation, relecture)
//!
//! Les éléments sont construits par valeur avec des méthodes consommantes
//! (`with_attr`, `with_child`, `with_text`), puis sérialisés avec
//! `quick-xml`. Les noms sont conservés qualifiés (`fes:Filter`), les
//! déclarations d'espaces de noms sont des attributs `xmlns:*` ordinaires.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::FesError;

/// Nœud enfant d'un élément
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// Élément XML avec attributs ordonnés
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Crée un élément vide à partir de son nom qualifié
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Ajoute (ou remplace) un attribut
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    /// Déclare un espace de noms préfixé (`xmlns:prefix`)
    pub fn with_namespace(self, prefix: &str, uri: &str) -> Self {
        self.with_attr(format!("xmlns:{}", prefix), uri)
    }

    /// Ajoute un élément enfant
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Ajoute plusieurs éléments enfants
    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = XmlElement>,
    {
        self.children
            .extend(children.into_iter().map(XmlNode::Element));
        self
    }

    /// Ajoute un nœud texte
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Valeur d'un attribut par nom qualifié
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Éléments enfants directs
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Premier enfant direct portant ce nom
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Premier nœud texte direct
    pub fn text(&self) -> Option<&str> {
        self.children.iter().find_map(|n| match n {
            XmlNode::Text(t) => Some(t.as_str()),
            XmlNode::Element(_) => None,
        })
    }

    /// Tous les descendants (soi compris) portant ce nom, en ordre de document
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            out.push(self);
        }
        for child in self.child_elements() {
            child.collect_named(name, out);
        }
    }

    /// Copie de l'élément sans les déclarations `xmlns:*` déjà portées par
    /// un ancêtre (même préfixe, même URI). Les autres attributs sont gardés.
    pub fn without_declared_namespaces(&self, declared: &[(&str, &str)]) -> XmlElement {
        let attributes = self
            .attributes
            .iter()
            .filter(|(k, v)| {
                let Some(prefix) = k.strip_prefix("xmlns:") else {
                    return true;
                };
                !declared
                    .iter()
                    .any(|(p, uri)| *p == prefix && *uri == v.as_str())
            })
            .cloned()
            .collect();
        XmlElement {
            name: self.name.clone(),
            attributes,
            children: self.children.clone(),
        }
    }

    /// Sérialise en document complet (déclaration XML, UTF-8)
    pub fn to_document(&self) -> Result<String, FesError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| FesError::Write(e.to_string()))?;
        write_element(&mut writer, self)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Relit un document (ou fragment) XML en arbre.
    ///
    /// Les textes sont rognés, les nœuds texte vides supprimés, la
    /// déclaration et les commentaires ignorés.
    pub fn parse(xml: &str) -> Result<XmlElement, FesError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|e| FesError::parse_error(position, e.to_string()))?;

            match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start, position)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start, position)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| FesError::Malformed("unexpected end tag".into()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| FesError::parse_error(position, e.to_string()))?;
                    push_text(&mut stack, &text);
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned())?;
                    push_text(&mut stack, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(FesError::Malformed(format!(
                "unclosed element <{}>",
                stack[stack.len() - 1].name
            )));
        }
        root.ok_or_else(|| FesError::Malformed("no root element".into()))
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), FesError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| FesError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| FesError::Write(e.to_string()))?;
    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => writer
                .write_event(Event::Text(BytesText::new(t)))
                .map_err(|e| FesError::Write(e.to_string()))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| FesError::Write(e.to_string()))
}

fn element_from_start(start: &BytesStart, position: u64) -> Result<XmlElement, FesError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| FesError::parse_error(position, e.to_string()))?
        .to_string();
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FesError::parse_error(position, e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| FesError::parse_error(position, e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| FesError::parse_error(position, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), FesError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(FesError::Malformed("multiple root elements".into())),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    if text.is_empty() {
        return;
    }
    // Texte hors racine (espaces) ignoré
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Text(text.to_string()));
    }
}
