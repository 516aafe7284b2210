// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FOM schema document.
//!
//! Parses the FOM XML once and keeps an owned copy of every datatype
//! declaration, indexed by `(kind, name)` and by name alone. Both the
//! attribute form (`<basicData name="..." size="4"/>`) and the IEEE
//! 1516-2010 OMT element form (`<basicData><name>...</name></basicData>`)
//! are accepted; see [`SchemaElement::property`].

use crate::error::SchemaError;
use crate::model::DatatypeKind;
use roxmltree::Document;
use std::collections::HashMap;

/// Owned XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaElement {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<SchemaElement>,
}

impl SchemaElement {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();
        let text = node
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let children = node
            .children()
            .filter(|n| n.is_element())
            .map(Self::from_node)
            .collect();

        Self {
            tag: node.tag_name().name().to_string(),
            attributes,
            text,
            children,
        }
    }

    /// Local tag name (namespace stripped).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First child element with the given tag.
    pub fn child(&self, tag: &str) -> Option<&SchemaElement> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Child elements with the given tag, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a SchemaElement> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Read a property: attribute `key` first, then the text of child
    /// element `<key>`. Blank values count as absent.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.attribute(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| self.child(key).and_then(SchemaElement::text))
    }

    /// First present property among `keys`.
    pub fn property_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.property(k))
    }

    /// True when [`property`](Self::property) reads `key` from an attribute
    /// rather than a child element.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.property("name")
    }
}

#[derive(Debug)]
struct Declaration {
    kind: DatatypeKind,
    name: String,
    element: SchemaElement,
}

/// Parsed, read-only FOM datatype declarations.
#[derive(Debug, Default)]
pub struct SchemaDocument {
    declarations: Vec<Declaration>,
    by_kind: HashMap<(DatatypeKind, String), usize>,
    by_name: HashMap<String, usize>,
}

impl SchemaDocument {
    /// Parse FOM text.
    ///
    /// Datatype declarations are collected from anywhere in the document.
    /// When a `(kind, name)` pair is declared more than once the first
    /// declaration wins.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let doc = Document::parse(text).map_err(|e| SchemaError::ParseFailure(e.to_string()))?;

        let mut schema = Self::default();
        for node in doc.descendants().filter(|n| n.is_element()) {
            let kind = DatatypeKind::from_tag(node.tag_name().name());
            if kind == DatatypeKind::Unresolved {
                continue;
            }

            let element = SchemaElement::from_node(node);
            let Some(name) = element.name().map(str::to_string) else {
                log::debug!("skipping unnamed <{}> declaration", kind.tag());
                continue;
            };
            schema.insert(kind, name, element);
        }

        log::debug!(
            "parsed FOM schema with {} datatype declarations",
            schema.declarations.len()
        );
        Ok(schema)
    }

    fn insert(&mut self, kind: DatatypeKind, name: String, element: SchemaElement) {
        let key = (kind, name);
        if self.by_kind.contains_key(&key) {
            log::debug!("duplicate {} '{}' ignored", kind.tag(), key.1);
            return;
        }

        let index = self.declarations.len();
        self.by_name.entry(key.1.clone()).or_insert(index);
        self.by_kind.insert(key.clone(), index);
        self.declarations.push(Declaration {
            kind,
            name: key.1,
            element,
        });
    }

    /// Declaration of `kind` named `name`.
    pub fn find(&self, kind: DatatypeKind, name: &str) -> Option<&SchemaElement> {
        self.by_kind
            .get(&(kind, name.to_string()))
            .map(|&i| &self.declarations[i].element)
    }

    /// First declaration named `name`, of any kind.
    pub fn find_any(&self, name: &str) -> Option<(DatatypeKind, &SchemaElement)> {
        self.by_name.get(name).map(|&i| {
            let decl = &self.declarations[i];
            (decl.kind, &decl.element)
        })
    }

    /// Names declared with `kind`, in document order.
    pub fn declared(&self, kind: DatatypeKind) -> impl Iterator<Item = &str> {
        self.declarations
            .iter()
            .filter(move |d| d.kind == kind)
            .map(|d| d.name.as_str())
    }

    /// Every declaration as `(kind, name)`, in document order.
    pub fn declarations(&self) -> impl Iterator<Item = (DatatypeKind, &str)> {
        self.declarations.iter().map(|d| (d.kind, d.name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
