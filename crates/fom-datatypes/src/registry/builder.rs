// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor construction from schema declarations.
//!
//! A [`Builder`] lives for one registry miss. It resolves nested references
//! depth-first, caching every descriptor it completes, and tracks the names
//! under construction so a cyclic declaration ends in an unresolved
//! reference instead of unbounded recursion.

use super::{CycleReport, KindCaches};
use crate::error::LookupError;
use crate::model::{ByteOrder, Datatype, DatatypeKind, DatatypeRef, Enumerator};
use crate::schema::{SchemaDocument, SchemaElement};
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Arc;

#[cfg(feature = "aggregates")]
use crate::model::{
    Alternative, ArrayDescriptor, Definition, Dimension, Field, FixedRecordDescriptor,
    VariantRecordDescriptor,
};

/// Alternative enumerator standing for "every enumerator not listed elsewhere".
#[cfg(feature = "aggregates")]
const OTHER_ENUMERATOR: &str = "HLAother";

/// Datatype name meaning "no datatype".
#[cfg(feature = "aggregates")]
const NA: &str = "NA";

pub(super) struct Outcome {
    pub constructed: u64,
    pub cycles: Vec<CycleReport>,
}

pub(super) struct Builder<'a> {
    document: &'a SchemaDocument,
    caches: &'a KindCaches,
    max_depth: usize,
    in_progress: Vec<(DatatypeKind, String)>,
    constructed: u64,
    cycles: Vec<CycleReport>,
}

impl<'a> Builder<'a> {
    pub(super) fn new(document: &'a SchemaDocument, caches: &'a KindCaches, max_depth: usize) -> Self {
        Self {
            document,
            caches,
            max_depth,
            in_progress: Vec::new(),
            constructed: 0,
            cycles: Vec::new(),
        }
    }

    pub(super) fn finish(self) -> Outcome {
        Outcome {
            constructed: self.constructed,
            cycles: self.cycles,
        }
    }

    /// Resolve `(kind, name)` from the cache or the schema.
    pub(super) fn resolve(
        &mut self,
        kind: DatatypeKind,
        name: &str,
    ) -> Result<Arc<Datatype>, LookupError> {
        if let Some(hit) = self.caches.get(kind, name) {
            return Ok(hit);
        }

        let element = self
            .document
            .find(kind, name)
            .ok_or_else(|| LookupError::not_found(kind, name))?;

        if self.in_progress.len() >= self.max_depth {
            return Err(LookupError::DepthExceeded {
                name: name.to_string(),
                limit: self.max_depth,
            });
        }

        self.in_progress.push((kind, name.to_string()));
        let built = self.construct(kind, name, element);
        self.in_progress.pop();

        let datatype = self.caches.insert(Arc::new(built?));
        self.constructed += 1;
        log::debug!("constructed {} '{}'", kind, name);
        Ok(datatype)
    }

    fn construct(
        &mut self,
        kind: DatatypeKind,
        name: &str,
        element: &SchemaElement,
    ) -> Result<Datatype, LookupError> {
        match kind {
            DatatypeKind::Basic => basic(name, element),
            DatatypeKind::Simple => self.simple(name, element),
            DatatypeKind::Enumerated => self.enumerated(name, element),
            #[cfg(feature = "aggregates")]
            DatatypeKind::Array => self.array(name, element),
            #[cfg(feature = "aggregates")]
            DatatypeKind::FixedRecord => self.fixed_record(name, element),
            #[cfg(feature = "aggregates")]
            DatatypeKind::VariantRecord => self.variant_record(name, element),
            #[cfg(not(feature = "aggregates"))]
            DatatypeKind::Array | DatatypeKind::FixedRecord | DatatypeKind::VariantRecord => {
                Err(LookupError::Unsupported(kind))
            }
            DatatypeKind::Unresolved => Err(LookupError::not_found(kind, name)),
        }
    }

    /// Resolve a nested datatype by name.
    ///
    /// A declaration of `preferred` kind wins over earlier declarations of
    /// other kinds. Returns `None` at a cycle point. An undeclared name makes
    /// the referencing datatype malformed.
    fn link(
        &mut self,
        name: &str,
        preferred: Option<DatatypeKind>,
    ) -> Result<Option<Arc<Datatype>>, LookupError> {
        let kind = preferred
            .filter(|&k| self.document.find(k, name).is_some())
            .or_else(|| self.document.find_any(name).map(|(k, _)| k));
        let Some(kind) = kind else {
            let owner = self.in_progress.last().map_or(name, |(_, n)| n.as_str());
            return Err(LookupError::malformed(
                owner,
                format!("references undeclared datatype '{}'", name),
            ));
        };

        if self
            .in_progress
            .iter()
            .any(|(k, n)| *k == kind && n == name)
        {
            let mut path: Vec<String> = self.in_progress.iter().map(|(_, n)| n.clone()).collect();
            path.push(name.to_string());
            self.cycles.push(CycleReport {
                name: name.to_string(),
                path,
            });
            return Ok(None);
        }

        self.resolve(kind, name).map(Some)
    }

    fn reference(
        &mut self,
        name: &str,
        preferred: Option<DatatypeKind>,
    ) -> Result<DatatypeRef, LookupError> {
        Ok(match self.link(name, preferred)? {
            Some(datatype) => datatype.to_ref(),
            None => DatatypeRef::unresolved(name),
        })
    }

    fn simple(&mut self, name: &str, element: &SchemaElement) -> Result<Datatype, LookupError> {
        let representation = required(name, element, "representation")?;
        let representation = self.reference(representation, Some(DatatypeKind::Basic))?;
        Ok(Datatype::simple(name, representation))
    }

    fn enumerated(&mut self, name: &str, element: &SchemaElement) -> Result<Datatype, LookupError> {
        let representation = required(name, element, "representation")?;
        let representation = self.reference(representation, Some(DatatypeKind::Basic))?;

        let mut enumerators = Vec::new();
        let mut seen = HashSet::new();
        for node in element.children_named("enumerator") {
            let enumerator = required(name, node, "name")?;
            if !seen.insert(enumerator) {
                return Err(LookupError::malformed(
                    name,
                    format!("duplicate enumerator '{}'", enumerator),
                ));
            }
            let value = node.property_any(&["values", "value"]).ok_or_else(|| {
                LookupError::malformed(
                    name,
                    format!("enumerator '{}' is missing 'values'", enumerator),
                )
            })?;
            enumerators.push(Enumerator::new(enumerator, value));
        }

        Ok(Datatype::enumerated(name, representation, enumerators))
    }

    #[cfg(feature = "aggregates")]
    fn array(&mut self, name: &str, element: &SchemaElement) -> Result<Datatype, LookupError> {
        let element_type = required(name, element, "dataType")?;
        let cardinality = required(name, element, "cardinality")?;
        let dimensions = parse_cardinality(cardinality)
            .map_err(|reason| LookupError::malformed(name, reason))?;
        let element_type = self.reference(element_type, None)?;

        Ok(Datatype::new(
            name,
            Definition::Array(ArrayDescriptor {
                element_type,
                dimensions,
            }),
        ))
    }

    #[cfg(feature = "aggregates")]
    fn fixed_record(&mut self, name: &str, element: &SchemaElement) -> Result<Datatype, LookupError> {
        let mut fields = Vec::new();
        let mut seen = HashSet::new();
        for node in element.children_named("field") {
            let field = required(name, node, "name")?;
            if !seen.insert(field) {
                return Err(LookupError::malformed(
                    name,
                    format!("duplicate field '{}'", field),
                ));
            }
            let datatype = required(name, node, "dataType")?;
            fields.push(Field::new(field, self.reference(datatype, None)?));
        }

        Ok(Datatype::new(
            name,
            Definition::FixedRecord(FixedRecordDescriptor { fields }),
        ))
    }

    #[cfg(feature = "aggregates")]
    fn variant_record(
        &mut self,
        name: &str,
        element: &SchemaElement,
    ) -> Result<Datatype, LookupError> {
        let discriminant_name = required(name, element, "discriminant")?;
        let discriminant_type = required(name, element, "dataType")?;
        let discriminant = self
            .link(discriminant_type, Some(DatatypeKind::Enumerated))?
            .ok_or_else(|| {
                LookupError::malformed(
                    name,
                    format!("discriminant type '{}' is cyclic", discriminant_type),
                )
            })?;
        let Definition::Enumerated(domain) = discriminant.definition() else {
            return Err(LookupError::malformed(
                name,
                format!("discriminant type '{}' is not enumerated", discriminant_type),
            ));
        };

        let mut alternatives = Vec::new();
        let mut defaults = Vec::new();
        for node in element.children_named("alternative") {
            let alternative = required(name, node, "name")?;
            let listed = required(name, node, "enumerator")?;

            let mut enumerators: Vec<Enumerator> = Vec::new();
            for label in listed.split(',').map(str::trim).filter(|l| !l.is_empty()) {
                if label == OTHER_ENUMERATOR {
                    defaults.push(alternatives.len());
                    continue;
                }
                let enumerator = domain.enumerator(label).ok_or_else(|| {
                    LookupError::malformed(
                        name,
                        format!(
                            "alternative '{}' names unknown enumerator '{}'",
                            alternative, label
                        ),
                    )
                })?;
                if enumerators.contains(enumerator) {
                    return Err(LookupError::malformed(
                        name,
                        format!(
                            "alternative '{}' lists enumerator '{}' twice",
                            alternative, label
                        ),
                    ));
                }
                enumerators.push(enumerator.clone());
            }

            let datatype = match node.property("dataType") {
                None | Some(NA) => None,
                Some(datatype) => Some(self.reference(datatype, None)?),
            };
            alternatives.push(Alternative::new(alternative, datatype, enumerators));
        }

        // HLAother picks up every enumerator no other alternative claims.
        for &index in &defaults {
            let claimed: HashSet<&str> = alternatives
                .iter()
                .enumerate()
                .filter(|(i, _)| !defaults.contains(i))
                .flat_map(|(_, alt)| alt.enumerators.iter().map(|e| e.name.as_str()))
                .collect();
            let rest: Vec<Enumerator> = domain
                .enumerators
                .iter()
                .filter(|e| !claimed.contains(e.name.as_str()))
                .filter(|e| !alternatives[index].enumerators.contains(e))
                .cloned()
                .collect();
            alternatives[index].enumerators.extend(rest);
        }

        Ok(Datatype::new(
            name,
            Definition::VariantRecord(VariantRecordDescriptor {
                discriminant_name: discriminant_name.to_string(),
                discriminant_type: discriminant.to_ref(),
                alternatives,
            }),
        ))
    }
}

fn required<'e>(
    owner: &str,
    element: &'e SchemaElement,
    key: &str,
) -> Result<&'e str, LookupError> {
    element.property(key).ok_or_else(|| {
        LookupError::malformed(
            owner,
            format!("<{}> is missing '{}'", element.tag(), key),
        )
    })
}

fn basic(name: &str, element: &SchemaElement) -> Result<Datatype, LookupError> {
    let size = required(name, element, "size")?;
    let size: u32 = size
        .parse()
        .map_err(|_| LookupError::malformed(name, format!("invalid size '{}'", size)))?;
    // Attribute form gives bytes, OMT element form gives bits.
    let byte_size = if element.has_attribute("size") {
        size
    } else {
        size.div_ceil(8)
    };
    let byte_size = NonZeroU32::new(byte_size)
        .ok_or_else(|| LookupError::malformed(name, "size must be positive"))?;

    let endianness = element
        .property_any(&["endianness", "endian"])
        .ok_or_else(|| LookupError::malformed(name, "<basicData> is missing 'endianness'"))?;
    let byte_order = ByteOrder::from_schema(endianness).ok_or_else(|| {
        LookupError::malformed(name, format!("unknown endianness '{}'", endianness))
    })?;

    Ok(Datatype::basic(name, byte_size, byte_order))
}

/// Parse an OMT cardinality: comma-separated `Dynamic`, `N` or `[lo..hi]`.
#[cfg(feature = "aggregates")]
fn parse_cardinality(text: &str) -> Result<Vec<Dimension>, String> {
    let mut dimensions = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        let (entry, tail) = if rest.starts_with('[') {
            let end = rest
                .find(']')
                .ok_or_else(|| format!("unterminated range in cardinality '{}'", text))?;
            (&rest[..=end], &rest[end + 1..])
        } else {
            match rest.find(',') {
                Some(i) => (&rest[..i], &rest[i..]),
                None => (rest, ""),
            }
        };
        dimensions.push(parse_dimension(entry.trim(), text)?);
        rest = tail.trim_start().trim_start_matches(',').trim_start();
    }

    if dimensions.is_empty() {
        return Err("empty cardinality".to_string());
    }
    Ok(dimensions)
}

#[cfg(feature = "aggregates")]
fn parse_dimension(entry: &str, text: &str) -> Result<Dimension, String> {
    let bound = |s: &str| -> Result<i32, String> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("dynamic") {
            return Ok(Dimension::DYNAMIC);
        }
        s.parse::<u32>()
            .ok()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| format!("invalid cardinality '{}'", text))
    };

    match entry.strip_prefix('[').and_then(|e| e.strip_suffix(']')) {
        Some(range) => {
            let (lower, upper) = range
                .split_once("..")
                .ok_or_else(|| format!("invalid range in cardinality '{}'", text))?;
            let (lower, upper) = (bound(lower)?, bound(upper)?);
            if lower != Dimension::DYNAMIC && upper != Dimension::DYNAMIC && lower > upper {
                return Err(format!("inverted range in cardinality '{}'", text));
            }
            Ok(Dimension::bounded(lower, upper))
        }
        None => bound(entry).map(Dimension::fixed),
    }
}
