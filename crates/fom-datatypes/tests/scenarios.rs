// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![cfg(feature = "aggregates")]

//! End-to-end datatype resolution against realistic FOM fragments.

use fom_datatypes::{
    ByteOrder, DatatypeKind, DatatypeRef, DatatypeRegistry, Dimension, Enumerator, LookupError,
};

const RESTAURANT_FOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<objectModel xmlns="http://standards.ieee.org/IEEE1516-2010">
  <dataTypes>
    <basicDataRepresentations>
      <basicData name="HLAinteger32BE" size="4" endianness="BIG"/>
      <basicData name="HLAfloat64BE" size="8" endianness="BIG"/>
      <basicData name="HLAoctet" size="1" endianness="BIG"/>
    </basicDataRepresentations>
    <simpleDataTypes>
      <simpleData name="PayRate" representation="HLAinteger32BE"/>
      <simpleData name="Price" representation="HLAfloat64BE"/>
    </simpleDataTypes>
    <enumeratedDataTypes>
      <enumeratedData name="Flavour" representation="HLAinteger32BE">
        <enumerator name="Vanilla" values="0"/>
        <enumerator name="Chocolate" values="1"/>
      </enumeratedData>
    </enumeratedDataTypes>
    <arrayDataTypes>
      <arrayData name="Menu" dataType="MenuItem" cardinality="Dynamic"/>
      <arrayData name="Grid" dataType="HLAoctet" cardinality="[0..3],[0..4]"/>
      <arrayData name="Triple" dataType="Price" cardinality="3"/>
    </arrayDataTypes>
    <fixedRecordDataTypes>
      <fixedRecordData name="MenuItem">
        <field name="flavour" dataType="Flavour"/>
        <field name="price" dataType="Price"/>
        <field name="scoops" dataType="HLAoctet"/>
      </fixedRecordData>
    </fixedRecordDataTypes>
    <variantRecordDataTypes>
      <variantRecordData name="Topping" discriminant="Kind" dataType="ToppingKind">
        <alternative name="SauceAmount" dataType="Price" enumerator="Sauce"/>
        <alternative name="Nothing" dataType="NA" enumerator="Plain"/>
        <alternative name="Extra" dataType="HLAoctet" enumerator="HLAother"/>
      </variantRecordData>
      <enumeratedData name="ToppingKind" representation="HLAoctet">
        <enumerator name="Sauce" values="0"/>
        <enumerator name="Plain" values="1"/>
        <enumerator name="Nuts" values="2"/>
        <enumerator name="Sprinkles" values="3"/>
      </enumeratedData>
    </variantRecordDataTypes>
  </dataTypes>
</objectModel>"#;

fn registry() -> DatatypeRegistry {
    let registry = DatatypeRegistry::new();
    registry.initialize(RESTAURANT_FOM).unwrap();
    registry
}

#[test]
fn test_pay_rate_scenario() {
    let registry = registry();
    let pay_rate = registry
        .get_attribute_datatype("PayRate", "simpleData")
        .unwrap();
    assert_eq!(pay_rate.kind(), DatatypeKind::Simple);
    assert_eq!(pay_rate.name(), "PayRate");

    let basic = registry.resolve(pay_rate.representation().unwrap()).unwrap();
    assert_eq!(basic.kind(), DatatypeKind::Basic);
    assert_eq!(basic.name(), "HLAinteger32BE");
    assert_eq!(basic.byte_size(), Some(4));
    assert_eq!(basic.byte_order(), Some(ByteOrder::Big));
}

#[test]
fn test_flavour_scenario() {
    let registry = registry();
    let flavour = registry
        .get_attribute_datatype("Flavour", "enumeratedData")
        .unwrap();
    assert_eq!(flavour.kind(), DatatypeKind::Enumerated);
    let enumerators = flavour.enumerators().unwrap();
    assert_eq!(enumerators.len(), 2);
    assert_eq!(enumerators[0], Enumerator::new("Vanilla", "0"));
    assert_eq!(enumerators[1], Enumerator::new("Chocolate", "1"));
}

#[test]
fn test_missing_and_uninitialized() {
    let registry = registry();
    assert!(matches!(
        registry.get_parameter_datatype("Sundae", "fixedRecordData"),
        Err(LookupError::NotFound { .. })
    ));

    let empty = DatatypeRegistry::new();
    assert_eq!(
        empty.get_parameter_datatype("Sundae", "fixedRecordData"),
        Err(LookupError::NotInitialized)
    );
}

#[test]
fn test_array_declared_before_its_element() {
    let registry = registry();
    let menu = registry.get_attribute_datatype("Menu", "arrayData").unwrap();
    assert_eq!(menu.kind(), DatatypeKind::Array);
    assert_eq!(
        menu.element_type(),
        Some(&DatatypeRef::new("MenuItem", DatatypeKind::FixedRecord))
    );
    assert_eq!(menu.dimensions().unwrap(), &[Dimension::dynamic()]);
    assert!(menu.dimensions().unwrap()[0].is_dynamic());
}

#[test]
fn test_array_dimensions() {
    let registry = registry();
    let grid = registry.get_attribute_datatype("Grid", "arrayData").unwrap();
    assert_eq!(
        grid.dimensions().unwrap(),
        &[Dimension::bounded(0, 3), Dimension::bounded(0, 4)]
    );

    let triple = registry.get_attribute_datatype("Triple", "arrayData").unwrap();
    assert_eq!(triple.dimensions().unwrap()[0].cardinality(), Some(3));
    assert_eq!(
        triple.element_type(),
        Some(&DatatypeRef::new("Price", DatatypeKind::Simple))
    );
}

#[test]
fn test_fixed_record_fields() {
    let registry = registry();
    let item = registry
        .get_attribute_datatype("MenuItem", "fixedRecordData")
        .unwrap();
    let fields = item.fields().unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["flavour", "price", "scoops"]);
    assert_eq!(
        fields[0].datatype,
        DatatypeRef::new("Flavour", DatatypeKind::Enumerated)
    );

    // Every nested reference is already resolvable from the cache.
    let before = registry.stats().constructions;
    for reference in item.references() {
        let nested = registry.resolve(reference).unwrap();
        assert_eq!(nested.kind(), reference.kind);
    }
    assert_eq!(registry.stats().constructions, before);
}

#[test]
fn test_variant_record_alternatives() {
    let registry = registry();
    let topping = registry
        .get_parameter_datatype("Topping", "variantRecordData")
        .unwrap();
    assert_eq!(topping.kind(), DatatypeKind::VariantRecord);

    let (discriminant, discriminant_type) = topping.discriminant().unwrap();
    assert_eq!(discriminant, "Kind");
    assert_eq!(
        discriminant_type,
        &DatatypeRef::new("ToppingKind", DatatypeKind::Enumerated)
    );

    let alternatives = topping.alternatives().unwrap();
    let names: Vec<&str> = alternatives.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["SauceAmount", "Nothing", "Extra"]);

    assert_eq!(
        alternatives[0].enumerators,
        vec![Enumerator::new("Sauce", "0")]
    );
    assert_eq!(alternatives[1].datatype, None);
    assert_eq!(
        alternatives[2].enumerators,
        vec![Enumerator::new("Nuts", "2"), Enumerator::new("Sprinkles", "3")]
    );

    assert_eq!(
        topping.alternative_for("Sprinkles").map(|a| a.name.as_str()),
        Some("Extra")
    );
    assert_eq!(
        topping.alternative_for("Plain").map(|a| a.name.as_str()),
        Some("Nothing")
    );
}

#[test]
fn test_variant_record_rejects_unknown_enumerator() {
    let fom = r#"<fom>
        <basicData name="HLAoctet" size="1" endianness="BIG"/>
        <enumeratedData name="Switch" representation="HLAoctet">
            <enumerator name="On" values="1"/>
        </enumeratedData>
        <variantRecordData name="Bad" discriminant="State" dataType="Switch">
            <alternative name="Broken" dataType="HLAoctet" enumerator="Off"/>
        </variantRecordData>
        <variantRecordData name="NotEnum" discriminant="State" dataType="HLAoctet">
            <alternative name="Any" dataType="HLAoctet" enumerator="On"/>
        </variantRecordData>
    </fom>"#;
    let registry = DatatypeRegistry::new();
    registry.initialize(fom).unwrap();

    for name in ["Bad", "NotEnum"] {
        assert!(matches!(
            registry.get_datatype(name, DatatypeKind::VariantRecord),
            Err(LookupError::Malformed { .. })
        ));
    }
    // The discriminant itself survived the failed constructions.
    assert!(registry.get_datatype("Switch", DatatypeKind::Enumerated).is_ok());
}

#[test]
fn test_omt_element_form() {
    let fom = r#"<objectModel xmlns="http://standards.ieee.org/IEEE1516-2010">
  <dataTypes>
    <basicDataRepresentations>
      <basicData><name>HLAinteger32BE</name><size>32</size><endian>Big</endian></basicData>
    </basicDataRepresentations>
    <enumeratedDataTypes>
      <enumeratedData>
        <name>Color</name>
        <representation>HLAinteger32BE</representation>
        <enumerator><name>Red</name><value>0</value></enumerator>
        <enumerator><name>Green</name><value>1</value></enumerator>
      </enumeratedData>
    </enumeratedDataTypes>
    <arrayDataTypes>
      <arrayData><name>Palette</name><dataType>Color</dataType><cardinality>16</cardinality></arrayData>
    </arrayDataTypes>
    <fixedRecordDataTypes>
      <fixedRecordData>
        <name>Pixel</name>
        <field><name>color</name><dataType>Color</dataType></field>
        <field><name>alpha</name><dataType>HLAinteger32BE</dataType></field>
      </fixedRecordData>
    </fixedRecordDataTypes>
    <variantRecordDataTypes>
      <variantRecordData>
        <name>Paint</name>
        <discriminant>Which</discriminant>
        <dataType>Color</dataType>
        <alternative><enumerator>Red, Green</enumerator><name>Pixel</name><dataType>Pixel</dataType></alternative>
      </variantRecordData>
    </variantRecordDataTypes>
  </dataTypes>
</objectModel>"#;
    let registry = DatatypeRegistry::new();
    registry.initialize(fom).unwrap();

    let basic = registry
        .get_datatype("HLAinteger32BE", DatatypeKind::Basic)
        .unwrap();
    assert_eq!(basic.byte_size(), Some(4));

    let color = registry.get_datatype("Color", DatatypeKind::Enumerated).unwrap();
    assert_eq!(
        color.enumerators().unwrap(),
        &[Enumerator::new("Red", "0"), Enumerator::new("Green", "1")]
    );

    let palette = registry.get_datatype("Palette", DatatypeKind::Array).unwrap();
    assert_eq!(palette.dimensions().unwrap(), &[Dimension::fixed(16)]);

    let pixel = registry
        .get_datatype("Pixel", DatatypeKind::FixedRecord)
        .unwrap();
    assert_eq!(pixel.fields().unwrap().len(), 2);

    let paint = registry
        .get_datatype("Paint", DatatypeKind::VariantRecord)
        .unwrap();
    let alternatives = paint.alternatives().unwrap();
    assert_eq!(alternatives.len(), 1);
    assert_eq!(alternatives[0].enumerators.len(), 2);
    assert_eq!(
        alternatives[0].datatype,
        Some(DatatypeRef::new("Pixel", DatatypeKind::FixedRecord))
    );
}

#[test]
fn test_resolve_all_counts_every_declaration() {
    let registry = registry();
    assert_eq!(registry.resolve_all().unwrap(), 12);
    assert!(registry.cycle_reports().is_empty());
}
