// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handle-based lookups through DatatypeService.

use fom_datatypes::{
    AttributeHandle, BridgeError, DatatypeKind, DatatypeRegistry, DatatypeService,
    InteractionClassHandle, LookupError, ObjectClassHandle, ParameterHandle, RuntimeBridge,
    ServiceError, Symbol, SymbolHandle,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const FOM: &str = r#"<objectModel><dataTypes>
    <basicData name="HLAinteger32BE" size="4" endianness="BIG"/>
    <simpleData name="PayRate" representation="HLAinteger32BE"/>
    <enumeratedData name="Flavour" representation="HLAinteger32BE">
        <enumerator name="Vanilla" values="0"/>
        <enumerator name="Chocolate" values="1"/>
    </enumeratedData>
</dataTypes></objectModel>"#;

const WAITER: ObjectClassHandle = ObjectClassHandle(1);
const PAY: AttributeHandle = AttributeHandle(10);
const SERVE: InteractionClassHandle = InteractionClassHandle(2);
const FLAVOUR: ParameterHandle = ParameterHandle(20);

struct FakeRuntime {
    symbols: HashMap<SymbolHandle, Symbol>,
    fetches: AtomicUsize,
    offline: AtomicBool,
}

impl FakeRuntime {
    fn new() -> Self {
        let mut symbols = HashMap::new();
        symbols.insert(
            SymbolHandle::Attribute(WAITER, PAY),
            Symbol::new("PayRate", "simpleData"),
        );
        symbols.insert(
            SymbolHandle::Parameter(SERVE, FLAVOUR),
            Symbol::new("Flavour", "enumeratedData"),
        );
        symbols.insert(
            SymbolHandle::Attribute(WAITER, AttributeHandle(11)),
            Symbol::new("Tips", "simpleData"),
        );
        Self {
            symbols,
            fetches: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }
}

impl RuntimeBridge for FakeRuntime {
    fn resolve_symbol(&self, handle: &SymbolHandle) -> Result<Symbol, BridgeError> {
        self.symbols
            .get(handle)
            .cloned()
            .ok_or(BridgeError::UnknownHandle(*handle))
    }

    fn fetch_schema_document(&self) -> Result<String, BridgeError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BridgeError::Unavailable("not connected".into()));
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(FOM.to_string())
    }
}

fn service() -> DatatypeService<FakeRuntime> {
    DatatypeService::new(FakeRuntime::new(), Arc::new(DatatypeRegistry::new()))
}

#[test]
fn test_attribute_lookup_fetches_schema_lazily() {
    let service = service();
    assert!(!service.registry().is_initialized());
    assert_eq!(service.bridge().fetches.load(Ordering::SeqCst), 0);

    let pay = service.attribute_datatype(WAITER, PAY).unwrap();
    assert_eq!(pay.kind(), DatatypeKind::Simple);
    assert_eq!(pay.name(), "PayRate");
    assert!(service.registry().is_initialized());

    let flavour = service.parameter_datatype(SERVE, FLAVOUR).unwrap();
    assert_eq!(flavour.enumerators().map(<[_]>::len), Some(2));

    assert_eq!(service.bridge().fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn test_preinitialized_registry_skips_fetch() {
    let registry = Arc::new(DatatypeRegistry::new());
    registry.initialize(FOM).unwrap();
    let service = DatatypeService::new(FakeRuntime::new(), Arc::clone(&registry));

    service.attribute_datatype(WAITER, PAY).unwrap();
    assert_eq!(service.bridge().fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_handle_and_missing_datatype() {
    let service = service();

    let err = service
        .attribute_datatype(WAITER, AttributeHandle(99))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Bridge(BridgeError::UnknownHandle(_))
    ));

    let err = service
        .attribute_datatype(WAITER, AttributeHandle(11))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Lookup(LookupError::NotFound { .. })
    ));
}

#[test]
fn test_failed_fetch_is_retried() {
    let service = service();
    service.bridge().offline.store(true, Ordering::SeqCst);

    let err = service.attribute_datatype(WAITER, PAY).unwrap_err();
    assert!(matches!(err, ServiceError::Bridge(BridgeError::Unavailable(_))));
    assert!(!service.registry().is_initialized());

    service.bridge().offline.store(false, Ordering::SeqCst);
    assert!(service.attribute_datatype(WAITER, PAY).is_ok());
    assert_eq!(service.bridge().fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_first_lookups_fetch_once() {
    let service = Arc::new(service());
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    service.attribute_datatype(WAITER, PAY).map(|_| ())
                } else {
                    service.parameter_datatype(SERVE, FLAVOUR).map(|_| ())
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(service.bridge().fetches.load(Ordering::SeqCst), 1);
}
