// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Custom types end to end: enum, union, optional and array members described
// with the builder, then owned, copied, compared and looked up at runtime.

#![allow(clippy::float_cmp)]

use std::mem::ManuallyDrop;
use std::sync::Arc;
use uatypes::{
    memory, native_type, DataTypeArray, Error, NativeType, NodeId, OwnershipWrapper, TypeKind,
    TypeDescriptorBuilder, TypeRegistry, UaString, Variant,
};

const NS: u16 = 5;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Info = 0,
    Warning = 1,
    Alarm = 2,
}

#[repr(C)]
#[allow(dead_code)]
union ReadingPayload {
    numeric: f64,
    text: ManuallyDrop<UaString>,
}

#[repr(C)]
struct Reading {
    switch: u32,
    payload: ReadingPayload,
}

impl std::fmt::Debug for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reading")
            .field("switch", &self.switch)
            .finish_non_exhaustive()
    }
}

#[repr(C)]
#[derive(Debug)]
struct Event {
    severity: Severity,
    source: UaString,
    reading: *mut Reading,
    tags_len: usize,
    tags: *mut UaString,
}

native_type!(unsafe Severity => || {
    TypeDescriptorBuilder::<Severity>::create_enum(
        "Severity",
        NodeId::numeric(NS, 1),
        NodeId::numeric(NS, 1001),
    )
    .build()
});

native_type!(unsafe Reading => || {
    TypeDescriptorBuilder::<Reading>::create_union(
        "Reading",
        NodeId::numeric(NS, 2),
        NodeId::numeric(NS, 1002),
    )
    .add_union_field::<f64, _>("numeric", |r| &r.payload)
    .add_union_field::<UaString, _>("text", |r| &r.payload)
    .build()
});

native_type!(unsafe Event => || {
    TypeDescriptorBuilder::<Event>::create_structure(
        "Event",
        NodeId::string(NS, "Event"),
        NodeId::numeric(NS, 1003),
    )
    .add_field("severity", |e| &e.severity)
    .add_field("source", |e| &e.source)
    .add_optional_field::<Reading>("reading", |e| &e.reading)
    .add_array_field::<UaString>("tags", |e| &e.tags_len, |e| &e.tags)
    .build()
});

fn adopt_reading(value: Reading) -> OwnershipWrapper<Reading> {
    // SAFETY: text payloads come from UaString::alloc.
    unsafe { OwnershipWrapper::adopt(value) }
}

fn numeric_reading(value: f64) -> OwnershipWrapper<Reading> {
    adopt_reading(Reading {
        switch: 1,
        payload: ReadingPayload { numeric: value },
    })
}

fn text_reading(text: &str) -> OwnershipWrapper<Reading> {
    let text = UaString::alloc(text).expect("alloc").into_native();
    adopt_reading(Reading {
        switch: 2,
        payload: ReadingPayload {
            text: ManuallyDrop::new(text),
        },
    })
}

/// Move a wrapped value into a heap block owned by the memory engine.
fn into_heap<T: NativeType>(value: OwnershipWrapper<T>) -> *mut T {
    let block = memory::allocate(T::descriptor()).expect("allocate").cast::<T>();
    // SAFETY: the block is sized and aligned for T.
    unsafe { block.write(value.into_native()) };
    block
}

fn event(
    severity: Severity,
    source: &str,
    reading: Option<OwnershipWrapper<Reading>>,
    tags: &[&str],
) -> OwnershipWrapper<Event> {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    let (tags, tags_len) = uatypes::to_native_array(&tags).expect("tags").into_raw_parts();
    let native = Event {
        severity,
        source: UaString::alloc(source).expect("alloc").into_native(),
        reading: reading.map_or(std::ptr::null_mut(), into_heap),
        tags_len,
        tags,
    };
    // SAFETY: every heap part was allocated by the memory engine above.
    unsafe { OwnershipWrapper::adopt(native) }
}

fn reading_of(event: &Event) -> Option<&Reading> {
    // SAFETY: the optional member is null or points to a valid Reading.
    unsafe { event.reading.as_ref() }
}

fn tags_of(event: &Event) -> Vec<String> {
    if event.tags_len == 0 {
        return Vec::new();
    }
    // SAFETY: `tags` holds `tags_len` valid strings.
    let tags = unsafe { std::slice::from_raw_parts(event.tags, event.tags_len) };
    uatypes::from_native_array(tags)
}

#[test]
fn descriptors_have_expected_shape() {
    init_logging();
    let severity = TypeRegistry::descriptor::<Severity>();
    assert_eq!(severity.type_kind(), TypeKind::Enum);
    assert_eq!(severity.mem_size(), 4);

    let reading = TypeRegistry::descriptor::<Reading>();
    assert_eq!(reading.type_kind(), TypeKind::Union);
    assert!(reading.members().iter().all(|m| m.padding() == 8));
    assert!(!reading.is_pointer_free());

    let event = TypeRegistry::descriptor::<Event>();
    assert_eq!(event.type_kind(), TypeKind::OptionalStruct);
    assert_eq!(event.members().len(), 4);
    assert!(event.member("reading").expect("reading").is_optional());
    assert!(event.member("tags").expect("tags").is_array());
    assert_eq!(event.member_index("source"), Some(1));
}

#[test]
fn event_clone_is_deep_and_independent() {
    init_logging();
    let original = event(
        Severity::Alarm,
        "boiler",
        Some(text_reading("overheat")),
        &["plant-a", "line-3"],
    );
    let mut copy = original.clone();
    assert_eq!(copy, original);
    assert_ne!(copy.reading, original.reading);
    assert_ne!(copy.tags, original.tags);

    copy.clear();
    assert!(copy.is_empty());
    assert!(copy.reading.is_null());

    assert_eq!(original.severity, Severity::Alarm);
    assert_eq!(original.source.to_string_lossy(), "boiler");
    let reading = reading_of(&original).expect("reading");
    assert_eq!(reading.switch, 2);
    // SAFETY: switch 2 selects the text alternative.
    assert_eq!(unsafe { reading.payload.text.as_bytes() }, b"overheat");
    assert_eq!(tags_of(&original), vec!["plant-a", "line-3"]);
}

#[test]
fn optional_member_participates_in_equality() {
    let with = event(Severity::Info, "pump", Some(numeric_reading(1.5)), &[]);
    let without = event(Severity::Info, "pump", None, &[]);
    let other_value = event(Severity::Info, "pump", Some(numeric_reading(2.5)), &[]);
    assert_ne!(with, without);
    assert_ne!(with, other_value);
    assert_eq!(with, with.try_clone().expect("clone"));
    assert_eq!(without.try_clone().expect("clone"), without);
}

#[test]
fn union_compares_switch_then_alternative() {
    assert_eq!(text_reading("a"), text_reading("a"));
    assert_ne!(text_reading("a"), text_reading("b"));
    assert_ne!(numeric_reading(0.0), text_reading(""));
    assert_eq!(numeric_reading(4.0), numeric_reading(4.0));
    assert!(OwnershipWrapper::<Reading>::new().is_empty());
}

#[test]
fn invalid_union_switch_is_cleared_safely() {
    init_logging();
    let mut bogus = adopt_reading(Reading {
        switch: 7,
        payload: ReadingPayload { numeric: 1.0 },
    });
    let copy = bogus.try_clone().expect("clone");
    assert!(copy.is_empty());

    let twin = adopt_reading(Reading {
        switch: 7,
        payload: ReadingPayload { numeric: 2.0 },
    });
    let other = adopt_reading(Reading {
        switch: 9,
        payload: ReadingPayload { numeric: 1.0 },
    });
    assert_eq!(bogus, twin);
    assert_ne!(bogus, other);
    assert_ne!(bogus, copy);
    bogus.clear();
    assert!(bogus.is_empty());
}

#[test]
fn registry_lookup_and_data_type_array() {
    init_logging();
    TypeRegistry::register_type::<Event>().expect("register Event");
    TypeRegistry::register_type::<Reading>().expect("register Reading");

    let found = TypeRegistry::find(&NodeId::string(NS, "Event")).expect("Event");
    assert!(std::ptr::eq(found, Event::descriptor()));

    let base = Arc::new(DataTypeArray::new([Severity::descriptor()]));
    let types = DataTypeArray::new([Event::descriptor(), Reading::descriptor()]).with_next(base);
    assert_eq!(types.iter().count(), 3);
    assert_eq!(
        types.find_by_encoding_id(&NodeId::numeric(NS, 1001)).map(|d| d.name()),
        Some("Severity")
    );
    assert_eq!(
        types.find(&NodeId::numeric(NS, 2)).map(|d| d.name()),
        Some("Reading")
    );
}

#[test]
fn variant_holds_custom_type() {
    let value = event(Severity::Warning, "valve", None, &["x"]);
    let variant = Variant::from_scalar(value).expect("variant");
    assert!(variant.is_type::<Event>());

    let held = variant.scalar::<Event>().expect("scalar");
    assert_eq!(held.source.as_bytes(), b"valve");
    assert_eq!(tags_of(held), vec!["x"]);

    assert_eq!(
        variant.scalar::<Reading>().unwrap_err(),
        Error::TypeMismatch {
            expected: "Reading".into(),
            actual: "Event".into(),
        }
    );
    assert_eq!(variant.clone(), variant);
}
