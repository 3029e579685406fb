// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{ArrayOwnershipWrapper, OwnershipWrapper};
use crate::builder::TypeDescriptorBuilder;
use crate::builtin::{UaLocalizedText, UaString};
use crate::config::empty_array_sentinel;
use crate::error::Error;
use crate::native_type;
use crate::node_id::NodeId;

#[repr(C)]
#[derive(Debug)]
struct Measurements {
    description: UaString,
    len: usize,
    data: *mut f32,
}

native_type!(unsafe Measurements => || {
    TypeDescriptorBuilder::<Measurements>::create_structure(
        "Measurements",
        NodeId::numeric(3, 100),
        NodeId::numeric(3, 101),
    )
    .add_field("description", |m| &m.description)
    .add_array_field::<f32>("data", |m| &m.len, |m| &m.data)
    .build()
});

fn measurements(description: &str, values: &[f32]) -> OwnershipWrapper<Measurements> {
    let mut wrapper = OwnershipWrapper::<Measurements>::new();
    let mut data = ArrayOwnershipWrapper::<f32>::with_len(values.len()).expect("alloc");
    // SAFETY: pointer-free elements.
    unsafe { data.as_mut_slice() }.copy_from_slice(values);
    let (data, len) = data.into_raw_parts();
    // SAFETY: both heap parts come from the memory engine and move into the value.
    unsafe {
        let value = wrapper.handle_mut();
        value.description = UaString::alloc(description).expect("alloc").into_native();
        value.len = len;
        value.data = data;
    }
    wrapper
}

#[repr(C, align(64))]
struct CacheLine {
    value: u64,
}

native_type!(unsafe CacheLine => || {
    TypeDescriptorBuilder::<CacheLine>::create_structure(
        "CacheLine",
        NodeId::numeric(3, 102),
        NodeId::numeric(3, 103),
    )
    .add_field("value", |c| &c.value)
    .build()
});

fn samples(m: &Measurements) -> &[f32] {
    if m.len == 0 {
        return &[];
    }
    // SAFETY: `data` holds `len` floats owned by the value.
    unsafe { std::slice::from_raw_parts(m.data, m.len) }
}

#[test]
fn new_wrapper_is_empty() {
    let wrapper = OwnershipWrapper::<Measurements>::new();
    assert!(wrapper.is_empty());
    assert!(wrapper.description.is_null());
    assert!(wrapper.data.is_null());
    assert_eq!(wrapper, OwnershipWrapper::default());
}

#[test]
fn clone_is_independent() {
    let original = measurements("pressure", &[1.0, 2.5, -3.0]);
    let mut copy = original.clone();
    assert_eq!(copy, original);
    assert_ne!(copy.data, original.data);
    assert_eq!(samples(&copy), &[1.0, 2.5, -3.0]);

    copy.clear();
    assert!(copy.is_empty());
    assert_ne!(copy, original);
    assert_eq!(original.description.as_bytes(), b"pressure");
    assert_eq!(samples(&original), &[1.0, 2.5, -3.0]);
}

#[test]
fn clear_is_idempotent() {
    let mut wrapper = measurements("once", &[1.0]);
    wrapper.clear();
    wrapper.clear();
    assert!(wrapper.is_empty());

    let mut empty = OwnershipWrapper::<UaString>::new();
    empty.clear();
    assert!(empty.is_empty());
}

#[test]
fn take_leaves_source_empty() {
    let mut source = measurements("moved", &[4.0, 5.0]);
    let target = source.take();
    assert!(source.is_empty());
    assert_eq!(target.description.as_bytes(), b"moved");
    drop(source);
    assert_eq!(samples(&target), &[4.0, 5.0]);
}

#[test]
fn swap_exchanges_content() {
    let mut a = UaString::alloc("left").expect("alloc");
    let mut b = UaString::alloc("right").expect("alloc");
    a.swap(&mut b);
    assert_eq!(a.as_bytes(), b"right");
    assert_eq!(b.as_bytes(), b"left");
}

#[test]
fn clone_from_replaces_content() {
    let source = measurements("new", &[9.0]);
    let mut target = measurements("old", &[1.0, 2.0, 3.0]);
    target.clone_from(&source);
    assert_eq!(target, source);

    let mut other = OwnershipWrapper::<Measurements>::new();
    other.try_clone_from(&source).expect("clone");
    assert_eq!(samples(&other), &[9.0]);
}

#[test]
fn empty_and_null_arrays_are_preserved() {
    let empty = measurements("", &[]);
    assert_eq!(empty.data, empty_array_sentinel().cast());
    let copy = empty.try_clone().expect("clone");
    assert_eq!(copy.data, empty_array_sentinel().cast());
    assert!(!copy.description.is_null());
    assert_ne!(copy, OwnershipWrapper::new());
}

#[test]
fn into_native_and_adopt() {
    let wrapper = UaLocalizedText {
        locale: UaString::alloc("de").expect("alloc").into_native(),
        text: UaString::alloc("Druck").expect("alloc").into_native(),
    };
    // SAFETY: both strings were just released by their wrappers.
    let adopted = unsafe { OwnershipWrapper::adopt(wrapper) };
    assert_eq!(adopted.text.to_string_lossy(), "Druck");

    let native = adopted.into_native();
    // SAFETY: ownership goes back to a wrapper that frees it.
    let again = unsafe { OwnershipWrapper::adopt(native) };
    assert_eq!(again.locale.as_bytes(), b"de");
}

#[test]
fn from_value_for_pointer_free_types() {
    let wrapper = OwnershipWrapper::from_value(42u32);
    assert_eq!(*wrapper, 42);
    assert!(!wrapper.is_empty());
    assert_eq!(format!("{:?}", wrapper), "UInt32(42)");
}

#[test]
#[should_panic(expected = "cannot be wrapped by value")]
fn from_value_rejects_heap_types() {
    let _ = OwnershipWrapper::from_value(UaString::default());
}

#[test]
fn array_with_len_is_zeroed() {
    let array = ArrayOwnershipWrapper::<UaString>::with_len(3).expect("alloc");
    assert_eq!(array.len(), 3);
    assert!(array.iter().all(UaString::is_null));
}

#[test]
fn array_bounds_checking() {
    let array = ArrayOwnershipWrapper::<u16>::with_len(4).expect("alloc");
    assert_eq!(*array.at(3), 0);
    assert_eq!(array.get(4), None);
    assert_eq!(array.ptr_at(3), array.as_ptr().wrapping_add(3));
}

#[test]
#[should_panic(expected = "out of range")]
fn array_at_len_panics() {
    let array = ArrayOwnershipWrapper::<u16>::with_len(4).expect("alloc");
    let _ = array.at(4);
}

#[test]
fn array_copy_and_clone_are_deep() {
    let names = ["alpha", "beta"].map(|s| UaString::alloc(s).expect("alloc"));
    let mut natives: Vec<UaString> = names
        .iter()
        .map(|n| n.try_clone().expect("clone").into_native())
        .collect();
    // SAFETY: every element is a valid string owned by `natives`.
    let array = unsafe { ArrayOwnershipWrapper::copy_from_slice(&natives) }.expect("copy");
    // The array holds its own copies; release the sources.
    for native in &mut natives {
        // SAFETY: the strings came from wrappers.
        drop(unsafe { OwnershipWrapper::adopt(std::mem::take(native)) });
    }

    let mut copy = array.clone();
    assert_eq!(copy, array);
    assert_eq!(copy[1].as_bytes(), b"beta");

    copy.clear();
    assert!(copy.is_empty());
    assert_eq!(copy.as_ptr(), empty_array_sentinel().cast_const().cast());
    assert_eq!(array.at(0).as_bytes(), b"alpha");
}

#[test]
fn array_take_and_swap() {
    let mut a = ArrayOwnershipWrapper::<f64>::with_len(2).expect("alloc");
    let mut b = ArrayOwnershipWrapper::<f64>::new();
    a.swap(&mut b);
    assert!(a.is_empty());
    assert_eq!(b.len(), 2);

    let taken = b.take();
    assert!(b.is_empty());
    assert_eq!(taken.len(), 2);
    assert_eq!(ArrayOwnershipWrapper::<f64>::new(), b);
}

#[test]
fn failed_copy_leaves_destination_empty() {
    let mut source = measurements("overflowing", &[]);
    // SAFETY: restored below before the source is dropped.
    unsafe {
        let value = source.handle_mut();
        value.len = usize::MAX;
        value.data = std::ptr::NonNull::<f32>::dangling().as_ptr();
    }

    // `description` is copied before `data` fails.
    assert_eq!(source.try_clone().unwrap_err(), Error::CapacityOverflow);

    let mut target = measurements("previous", &[1.0, 2.0]);
    assert_eq!(target.try_clone_from(&source), Err(Error::CapacityOverflow));
    assert!(target.is_empty());
    assert!(target.description.is_null());
    assert!(target.data.is_null());
    assert_eq!(target.len, 0);

    // SAFETY: back to a valid absent array.
    unsafe {
        let value = source.handle_mut();
        value.len = 0;
        value.data = std::ptr::null_mut();
    }
    assert_eq!(source.description.to_string_lossy(), "overflowing");
}

#[test]
#[should_panic(expected = "alignment")]
fn over_aligned_type_is_rejected() {
    let _ = ArrayOwnershipWrapper::<CacheLine>::with_len(1);
}
