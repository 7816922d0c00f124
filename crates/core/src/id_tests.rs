// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::borrow::Borrow;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn new_and_as_str() {
    let id = TestId::new("abc");
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn display() {
    let id = TestId::new("hello");
    assert_eq!(id.to_string(), "hello");
}

#[test]
fn short_truncates() {
    let id = TestId::new("abcdefgh");
    assert_eq!(id.short(3), "abc");
    assert_eq!(id.short(100), "abcdefgh");
}

#[test]
fn from_string_and_str() {
    let a: TestId = String::from("owned").into();
    let b: TestId = "borrowed".into();
    assert_eq!(a.as_str(), "owned");
    assert_eq!(b.as_str(), "borrowed");
}

#[test]
fn partial_eq_str() {
    let id = TestId::new("test");
    assert_eq!(id, *"test");
    assert_eq!(id, "test");
}

#[test]
fn borrow_and_hash_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::new("k"), 42);
    let borrowed: &str = map.keys().next().unwrap().borrow();
    assert_eq!(borrowed, "k");
    assert_eq!(map.get("k"), Some(&42));
}
