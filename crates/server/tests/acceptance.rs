//! End-to-end scenarios and cross-cutting invariants run against the
//! public `apocryphad` library API, mirroring the style of the teacher's
//! `crates/sqrld/tests/query_engine.rs`: plain `#[test]` functions over
//! the crate's public surface rather than spinning up a socket.

use apocryphad::store::Store;
use std::path::PathBuf;

fn store() -> Store {
  Store::new(Default::default(), PathBuf::from("/tmp/unused-apocrypha-test.json"), 16)
}

fn q(store: &Store, line: &str) -> String {
  let tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
  store.evaluate(&tokens).unwrap()
}

fn q_err(store: &Store, line: &str) -> String {
  let tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
  store.evaluate(&tokens).unwrap_err().to_string()
}

#[test]
fn scenario_1_apples_granny() {
  let s = store();
  assert_eq!(q(&s, "apples granny = good"), "");
  assert_eq!(q(&s, "apples"), "{'granny': 'good'}\n");
  assert_eq!(q(&s, "apples granny"), "good\n");
}

#[test]
fn scenario_2_toppings_append() {
  let s = store();
  q(&s, "toppings = mushrooms");
  q(&s, "toppings + pineapple");
  assert_eq!(q(&s, "toppings"), "mushrooms\npineapple\n");
}

#[test]
fn scenario_3_sweets_remove() {
  let s = store();
  q(&s, "sweets = cake pie pizza");
  q(&s, "sweets - pizza");
  assert_eq!(q(&s, "sweets"), "cake\npie\n");
}

#[test]
fn scenario_4_search_order_follows_insertion() {
  let s = store();
  q(&s, "rasp = berry");
  q(&s, "blue = berry");
  assert_eq!(q(&s, "@ berry"), "rasp\nblue\n");
}

#[test]
fn scenario_5_set_json_list() {
  let s = store();
  q(&s, r#"pasta --set ["spaghetti","lasagna"]"#);
  assert_eq!(q(&s, "pasta"), "spaghetti\nlasagna\n");
}

#[test]
fn scenario_6_del_prunes_to_sibling() {
  let s = store();
  q(&s, "apple sauce = good");
  q(&s, "apple pie = great");
  q(&s, "apple sauce --del");
  assert_eq!(q(&s, "apple"), "{'pie': 'great'}\n");
}

#[test]
fn round_trip_assign_then_index() {
  let s = store();
  q(&s, "x = hello world");
  assert_eq!(q(&s, "x"), "hello\nworld\n");
}

#[test]
fn round_trip_set_then_edit_is_semantically_equal() {
  let s = store();
  q(&s, r#"cfg --set {"a":"1","b":["x","y"]}"#);
  assert_eq!(q(&s, "cfg --edit"), "{\"a\":\"1\",\"b\":[\"x\",\"y\"]}\n");
}

#[test]
fn round_trip_append_then_remove_sequence() {
  let s = store();
  q(&s, "list = a b");
  q(&s, "list + c");
  assert_eq!(q(&s, "list"), "a\nb\nc\n");
  q(&s, "list - b");
  assert_eq!(q(&s, "list"), "a\nc\n");
}

#[test]
fn boundary_last_element_removal_deletes_the_key() {
  let s = store();
  q(&s, "only = x");
  q(&s, "only - x");
  assert_eq!(q(&s, "only"), "");
}

#[test]
fn boundary_remove_of_only_child_prunes_the_now_empty_parent() {
  let s = store();
  q(&s, "a b = x");
  q(&s, "a b - x");
  assert_eq!(q(&s, "a"), "");
}

#[test]
fn boundary_autovivify_creates_intermediate_mappings() {
  let s = store();
  q(&s, "a b c = v");
  assert_eq!(q(&s, "a --keys"), "b\n");
  assert_eq!(q(&s, "a b --keys"), "c\n");
}

#[test]
fn boundary_del_prunes_to_root_but_never_removes_it() {
  let s = store();
  q(&s, "a b c = v");
  q(&s, "a b c --del");
  assert_eq!(q(&s, "a"), "");
}

#[test]
fn invariant_a_generation_and_dirty_after_mutation() {
  let s = store();
  assert!(!s.is_dirty());
  q(&s, "a = b");
  assert!(s.is_dirty());
  assert_eq!(s.generation(), 1);
  q(&s, "a = c");
  assert_eq!(s.generation(), 2);
}

#[test]
fn invariant_failed_mutation_leaves_root_unchanged() {
  let s = store();
  q(&s, "a = x y");
  let before = q(&s, "a");
  let err = q_err(&s, "a - z");
  assert_eq!(err, "value not found");
  assert_eq!(q(&s, "a"), before);
}

#[test]
fn short_aliases_normalize_before_dispatch() {
  let s = store();
  q(&s, "a b = v");
  assert_eq!(q(&s, "a -k"), "b\n");
  assert_eq!(q(&s, "a b -e"), "\"v\"\n");
}

#[test]
fn error_responses_use_fixed_prefix() {
  let s = store();
  let err = q_err(&s, "a = b + c");
  assert_eq!(err, "multiple operators");
}
