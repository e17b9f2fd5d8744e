//! End-to-end filtering scenarios over a small traceability report: system
//! requirements decompose into software requirements, which are verified by
//! test cases.

use tracesift_core::{Filter, Item};

fn report() -> Vec<Item> {
    serde_yaml::from_str(
        "
- id: SYS-1
  object_type: Requirement
  title: System shall brake
  location: [Vehicle, System Requirements]
  fields: {Status: Approved}
  tags: [safety]
  created_at: 2023-06-01T00:00:00Z
  modified_at: 2024-01-05T00:00:00Z
  upstream: []
  downstream:
    - {related_id: SW-1, type: decomposes to}
    - {related_id: SW-2, type: decomposes to}

- id: SW-1
  object_type: Requirement
  title: Apply brake pressure
  location: [Vehicle, Software Requirements]
  fields: {Status: Approved}
  tags: [safety]
  created_at: 2023-07-01T00:00:00Z
  modified_at: 2024-02-10T00:00:00Z
  upstream:
    - {related_id: SYS-1, type: decomposes to}
  downstream:
    - {related_id: TC-1, type: verified by}
    - {related_id: TC-2, type: verified by}

- id: SW-2
  object_type: Requirement
  title: Report brake faults
  location: [Vehicle, Software Requirements]
  fields: {Status: Draft}
  tags: []
  created_at: 2023-08-01T00:00:00Z
  modified_at: 2024-03-15T00:00:00Z
  upstream:
    - {related_id: SYS-1, type: decomposes to}
  downstream:
    - {related_id: TC-GONE, type: verified by}

- id: TC-1
  object_type: Test Case
  title: Brake pressure nominal
  location: [Vehicle, Tests]
  fields: {Result: Passed}
  tags: [regression]
  created_at: 2023-09-01T00:00:00Z
  modified_at: 2024-04-01T00:00:00Z
  upstream:
    - {related_id: SW-1, type: verified by}
  downstream: []

- id: TC-2
  object_type: Test Case
  title: Brake pressure degraded
  location: [Vehicle, Tests]
  fields: {Result: Failed}
  tags: [regression]
  created_at: 2023-09-01T00:00:00Z
  modified_at: 2024-04-02T00:00:00Z
  upstream:
    - {related_id: SW-1, type: verified by}
  downstream: []
",
    )
    .unwrap()
}

fn matching_ids(definition: &str, items: &[Item]) -> Vec<String> {
    Filter::from_yaml_str(definition)
        .unwrap()
        .apply(items)
        .unwrap()
        .iter()
        .map(|item| item.id.clone())
        .collect()
}

#[test]
fn software_requirements_are_found_by_location() {
    let items = report();
    let ids = matching_ids(
        "main:\n  location: {is under: Vehicle/Software Requirements}\n",
        &items,
    );
    assert_eq!(ids, vec!["SW-1", "SW-2"]);
}

#[test]
fn unverified_requirements_have_no_passing_test() {
    // requirements where no downstream test passed
    let definition = "
main:
  type: Requirement
  according to all:
    - downstream items:
        with relationship type: verified by
        count match: passed-test
        count: {is: 0}
passed-test:
  field: {name: Result, value: {is: Passed}}
";
    let items = report();
    let ids = matching_ids(definition, &items);
    // SYS-1 has no "verified by" relationships at all, so its count is 0;
    // SW-2's only test is unknown, which counts as a (potential) match
    assert_eq!(ids, vec!["SYS-1"]);
}

#[test]
fn fully_verified_requirements_require_known_tests() {
    let definition = "
main:
  type: Requirement
  according to all:
    - downstream items:
        with relationship type: verified by
        count: {greater than or equal to: 1}
    - downstream items:
        with relationship type: verified by
        all match: passed-test
passed-test:
  field: {name: Result, value: {is: Passed}}
";
    let items = report();
    // SW-1 has a failed test, SW-2 an unknown one; neither fully verifies
    assert!(matching_ids(definition, &items).is_empty());

    // fix the failing test and SW-1 qualifies
    let mut items = items;
    items[4].fields.insert("Result".into(), "Passed".into());
    assert_eq!(matching_ids(definition, &items), vec!["SW-1"]);
}

#[test]
fn draft_requirements_under_a_subtree() {
    let definition = "
main:
  according to all:
    - location: {is under: Vehicle}
    - field: {name: Status, value: {is: Draft}}
";
    let items = report();
    assert_eq!(matching_ids(definition, &items), vec!["SW-2"]);
}

#[test]
fn safety_items_modified_this_year() {
    let definition = "
main:
  according to all:
    - tags: {include: safety}
    - modified: {after: 2024-01-01T00:00:00Z}
";
    let items = report();
    assert_eq!(matching_ids(definition, &items), vec!["SYS-1", "SW-1"]);
}

#[test]
fn requirements_tracing_to_an_approved_system_requirement() {
    let definition = "
main:
  type: Requirement
  according to all:
    - upstream items:
        with relationship type: decomposes to
        all match: approved-system-requirement
    - upstream items:
        with relationship type: decomposes to
        count: {greater than: 0}
approved-system-requirement:
  according to all:
    - type: Requirement
    - field: {name: Status, value: {is: Approved}}
    - location: {is under: Vehicle/System Requirements}
";
    let items = report();
    assert_eq!(matching_ids(definition, &items), vec!["SW-1", "SW-2"]);
}

#[test]
fn invalid_definition_aborts_before_evaluation() {
    let definition = "
main:
  downstream items:
    all match: passed-test
    count: {is: 2}
passed-test:
  field: {name: Result, value: {is: Passed}}
";
    assert!(Filter::from_yaml_str(definition).is_err());
}
