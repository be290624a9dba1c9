//! End-to-end seed scenarios from the comparison engine's specification (spec §8, A–F):
//! one integration test per scenario, exercised purely through the public API.

use std::sync::Arc;

use schema_match::comparator::{Exact, Levenshtein};
use schema_match::{compare, CompareOptions, FieldDescriptor, PrimType, Record, Schema, Scalar, Value};

fn string_field(threshold: f64) -> FieldDescriptor {
    FieldDescriptor::primitive(PrimType::String, Arc::new(Exact)).with_threshold(threshold)
}

fn int_field(threshold: f64) -> FieldDescriptor {
    FieldDescriptor::primitive(PrimType::Int, Arc::new(Exact)).with_threshold(threshold)
}

/// Scenario A — flat perfect match.
#[test]
fn scenario_a_flat_perfect_match() {
    let schema = Schema::new([("name", string_field(1.0)), ("age", int_field(1.0))]).unwrap();
    let rec = Record::new()
        .insert("name", Value::Prim(Scalar::String("Alice".into())))
        .insert("age", Value::Prim(Scalar::Int(30)));

    let result = compare(&schema, &rec, &rec, CompareOptions::default());

    assert_eq!(result.overall_score, 1.0);
    let matrix = result.confusion_matrix.unwrap();
    assert_eq!(matrix.overall.tp, 2);
    assert_eq!(matrix.overall, matrix.aggregate);
    let derived = matrix.overall_derived.unwrap();
    assert_eq!(derived.precision, 1.0);
    assert_eq!(derived.recall, 1.0);
    assert_eq!(derived.f1, 1.0);
    assert_eq!(derived.accuracy, 1.0);
}

/// Scenario B — primitive mismatch below threshold.
#[test]
fn scenario_b_primitive_mismatch_below_threshold() {
    let schema = Schema::new([
        (
            "name",
            FieldDescriptor::primitive(PrimType::String, Arc::new(Levenshtein)).with_threshold(0.9),
        ),
        ("age", int_field(1.0)),
    ])
    .unwrap();
    let gt = Record::new()
        .insert("name", Value::Prim(Scalar::String("Alice".into())))
        .insert("age", Value::Prim(Scalar::Int(30)));
    let pred = Record::new()
        .insert("name", Value::Prim(Scalar::String("Alicia".into())))
        .insert("age", Value::Prim(Scalar::Int(30)));

    let result = compare(&schema, &gt, &pred, CompareOptions::default());
    let matrix = result.confusion_matrix.unwrap();

    assert_eq!(matrix.children.get("name").unwrap().overall.fd, 1);
    assert_eq!(matrix.children.get("age").unwrap().overall.tp, 1);
    assert_eq!(matrix.overall.tp, 1);
    assert_eq!(matrix.overall.fd, 1);
    assert_eq!(matrix.overall.fp(), 1);
    // clip_under_threshold defaults to true, so the weighted score is exactly 0.5.
    assert_eq!(result.overall_score, 0.5);
}

/// Scenario C — list-of-record Hungarian reorder.
#[test]
fn scenario_c_list_of_record_hungarian_reorder() {
    let item_schema =
        Schema::with_match_threshold([("id", string_field(1.0)), ("qty", int_field(1.0))], 0.7).unwrap();
    let schema = Schema::new([("items", FieldDescriptor::list_rec(item_schema))]).unwrap();

    let rec = |id: &str, qty: i64| {
        Record::new()
            .insert("id", Value::Prim(Scalar::String(id.into())))
            .insert("qty", Value::Prim(Scalar::Int(qty)))
    };
    let gt = Record::new().insert(
        "items",
        Value::ListRec(vec![rec("A", 1), rec("B", 2)]),
    );
    let pred = Record::new().insert(
        "items",
        Value::ListRec(vec![rec("B", 2), rec("A", 1)]),
    );

    let result = compare(&schema, &gt, &pred, CompareOptions::default());
    let matrix = result.confusion_matrix.unwrap();
    let items = matrix.children.get("items").unwrap();

    assert_eq!(items.overall.tp, 2);
    assert_eq!(items.aggregate.tp, 4);
    assert_eq!(result.overall_score, 1.0);
}

/// Scenario D — list-of-record below element match_threshold.
#[test]
fn scenario_d_list_of_record_below_match_threshold() {
    let item_schema =
        Schema::with_match_threshold([("id", string_field(1.0)), ("qty", int_field(1.0))], 0.7).unwrap();
    let schema = Schema::new([("items", FieldDescriptor::list_rec(item_schema))]).unwrap();

    let rec = |id: &str, qty: i64| {
        Record::new()
            .insert("id", Value::Prim(Scalar::String(id.into())))
            .insert("qty", Value::Prim(Scalar::Int(qty)))
    };
    let gt = Record::new().insert("items", Value::ListRec(vec![rec("A", 1)]));
    let pred = Record::new().insert("items", Value::ListRec(vec![rec("A", 9)]));

    let result = compare(&schema, &gt, &pred, CompareOptions::default());
    let matrix = result.confusion_matrix.unwrap();
    let items = matrix.children.get("items").unwrap();

    assert_eq!(items.overall.fd, 1);
    assert_eq!(items.overall.fp(), 1);
    assert_eq!(items.overall.fn_, 0);
    assert_eq!(items.overall.fa, 0);
    assert_eq!(items.aggregate.tp, 1); // id
    assert_eq!(items.aggregate.fd, 1); // qty
    assert_eq!(result.overall_score, 0.5);
}

/// Scenario E — extra (hallucinated) field in the prediction.
#[test]
fn scenario_e_extra_prediction_field_is_false_alarm() {
    let schema = Schema::new([("name", string_field(1.0))]).unwrap();
    let gt = Record::new().insert("name", Value::Prim(Scalar::String("Alice".into())));
    let pred = Record::new()
        .insert("name", Value::Prim(Scalar::String("Alice".into())))
        .with_extra_fields(["ssn".to_owned()]);

    let result = compare(&schema, &gt, &pred, CompareOptions::default());
    let matrix = result.confusion_matrix.unwrap();

    assert_eq!(matrix.overall.tp, 1);
    assert_eq!(matrix.overall.fa, 1);
    assert_eq!(matrix.overall.fp(), 1);

    let non_matches = result.non_matches.unwrap();
    assert_eq!(non_matches.len(), 1);
    assert_eq!(non_matches[0].field_path, "ssn");
    assert_eq!(non_matches[0].kind, schema_match::NonMatchKind::FalseAlarm);
}

/// Scenario F — null list vs. populated list.
#[test]
fn scenario_f_null_list_vs_populated_list() {
    let schema = Schema::new([(
        "tags",
        FieldDescriptor::list_prim(PrimType::String, Arc::new(Exact)).with_threshold(0.8),
    )])
    .unwrap();
    let gt = Record::new().insert("tags", Value::Null);
    let pred = Record::new().insert(
        "tags",
        Value::ListPrim(vec![
            Scalar::String("a".into()),
            Scalar::String("b".into()),
            Scalar::String("c".into()),
        ]),
    );

    let result = compare(&schema, &gt, &pred, CompareOptions::default());
    let matrix = result.confusion_matrix.unwrap();
    let tags = matrix.children.get("tags").unwrap();

    assert_eq!(tags.overall.fa, 3);
    assert_eq!(tags.overall.fp(), 3);
    assert_eq!(matrix.overall.fa, 3);
    assert_eq!(matrix.overall.fp(), 3);

    let non_matches = result.non_matches.unwrap();
    assert_eq!(non_matches.len(), 3);
}
