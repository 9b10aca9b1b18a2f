//! Tests for column validation and the two-way split.

use csv_dataset_manager::partition::{RowSubset, load_table, partition, validate_column};
use csv_dataset_manager::{LoadOptions, PartitionError, PartitionValue, Row, Table, Value};
use std::fs;

fn labels(values: &[Value]) -> Table {
    Table::new(
        vec!["label".into(), "image_path".into()],
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Row::new(vec![v.clone(), Value::Str(format!("/imgs/{}.png", i + 1))]))
            .collect(),
    )
    .unwrap()
}

fn s(v: &str) -> Value {
    Value::Str(v.into())
}

#[test]
fn cat_dog_cat_scenario() {
    let table = labels(&[s("cat"), s("dog"), s("cat")]);
    let parts = partition(&table, "label", &PartitionValue::Str("cat".into()));

    assert_eq!(parts.matching.indices(), &[0, 2]);
    assert_eq!(parts.non_matching.indices(), &[1]);
    let paths: Vec<_> = parts
        .matching
        .column_values("image_path")
        .map(|(_, v)| v.to_string())
        .collect();
    assert_eq!(paths, vec!["/imgs/1.png", "/imgs/3.png"]);
}

#[test]
fn partition_is_total_and_disjoint() {
    let table = labels(&[
        s("a"),
        Value::Null,
        s("b"),
        Value::Int(1),
        s("a"),
        Value::Float(1.0),
        s("c"),
    ]);
    for value in [
        PartitionValue::Str("a".into()),
        PartitionValue::Int(1),
        PartitionValue::Str("zzz".into()),
    ] {
        let parts = partition(&table, "label", &value);
        let mut all: Vec<usize> = parts
            .matching
            .indices()
            .iter()
            .chain(parts.non_matching.indices())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..table.len()).collect::<Vec<_>>(), "value {value}");
        assert!(
            parts
                .matching
                .indices()
                .iter()
                .all(|i| !parts.non_matching.indices().contains(i))
        );
    }
}

#[test]
fn partition_is_stable() {
    let table = labels(&[s("x"), s("y"), s("x"), s("y"), s("x")]);
    let parts = partition(&table, "label", &PartitionValue::Str("x".into()));

    let m = parts.matching.indices();
    let n = parts.non_matching.indices();
    assert!(m.windows(2).all(|w| w[0] < w[1]));
    assert!(n.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(m, &[0, 2, 4]);
    assert_eq!(n, &[1, 3]);
}

#[test]
fn nulls_and_type_mismatches_do_not_match() {
    let table = labels(&[Value::Null, s("5"), Value::Int(5)]);
    let parts = partition(&table, "label", &PartitionValue::Int(5));
    assert_eq!(parts.matching.indices(), &[2]);
    assert_eq!(parts.non_matching.indices(), &[0, 1]);
}

#[test]
fn every_row_matching_leaves_non_matching_empty() {
    let table = labels(&[s("cat"), s("cat")]);
    let parts = partition(&table, "label", &PartitionValue::Str("cat".into()));
    assert_eq!(parts.matching.len(), 2);
    assert!(parts.non_matching.is_empty());
}

#[test]
fn absent_value_leaves_matching_empty() {
    let table = labels(&[s("cat"), s("dog")]);
    let parts = partition(&table, "label", &PartitionValue::Str("bird".into()));
    assert!(parts.matching.is_empty());
    assert_eq!(parts.non_matching.len(), 2);
}

#[test]
fn validate_column_accepts_known_column() {
    let table = labels(&[s("cat")]);
    assert!(validate_column(&table, "label").is_ok());
}

#[test]
fn validate_column_rejects_unknown_column() {
    let table = labels(&[s("cat")]);
    let err = validate_column(&table, "species").unwrap_err();
    match err {
        PartitionError::UnknownColumn { column, available } => {
            assert_eq!(column, "species");
            assert_eq!(available, vec!["label".to_string(), "image_path".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_table_wraps_failures_as_load_errors() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("bad.csv");
    fs::write(&path, "a,b\n1,2,3\n")?;

    let err = load_table(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, PartitionError::Load { .. }));
    assert!(err.to_string().contains("Failed to load table"));
    Ok(())
}

#[test]
fn row_subset_new_drops_out_of_range_indices() {
    let table = labels(&[s("a"), s("b")]);
    let subset = RowSubset::new(&table, vec![1, 5, 0]);
    assert_eq!(subset.indices(), &[1, 0]);
    assert_eq!(subset.rows().count(), 2);
    assert_eq!(RowSubset::all(&table).len(), 2);
}
