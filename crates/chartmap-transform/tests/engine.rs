//! Engine behaviour over small in-memory tables.

use chartmap_model::{
    Aggregation, CellValue, Filter, FilterOp, NullHandling, Order, Pivot, Row, Transform,
};
use chartmap_transform::{Query, TabularTransformEngine, TransformOutput};
use proptest::prelude::*;
use serde_json::{Value, json};

fn query<'a>(column: &'a str, transform: &'a Transform, pivot: &'a Pivot) -> Query<'a> {
    Query {
        item: "test",
        column,
        transform,
        pivot,
    }
}

fn values(output: TransformOutput) -> Vec<(String, Value)> {
    match output {
        TransformOutput::Values { groups } => groups
            .into_iter()
            .map(|g| (g.label("all"), g.value))
            .collect(),
        TransformOutput::Matrix(_) => panic!("expected values"),
    }
}

#[test]
fn eq_filter_keeps_matching_group_only() {
    let rows = vec![
        Row::new().with("channel", "Email").with("day", "Mon").with("count", 3),
        Row::new().with("channel", "SMS").with("day", "Mon").with("count", 5),
    ];
    let transform = Transform {
        aggregation: Aggregation::Sum,
        group_by: vec!["channel".into(), "day".into()],
        filters: vec![Filter::new("channel", FilterOp::Eq, json!("Email"))],
        ..Transform::default()
    };
    let pivot = Pivot::default();
    let output = TabularTransformEngine::new()
        .execute(&rows, &query("count", &transform, &pivot))
        .expect("execute");
    assert_eq!(values(output), vec![("Email/Mon".to_string(), json!(3))]);
}

#[test]
fn comparison_and_set_filters() {
    let rows: Vec<Row> = (1..=6)
        .map(|n| Row::new().with("n", n).with("tag", if n % 2 == 0 { "even" } else { "odd" }))
        .collect();
    let engine = TabularTransformEngine::new();
    let pivot = Pivot::default();

    let transform = Transform {
        aggregation: Aggregation::Count,
        filters: vec![
            Filter::new("n", FilterOp::Gte, json!(2)),
            Filter::new("n", FilterOp::Lt, json!(6)),
            Filter::new("tag", FilterOp::NotIn, json!(["odd"])),
        ],
        ..Transform::default()
    };
    let output = engine
        .execute(&rows, &query("n", &transform, &pivot))
        .expect("execute");
    assert_eq!(values(output), vec![("all".to_string(), json!(2))]);

    let transform = Transform {
        aggregation: Aggregation::Max,
        filters: vec![Filter::new("n", FilterOp::In, json!([1, 3, 4]))],
        ..Transform::default()
    };
    let output = engine
        .execute(&rows, &query("n", &transform, &pivot))
        .expect("execute");
    assert_eq!(values(output), vec![("all".to_string(), json!(4))]);
}

fn sparse_rows() -> Vec<Row> {
    vec![
        Row::new().with("day", "Mon").with("channel", "Email").with("count", 3),
        Row::new().with("day", "Tue").with("channel", "SMS").with("count", CellValue::Null),
    ]
}

#[test]
fn pivot_zero_fills_missing_cells() {
    let transform = Transform {
        aggregation: Aggregation::Sum,
        null_handling: NullHandling::Zero,
        ..Transform::default()
    };
    let pivot = Pivot::new("day", Some("channel"));
    let output = TabularTransformEngine::new()
        .execute(&sparse_rows(), &query("count", &transform, &pivot))
        .expect("execute");
    let TransformOutput::Matrix(matrix) = output else {
        panic!("expected matrix");
    };
    assert_eq!(
        matrix.categories,
        vec![CellValue::from("Mon"), CellValue::from("Tue")]
    );
    assert_eq!(matrix.series("Email").expect("Email").data, vec![json!(3), json!(0)]);
    // SMS/Tue only holds a null, which counts as missing.
    assert_eq!(matrix.series("SMS").expect("SMS").data, vec![json!(0), json!(0)]);
}

#[test]
fn pivot_skip_omits_missing_cells() {
    let transform = Transform {
        aggregation: Aggregation::Sum,
        null_handling: NullHandling::Skip,
        ..Transform::default()
    };
    let pivot = Pivot::new("day", Some("channel"));
    let output = TabularTransformEngine::new()
        .execute(&sparse_rows(), &query("count", &transform, &pivot))
        .expect("execute");
    let TransformOutput::Matrix(matrix) = output else {
        panic!("expected matrix");
    };
    assert_eq!(matrix.series("Email").expect("Email").data, vec![json!(3)]);
    assert_eq!(matrix.series("Email").expect("Email").labels, vec![json!("Mon")]);
    assert!(matrix.series("SMS").expect("SMS").data.is_empty());
}

#[test]
fn pivot_fill_uses_fill_value() {
    let transform = Transform {
        aggregation: Aggregation::Sum,
        null_handling: NullHandling::Fill,
        fill_value: Some(json!(-1)),
        ..Transform::default()
    };
    let pivot = Pivot::new("day", Some("channel"));
    let output = TabularTransformEngine::new()
        .execute(&sparse_rows(), &query("count", &transform, &pivot))
        .expect("execute");
    let TransformOutput::Matrix(matrix) = output else {
        panic!("expected matrix");
    };
    assert_eq!(matrix.series("Email").expect("Email").data, vec![json!(3), json!(-1)]);
}

#[test]
fn order_by_value_desc_then_limit() {
    let rows = vec![
        Row::new().with("name", "A").with("score", 10),
        Row::new().with("name", "B").with("score", 30),
        Row::new().with("name", "C").with("score", 20),
    ];
    let transform = Transform {
        aggregation: Aggregation::Sum,
        group_by: vec!["name".into()],
        order_by: vec![Order::desc("value")],
        limit: Some(2),
        ..Transform::default()
    };
    let pivot = Pivot::default();
    let output = TabularTransformEngine::new()
        .execute(&rows, &query("score", &transform, &pivot))
        .expect("execute");
    assert_eq!(
        values(output),
        vec![("B".to_string(), json!(30)), ("C".to_string(), json!(20))]
    );
}

fn labels(output: TransformOutput) -> Vec<String> {
    values(output).into_iter().map(|(label, _)| label).collect()
}

#[test]
fn groups_keep_first_appearance_without_order() {
    let rows = vec![
        Row::new().with("name", "C").with("score", 1),
        Row::new().with("name", "A").with("score", 2),
        Row::new().with("name", "B").with("score", 3),
        Row::new().with("name", "A").with("score", 4),
    ];
    let transform = Transform {
        aggregation: Aggregation::Sum,
        group_by: vec!["name".into()],
        ..Transform::default()
    };
    let pivot = Pivot::default();
    let output = TabularTransformEngine::new()
        .execute(&rows, &query("score", &transform, &pivot))
        .expect("execute");
    assert_eq!(
        values(output),
        vec![
            ("C".to_string(), json!(1)),
            ("A".to_string(), json!(6)),
            ("B".to_string(), json!(3)),
        ]
    );
}

#[test]
fn equal_sort_keys_keep_grouping_order() {
    let rows = vec![
        Row::new().with("name", "A").with("score", 1),
        Row::new().with("name", "B").with("score", 2),
        Row::new().with("name", "C").with("score", 1),
        Row::new().with("name", "D").with("score", 2),
    ];
    let transform = Transform {
        aggregation: Aggregation::Sum,
        group_by: vec!["name".into()],
        order_by: vec![Order::desc("value")],
        ..Transform::default()
    };
    let pivot = Pivot::default();
    let output = TabularTransformEngine::new()
        .execute(&rows, &query("score", &transform, &pivot))
        .expect("execute");
    assert_eq!(labels(output), vec!["B", "D", "A", "C"]);
}

#[test]
fn order_by_field_asc_then_value_desc() {
    let rows = vec![
        Row::new().with("region", "South").with("product", "X").with("amount", 5),
        Row::new().with("region", "North").with("product", "X").with("amount", 1),
        Row::new().with("region", "North").with("product", "Y").with("amount", 4),
        Row::new().with("region", "South").with("product", "Y").with("amount", 9),
    ];
    let transform = Transform {
        aggregation: Aggregation::Sum,
        group_by: vec!["region".into(), "product".into()],
        order_by: vec![Order::asc("region"), Order::desc("amount")],
        ..Transform::default()
    };
    let pivot = Pivot::default();
    let output = TabularTransformEngine::new()
        .execute(&rows, &query("amount", &transform, &pivot))
        .expect("execute");
    assert_eq!(
        values(output),
        vec![
            ("North/Y".to_string(), json!(4)),
            ("North/X".to_string(), json!(1)),
            ("South/Y".to_string(), json!(9)),
            ("South/X".to_string(), json!(5)),
        ]
    );
}

#[test]
fn non_numeric_text_fails_sum() {
    let rows = vec![Row::new().with("amount", "lots")];
    let transform = Transform {
        aggregation: Aggregation::Sum,
        ..Transform::default()
    };
    let pivot = Pivot::default();
    let err = TabularTransformEngine::new()
        .execute(&rows, &query("amount", &transform, &pivot))
        .expect_err("text is not summable");
    assert!(err.to_string().contains("non-numeric"));
}

proptest! {
    #[test]
    fn order_desc_with_limit_keeps_largest(
        scores in proptest::collection::vec(0i64..1000, 1..20),
        limit in 0usize..25,
    ) {
        let rows: Vec<Row> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| Row::new().with("name", format!("g{i}")).with("score", *s))
            .collect();
        let transform = Transform {
            aggregation: Aggregation::Sum,
            group_by: vec!["name".into()],
            order_by: vec![Order::desc("score")],
            limit: Some(limit),
            ..Transform::default()
        };
        let pivot = Pivot::default();
        let output = TabularTransformEngine::new()
            .execute(&rows, &query("score", &transform, &pivot))
            .expect("execute");
        let got: Vec<(String, i64)> = values(output)
            .into_iter()
            .map(|(label, v)| (label, v.as_i64().expect("integer sum")))
            .collect();

        // Ties keep first-appearance order, so a stable sort of the input is exact.
        let mut expected: Vec<(String, i64)> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("g{i}"), *s))
            .collect();
        expected.sort_by(|a, b| b.1.cmp(&a.1));
        expected.truncate(limit);
        prop_assert_eq!(got, expected);
    }
}
