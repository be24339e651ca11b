//! Tests for chartmap-model types.

use chartmap_model::{
    Aggregation, ChartId, DataType, FilterOp, Mapping, MappingStatus, ModelError, NullHandling,
};

const MAPPING_JSON: &str = r#"{
    "chartId": "stacked_line_chart",
    "templateVersion": "v1",
    "specVersion": "v1",
    "items": [
        {
            "placeholder": "series_1_data",
            "dataType": "array",
            "source": {"table": "daily_conversions", "column": "conversion_count"},
            "transform": {
                "aggregation": "sum",
                "groupBy": ["day_name", "channel_name"],
                "filters": [{"field": "channel_name", "op": "notIn", "value": ["SMS"]}],
                "orderBy": [{"field": "day_name"}],
                "nullHandling": "zero"
            },
            "pivot": {"categoryKey": "day_name", "seriesKey": "channel_name"}
        }
    ]
}"#;

#[test]
fn mapping_loads_with_defaults() {
    let mapping = Mapping::from_json(MAPPING_JSON).expect("parse mapping");
    assert_eq!(mapping.chart_id.as_str(), "stacked_line_chart");
    assert_eq!(mapping.status, MappingStatus::Draft);
    assert!(mapping.mapping_version.is_none());

    let item = &mapping.items[0];
    assert_eq!(item.placeholder, "${series_1_data}");
    assert_eq!(item.variable(), "series_1_data");
    assert_eq!(item.data_type, DataType::Array);
    assert_eq!(item.transform.aggregation, Aggregation::Sum);
    assert_eq!(item.transform.null_handling, NullHandling::Zero);
    assert_eq!(item.transform.filters[0].op, FilterOp::NotIn);
    assert!(item.pivot.is_set());
    assert_eq!(
        item.required_columns(),
        vec!["conversion_count", "day_name", "channel_name"]
    );
}

#[test]
fn mapping_rejects_unknown_aggregation() {
    let text = MAPPING_JSON.replace("\"sum\"", "\"median\"");
    let err = Mapping::from_json(&text).expect_err("median is not an aggregation");
    assert!(matches!(err, ModelError::MalformedMapping(_)));
}

#[test]
fn mapping_rejects_unknown_null_handling() {
    let text = MAPPING_JSON.replace("\"zero\"", "\"interpolate\"");
    assert!(Mapping::from_json(&text).is_err());
}

#[test]
fn mapping_rejects_bad_placeholder() {
    let text = MAPPING_JSON.replace("series_1_data", "series 1");
    let err = Mapping::from_json(&text).expect_err("spaces are not allowed");
    assert!(matches!(err, ModelError::InvalidPlaceholder(_)));
}

#[test]
fn mapping_rejects_empty_chart_id() {
    let text = MAPPING_JSON.replace("stacked_line_chart", "  ");
    assert!(Mapping::from_json(&text).is_err());
}

#[test]
fn mapping_serializes_camel_case() {
    let mapping = Mapping::from_json(MAPPING_JSON).expect("parse mapping");
    let value = serde_json::to_value(&mapping).expect("serialize mapping");
    assert_eq!(value["chartId"], "stacked_line_chart");
    assert_eq!(value["items"][0]["transform"]["groupBy"][1], "channel_name");
    assert!(value.get("mappingVersion").is_none());
    let round: Mapping = serde_json::from_value(value).expect("deserialize mapping");
    assert_eq!(round, mapping);
}

#[test]
fn chart_id_trims() {
    let id = ChartId::new("  basic_pie_chart ").expect("valid id");
    assert_eq!(id.as_str(), "basic_pie_chart");
    assert!(ChartId::new("").is_err());
}
