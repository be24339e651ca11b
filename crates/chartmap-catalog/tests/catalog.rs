use std::fs;

use chartmap_catalog::{
    BuiltinTemplateStore, ChartConfig, PlaceholderCatalogGenerator, SeriesLimits, TemplateStore,
};
use chartmap_model::{ChartId, DataType, PlaceholderGroup, TemplateCategory};

fn generator() -> PlaceholderCatalogGenerator<BuiltinTemplateStore> {
    PlaceholderCatalogGenerator::new(BuiltinTemplateStore::default())
}

fn chart(id: &str) -> ChartId {
    ChartId::new(id).expect("valid chart id")
}

#[test]
fn gauge_catalog_snapshot() {
    let catalog = generator()
        .generate(&chart("basic_gauge_chart"), "v1", "v1")
        .expect("generate gauge catalog");
    insta::assert_json_snapshot!("gauge_catalog_items", &catalog.items);
}

#[test]
fn stacked_line_catalog_marks_extra_series_optional() {
    let catalog = generator()
        .generate(&chart("stacked_line_chart"), "v1", "v1")
        .expect("generate catalog");

    for item in &catalog.items {
        assert_eq!(item.name, format!("${{{}}}", item.variable));
    }

    let series_5 = catalog.get("${series_5_data}").expect("slot 5");
    assert!(series_5.required);
    assert_eq!(series_5.data_type, DataType::Array);
    assert_eq!(series_5.target_path.to_string(), "$.series[4].data");

    let series_6 = catalog.get("${series_6_data}").expect("slot 6");
    assert!(!series_6.required);

    let categories = catalog.get("${categories}").expect("categories");
    assert_eq!(categories.group, PlaceholderGroup::Axis);
    assert_eq!(categories.target_path.to_string(), "$.xAxis.data");

    let legend = catalog.get("${legend_config}").expect("legend");
    assert_eq!(legend.data_type, DataType::Object);
    assert_eq!(legend.group, PlaceholderGroup::Legend);

    assert_eq!(catalog.items.len(), 3 + 3 + 20 + 2 + 2);
}

#[test]
fn generation_is_deterministic() {
    let generator = generator();
    let a = generator
        .generate(&chart("basic_radar_chart"), "v1", "v1")
        .expect("first");
    let b = generator
        .generate(&chart("basic_radar_chart"), "v1", "v1")
        .expect("second");
    assert_eq!(a.items, b.items);
    assert_eq!(a.checksum, b.checksum);
    assert_eq!(a.checksum.len(), 64);
}

#[test]
fn checksum_follows_item_tuples() {
    let default = generator()
        .generate(&chart("basic_line_chart"), "v1", "v1")
        .expect("default limits");

    let config = ChartConfig::default()
        .with_limits(TemplateCategory::Cartesian, SeriesLimits::new(2, 10))
        .expect("valid limits");
    let narrowed = PlaceholderCatalogGenerator::new(BuiltinTemplateStore::new(config))
        .generate(&chart("basic_line_chart"), "v1", "v1")
        .expect("narrowed limits");

    assert_eq!(default.items.len(), narrowed.items.len());
    assert_ne!(default.checksum, narrowed.checksum);

    let other_spec = generator()
        .generate(&chart("basic_line_chart"), "v1", "v9")
        .expect("other spec version");
    assert_eq!(default.checksum, other_spec.checksum);
}

#[test]
fn config_file_drives_template_limits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chartmap.toml");
    fs::write(
        &path,
        "[series.RADAR]\ndefault_series_count = 2\nmax_series_count = 4\n",
    )
    .expect("write config");

    let config = ChartConfig::load(&path).expect("load config");
    let store = BuiltinTemplateStore::new(config);
    let template = store.get_template("basic_radar_chart").expect("radar");
    assert_eq!(template.default_series_count, 2);
    assert_eq!(template.max_series_count, 4);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chartmap.toml");
    fs::write(&path, "[series.GAUGE]\ndefault_series_count = 3\nmax_series_count = 1\n")
        .expect("write config");
    assert!(ChartConfig::load(&path).is_err());
}
