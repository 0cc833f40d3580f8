#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

// =============================================================================
// parse_or
// =============================================================================

#[test]
fn parse_or_missing_returns_default() {
    let val: usize = parse_or(None, 42);
    assert_eq!(val, 42);
}

#[test]
fn parse_or_present_valid() {
    let val: usize = parse_or(Some(" 99 ".into()), 0);
    assert_eq!(val, 99);
}

#[test]
fn parse_or_present_invalid_returns_default() {
    let val: f64 = parse_or(Some("notanumber".into()), 7.5);
    assert_eq!(val, 7.5);
}

// =============================================================================
// AppConfig
// =============================================================================

#[test]
fn empty_environment_gives_defaults() {
    let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.engine.debounce_ms, DEFAULT_DEBOUNCE_MS);
    assert_eq!(config.engine.drag_threshold_px, DEFAULT_DRAG_THRESHOLD_PX);
    assert_eq!(config.engine.min_zoom, DEFAULT_MIN_ZOOM);
    assert_eq!(config.engine.max_zoom, DEFAULT_MAX_ZOOM);
    assert_eq!(config.persist.queue_capacity, DEFAULT_PERSIST_QUEUE_CAPACITY);
    assert_eq!(config.persist.retries, DEFAULT_PERSIST_RETRIES);
    assert_eq!(config.persist.retry_base_ms, DEFAULT_PERSIST_RETRY_BASE_MS);
    assert!(config.seed_path.is_none());
    assert!(config.script_path.is_none());
}

#[test]
fn overrides_are_applied() {
    let config = AppConfig::from_lookup(lookup_from(&[
        ("IDEABOARD_DEBOUNCE_MS", "50"),
        ("IDEABOARD_DRAG_THRESHOLD_PX", "8"),
        ("IDEABOARD_MIN_ZOOM", "0.5"),
        ("IDEABOARD_MAX_ZOOM", "2"),
        ("IDEABOARD_PERSIST_QUEUE_CAPACITY", "16"),
        ("IDEABOARD_PERSIST_RETRIES", "3"),
        ("IDEABOARD_PERSIST_RETRY_BASE_MS", "5"),
        ("IDEABOARD_SEED", "board.json"),
        ("IDEABOARD_SCRIPT", "script.json"),
    ]))
    .unwrap();
    assert_eq!(config.engine.debounce_ms, 50.0);
    assert_eq!(config.engine.drag_threshold_px, 8.0);
    assert_eq!(config.engine.min_zoom, 0.5);
    assert_eq!(config.engine.max_zoom, 2.0);
    assert_eq!(config.persist.queue_capacity, 16);
    assert_eq!(config.persist.retries, 3);
    assert_eq!(config.persist.retry_base_ms, 5);
    assert_eq!(config.seed_path, Some(PathBuf::from("board.json")));
    assert_eq!(config.script_path, Some(PathBuf::from("script.json")));
}

#[test]
fn garbage_values_fall_back_to_defaults() {
    let config = AppConfig::from_lookup(lookup_from(&[
        ("IDEABOARD_DEBOUNCE_MS", "soon"),
        ("IDEABOARD_PERSIST_RETRIES", "-1"),
    ]))
    .unwrap();
    assert_eq!(config.engine.debounce_ms, DEFAULT_DEBOUNCE_MS);
    assert_eq!(config.persist.retries, DEFAULT_PERSIST_RETRIES);
}

#[test]
fn empty_paths_are_unset() {
    let config = AppConfig::from_lookup(lookup_from(&[("IDEABOARD_SEED", "")])).unwrap();
    assert!(config.seed_path.is_none());
}

#[test]
fn inverted_zoom_range_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("IDEABOARD_MIN_ZOOM", "3"), ("IDEABOARD_MAX_ZOOM", "2")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "IDEABOARD_MAX_ZOOM", .. }));
}

#[test]
fn zero_min_zoom_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("IDEABOARD_MIN_ZOOM", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "IDEABOARD_MIN_ZOOM", .. }));
}

#[test]
fn nan_debounce_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("IDEABOARD_DEBOUNCE_MS", "NaN")])).unwrap_err();
    assert_eq!(err.to_string(), "invalid IDEABOARD_DEBOUNCE_MS: must be a non-negative number");
}

#[test]
fn zero_queue_capacity_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("IDEABOARD_PERSIST_QUEUE_CAPACITY", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "IDEABOARD_PERSIST_QUEUE_CAPACITY", .. }));
}

