#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

fn types(raw: &str) -> Vec<String> {
    parse(raw)
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap().to_owned())
        .collect()
}

fn board_with_card() -> (IdeaCanvas, Uuid) {
    let id = Uuid::new_v4();
    let mut canvas = IdeaCanvas::new();
    let snapshot = json!({
        "ideas": [{ "id": id, "title": "card", "canvasX": 100.0, "canvasY": 100.0 }],
        "groups": [],
    });
    canvas.load_snapshot(&snapshot.to_string()).unwrap();
    (canvas, id)
}

#[test]
fn modifier_bits_decode() {
    let mods = modifiers(MOD_SHIFT | MOD_META);
    assert!(mods.shift && mods.meta);
    assert!(!mods.ctrl && !mods.alt);
    assert_eq!(modifiers(0), Modifiers::default());
}

#[test]
fn touch_points_pairs_coordinates_and_drops_odd_tail() {
    let points = touch_points(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
}

#[test]
fn load_snapshot_rejects_bad_json() {
    let mut canvas = IdeaCanvas::new();
    assert!(canvas.load_snapshot("{not json").is_err());
    assert!(canvas.load_snapshot(r#"{"ideas": [{"title": "no id"}]}"#).is_err());
}

#[test]
fn load_snapshot_accepts_wire_field_names() {
    let (canvas, id) = board_with_card();
    let snapshot = parse(&canvas.snapshot());
    assert_eq!(snapshot["ideas"][0]["id"], json!(id));
    assert_eq!(snapshot["ideas"][0]["x"], 100.0);
}

#[test]
fn drag_through_binding_emits_persist_json() {
    let (mut canvas, id) = board_with_card();
    assert_eq!(types(&canvas.pointer_down(110.0, 110.0, 0, 0, 0.0)), vec!["selection_changed", "render_needed"]);
    assert_eq!(types(&canvas.pointer_move(160.0, 110.0, 0, 10.0)), vec!["drag_started", "render_needed"]);
    let released = parse(&canvas.pointer_up(160.0, 110.0, 0, 0, 20.0));
    let persist = released
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["type"] == "persist_positions")
        .unwrap();
    assert_eq!(persist["updates"], json!([{ "id": id, "x": 150.0, "y": 100.0 }]));
    assert_eq!(canvas.gesture(), "idle");
}

#[test]
fn shift_bit_starts_marquee() {
    let (mut canvas, _) = board_with_card();
    canvas.pointer_down(0.0, 0.0, 0, MOD_SHIFT, 0.0);
    assert_eq!(canvas.gesture(), "rectangle-selecting");
    canvas.pointer_move(20.0, 30.0, MOD_SHIFT, 5.0);
    assert_eq!(parse(&canvas.marquee()), json!({ "min_x": 0.0, "min_y": 0.0, "max_x": 20.0, "max_y": 30.0 }));
}

#[test]
fn apply_update_parses_partial_fields() {
    let (mut canvas, id) = board_with_card();
    let group = Uuid::new_v4();
    let changed = canvas
        .apply_update(&id.to_string(), &json!({ "title": "renamed", "groupId": group, "canvasX": 5.0 }).to_string())
        .unwrap();
    assert!(changed);
    let idea = canvas.core.object(&id).unwrap();
    assert_eq!(idea.title, "renamed");
    assert_eq!(idea.group_id, Some(group));
    assert_eq!(idea.x, 5.0);
    assert_eq!(idea.y, 100.0);

    canvas.apply_update(&id.to_string(), r#"{"groupId": null}"#).unwrap();
    assert!(canvas.core.object(&id).unwrap().group_id.is_none());
}

#[test]
fn partial_absent_vs_null() {
    let partial = partial_from_json(r#"{"description": null}"#).unwrap();
    assert_eq!(partial.description, Some(None));
    assert_eq!(partial.title, None);
    assert!(partial_from_json("[]").is_err());
    assert!(partial_from_json(r#"{"priority": "urgent"}"#).is_err());
}

#[test]
fn malformed_ids_are_errors() {
    let mut canvas = IdeaCanvas::new();
    assert!(canvas.apply_delete("nope").is_err());
    assert!(canvas.apply_update("nope", "{}").is_err());
    assert!(canvas.set_selection("[1]").is_err());
}

#[test]
fn tick_reports_due_writes_and_next_deadline() {
    let (mut canvas, id) = board_with_card();
    canvas.set_selection(&json!([id]).to_string()).unwrap();
    canvas.key_down("ArrowLeft", 0, 1000.0);
    assert_eq!(canvas.next_due_ms(), Some(1200.0));
    assert_eq!(canvas.tick(1100.0), "[]");
    assert_eq!(types(&canvas.tick(1200.0)), vec!["persist_positions"]);
    assert!(canvas.next_due_ms().is_none());
}

#[test]
fn custom_settings_change_debounce() {
    let mut canvas = IdeaCanvas::with_settings(50.0, 4.0, 0.5, 2.0);
    assert_eq!(canvas.core.config.debounce_ms, 50.0);
    for _ in 0..20 {
        canvas.wheel(0.0, 0.0, 0.0, -1.0, 0);
    }
    assert_eq!(parse(&canvas.camera())["zoom"], 2.0);
}

#[test]
fn two_finger_touch_enters_pinch() {
    let mut canvas = IdeaCanvas::new();
    canvas.touch_start(&[0.0, 0.0, 100.0, 0.0], 0.0);
    assert_eq!(canvas.gesture(), "pinching");
    canvas.touch_move(&[0.0, 0.0, 200.0, 0.0], 10.0);
    assert_eq!(parse(&canvas.camera())["zoom"], 2.0);
    canvas.touch_end(200.0, 0.0, 1, 20.0);
    assert_eq!(canvas.gesture(), "idle");
}
