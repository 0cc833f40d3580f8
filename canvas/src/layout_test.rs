#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{Group, IdeaId, Priority};

const SIZE: CardSize = CardSize { width: 100.0, height: 50.0 };
const GAP: f64 = 10.0;

fn idea(title: &str, priority: Priority, completed: bool, group: Option<&Group>) -> Idea {
    Idea {
        priority,
        completed,
        group_id: group.map(|g| g.id),
        ..Idea::new(title, 999.0, 999.0)
    }
}

fn position_of(updates: &[PositionUpdate], id: IdeaId) -> (f64, f64) {
    let u = updates.iter().find(|u| u.id == id).unwrap();
    (u.x, u.y)
}

#[test]
fn task_order_open_before_done_then_priority() {
    let done_critical = idea("a", Priority::Critical, true, None);
    let open_low = idea("b", Priority::Low, false, None);
    let open_high = idea("c", Priority::High, false, None);
    let mut list = [&done_critical, &open_low, &open_high];
    list.sort_by(|a, b| task_order(a, b));
    let titles: Vec<&str> = list.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["c", "b", "a"]);
}

#[test]
fn task_order_ties_break_on_title() {
    let b = idea("beta", Priority::Medium, false, None);
    let a = idea("alpha", Priority::Medium, false, None);
    assert_eq!(task_order(&a, &b), Ordering::Less);
}

#[test]
fn organize_empty_doc_is_empty() {
    assert!(organize(&DocStore::new(), SIZE, GAP).is_empty());
}

#[test]
fn organize_puts_groups_in_name_order_and_ungrouped_last() {
    let zeta = Group::new("zeta", "red");
    let alpha = Group::new("alpha", "blue");
    let mut doc = DocStore::new();
    doc.insert_group(zeta.clone());
    doc.insert_group(alpha.clone());
    let loose = idea("loose", Priority::Medium, false, None);
    let in_zeta = idea("z", Priority::Medium, false, Some(&zeta));
    let in_alpha = idea("a", Priority::Medium, false, Some(&alpha));
    for i in [&loose, &in_zeta, &in_alpha] {
        doc.insert(i.clone());
    }

    let updates = organize(&doc, SIZE, GAP);

    assert_eq!(position_of(&updates, in_alpha.id), (0.0, 0.0));
    assert_eq!(position_of(&updates, in_zeta.id), (110.0, 0.0));
    assert_eq!(position_of(&updates, loose.id), (220.0, 0.0));
}

#[test]
fn organize_stacks_rows_by_task_order() {
    let g = Group::new("g", "red");
    let mut doc = DocStore::new();
    doc.insert_group(g.clone());
    let low = idea("low", Priority::Low, false, Some(&g));
    let crit = idea("crit", Priority::Critical, false, Some(&g));
    let done = idea("done", Priority::Critical, true, Some(&g));
    for i in [&low, &crit, &done] {
        doc.insert(i.clone());
    }

    let updates = organize(&doc, SIZE, GAP);

    assert_eq!(position_of(&updates, crit.id), (0.0, 0.0));
    assert_eq!(position_of(&updates, low.id), (0.0, 60.0));
    assert_eq!(position_of(&updates, done.id), (0.0, 120.0));
}

#[test]
fn organize_skips_empty_groups() {
    let empty = Group::new("aaa-empty", "red");
    let mut doc = DocStore::new();
    doc.insert_group(empty);
    let loose = idea("loose", Priority::Medium, false, None);
    doc.insert(loose.clone());
    assert_eq!(position_of(&organize(&doc, SIZE, GAP), loose.id), (0.0, 0.0));
}

#[test]
fn organize_treats_unknown_group_as_ungrouped() {
    let ghost = Group::new("ghost", "red");
    let mut doc = DocStore::new();
    let orphan = idea("orphan", Priority::Medium, false, Some(&ghost));
    doc.insert(orphan.clone());
    assert_eq!(position_of(&organize(&doc, SIZE, GAP), orphan.id), (0.0, 0.0));
}

#[test]
fn organize_omits_cards_already_in_place() {
    let mut doc = DocStore::new();
    let placed = Idea::new("placed", 0.0, 0.0);
    doc.insert(placed);
    assert!(organize(&doc, SIZE, GAP).is_empty());
}
