#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;

#[test]
fn new_queue_is_empty() {
    let writes = PendingWrites::new(200.0);
    assert!(writes.is_empty());
    assert!(writes.next_due_ms().is_none());
}

#[test]
fn nothing_due_before_quiet_period() {
    let mut writes = PendingWrites::new(200.0);
    writes.schedule(Uuid::new_v4(), 1.0, 2.0, 1000.0);
    assert!(writes.take_due(1199.0).is_empty());
    assert_eq!(writes.next_due_ms(), Some(1200.0));
}

#[test]
fn due_at_deadline() {
    let mut writes = PendingWrites::new(200.0);
    let id = Uuid::new_v4();
    writes.schedule(id, 1.0, 2.0, 1000.0);
    let due = writes.take_due(1200.0);
    assert_eq!(due, vec![PositionUpdate { id, x: 1.0, y: 2.0 }]);
    assert!(writes.is_empty());
}

#[test]
fn rapid_reschedules_coalesce_to_last_position() {
    let mut writes = PendingWrites::new(200.0);
    let id = Uuid::new_v4();
    writes.schedule(id, 1.0, 1.0, 0.0);
    writes.schedule(id, 2.0, 2.0, 50.0);
    writes.schedule(id, 3.0, 3.0, 100.0);
    assert_eq!(writes.next_due_ms(), Some(300.0));

    // The first deadline (200) was superseded.
    assert!(writes.take_due(250.0).is_empty());
    let due = writes.take_due(300.0);
    assert_eq!(due, vec![PositionUpdate { id, x: 3.0, y: 3.0 }]);
}

#[test]
fn take_due_leaves_later_slots() {
    let mut writes = PendingWrites::new(100.0);
    let early = Uuid::new_v4();
    let late = Uuid::new_v4();
    writes.schedule(early, 0.0, 0.0, 0.0);
    writes.schedule(late, 0.0, 0.0, 80.0);
    let due = writes.take_due(100.0);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, early);
    assert!(writes.peek(&late).is_some());
    assert_eq!(writes.next_due_ms(), Some(180.0));
}

#[test]
fn take_ids_ignores_deadline_and_unknown_ids() {
    let mut writes = PendingWrites::new(10_000.0);
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    writes.schedule(a, 1.0, 1.0, 0.0);
    writes.schedule(b, 2.0, 2.0, 0.0);
    let taken = writes.take_ids(&[a, Uuid::new_v4()]);
    assert_eq!(taken, vec![PositionUpdate { id: a, x: 1.0, y: 1.0 }]);
    assert!(writes.peek(&b).is_some());
}

#[test]
fn batches_come_out_in_scheduling_order() {
    let mut writes = PendingWrites::new(0.0);
    let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
    for (i, id) in ids.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let x = i as f64;
        writes.schedule(*id, x, 0.0, 0.0);
    }
    let order: Vec<Uuid> = writes.take_all().into_iter().map(|u| u.id).collect();
    assert_eq!(order, ids);
}

#[test]
fn cancel_removes_slot() {
    let mut writes = PendingWrites::new(100.0);
    let id = Uuid::new_v4();
    writes.schedule(id, 0.0, 0.0, 0.0);
    assert!(writes.cancel(&id));
    assert!(!writes.cancel(&id));
    assert!(writes.take_due(1000.0).is_empty());
}

#[test]
fn peek_reports_latest_position() {
    let mut writes = PendingWrites::new(100.0);
    let id = Uuid::new_v4();
    assert!(writes.peek(&id).is_none());
    writes.schedule(id, 1.0, 2.0, 0.0);
    writes.schedule(id, 3.0, 4.0, 10.0);
    assert_eq!(writes.peek(&id), Some((3.0, 4.0)));
}

#[test]
fn retain_drops_rejected_slots() {
    let mut writes = PendingWrites::new(100.0);
    let keep = Uuid::new_v4();
    let gone = Uuid::new_v4();
    writes.schedule(keep, 0.0, 0.0, 0.0);
    writes.schedule(gone, 0.0, 0.0, 0.0);
    writes.retain(|id| *id == keep);
    assert!(writes.peek(&keep).is_some());
    assert!(writes.peek(&gone).is_none());
}
