use super::*;

#[test]
fn pops_in_due_order_then_schedule_order() {
    let mut q = TimerQueue::new();
    q.schedule(0, 300, "c");
    q.schedule(0, 100, "a");
    q.schedule(0, 100, "b");

    assert_eq!(q.next_due(), Some(100));
    assert!(q.pop_due(99).is_none());
    assert_eq!(q.pop_due(100).map(|(_, a)| a), Some("a"));
    assert_eq!(q.pop_due(100).map(|(_, a)| a), Some("b"));
    assert!(q.pop_due(100).is_none());
    assert_eq!(q.pop_due(1_000).map(|(_, a)| a), Some("c"));
    assert!(q.is_empty());
}

#[test]
fn cancelled_tokens_never_fire() {
    let mut q = TimerQueue::new();
    let t = q.schedule(10, 800, "advance");
    q.schedule(10, 900, "toast");
    assert_eq!(q.len(), 2);
    assert!(q.cancel(t));
    assert_eq!(q.len(), 1);
    assert!(!q.cancel(t));
    assert_eq!(q.pop_due(10_000).map(|(_, a)| a), Some("toast"));
    assert!(q.pop_due(10_000).is_none());
}
