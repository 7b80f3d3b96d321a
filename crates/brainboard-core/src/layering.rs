//! Z-order operations over the global element order.
//!
//! Each function takes the current back-to-front order and the ids to move, and
//! returns the new order, or `None` when the move would change nothing. Moved
//! elements keep their relative order.

use crate::elements::ElementId;
use std::collections::HashSet;

fn changed(order: &[ElementId], next: Vec<ElementId>) -> Option<Vec<ElementId>> {
    (next != order).then_some(next)
}

fn partition(order: &[ElementId], ids: &HashSet<ElementId>) -> (Vec<ElementId>, Vec<ElementId>) {
    order.iter().copied().partition(|id| ids.contains(id))
}

/// Move `ids` above everything else.
pub fn bring_to_front(order: &[ElementId], ids: &HashSet<ElementId>) -> Option<Vec<ElementId>> {
    let (moved, mut rest) = partition(order, ids);
    rest.extend(moved);
    changed(order, rest)
}

/// Move `ids` below everything else.
pub fn send_to_back(order: &[ElementId], ids: &HashSet<ElementId>) -> Option<Vec<ElementId>> {
    let (mut moved, rest) = partition(order, ids);
    moved.extend(rest);
    changed(order, moved)
}

/// Move each of `ids` one step up, past the next unselected element.
pub fn bring_forward(order: &[ElementId], ids: &HashSet<ElementId>) -> Option<Vec<ElementId>> {
    let mut next = order.to_vec();
    for i in (0..next.len().saturating_sub(1)).rev() {
        if ids.contains(&next[i]) && !ids.contains(&next[i + 1]) {
            next.swap(i, i + 1);
        }
    }
    changed(order, next)
}

/// Move each of `ids` one step down, past the previous unselected element.
pub fn send_backward(order: &[ElementId], ids: &HashSet<ElementId>) -> Option<Vec<ElementId>> {
    let mut next = order.to_vec();
    for i in 1..next.len() {
        if ids.contains(&next[i]) && !ids.contains(&next[i - 1]) {
            next.swap(i, i - 1);
        }
    }
    changed(order, next)
}
