use crate::domain::{board::Column, ticket::Ticket};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// An entity that occupies a slot in an ordered group
pub trait Placed {
    fn position(&self) -> u32;
    fn created_at(&self) -> DateTime<Utc>;
    fn id_str(&self) -> &str;
}

impl Placed for Column {
    fn position(&self) -> u32 {
        self.position
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn id_str(&self) -> &str {
        self.id.as_str()
    }
}

impl Placed for Ticket {
    fn position(&self) -> u32 {
        self.position
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn id_str(&self) -> &str {
        self.id.as_str()
    }
}

/// Compares two members of the same group for display order.
///
/// Position ascending. Two members sharing a position is not a valid
/// resting state, but it does occur while a reorder is half applied, so
/// ties fall back to `created_at` and then `id` to keep rendering stable.
pub fn compare_placement<T: Placed>(a: &T, b: &T) -> Ordering {
    a.position()
        .cmp(&b.position())
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.id_str().cmp(b.id_str()))
}

/// Sorts a group in-place into display order
///
/// # Examples
/// ```
/// use kanboard_core::domain::sorting::sort_by_placement;
/// use kanboard_core::domain::{BoardId, Column};
///
/// let board = BoardId::from("b");
/// let mut columns = vec![
///     Column::new(board.clone(), "Done".to_string(), 2),
///     Column::new(board.clone(), "To Do".to_string(), 0),
///     Column::new(board, "Doing".to_string(), 1),
/// ];
///
/// sort_by_placement(&mut columns);
/// assert_eq!(columns[0].name, "To Do");
/// ```
pub fn sort_by_placement<T: Placed>(items: &mut [T]) {
    items.sort_by(compare_placement);
}
