//! Turning a drag gesture into the minimal set of position writes.
//!
//! The core is [`plan_move`], which works on any group/id types. The
//! [`ReorderPlanner`] wrappers resolve the member lists from a
//! [`BoardSnapshot`] and translate the plan into a [`WriteSet`].

use crate::domain::{
    board::{BoardId, ColumnId},
    position::{Member, PositionList},
    snapshot::BoardSnapshot,
    ticket::TicketId,
    write_set::{ColumnUpdate, EntityUpdate, TicketUpdate, WriteSet},
};
use crate::error::{KanboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A slot inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location<G> {
    pub group: G,
    pub index: usize,
}

impl<G> Location<G> {
    pub fn new(group: G, index: usize) -> Self {
        Self { group, index }
    }
}

/// One entity moving from a source slot to a destination slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move<G, I> {
    pub entity: I,
    pub source: Location<G>,
    pub destination: Location<G>,
}

/// A position write produced by the planner. `group` is set only for the
/// moved entity of a cross-group move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite<G, I> {
    pub id: I,
    pub position: u32,
    pub group: Option<G>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan<G, I> {
    pub writes: Vec<PlannedWrite<G, I>>,
}

impl<G, I> ReorderPlan<G, I> {
    fn empty() -> Self {
        Self { writes: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }
}

/// Computes the writes needed to realise `mv`.
///
/// `source_members` is the current membership of the source group.
/// `destination_members` is required when the groups differ and must not
/// yet contain the moved entity; it is ignored for same-group moves.
///
/// Writes for the destination group come first, then the source group,
/// each in ascending new position.
pub fn plan_move<G, I>(
    mv: &Move<G, I>,
    source_members: &[Member<I>],
    destination_members: Option<&[Member<I>]>,
) -> Result<ReorderPlan<G, I>>
where
    G: Clone + PartialEq,
    I: Clone + PartialEq + Display,
{
    let same_group = mv.source.group == mv.destination.group;
    if same_group && mv.source.index == mv.destination.index {
        return Ok(ReorderPlan::empty());
    }

    let source = PositionList::from_members(source_members);
    let moved = locate(&source, &mv.entity, mv.source.index)?;

    if same_group {
        if mv.destination.index >= source.len() {
            return Err(KanboardError::InvalidIndex {
                index: mv.destination.index,
                len: source.len(),
            });
        }
        let reordered = source
            .with_removed(mv.source.index)?
            .with_inserted(moved, mv.destination.index);
        let writes = reordered
            .changes()?
            .into_iter()
            .map(|(id, position)| PlannedWrite {
                id,
                position,
                group: None,
            })
            .collect();
        return Ok(ReorderPlan { writes });
    }

    let destination_members = destination_members.ok_or_else(|| {
        KanboardError::InvalidGesture("cross-group move without destination members".to_string())
    })?;
    let destination = PositionList::from_members(destination_members);
    if destination.index_of(&mv.entity).is_some() {
        return Err(KanboardError::InvalidGesture(format!(
            "{} is already a member of the destination group",
            mv.entity
        )));
    }
    if mv.destination.index > destination.len() {
        return Err(KanboardError::InvalidIndex {
            index: mv.destination.index,
            len: destination.len(),
        });
    }

    let grown = destination.with_inserted(moved, mv.destination.index);
    let mut writes: Vec<PlannedWrite<G, I>> = Vec::new();
    for (member, (id, position)) in grown.members().iter().zip(grown.renumbered()?) {
        if id == mv.entity {
            // always written: the group changes even if the position does not
            writes.push(PlannedWrite {
                id,
                position,
                group: Some(mv.destination.group.clone()),
            });
        } else if member.position != position {
            writes.push(PlannedWrite {
                id,
                position,
                group: None,
            });
        }
    }

    let shrunk = source.with_removed(mv.source.index)?;
    writes.extend(shrunk.changes()?.into_iter().map(|(id, position)| PlannedWrite {
        id,
        position,
        group: None,
    }));

    Ok(ReorderPlan { writes })
}

/// Computes the writes that close the gap left by removing `id`
pub fn plan_removal<I>(members: &[Member<I>], id: &I) -> Result<Vec<(I, u32)>>
where
    I: Clone + PartialEq + Display,
{
    let list = PositionList::from_members(members);
    let index = list
        .index_of(id)
        .ok_or_else(|| KanboardError::UnknownEntity(id.to_string()))?;
    list.with_removed(index)?.changes()
}

fn locate<I>(list: &PositionList<I>, entity: &I, index: usize) -> Result<Member<I>>
where
    I: Clone + PartialEq + Display,
{
    if index >= list.len() {
        return Err(KanboardError::InvalidIndex {
            index,
            len: list.len(),
        });
    }
    let actual = list
        .index_of(entity)
        .ok_or_else(|| KanboardError::UnknownEntity(entity.to_string()))?;
    if actual != index {
        return Err(KanboardError::InvalidGesture(format!(
            "{} is at index {}, not {}",
            entity, actual, index
        )));
    }
    list.get(index)
        .cloned()
        .ok_or(KanboardError::InvalidIndex {
            index,
            len: list.len(),
        })
}

/// What kind of item a drag carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Column,
    Ticket,
}

/// A reorder request against one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Gesture {
    /// Columns only ever move within the board being viewed
    Column {
        column_id: ColumnId,
        source_index: usize,
        destination_index: usize,
    },
    Ticket {
        ticket_id: TicketId,
        source: Location<ColumnId>,
        destination: Location<ColumnId>,
    },
}

impl Gesture {
    pub fn kind(&self) -> DragKind {
        match self {
            Self::Column { .. } => DragKind::Column,
            Self::Ticket { .. } => DragKind::Ticket,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            Self::Column { column_id, .. } => column_id.as_str(),
            Self::Ticket { ticket_id, .. } => ticket_id.as_str(),
        }
    }
}

/// The raw outcome of a drag-and-drop interaction, as reported by a UI:
/// container ids are plain strings and the drop target may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropResult {
    pub kind: DragKind,
    pub draggable_id: String,
    pub source: Location<String>,
    pub destination: Option<Location<String>>,
}

impl DropResult {
    /// Converts the drop into a gesture on `board_id`.
    ///
    /// Returns `Ok(None)` when the item was dropped outside any container.
    pub fn into_gesture(self, board_id: &BoardId) -> Result<Option<Gesture>> {
        let Some(destination) = self.destination else {
            return Ok(None);
        };

        let gesture = match self.kind {
            DragKind::Column => {
                for group in [&self.source.group, &destination.group] {
                    if group != board_id.as_str() {
                        return Err(KanboardError::InvalidGesture(format!(
                            "column {} cannot move through container {}",
                            self.draggable_id, group
                        )));
                    }
                }
                Gesture::Column {
                    column_id: self.draggable_id.parse()?,
                    source_index: self.source.index,
                    destination_index: destination.index,
                }
            }
            DragKind::Ticket => Gesture::Ticket {
                ticket_id: self.draggable_id.parse()?,
                source: Location::new(self.source.group.parse()?, self.source.index),
                destination: Location::new(destination.group.parse()?, destination.index),
            },
        };
        Ok(Some(gesture))
    }
}

/// Plans board-level reorders against a snapshot
pub struct ReorderPlanner;

impl ReorderPlanner {
    /// Plans the writes for `gesture` given the current board state
    pub fn plan(snapshot: &BoardSnapshot, gesture: &Gesture) -> Result<WriteSet> {
        match gesture {
            Gesture::Column {
                column_id,
                source_index,
                destination_index,
            } => {
                let board = snapshot.board.id.clone();
                let mv = Move {
                    entity: column_id.clone(),
                    source: Location::new(board.clone(), *source_index),
                    destination: Location::new(board, *destination_index),
                };
                let plan = plan_move(&mv, &snapshot.column_members(), None)?;
                Ok(WriteSet::new(
                    plan.writes
                        .into_iter()
                        .map(|w| EntityUpdate::Column(ColumnUpdate::position(w.id, w.position)))
                        .collect(),
                ))
            }
            Gesture::Ticket {
                ticket_id,
                source,
                destination,
            } => {
                for column_id in [&source.group, &destination.group] {
                    match snapshot.column(column_id) {
                        Some(column) if column.board_id == snapshot.board.id => {}
                        _ => return Err(KanboardError::ColumnNotFound(column_id.to_string())),
                    }
                }
                let mv = Move {
                    entity: ticket_id.clone(),
                    source: source.clone(),
                    destination: destination.clone(),
                };
                let source_members = snapshot.ticket_members(&source.group);
                let destination_members = snapshot.ticket_members(&destination.group);
                let plan = plan_move(&mv, &source_members, Some(destination_members.as_slice()))?;
                Ok(WriteSet::new(
                    plan.writes
                        .into_iter()
                        .map(|w| {
                            EntityUpdate::Ticket(match w.group {
                                Some(column_id) => TicketUpdate::relocate(w.id, column_id, w.position),
                                None => TicketUpdate::position(w.id, w.position),
                            })
                        })
                        .collect(),
                ))
            }
        }
    }

    /// Position writes for the tickets that stay behind when `ticket_id` is deleted
    pub fn plan_ticket_removal(snapshot: &BoardSnapshot, ticket_id: &TicketId) -> Result<WriteSet> {
        let ticket = snapshot
            .ticket(ticket_id)
            .ok_or_else(|| KanboardError::TicketNotFound(ticket_id.to_string()))?;
        let changes = plan_removal(&snapshot.ticket_members(&ticket.column_id), ticket_id)?;
        Ok(WriteSet::new(
            changes
                .into_iter()
                .map(|(id, position)| EntityUpdate::Ticket(TicketUpdate::position(id, position)))
                .collect(),
        ))
    }

    /// Position writes for the columns that stay behind when `column_id` is deleted
    pub fn plan_column_removal(snapshot: &BoardSnapshot, column_id: &ColumnId) -> Result<WriteSet> {
        let changes = plan_removal(&snapshot.column_members(), column_id)?;
        Ok(WriteSet::new(
            changes
                .into_iter()
                .map(|(id, position)| EntityUpdate::Column(ColumnUpdate::position(id, position)))
                .collect(),
        ))
    }
}
