//! Ordered collections of positioned members.
//!
//! A [`PositionList`] is one containment group (the columns of a board or the
//! tickets of a column) held in display order. Every operation returns a new
//! list; nothing here mutates its input or performs I/O.

use crate::error::{KanboardError, Result};

/// An entity id together with its currently stored position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member<I> {
    pub id: I,
    pub position: u32,
}

impl<I> Member<I> {
    pub fn new(id: I, position: u32) -> Self {
        Self { id, position }
    }
}

/// One group's members in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionList<I> {
    members: Vec<Member<I>>,
}

impl<I: Clone + PartialEq> PositionList<I> {
    /// Builds a list sorted by stored position. Members with equal positions
    /// keep the order they were given in.
    pub fn from_members(members: &[Member<I>]) -> Self {
        let mut members = members.to_vec();
        members.sort_by_key(|m| m.position);
        Self { members }
    }

    /// Returns a copy of the list without the member at `index`
    pub fn with_removed(&self, index: usize) -> Result<Self> {
        if index >= self.members.len() {
            return Err(KanboardError::InvalidIndex {
                index,
                len: self.members.len(),
            });
        }
        let mut members = self.members.clone();
        members.remove(index);
        Ok(Self { members })
    }

    /// Returns a copy of the list with `member` inserted at `index`.
    ///
    /// `index` is clamped to `[0, len]`; `len` appends.
    pub fn with_inserted(&self, member: Member<I>, index: usize) -> Self {
        let mut members = self.members.clone();
        let index = index.min(members.len());
        members.insert(index, member);
        Self { members }
    }

    /// The position every member must hold: its index in the list.
    ///
    /// Fails if the list holds more members than a `u32` position can number.
    pub fn renumbered(&self) -> Result<Vec<(I, u32)>> {
        self.members
            .iter()
            .enumerate()
            .map(|(index, m)| Ok((m.id.clone(), slot(index)?)))
            .collect()
    }

    /// The renumbered pairs whose new position differs from the stored one,
    /// in ascending new position
    pub fn changes(&self) -> Result<Vec<(I, u32)>> {
        let mut changes = Vec::new();
        for (index, m) in self.members.iter().enumerate() {
            let position = slot(index)?;
            if m.position != position {
                changes.push((m.id.clone(), position));
            }
        }
        Ok(changes)
    }

    pub fn index_of(&self, id: &I) -> Option<usize> {
        self.members.iter().position(|m| &m.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Member<I>> {
        self.members.get(index)
    }

    pub fn members(&self) -> &[Member<I>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The position stored for the member at `index`
pub(crate) fn slot(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| KanboardError::InvalidIndex {
        index,
        len: u32::MAX as usize,
    })
}
