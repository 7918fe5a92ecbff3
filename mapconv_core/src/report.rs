//! The run report: everything surfaced but never fatal,
//! plus the summary written to stdout on a successful run.

use serde_derive::{Deserialize, Serialize};

use crate::orientation::AxisRemap;

/// The kind of non-fatal event a [`Note`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKind {
    MappingMiss,
    RestrictionMiss,
    BoundsClamp,
    Skip,
}

/// A single recovered/surfaced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    pub token: String,
    pub message: String,
}

impl Note {
    pub fn new(kind: NoteKind, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, token: token.into(), message: message.into() }
    }
}

/// Per-tier resolution counts for the Asset Mapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub tier1: usize,
    pub tier2: usize,
    pub tier3: usize,
    pub skipped: usize,
}

/// The full run report for one converted map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub map_name: String,
    pub base_terrain: String,
    pub chosen_remap: Option<AxisRemap>,
    pub control_point_count: usize,
    pub spawn_point_count: usize,
    pub tier_counts: TierCounts,
    pub notes: Vec<Note>,
}

impl RunReport {
    pub fn push(&mut self, note: Note) {
        if note.kind == NoteKind::Skip {
            self.tier_counts.skipped += 1;
        }
        self.notes.push(note);
    }
}
