//! Detection categories and per-frame slot allocation.
//!
//! Each category owns a fixed-capacity run of publication slots in the
//! shared table. Allocation is pure: it maps one frame's detections onto
//! slot indexes and leaves every table write to the publisher.

use std::collections::HashMap;
use std::fmt;

use crate::detect::Detection;

/// Detection categories recognized by the bridge.
///
/// The set is closed: the slot key space only exists for these three, and
/// detections with any other label are ignored by allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Hatch,
    Ball,
    Tape,
}

impl Category {
    /// Publication order. The publisher walks categories in this order every
    /// frame.
    pub const ALL: [Category; 3] = [Category::Hatch, Category::Ball, Category::Tape];

    pub fn from_label(label: &str) -> Option<Category> {
        match label {
            "Hatch" => Some(Category::Hatch),
            "Ball" => Some(Category::Ball),
            "Tape" => Some(Category::Tape),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Hatch => "Hatch",
            Category::Ball => "Ball",
            Category::Tape => "Tape",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-category slot capacities. A configuration value, not business logic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacityMap {
    hatch: usize,
    ball: usize,
    tape: usize,
}

impl Default for CapacityMap {
    fn default() -> Self {
        Self {
            hatch: 3,
            ball: 3,
            tape: 6,
        }
    }
}

impl CapacityMap {
    pub fn new(hatch: usize, ball: usize, tape: usize) -> Self {
        Self { hatch, ball, tape }
    }

    pub fn capacity(&self, category: Category) -> usize {
        match category {
            Category::Hatch => self.hatch,
            Category::Ball => self.ball,
            Category::Tape => self.tape,
        }
    }
}

/// One frame's slot contents: per category, at most `capacity` detections in
/// detector arrival order, destined for slot indexes `0..k`.
#[derive(Debug, Default)]
pub struct SlotAssignment {
    slots: HashMap<Category, Vec<Detection>>,
}

impl SlotAssignment {
    pub fn assigned(&self, category: Category) -> &[Detection] {
        self.slots.get(&category).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Assign this frame's detections to category slots.
///
/// Arrival order is preserved within each category; there is no sorting or
/// prioritization. Detections past a category's capacity are dropped — a
/// hard ceiling, not buffered or reported beyond a debug line.
pub fn allocate(detections: &[Detection], capacities: &CapacityMap) -> SlotAssignment {
    let mut slots: HashMap<Category, Vec<Detection>> = HashMap::new();
    let mut dropped = 0usize;
    for detection in detections {
        let Some(category) = Category::from_label(&detection.label) else {
            log::debug!("ignoring detection with unknown label {:?}", detection.label);
            continue;
        };
        let assigned = slots.entry(category).or_default();
        if assigned.len() < capacities.capacity(category) {
            assigned.push(detection.clone());
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        log::debug!("dropped {} detections past slot capacity", dropped);
    }
    SlotAssignment { slots }
}
