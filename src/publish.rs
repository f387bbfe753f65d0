//! Bounded-slot publication protocol.
//!
//! Every frame the publisher rewrites slots `0..k` for the `k` detections a
//! category was allocated, in increasing index order, then deactivates the
//! first unused slot. The consumer scans a category's slots from index 0 and
//! stops at the first `inUse=false`, so the ordering contract is that all
//! active writes for a category precede its deactivation write and indexes
//! only increase — a concurrent scanner never observes a hole.
//!
//! The legacy writer deactivates only slot `k`, never the slots past it.
//! When the detection count drops by more than one between frames, the
//! trailing slots keep stale active state. `reset_all_trailing_slots`
//! switches to the corrected behavior; the default preserves compatibility.

use crate::detect::Detection;
use crate::slots::{Category, CapacityMap, SlotAssignment};
use crate::table::SharedTable;

/// Root of the slot key space in the shared table.
pub const VISION_TABLE: &str = "VisionValues";

/// Key for one field of one slot, e.g. `VisionValues/Tape2/inUse`.
pub fn slot_key(category: Category, index: usize, field: &str) -> String {
    format!("{}/{}{}/{}", VISION_TABLE, category, index, field)
}

/// Publishes per-frame slot assignments to the shared table.
pub struct SlotPublisher {
    capacities: CapacityMap,
    reset_all_trailing_slots: bool,
}

impl SlotPublisher {
    pub fn new(capacities: CapacityMap) -> Self {
        Self {
            capacities,
            reset_all_trailing_slots: false,
        }
    }

    /// `true` deactivates every slot past the last active one instead of
    /// only the first unused slot.
    pub fn with_reset_all_trailing_slots(mut self, reset: bool) -> Self {
        self.reset_all_trailing_slots = reset;
        self
    }

    pub fn capacities(&self) -> &CapacityMap {
        &self.capacities
    }

    /// Publish one frame's assignment, walking categories in declaration
    /// order. Write failures are logged and not retried; the next frame
    /// overwrites.
    pub fn publish(&self, table: &mut dyn SharedTable, assignment: &SlotAssignment) {
        for category in Category::ALL {
            self.publish_category(table, category, assignment.assigned(category));
        }
    }

    fn publish_category(
        &self,
        table: &mut dyn SharedTable,
        category: Category,
        assigned: &[Detection],
    ) {
        let capacity = self.capacities.capacity(category);
        debug_assert!(assigned.len() <= capacity);

        for (index, detection) in assigned.iter().enumerate() {
            self.write_slot(table, category, index, detection);
        }

        // Deactivation comes after every active write. Without the reset
        // policy only the first unused slot is touched; indexes past it keep
        // whatever state the previous frame left.
        let first_unused = assigned.len();
        let trailing_end = if self.reset_all_trailing_slots {
            capacity
        } else {
            capacity.min(first_unused + 1)
        };
        for index in first_unused..trailing_end {
            if let Err(e) = table.put_bool(&slot_key(category, index, "inUse"), false) {
                log::warn!("table write failed for {}{}/inUse: {}", category, index, e);
            }
        }
    }

    fn write_slot(
        &self,
        table: &mut dyn SharedTable,
        category: Category,
        index: usize,
        detection: &Detection,
    ) {
        // Confidence goes out as a 0-100 percentage, not the raw fraction.
        let values = [
            detection.center_x,
            detection.end_x,
            detection.end_y,
            detection.area,
            detection.confidence * 100.0,
        ];
        if let Err(e) = table.put_string(&slot_key(category, index, "label"), &detection.label) {
            log::warn!("table write failed for {}{}/label: {}", category, index, e);
        }
        if let Err(e) = table.put_numbers(&slot_key(category, index, "values"), &values) {
            log::warn!("table write failed for {}{}/values: {}", category, index, e);
        }
        if let Err(e) = table.put_bool(&slot_key(category, index, "inUse"), true) {
            log::warn!("table write failed for {}{}/inUse: {}", category, index, e);
        }
    }
}
