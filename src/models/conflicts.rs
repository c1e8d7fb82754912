use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{ScheduleSlot, SlotId};

#[derive(Debug, Clone, PartialEq)]
pub struct StaffConflict {
    pub slot: ScheduleSlot,
    /// Only the staff members both slots have in common.
    pub shared_staff_ids: BTreeSet<String>,
}

/// Existing slots a proposed slot would clash with, grouped by the shared
/// resource. All lists empty means the proposed slot is safe to persist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictReport {
    pub classroom_conflicts: Vec<ScheduleSlot>,
    pub teacher_conflicts: Vec<ScheduleSlot>,
    pub staff_conflicts: Vec<StaffConflict>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.classroom_conflicts.is_empty()
            && self.teacher_conflicts.is_empty()
            && self.staff_conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classroom_conflicts.len() + self.teacher_conflicts.len() + self.staff_conflicts.len()
    }

    /// Human-readable explanation naming each clashing resource and class.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No scheduling conflicts".to_string();
        }

        let mut parts = Vec::with_capacity(self.len());
        for slot in &self.classroom_conflicts {
            parts.push(format!(
                "classroom {} is already booked for {}",
                slot.classroom_id.as_deref().unwrap_or("?"),
                describe(slot)
            ));
        }
        for slot in &self.teacher_conflicts {
            parts.push(format!(
                "teacher {} is already teaching {}",
                slot.teacher_profile_id.as_deref().unwrap_or("?"),
                describe(slot)
            ));
        }
        for conflict in &self.staff_conflicts {
            let staff: Vec<&str> = conflict.shared_staff_ids.iter().map(String::as_str).collect();
            parts.push(format!(
                "staff {} already assigned to {}",
                staff.join(", "),
                describe(&conflict.slot)
            ));
        }

        format!("Schedule conflicts detected: {}", parts.join("; "))
    }
}

fn describe(slot: &ScheduleSlot) -> String {
    format!("\"{}\" ({})", slot.title, slot.time_slot)
}

fn same_resource(proposed: &Option<String>, existing: &Option<String>) -> bool {
    matches!((proposed, existing), (Some(a), Some(b)) if a == b)
}

/// Compares `proposed` against the slots already scheduled in its branch.
///
/// Callers pass only slots of the proposed slot's branch and must have
/// validated `start_time < end_time`. Results keep the iteration order of
/// `existing`, and an existing slot with the proposed slot's own id is skipped.
pub fn check_conflicts<'a, I>(proposed: &ScheduleSlot, existing: I) -> ConflictReport
where
    I: IntoIterator<Item = &'a ScheduleSlot>,
{
    let mut report = ConflictReport::default();
    let mut classroom_seen: HashSet<SlotId> = HashSet::new();
    let mut teacher_seen: HashSet<SlotId> = HashSet::new();
    let mut staff_index: HashMap<SlotId, usize> = HashMap::new();

    for other in existing {
        if proposed.is_persisted() && other.id == proposed.id {
            continue;
        }
        if !proposed.time_slot.overlaps(&other.time_slot) {
            continue;
        }

        if same_resource(&proposed.classroom_id, &other.classroom_id) && classroom_seen.insert(other.id) {
            report.classroom_conflicts.push(other.clone());
        }

        if same_resource(&proposed.teacher_profile_id, &other.teacher_profile_id)
            && teacher_seen.insert(other.id)
        {
            report.teacher_conflicts.push(other.clone());
        }

        let shared: BTreeSet<String> = proposed
            .staff_user_ids
            .intersection(&other.staff_user_ids)
            .cloned()
            .collect();
        if shared.is_empty() {
            continue;
        }
        match staff_index.get(&other.id) {
            Some(&index) => report.staff_conflicts[index].shared_staff_ids.extend(shared),
            None => {
                staff_index.insert(other.id, report.staff_conflicts.len());
                report.staff_conflicts.push(StaffConflict {
                    slot: other.clone(),
                    shared_staff_ids: shared,
                });
            }
        }
    }

    report
}
