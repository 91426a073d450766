//! Roster partitioning for the `students-N` stages.
//!
//! Group `k` of a roster of `n` students is the index range
//! `[(k-1)·n/8, k·n/8)` of the roster ordered by student ID. Groups cover the
//! roster exactly once, differ in size by at most one, and depend only on the
//! set of student IDs.

use std::ops::Range;

use lens_core::entities::Student;
use lens_core::enums::STUDENT_GROUP_COUNT;

/// Index range of `group` (1-based) in a roster of `roster_len` students.
///
/// Returns `None` for a group number outside `1..=8`.
#[must_use]
pub fn group_bounds(roster_len: usize, group: u8) -> Option<Range<usize>> {
    if group == 0 || group > STUDENT_GROUP_COUNT {
        return None;
    }
    let count = usize::from(STUDENT_GROUP_COUNT);
    let k = usize::from(group);
    Some((k - 1) * roster_len / count..k * roster_len / count)
}

/// The students of `group` in an already ordered roster.
#[must_use]
pub fn partition(ordered: &[Student], group: u8) -> &[Student] {
    match group_bounds(ordered.len(), group) {
        Some(range) => &ordered[range],
        None => &[],
    }
}
