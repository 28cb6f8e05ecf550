/// Returns true if `[staker_start, staker_end]` lies within
/// `[lower_bound, upper_bound]` and the staker interval is not inverted.
///
/// Containment, not overlap: both endpoints must be inside the bound.
pub fn bounded_by(staker_start: u64, staker_end: u64, lower_bound: u64, upper_bound: u64) -> bool {
    staker_start >= lower_bound && staker_end <= upper_bound && staker_end >= staker_start
}
