//! Interval ladder: mastery level → minimum days before a position is due again

/// Highest mastery level on the ladder
pub const MAX_LEVEL: u8 = 8;

/// Minimum days until due, indexed by mastery level
///
/// | Level | Days |
/// |-------|------|
/// | 0     | 0    |
/// | 1     | 1    |
/// | 2     | 3    |
/// | 3     | 7    |
/// | 4     | 14   |
/// | 5     | 30   |
/// | 6     | 90   |
/// | 7     | 180  |
/// | 8     | 365  |
pub const INTERVAL_DAYS: [u32; MAX_LEVEL as usize + 1] = [0, 1, 3, 7, 14, 30, 90, 180, 365];

/// Minimum days until due for `level`
///
/// Levels below the ladder clamp to level 0, levels above it to level 8.
pub fn interval_days(level: i64) -> u32 {
    let clamped = level.clamp(0, MAX_LEVEL as i64) as usize;
    INTERVAL_DAYS.get(clamped).copied().unwrap_or(0)
}

/// Longest interval on the ladder
pub fn max_interval_days() -> u32 {
    INTERVAL_DAYS[MAX_LEVEL as usize]
}
