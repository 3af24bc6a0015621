use std::mem;

use super::error::PartitionError;
use super::model::{HasDuration, Side};

/// Default side budget: 22 minutes, a conservative 12" LP side at 33⅓ rpm.
pub const DEFAULT_SIDE_BUDGET_SECS: f64 = 1320.0;

/// Reject budgets that are negative, NaN or infinite.
pub fn check_budget(budget_secs: f64) -> Result<(), PartitionError> {
    if budget_secs.is_finite() && budget_secs >= 0.0 {
        Ok(())
    } else {
        Err(PartitionError::InvalidBudget {
            budget: budget_secs,
        })
    }
}

fn checked_duration_ms<T: HasDuration>(index: usize, track: &T) -> Result<f64, PartitionError> {
    match track.duration_ms() {
        None => Err(PartitionError::MissingDuration { index }),
        Some(ms) if !ms.is_finite() || ms < 0.0 => Err(PartitionError::InvalidDuration {
            index,
            duration_ms: ms,
        }),
        Some(ms) => Ok(ms),
    }
}

/// Pack `tracks` onto vinyl sides of at most `budget_secs` each.
///
/// Tracks are taken in order and appended to the current side while the
/// running total stays within the budget (inclusive). The first track that
/// would overflow starts a new side. A track longer than the whole budget is
/// never split: it gets a side of its own, which then runs over.
///
/// When the number of sides is odd, one empty side is appended so the result
/// pairs up into discs. No tracks means no sides.
///
/// Comparisons are made in fractional seconds derived from the millisecond
/// durations, without rounding.
pub fn partition<T>(tracks: &[T], budget_secs: f64) -> Result<Vec<Side<T>>, PartitionError>
where
    T: HasDuration + Clone,
{
    check_budget(budget_secs)?;
    if tracks.is_empty() {
        return Ok(Vec::new());
    }

    let mut sides: Vec<Side<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut current_secs = 0.0_f64;
    let mut current_ms = 0.0_f64;

    for (index, track) in tracks.iter().enumerate() {
        let ms = checked_duration_ms(index, track)?;
        let secs = ms / 1000.0;

        if current_secs + secs <= budget_secs {
            current.push(track.clone());
            current_secs += secs;
            current_ms += ms;
        } else {
            // Only an oversized opening track reaches here with nothing on the side.
            if !current.is_empty() {
                sides.push(Side::with_total(mem::take(&mut current), current_ms));
            }
            current.push(track.clone());
            current_secs = secs;
            current_ms = ms;
        }
    }

    if !current.is_empty() {
        sides.push(Side::with_total(current, current_ms));
    }

    if sides.len() % 2 != 0 {
        sides.push(Side::empty());
    }

    Ok(sides)
}
