//! Late-settlement penalty curve.
//!
//! A claim settled within a day of maturity pays in full. After that the
//! penalty roughly doubles each day, `2^(days_late + 3) / WINDOW - 1`, and
//! once the withdrawal window has passed it is pinned at the maximum:
//!
//! | days late | penalty % |
//! |-----------|-----------|
//! | 0         | 0         |
//! | 1         | 1         |
//! | 2         | 3         |
//! | 3         | 8         |
//! | 4         | 17        |
//! | 5         | 35        |
//! | 6         | 72        |
//! | 7+        | 99        |

use xen_core::constants::{MAX_PENALTY_PCT, SECONDS_IN_DAY, WITHDRAWAL_WINDOW_DAYS};

/// Penalty percentage in `[0, MAX_PENALTY_PCT]` for settling `seconds_late`
/// after maturity.
pub fn withdrawal_penalty(seconds_late: u64) -> u64 {
    let days_late = seconds_late / SECONDS_IN_DAY;
    if days_late >= WITHDRAWAL_WINDOW_DAYS {
        return MAX_PENALTY_PCT;
    }
    // days_late < 7, so the shift stays well inside u64.
    let penalty = (1u64 << (days_late + 3)) / WITHDRAWAL_WINDOW_DAYS - 1;
    penalty.min(MAX_PENALTY_PCT)
}
