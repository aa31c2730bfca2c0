//! Floored base-2 logarithm with a floor of 1.

/// `floor(log2(x))`, except that every `x <= 2` maps to 1.
///
/// The floor keeps a rank delta of 0, 1 or 2 from zeroing out the reward
/// product it multiplies into.
///
/// # Examples
///
/// ```
/// use xen_reward::log2_floor;
/// assert_eq!(log2_floor(2), 1);
/// assert_eq!(log2_floor(3), 1);
/// assert_eq!(log2_floor(4), 2);
/// assert_eq!(log2_floor(7), 2);
/// assert_eq!(log2_floor(8), 3);
/// ```
pub fn log2_floor(x: u128) -> u64 {
    if x <= 2 {
        return 1;
    }
    // Index of the highest set bit, counting from zero.
    x.ilog2() as u64
}
