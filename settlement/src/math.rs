//! Integer square root.

/// Floor of the square root of `n`, by Newton iteration.
///
/// Pure integer arithmetic, so every platform gets the same answer. The
/// iterate starts at `ceil(n / 2)` and strictly decreases until it reaches
/// the floor root, which bounds the loop at `O(log n)` steps.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = n / 2 + (n & 1);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
