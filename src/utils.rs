/// Tolerance shared by every geometric comparison in the crate.
///
/// The sweepline derives vertices algebraically, so coordinates carry
/// floating-point error; all predicates below absorb it with this same
/// constant. The cell-closing walk relies on that consistency to terminate.
pub(crate) const EPSILON: f64 = 1e-9;

#[inline]
pub(crate) fn eps_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[inline]
pub(crate) fn eps_lt(a: f64, b: f64) -> bool {
    b - a > EPSILON
}

#[inline]
#[allow(dead_code)]
pub(crate) fn eps_le(a: f64, b: f64) -> bool {
    a - b < EPSILON
}

#[inline]
pub(crate) fn eps_gt(a: f64, b: f64) -> bool {
    a - b > EPSILON
}

#[inline]
#[allow(dead_code)]
pub(crate) fn eps_ge(a: f64, b: f64) -> bool {
    b - a < EPSILON
}

#[inline]
pub fn abs_diff_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (if a > b { a - b } else { b - a }) <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_predicates_agree_on_the_same_constant() {
        // values separated by less than the tolerance compare as equal
        let a = 1.0;
        let b = 1.0 + EPSILON / 2.0;
        assert!(eps_eq(a, b));
        assert!(!eps_lt(a, b));
        assert!(!eps_gt(b, a));
        assert!(eps_le(a, b));
        assert!(eps_ge(b, a));

        // values separated by more than the tolerance do not
        let c = 1.0 + 2.0 * EPSILON;
        assert!(!eps_eq(a, c));
        assert!(eps_lt(a, c));
        assert!(eps_gt(c, a));
        assert!(eps_le(a, c));
        assert!(eps_ge(c, a));
    }
}
