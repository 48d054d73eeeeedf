/// Calculate number of combinations C(n, k) without overflow
pub fn num_combinations(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    if k == 0 || k == n {
        return 1;
    }

    let k = k.min(n - k); // Optimization: C(n,k) = C(n,n-k)
    let mut result = 1usize;

    for i in 0..k {
        result = result.saturating_mul(n - i) / (i + 1);
    }

    result
}

/// Solve C(n, 2) = k for n, if k is a triangular number.
///
/// Returns `None` for k = 0 as well: an empty encoding carries no order.
pub fn triangular_order(k: usize) -> Option<usize> {
    if k == 0 {
        return None;
    }
    // n ~ (1 + sqrt(1 + 8k)) / 2, then correct for float rounding.
    let estimate = ((1.0 + (1.0 + 8.0 * k as f64).sqrt()) / 2.0) as usize;
    (estimate.saturating_sub(1)..=estimate + 1).find(|&n| num_combinations(n, 2) == k)
}

pub fn gcd(a: usize, b: usize) -> usize {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// GCD of a set of lengths: 0 when empty, the element itself for a
/// singleton, the reduced gcd otherwise.
pub fn gcd_of<'a, I>(values: I) -> usize
where
    I: IntoIterator<Item = &'a usize>,
{
    values.into_iter().fold(0, |acc, &v| gcd(acc, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_combinations() {
        assert_eq!(num_combinations(5, 2), 10);
        assert_eq!(num_combinations(4, 4), 1);
        assert_eq!(num_combinations(3, 0), 1);
        assert_eq!(num_combinations(2, 3), 0);
    }

    #[test]
    fn test_triangular_order() {
        assert_eq!(triangular_order(1), Some(2));
        assert_eq!(triangular_order(3), Some(3));
        assert_eq!(triangular_order(10), Some(5));
        assert_eq!(triangular_order(45), Some(10));
        assert_eq!(triangular_order(4), None);
        assert_eq!(triangular_order(0), None);
    }

    #[test]
    fn test_gcd_of_sets() {
        let empty: BTreeSet<usize> = BTreeSet::new();
        assert_eq!(gcd_of(&empty), 0);
        assert_eq!(gcd_of(&BTreeSet::from([6])), 6);
        assert_eq!(gcd_of(&BTreeSet::from([6, 9])), 3);
        assert_eq!(gcd_of(&BTreeSet::from([3, 4])), 1);
        assert_eq!(gcd(0, 7), 7);
    }
}
