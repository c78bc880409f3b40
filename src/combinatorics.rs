//! Enumeration primitives for the blow-up engines: multisets, tuples,
//! compositions, subsets and multiset permutations over `1..=max`, with
//! exact counting helpers.

use num_bigint::BigInt;
use num_traits::One;

/// n! as an exact integer.
pub fn factorial(n: usize) -> BigInt {
    let mut out = BigInt::one();
    for k in 2..=n {
        out *= BigInt::from(k);
    }
    out
}

/// Multinomial weight of a sorted multiset selection: n!/∏ count(v)!
/// where n is the selection length. This is the number of ordered tuples
/// realizing the multiset. Equal entries must be adjacent.
pub fn multiset_coefficient(selection: &[usize]) -> BigInt {
    let mut out = factorial(selection.len());
    let mut i = 0;
    while i < selection.len() {
        let mut j = i;
        while j < selection.len() && selection[j] == selection[i] {
            j += 1;
        }
        out /= factorial(j - i);
        i = j;
    }
    out
}

/// Multinomial coefficient for an ordered composition: total!/∏ part!.
pub fn composition_coefficient(parts: &[usize]) -> BigInt {
    let total: usize = parts.iter().sum();
    let mut out = factorial(total);
    for &p in parts {
        out /= factorial(p);
    }
    out
}

/// Nondecreasing `len`-tuples over `1..=max` (selections with
/// repetition), in lexicographic order.
pub fn unordered_tuples(max: usize, len: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(len);
    fn rec(max: usize, len: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == len {
            out.push(current.clone());
            return;
        }
        for v in start..=max {
            current.push(v);
            rec(max, len, v, current, out);
            let _ = current.pop();
        }
    }
    rec(max, len, 1, &mut current, &mut out);
    out
}

/// All ordered `len`-tuples over `1..=max`, in lexicographic order.
pub fn tuples(max: usize, len: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(len);
    fn rec(max: usize, len: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == len {
            out.push(current.clone());
            return;
        }
        for v in 1..=max {
            current.push(v);
            rec(max, len, current, out);
            let _ = current.pop();
        }
    }
    rec(max, len, &mut current, &mut out);
    out
}

/// Ordered sequences of positive integers summing to `total`. There is
/// exactly one composition of 0, the empty one.
pub fn compositions(total: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    fn rec(remaining: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if remaining == 0 {
            out.push(current.clone());
            return;
        }
        for part in 1..=remaining {
            current.push(part);
            rec(remaining - part, current, out);
            let _ = current.pop();
        }
    }
    rec(total, &mut current, &mut out);
    out
}

/// Sorted `len`-element subsets of `1..=max`, in lexicographic order.
pub fn subsets(max: usize, len: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(len);
    fn rec(max: usize, len: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == len {
            out.push(current.clone());
            return;
        }
        for v in start..=max {
            current.push(v);
            rec(max, len, v + 1, current, out);
            let _ = current.pop();
        }
    }
    rec(max, len, 1, &mut current, &mut out);
    out
}

/// Distinct permutations of a multiset, in lexicographic order.
pub fn multiset_permutations(items: &[usize]) -> Vec<Vec<usize>> {
    let mut pool = items.to_vec();
    pool.sort_unstable();
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(pool.len());
    let mut used = vec![false; pool.len()];
    fn rec(
        pool: &[usize],
        used: &mut [bool],
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == pool.len() {
            out.push(current.clone());
            return;
        }
        let mut last: Option<usize> = None;
        for i in 0..pool.len() {
            if used[i] || last == Some(pool[i]) {
                continue;
            }
            last = Some(pool[i]);
            used[i] = true;
            current.push(pool[i]);
            rec(pool, used, current, out);
            let _ = current.pop();
            used[i] = false;
        }
    }
    rec(&pool, &mut used, &mut current, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_values() {
        assert_eq!(factorial(0), BigInt::from(1));
        assert_eq!(factorial(5), BigInt::from(120));
    }

    #[test]
    fn multiset_coefficient_counts_orderings() {
        // (1,1,2): 3!/2! = 3 orderings
        assert_eq!(multiset_coefficient(&[1, 1, 2]), BigInt::from(3));
        assert_eq!(multiset_coefficient(&[2, 2, 2]), BigInt::from(1));
        assert_eq!(multiset_coefficient(&[]), BigInt::from(1));
    }

    #[test]
    fn unordered_tuple_counts() {
        // C(max + len - 1, len)
        assert_eq!(unordered_tuples(3, 2).len(), 6);
        assert_eq!(unordered_tuples(5, 3).len(), 35);
        assert_eq!(unordered_tuples(4, 0), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn tuple_counts() {
        assert_eq!(tuples(3, 2).len(), 9);
        assert_eq!(tuples(2, 3).len(), 8);
        assert_eq!(tuples(7, 0).len(), 1);
    }

    #[test]
    fn composition_counts() {
        assert_eq!(compositions(0), vec![Vec::<usize>::new()]);
        // 2^(n-1) compositions of n
        assert_eq!(compositions(4).len(), 8);
        let total: usize = compositions(4).iter().map(|c| c.iter().sum::<usize>()).sum();
        assert_eq!(total, 4 * 8);
    }

    #[test]
    fn subset_counts() {
        assert_eq!(subsets(5, 2).len(), 10);
        assert_eq!(subsets(5, 5).len(), 1);
        assert_eq!(subsets(3, 4).len(), 0);
    }

    #[test]
    fn multiset_permutation_dedup() {
        let perms = multiset_permutations(&[1, 1, 2]);
        assert_eq!(perms, vec![vec![1, 1, 2], vec![1, 2, 1], vec![2, 1, 1]]);
        assert_eq!(multiset_permutations(&[3, 2, 1]).len(), 6);
        assert_eq!(multiset_permutations(&[]), vec![Vec::<usize>::new()]);
    }
}
