//! Greedy Leja-point selection from a Ritz-value candidate pool.
//!
//! Newton interpolation is numerically stable only if the nodes are
//! ordered so that each new node is as far as possible, in a product
//! sense, from all previous ones. Leja ordering delivers exactly that: at
//! every step the candidate maximizing ∏ⱼ |z − Lⱼ| over the existing
//! sequence is appended.
//!
//! The raw product of up to ~m·restarts distances overflows or underflows
//! double precision long before the sequence is complete, so every factor
//! is raised to a fixed exponent e = 1/(n + n_use) chosen per call. This
//! keeps the products O(1) while preserving the argmax.
//!
//! The sequence only ever grows; points are never reordered or removed
//! once appended. Selected candidates are removed from the pool by
//! swapping in the last remaining entry, so one invocation never selects
//! the same candidate twice.

use faer::c64;

/// Appends up to `n_use` points from `candidates` to the Leja sequence.
///
/// `leja` holds `n` valid points in its leading entries; the buffer is
/// grown (doubling, zero-filled) when it cannot hold `n + n_use`. The
/// candidate slice is consumed destructively: chosen entries are
/// overwritten by the swap-removal scheme.
///
/// When the sequence is empty the first point is the candidate of largest
/// modulus, anchoring the sequence near the outer spectral radius. If the
/// pool is exhausted before `n_use` points were added, the remaining
/// iterations are silent no-ops.
///
/// # Returns
/// The new total length of the Leja sequence.
pub fn extend_leja(leja: &mut Vec<c64>, n: usize, candidates: &mut [c64], n_use: usize) -> usize {
    assert!(
        leja.len() >= n,
        "extend_leja: the sequence claims {} points but the buffer holds {}.",
        n,
        leja.len(),
    );

    let target = n + n_use;
    if leja.len() < target {
        leja.resize(2 * target, c64::new(0.0, 0.0));
    }

    // The per-call exponent keeping the distance products O(1).
    let e = 1.0 / target as f64;

    let mut n_new = n;
    let mut remaining = candidates.len();

    if n_new == 0 && remaining > 0 && n_use > 0 {
        // Bootstrap: anchor at the candidate of greatest modulus.
        let mut i_max = 0;
        for i in 1..remaining {
            if candidates[i].norm() > candidates[i_max].norm() {
                i_max = i;
            }
        }
        leja[0] = candidates[i_max];
        candidates[i_max] = candidates[remaining - 1];
        remaining -= 1;
        n_new = 1;
    }

    while n_new < target {
        if remaining == 0 {
            break;
        }
        let mut i_best = 0;
        let mut p_best = f64::NEG_INFINITY;
        for i in 0..remaining {
            let z = candidates[i];
            let mut p = 1.0;
            for l in leja.iter().take(n_new) {
                p *= (z - l).norm().powf(e);
            }
            if p > p_best {
                p_best = p;
                i_best = i;
            }
        }
        leja[n_new] = candidates[i_best];
        candidates[i_best] = candidates[remaining - 1];
        remaining -= 1;
        n_new += 1;
    }

    n_new
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(x: f64) -> c64 {
        c64::new(x, 0.0)
    }

    #[test]
    fn test_bootstrap_picks_largest_modulus() {
        let mut leja = vec![c64::new(0.0, 0.0); 8];
        let mut candidates = vec![re(0.5), c64::new(0.0, -3.0), re(2.0)];
        let n = extend_leja(&mut leja, 0, &mut candidates, 1);
        assert_eq!(n, 1);
        assert!((leja[0] - c64::new(0.0, -3.0)).norm() < 1e-15);
    }

    #[test]
    fn test_greedy_product_distance_order() {
        // From {-2, -1, 0, 1, 2} anchored at -2, the greedy rule picks 2
        // (distance 4), then 0 (product 2·2 beats 1·3 and 3·1).
        let mut leja = vec![c64::new(0.0, 0.0); 16];
        let mut candidates = vec![re(-2.0), re(-1.0), re(0.0), re(1.0), re(2.0)];
        let n = extend_leja(&mut leja, 0, &mut candidates, 3);
        assert_eq!(n, 3);
        assert!((leja[0] - re(-2.0)).norm() < 1e-15);
        assert!((leja[1] - re(2.0)).norm() < 1e-15);
        assert!((leja[2] - re(0.0)).norm() < 1e-15);
    }

    #[test]
    fn test_no_duplicate_selection_and_exhaustion() {
        // Asking for more points than the pool holds stops silently at the
        // pool size, with every candidate selected exactly once.
        let mut leja = vec![c64::new(0.0, 0.0); 4];
        let mut candidates = vec![re(1.0), re(-1.0)];
        let n = extend_leja(&mut leja, 0, &mut candidates, 5);
        assert_eq!(n, 2);
        let mut picked: Vec<f64> = leja[..n].iter().map(|z| z.re).collect();
        picked.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(picked, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_buffer_growth_doubles() {
        let mut leja = vec![c64::new(0.0, 0.0); 2];
        leja[0] = re(3.0);
        leja[1] = re(-3.0);
        let mut candidates = vec![re(0.0), re(1.0), re(-1.0)];
        let n = extend_leja(&mut leja, 2, &mut candidates, 3);
        assert_eq!(n, 5);
        assert_eq!(leja.len(), 10);
        // Previously selected points are untouched.
        assert!((leja[0] - re(3.0)).norm() < 1e-15);
        assert!((leja[1] - re(-3.0)).norm() < 1e-15);
    }

    #[test]
    fn test_incremental_extension_matches_single_call() {
        // Extending in two steps must keep the earlier prefix frozen: the
        // sequence is append-only.
        let pool = [re(-2.0), re(-0.5), re(0.25), re(1.5), re(2.5)];
        let mut leja = vec![c64::new(0.0, 0.0); 16];
        let mut candidates = pool.to_vec();
        let n1 = extend_leja(&mut leja, 0, &mut candidates, 2);
        let prefix: Vec<c64> = leja[..n1].to_vec();
        let mut rest: Vec<c64> = candidates[..pool.len() - n1].to_vec();
        let n2 = extend_leja(&mut leja, n1, &mut rest, 2);
        assert_eq!(n2, 4);
        assert_eq!(&leja[..n1], &prefix[..]);
    }
}
