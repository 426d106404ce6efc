//! Weighted random choice over a stably ordered set of entries.

use rand::Rng;

/// Draw `r` uniformly in `[0, total)` and walk the entries in order,
/// returning the first whose cumulative weight exceeds `r`.
///
/// Entries with a weight that is not strictly positive (or not finite) never
/// win. Returns `None` when nothing is eligible.
pub fn choose_weighted<T, R>(entries: impl IntoIterator<Item = (T, f64)>, rng: &mut R) -> Option<T>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<(T, f64)> = entries
        .into_iter()
        .filter(|(_, weight)| weight.is_finite() && *weight > 0.0)
        .collect();
    let total: f64 = eligible.iter().map(|(_, weight)| *weight).sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last = None;
    for (entry, weight) in eligible {
        cumulative += weight;
        if cumulative > roll {
            return Some(entry);
        }
        last = Some(entry);
    }
    // Rounding can leave the final cumulative sum a hair under `roll`.
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_empty_is_none() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let entries: Vec<(&str, f64)> = vec![];
        assert_eq!(choose_weighted(entries, &mut rng), None);
    }

    #[test]
    fn test_non_positive_weights_never_chosen() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        for _ in 0..500 {
            let pick = choose_weighted(vec![("neg", -4.0), ("zero", 0.0), ("pos", 0.1)], &mut rng);
            assert_eq!(pick, Some("pos"));
        }
        assert_eq!(
            choose_weighted(vec![("neg", -1.0), ("zero", 0.0)], &mut rng),
            None
        );
    }

    #[test]
    fn test_nan_weight_excluded() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let pick = choose_weighted(vec![("nan", f64::NAN), ("ok", 1.0)], &mut rng);
        assert_eq!(pick, Some("ok"));
    }

    #[test]
    fn test_distribution_roughly_proportional() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut heavy = 0;
        let trials = 20_000;
        for _ in 0..trials {
            if choose_weighted(vec![("light", 1.0), ("heavy", 3.0)], &mut rng) == Some("heavy") {
                heavy += 1;
            }
        }
        let ratio = heavy as f64 / trials as f64;
        assert!((ratio - 0.75).abs() < 0.02, "ratio was {ratio}");
    }
}
