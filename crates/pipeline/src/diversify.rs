//! Diversified top-k selection.
//!
//! ## Algorithm
//!
//! 1. Split candidates into unseen and already shown titles
//! 2. Fill from the unseen partition with era mixing:
//!    - bucket by era (modern >= cutoff, classic < cutoff); undated
//!      candidates only take part in backfill
//!    - the preferred era bucket is primary (modern when no preference)
//!    - take k/2 from the primary bucket (all k if the other bucket is
//!      empty), the rest from the secondary bucket
//!    - backfill any shortfall with the remaining candidates by score
//! 3. Only if unseen titles cannot fill k, repeat step 2 on the seen
//!    partition for the remainder
//! 4. Shuffle the selection for presentation
//!
//! The selected set is a pure function of the input; only the final order
//! depends on the rng.

use catalog::{DEFAULT_MODERN_CUTOFF, Era};
use dialogue::SeenItems;
use rand::Rng;
use rand::seq::SliceRandom;
use retrieval::Candidate;
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct Diversifier {
    modern_cutoff: u16,
}

impl Default for Diversifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Diversifier {
    pub fn new() -> Self {
        Self {
            modern_cutoff: DEFAULT_MODERN_CUTOFF,
        }
    }

    /// First year counted as modern (default: 1990)
    pub fn with_modern_cutoff(mut self, cutoff: u16) -> Self {
        self.modern_cutoff = cutoff;
        self
    }

    /// Pick up to `k` candidates. Returns exactly `min(k, candidates.len())`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        candidates: Vec<Candidate>,
        seen: &SeenItems,
        era_preference: Option<Era>,
        k: usize,
        rng: &mut R,
    ) -> Vec<Candidate> {
        let primary = era_preference.unwrap_or(Era::Modern);
        let (unseen, already_seen): (Vec<Candidate>, Vec<Candidate>) =
            candidates.into_iter().partition(|c| !seen.contains(&c.title));

        debug!(
            unseen = unseen.len(),
            seen = already_seen.len(),
            k,
            "Diversifying candidates"
        );

        let mut selected = self.mix(unseen, k, primary);
        if selected.len() < k {
            let remainder = k - selected.len();
            selected.extend(self.mix(already_seen, remainder, primary));
        }

        selected.shuffle(rng);
        selected
    }

    /// Era-mixed pick of `need` candidates from one partition
    fn mix(&self, pool: Vec<Candidate>, need: usize, primary: Era) -> Vec<Candidate> {
        if need == 0 || pool.is_empty() {
            return Vec::new();
        }

        let mut modern = Vec::new();
        let mut classic = Vec::new();
        let mut undated = Vec::new();
        for candidate in pool {
            match candidate.year.map(|y| Era::of(y, self.modern_cutoff)) {
                Some(Era::Modern) => modern.push(candidate),
                Some(Era::Classic) => classic.push(candidate),
                None => undated.push(candidate),
            }
        }
        sort_by_score(&mut modern);
        sort_by_score(&mut classic);

        let (mut first, mut second) = match primary {
            Era::Modern => (modern, classic),
            Era::Classic => (classic, modern),
        };

        let from_first = if second.is_empty() { need } else { need / 2 };
        let mut picked: Vec<Candidate> = first.drain(..from_first.min(first.len())).collect();

        let from_second = (need - picked.len()).min(second.len());
        picked.extend(second.drain(..from_second));

        if picked.len() < need {
            let mut rest: Vec<Candidate> = first.into_iter().chain(second).chain(undated).collect();
            sort_by_score(&mut rest);
            let short = need - picked.len();
            picked.extend(rest.into_iter().take(short));
        }

        picked
    }
}

/// Highest score first, ties by title
fn sort_by_score(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeSet;

    fn candidate(title: &str, year: Option<u16>, score: f32) -> Candidate {
        let mut c = Candidate::new(title, year, Vec::new());
        c.score = score;
        c
    }

    fn titles(candidates: &[Candidate]) -> BTreeSet<String> {
        candidates.iter().map(|c| c.title.clone()).collect()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn pool() -> Vec<Candidate> {
        vec![
            candidate("M1", Some(2001), 3.0),
            candidate("M2", Some(1999), 2.5),
            candidate("M3", Some(2010), 2.0),
            candidate("C1", Some(1950), 2.8),
            candidate("C2", Some(1972), 2.2),
            candidate("C3", Some(1985), 1.0),
            candidate("U1", None, 9.0),
        ]
    }

    #[test]
    fn test_era_mix_defaults_to_modern_primary() {
        let selected = Diversifier::new().select(pool(), &SeenItems::default(), None, 4, &mut rng());
        assert_eq!(titles(&selected), set(&["M1", "M2", "C1", "C2"]));
    }

    #[test]
    fn test_classic_preference_makes_classic_primary() {
        let selected =
            Diversifier::new().select(pool(), &SeenItems::default(), Some(Era::Classic), 3, &mut rng());
        // 3/2 = 1 from classic, 2 from modern
        assert_eq!(titles(&selected), set(&["C1", "M1", "M2"]));
    }

    #[test]
    fn test_single_bucket_takes_everything() {
        let pool = vec![
            candidate("M1", Some(2001), 3.0),
            candidate("M2", Some(1999), 2.5),
            candidate("M3", Some(2010), 2.0),
        ];
        let selected =
            Diversifier::new().select(pool, &SeenItems::default(), Some(Era::Classic), 2, &mut rng());
        assert_eq!(titles(&selected), set(&["M1", "M2"]));
    }

    #[test]
    fn test_backfill_uses_undated_candidates() {
        let selected = Diversifier::new().select(pool(), &SeenItems::default(), None, 7, &mut rng());
        assert_eq!(selected.len(), 7);
        assert!(titles(&selected).contains("U1"));
    }

    #[test]
    fn test_never_more_than_k_and_exactly_min() {
        for k in 0..10 {
            let selected = Diversifier::new().select(pool(), &SeenItems::default(), None, k, &mut rng());
            assert_eq!(selected.len(), k.min(7), "k = {k}");
        }
    }

    #[test]
    fn test_seen_titles_excluded_when_unseen_suffice() {
        let mut seen = SeenItems::default();
        seen.record("M1");
        seen.record("C1");

        let selected = Diversifier::new().select(pool(), &seen, None, 4, &mut rng());
        let picked = titles(&selected);
        assert!(!picked.contains("M1"));
        assert!(!picked.contains("C1"));
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_seen_titles_backfill_when_needed() {
        let mut seen = SeenItems::default();
        for title in ["M1", "M2", "M3", "C1", "C2", "C3"] {
            seen.record(title);
        }

        let selected = Diversifier::new().select(pool(), &seen, None, 3, &mut rng());
        let picked = titles(&selected);
        assert_eq!(selected.len(), 3);
        assert!(picked.contains("U1"));
    }

    #[test]
    fn test_selection_is_stable_across_runs() {
        let diversifier = Diversifier::new();
        let seen = SeenItems::default();
        let first = diversifier.select(pool(), &seen, None, 5, &mut StdRng::seed_from_u64(1));
        let second = diversifier.select(pool(), &seen, None, 5, &mut StdRng::seed_from_u64(99));
        assert_eq!(titles(&first), titles(&second));
    }
}
