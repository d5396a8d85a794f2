/// Candidate set construction: the target plus decoys, uniformly shuffled.
///
/// Two policies, selected by [`Variant`]:
///   - Classic:  target + random decoys, all pairwise distinct.
///   - NearMiss: target + jittered copies of the target + random decoys.
///     The jittered copies are not deduplicated; they may coincide with the
///     target or with each other.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::color::{random_color, similar_color, Color};
use crate::domain::variant::Variant;

/// Number of option buttons per round.
pub const OPTION_COUNT: usize = 6;

/// Options are laid out in a grid this many columns wide.
pub const OPTION_COLUMNS: usize = 3;

/// Exactly [`OPTION_COUNT`] colors, the target among them.
/// Only constructed by [`build_options`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSet(Vec<Color>);

impl OptionSet {
    pub fn get(&self, index: usize) -> Option<Color> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.0.contains(&color)
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.0.iter().copied()
    }
}

pub fn build_options<R: Rng + ?Sized>(
    target: Color,
    variant: Variant,
    variation: u8,
    rng: &mut R,
) -> OptionSet {
    let mut colors = match variant {
        Variant::Classic => distinct_random_decoys(target, rng),
        Variant::NearMiss => near_miss_decoys(target, variant.near_miss_decoys(), variation, rng),
    };
    colors.shuffle(rng);

    debug_assert!(
        !variant.distinct_options()
            || colors.iter().collect::<HashSet<_>>().len() == colors.len()
    );

    let set = OptionSet(colors);
    debug_assert_eq!(set.len(), OPTION_COUNT);
    debug_assert!(set.contains(target));
    set
}

fn distinct_random_decoys<R: Rng + ?Sized>(target: Color, rng: &mut R) -> Vec<Color> {
    let mut seen = HashSet::with_capacity(OPTION_COUNT);
    let mut colors = Vec::with_capacity(OPTION_COUNT);
    seen.insert(target);
    colors.push(target);
    while colors.len() < OPTION_COUNT {
        let candidate = random_color(rng);
        if seen.insert(candidate) {
            colors.push(candidate);
        }
    }
    colors
}

fn near_miss_decoys<R: Rng + ?Sized>(
    target: Color,
    near_count: usize,
    variation: u8,
    rng: &mut R,
) -> Vec<Color> {
    let mut colors = Vec::with_capacity(OPTION_COUNT);
    colors.push(target);
    for _ in 0..near_count {
        colors.push(similar_color(target, variation, rng));
    }
    while colors.len() < OPTION_COUNT {
        let candidate = random_color(rng);
        if !colors.contains(&candidate) {
            colors.push(candidate);
        }
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color::DEFAULT_VARIATION;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn classic_sets_are_full_distinct_and_hold_target() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let target = random_color(&mut rng);
            let set = build_options(target, Variant::Classic, DEFAULT_VARIATION, &mut rng);
            assert_eq!(set.len(), OPTION_COUNT);
            assert!(set.contains(target));
            let unique: HashSet<Color> = set.iter().collect();
            assert_eq!(unique.len(), OPTION_COUNT);
        }
    }

    #[test]
    fn near_miss_sets_are_full_and_hold_target() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let target = random_color(&mut rng);
            let set = build_options(target, Variant::NearMiss, DEFAULT_VARIATION, &mut rng);
            assert_eq!(set.len(), OPTION_COUNT);
            assert!(set.contains(target));
        }
    }

    #[test]
    fn near_miss_includes_two_close_decoys() {
        let mut rng = StdRng::seed_from_u64(3);
        let target = Color::new(120, 60, 200);
        let set = build_options(target, Variant::NearMiss, DEFAULT_VARIATION, &mut rng);
        let close = set
            .iter()
            .filter(|c| {
                c.channels()
                    .into_iter()
                    .zip(target.channels())
                    .all(|(a, b)| a.abs_diff(b) <= 15)
            })
            .count();
        // target + two near misses; a random decoy landing this close is possible but rare
        assert!(close >= 3, "only {close} options near {target}");
    }

    #[test]
    fn near_miss_keeps_duplicate_decoys() {
        // Zero variation turns both near misses into exact copies of the target.
        let mut rng = StdRng::seed_from_u64(4);
        let target = Color::new(10, 20, 30);
        let set = build_options(target, Variant::NearMiss, 0, &mut rng);
        assert_eq!(set.len(), OPTION_COUNT);
        assert_eq!(set.iter().filter(|&c| c == target).count(), 3);
    }

    #[test]
    fn shuffle_moves_the_target_around() {
        let mut rng = StdRng::seed_from_u64(5);
        let target = Color::new(1, 2, 3);
        let mut positions = HashSet::new();
        for _ in 0..100 {
            let set = build_options(target, Variant::Classic, DEFAULT_VARIATION, &mut rng);
            let pos = set.iter().position(|c| c == target).expect("target present");
            positions.insert(pos);
        }
        assert_eq!(positions.len(), OPTION_COUNT);
    }

    #[test]
    fn get_out_of_range_is_none() {
        let mut rng = StdRng::seed_from_u64(6);
        let set = build_options(Color::new(0, 0, 0), Variant::Classic, DEFAULT_VARIATION, &mut rng);
        assert!(set.get(OPTION_COUNT - 1).is_some());
        assert!(set.get(OPTION_COUNT).is_none());
    }
}
