use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::scenario::schema::{Department, Scenario};

/// Picks the active set for a new day: a random count in `[min, max]` of
/// distinct scenarios for `role` that were not answered in this game.
/// The count is clamped to what is available; an empty result means the
/// day has no content.
pub fn draw_day_scenarios<R: Rng>(
    pool: &[Scenario],
    role: Department,
    answered: &HashSet<String>,
    min_per_day: usize,
    max_per_day: usize,
    rng: &mut R,
) -> Vec<Scenario> {
    let mut available = pool
        .iter()
        .filter(|s| s.department == role && !answered.contains(&s.id))
        .collect::<Vec<_>>();
    // pool may contain duplicates when callers merge sources
    let mut seen = HashSet::new();
    available.retain(|s| seen.insert(s.id.clone()));
    if available.is_empty() {
        return Vec::new();
    }

    let low = min_per_day.max(1);
    let high = max_per_day.max(low);
    let wanted = rng.gen_range(low..=high).min(available.len());

    available.shuffle(rng);
    available.into_iter().take(wanted).cloned().collect()
}
