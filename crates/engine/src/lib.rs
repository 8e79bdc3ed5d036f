use std::collections::HashSet;

use rand::{seq::IndexedRandom, Rng};
use shared::{domain::StudentId, error::DrawError};

/// Draws a single id from `selection`, avoiding an immediate repeat of
/// `last_drawn` whenever the selection holds at least two students.
///
/// With exactly one selected student the exclusion is skipped, so that
/// student is drawn again even if it was drawn last; there is no alternative.
pub fn draw_one(
    selection: &HashSet<StudentId>,
    last_drawn: Option<StudentId>,
    rng: &mut impl Rng,
) -> Result<StudentId, DrawError> {
    if selection.is_empty() {
        return Err(DrawError::EmptySelection);
    }

    let mut pool: Vec<StudentId> = selection.iter().copied().collect();
    if pool.len() >= 2 {
        if let Some(last) = last_drawn {
            pool.retain(|id| *id != last);
        }
    }

    // Exclusion only ever removes one id from a pool of two or more.
    Ok(*pool.choose(rng).ok_or(DrawError::EmptySelection)?)
}

/// Draws `need` distinct ids from `selection`, uniformly over combinations,
/// using a partial Fisher-Yates prefix shuffle. The last-drawn marker plays
/// no part here.
pub fn draw_sample(
    selection: &HashSet<StudentId>,
    need: usize,
    rng: &mut impl Rng,
) -> Result<Vec<StudentId>, DrawError> {
    if selection.is_empty() {
        return Err(DrawError::EmptySelection);
    }

    let mut pool: Vec<StudentId> = selection.iter().copied().collect();
    if pool.len() < need {
        return Err(DrawError::InsufficientPool {
            have: pool.len(),
            need,
        });
    }

    for slot in 0..need {
        let pick = rng.random_range(slot..pool.len());
        pool.swap(slot, pick);
    }
    pool.truncate(need);
    Ok(pool)
}

/// Draws one id uniformly from the whole catalog, ignoring the selection
/// set and the no-repeat rule.
pub fn draw_any(catalog_ids: &[StudentId], rng: &mut impl Rng) -> Result<StudentId, DrawError> {
    catalog_ids
        .choose(rng)
        .copied()
        .ok_or(DrawError::EmptyCatalog)
}
