use std::{collections::HashSet, sync::Arc};

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use shared::{
    domain::{Student, StudentId},
    error::DrawError,
};
use storage::StateStore;
use tracing::warn;

pub mod catalog;
pub mod persist;

pub use catalog::{Catalog, CatalogSource, HttpCatalogSource, MissingCatalogSource};

/// Owns the selection set and last-drawn marker for one session, forwards
/// draw commands to the engine, and persists state changes best-effort.
///
/// All mutation goes through `&mut self`; the only async boundaries are the
/// store reads at load time and the fire-and-forget writes afterwards.
pub struct SelectionController {
    catalog: Catalog,
    store: Arc<dyn StateStore>,
    selected: HashSet<StudentId>,
    last_drawn: Option<StudentId>,
    rng: StdRng,
}

impl SelectionController {
    /// Restores persisted selection state, treating an empty store as "no
    /// prior state". Only a failing store read is an error.
    pub async fn load(catalog: Catalog, store: Arc<dyn StateStore>) -> Result<Self> {
        Self::load_with_rng(catalog, store, StdRng::from_os_rng()).await
    }

    pub async fn load_with_rng(
        catalog: Catalog,
        store: Arc<dyn StateStore>,
        rng: StdRng,
    ) -> Result<Self> {
        let selected = persist::load_selection(store.as_ref()).await?;
        let last_drawn = persist::load_last_drawn(store.as_ref()).await?;
        Ok(Self {
            catalog,
            store,
            selected,
            last_drawn,
            rng,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_selected(&self, id: StudentId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    pub fn last_drawn(&self) -> Option<StudentId> {
        self.last_drawn
    }

    /// Adds `id` to the selection set, or removes it if already present.
    /// Unknown ids are accepted and stored; they simply never win a draw.
    pub async fn toggle(&mut self, id: StudentId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        if let Err(error) = persist::save_selection(self.store.as_ref(), &self.selected).await {
            warn!(%error, "failed to persist selection set");
        }
    }

    /// Draws one selected student, never repeating the previous single draw
    /// while at least two students are selected.
    pub async fn draw_one(&mut self) -> Result<Student, DrawError> {
        let pool = self.eligible_pool();
        let id = engine::draw_one(&pool, self.last_drawn, &mut self.rng)?;
        let student = self.resolve(id)?;
        self.remember_last_drawn(id).await;
        Ok(student)
    }

    /// Draws `need` distinct selected students without replacement. Leaves
    /// the last-drawn marker alone: a following single draw is unconstrained
    /// by a multi draw's results.
    pub async fn draw_n(&mut self, need: usize) -> Result<Vec<Student>, DrawError> {
        let pool = self.eligible_pool();
        let ids = engine::draw_sample(&pool, need, &mut self.rng)?;
        ids.into_iter().map(|id| self.resolve(id)).collect()
    }

    /// Draws one student from the whole catalog, ignoring the selection set.
    /// Still feeds the no-repeat rule for the next single draw.
    pub async fn draw_any(&mut self) -> Result<Student, DrawError> {
        let ids = self.catalog.ids();
        let id = engine::draw_any(&ids, &mut self.rng)?;
        let student = self.resolve(id)?;
        self.remember_last_drawn(id).await;
        Ok(student)
    }

    /// Selected ids whose student is still in the catalog. Stale ids stay
    /// stored but never reach a draw pool.
    fn eligible_pool(&self) -> HashSet<StudentId> {
        self.selected
            .iter()
            .copied()
            .filter(|&id| self.catalog.contains(id))
            .collect()
    }

    fn resolve(&self, id: StudentId) -> Result<Student, DrawError> {
        // Draw pools are intersected with the catalog, so this lookup only
        // fails if the pool invariant is broken.
        self.catalog
            .get(id)
            .cloned()
            .ok_or(DrawError::EmptySelection)
    }

    async fn remember_last_drawn(&mut self, id: StudentId) {
        self.last_drawn = Some(id);
        if let Err(error) = persist::save_last_drawn(self.store.as_ref(), id).await {
            warn!(%error, "failed to persist last-drawn id");
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
