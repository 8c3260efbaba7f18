use cubefield_common::EntityId;

use crate::cube::Cube;

/// Errors from entity store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("entity {0} not found")]
    NotFound(EntityId),
    #[error("entity {0} already present")]
    DuplicateId(EntityId),
}

/// Sole owner of live cubes.
///
/// Iteration order is insertion order. Contents change only through
/// [`EntityStore::insert`], [`EntityStore::insert_batch`] and
/// [`EntityStore::remove`]; the mutable views
/// handed out for stepping cannot add or drop entries.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    cubes: Vec<Cube>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Add a cube at the end of the iteration order. Returns its id.
    pub fn insert(&mut self, cube: Cube) -> Result<EntityId, StoreError> {
        let id = cube.id;
        if self.contains(id) {
            return Err(StoreError::DuplicateId(id));
        }
        self.cubes.push(cube);
        Ok(id)
    }

    /// Add several cubes at once, all or nothing. Every id is checked against
    /// the store and the rest of the batch before anything is added.
    pub fn insert_batch(&mut self, cubes: Vec<Cube>) -> Result<Vec<EntityId>, StoreError> {
        for (i, cube) in cubes.iter().enumerate() {
            if self.contains(cube.id) || cubes[..i].iter().any(|c| c.id == cube.id) {
                return Err(StoreError::DuplicateId(cube.id));
            }
        }
        let ids = cubes.iter().map(|c| c.id).collect();
        self.cubes.extend(cubes);
        Ok(ids)
    }

    /// Remove a cube. Returns it if it was present.
    pub fn remove(&mut self, id: EntityId) -> Option<Cube> {
        let index = self.index_of(id)?;
        Some(self.cubes.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Result<&Cube, StoreError> {
        self.cubes
            .iter()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut Cube, StoreError> {
        self.cubes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// All live cubes in insertion order.
    pub fn all(&self) -> &[Cube] {
        &self.cubes
    }

    /// Mutable slice for the per-step passes. Length is fixed through this view.
    pub fn all_mut(&mut self) -> &mut [Cube] {
        &mut self.cubes
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.cubes.iter().position(|c| c.id == id)
    }
}
