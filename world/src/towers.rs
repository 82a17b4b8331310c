//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use glam::Vec3;
use grid_defense_core::{TileCoord, TowerId, TowerKind, TowerSnapshot};

/// Record of a tower stored inside the world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Tile occupied by the tower.
    pub(crate) tile: TileCoord,
    /// Centre of the occupied tile.
    pub(crate) position: Vec3,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            position: self.position,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
///
/// Identifiers are never reused, not even after the board is cleared, so
/// systems holding per-tower state can prune it by identifier alone.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Records a tower on `tile` and returns the identifier allocated for it.
    pub(crate) fn insert(&mut self, kind: TowerKind, tile: TileCoord, position: Vec3) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                tile,
                position,
            },
        );
        id
    }

    /// Removes the tower standing on `tile`, if any.
    pub(crate) fn remove_at(&mut self, tile: TileCoord) -> Option<TowerState> {
        let id = self
            .entries
            .values()
            .find(|state| state.tile == tile)
            .map(|state| state.id)?;
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Forgets every tower while keeping the identifier counter.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
