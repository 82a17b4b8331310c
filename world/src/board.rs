//! Board content mutations and the path field they keep up to date.

use grid_defense_core::{BoardSize, ContentError, ContentKind, Event, TileCoord, TowerKind};
use tracing::debug;

use crate::{
    graph::TileGraph,
    navigation::{PathSolver, SolveError},
    towers::TowerRegistry,
};

impl From<SolveError> for ContentError {
    fn from(error: SolveError) -> Self {
        match error {
            SolveError::NoDestination => ContentError::NoDestination,
            SolveError::Disconnected { .. } => ContentError::Disconnected,
        }
    }
}

/// Tile graph plus the spawn points and towers placed on it.
///
/// Every public mutation leaves the graph in a state the solver accepts. Edits
/// that would break connectivity are undone and reported as rejections.
#[derive(Debug)]
pub(crate) struct Board {
    graph: TileGraph,
    solver: PathSolver,
    spawn_points: Vec<TileCoord>,
    towers: TowerRegistry,
}

impl Board {
    /// Builds a cleared board of the requested size.
    pub(crate) fn new(size: BoardSize) -> Self {
        let mut board = Self {
            graph: TileGraph::new(size),
            solver: PathSolver::default(),
            spawn_points: Vec::new(),
            towers: TowerRegistry::new(),
        };
        board.reset();
        board
    }

    pub(crate) fn graph(&self) -> &TileGraph {
        &self.graph
    }

    pub(crate) fn spawn_points(&self) -> &[TileCoord] {
        &self.spawn_points
    }

    pub(crate) fn towers(&self) -> &TowerRegistry {
        &self.towers
    }

    /// Replaces the graph with one of `size` and clears it.
    pub(crate) fn rebuild(&mut self, size: BoardSize, out_events: &mut Vec<Event>) {
        self.graph = TileGraph::new(size);
        self.clear(out_events);
    }

    /// Empties the board, then places one destination and one spawn point.
    pub(crate) fn clear(&mut self, out_events: &mut Vec<Event>) {
        for tower in self.towers.iter() {
            out_events.push(Event::TowerRemoved {
                tower: tower.id,
                tile: tower.tile,
            });
        }
        self.reset();
        out_events.push(Event::BoardReset {
            size: self.graph.size(),
        });
    }

    fn reset(&mut self) {
        for index in 0..self.graph.len() {
            self.graph.tile_mut(index).content = ContentKind::Empty;
        }
        self.towers.clear();

        let destination = self.graph.len() / 2;
        self.graph.tile_mut(destination).content = ContentKind::Destination;
        self.graph.tile_mut(0).content = ContentKind::SpawnPoint;
        self.spawn_points.clear();
        self.spawn_points.push(self.graph.tile(0).coord);

        self.solve_infallible();
    }

    pub(crate) fn toggle_wall(&mut self, tile: TileCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.locate(tile, ContentKind::Wall, out_events) else {
            return;
        };
        match self.graph.tile(index).content {
            ContentKind::Wall => {
                self.replace(index, ContentKind::Empty, out_events);
                self.solve_infallible();
            }
            ContentKind::Empty => {
                self.try_replace(index, ContentKind::Wall, out_events);
            }
            current => reject(tile, ContentKind::Wall, ContentError::Occupied { current }, out_events),
        }
    }

    pub(crate) fn toggle_destination(&mut self, tile: TileCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.locate(tile, ContentKind::Destination, out_events) else {
            return;
        };
        match self.graph.tile(index).content {
            ContentKind::Destination => {
                self.try_replace(index, ContentKind::Empty, out_events);
            }
            ContentKind::Empty => {
                self.replace(index, ContentKind::Destination, out_events);
                self.solve_infallible();
            }
            current => reject(
                tile,
                ContentKind::Destination,
                ContentError::Occupied { current },
                out_events,
            ),
        }
    }

    pub(crate) fn toggle_spawn_point(&mut self, tile: TileCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.locate(tile, ContentKind::SpawnPoint, out_events) else {
            return;
        };
        match self.graph.tile(index).content {
            ContentKind::SpawnPoint => {
                if self.spawn_points.len() <= 1 {
                    debug!(?tile, "refused to remove the last spawn point");
                    reject(tile, ContentKind::Empty, ContentError::LastSpawnPoint, out_events);
                    return;
                }
                self.spawn_points.retain(|spawn| *spawn != tile);
                self.replace(index, ContentKind::Empty, out_events);
            }
            ContentKind::Empty => {
                self.spawn_points.push(tile);
                self.replace(index, ContentKind::SpawnPoint, out_events);
            }
            current => reject(
                tile,
                ContentKind::SpawnPoint,
                ContentError::Occupied { current },
                out_events,
            ),
        }
    }

    /// Places, replaces or removes a tower of `kind` on `tile`.
    ///
    /// Walls and towers already block paths, so converting between them skips
    /// the solver.
    pub(crate) fn toggle_tower(
        &mut self,
        tile: TileCoord,
        kind: TowerKind,
        out_events: &mut Vec<Event>,
    ) {
        let requested = ContentKind::Tower(kind);
        let Some(index) = self.locate(tile, requested, out_events) else {
            return;
        };
        match self.graph.tile(index).content {
            ContentKind::Tower(current) if current == kind => {
                self.remove_tower(tile, out_events);
                self.replace(index, ContentKind::Empty, out_events);
                self.solve_infallible();
            }
            ContentKind::Tower(_) => {
                self.remove_tower(tile, out_events);
                self.replace(index, requested, out_events);
                self.place_tower(index, kind, out_events);
            }
            ContentKind::Wall => {
                self.replace(index, requested, out_events);
                self.place_tower(index, kind, out_events);
            }
            ContentKind::Empty => {
                self.try_replace(index, requested, out_events);
                if self.graph.tile(index).content == requested {
                    self.place_tower(index, kind, out_events);
                }
            }
            current => reject(tile, requested, ContentError::Occupied { current }, out_events),
        }
    }

    fn locate(
        &self,
        tile: TileCoord,
        requested: ContentKind,
        out_events: &mut Vec<Event>,
    ) -> Option<usize> {
        let index = self.graph.index_of(tile);
        if index.is_none() {
            reject(tile, requested, ContentError::OutOfBounds, out_events);
        }
        index
    }

    fn replace(&mut self, index: usize, content: ContentKind, out_events: &mut Vec<Event>) {
        let tile = self.graph.tile_mut(index);
        let previous = tile.content;
        tile.content = content;
        out_events.push(Event::ContentChanged {
            tile: tile.coord,
            previous,
            current: content,
        });
    }

    /// Changes content and re-solves, undoing the change when the solve fails.
    ///
    /// Either outcome is reported through `out_events`; callers that need to
    /// know which one happened read the tile content back.
    fn try_replace(&mut self, index: usize, content: ContentKind, out_events: &mut Vec<Event>) {
        let previous = self.graph.tile(index).content;
        self.graph.tile_mut(index).content = content;

        match self.solver.solve(&mut self.graph) {
            Ok(()) => {
                let tile = self.graph.tile(index).coord;
                out_events.push(Event::ContentChanged {
                    tile,
                    previous,
                    current: content,
                });
            }
            Err(error) => {
                self.graph.tile_mut(index).content = previous;
                self.solve_infallible();

                let tile = self.graph.tile(index).coord;
                debug!(?tile, ?content, %error, "rolled back board mutation");
                let reason = ContentError::from(error);
                reject(tile, content, reason, out_events);
            }
        }
    }

    fn place_tower(&mut self, index: usize, kind: TowerKind, out_events: &mut Vec<Event>) {
        let tile = self.graph.tile(index);
        let (coord, center) = (tile.coord, tile.center);
        let tower = self.towers.insert(kind, coord, center);
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            tile: coord,
        });
    }

    fn remove_tower(&mut self, tile: TileCoord, out_events: &mut Vec<Event>) {
        if let Some(state) = self.towers.remove_at(tile) {
            out_events.push(Event::TowerRemoved {
                tower: state.id,
                tile,
            });
        }
    }

    /// Re-solves after an edit that cannot break connectivity.
    fn solve_infallible(&mut self) {
        let solved = self.solver.solve(&mut self.graph);
        debug_assert!(solved.is_ok(), "board left unsolvable: {solved:?}");
    }
}

fn reject(
    tile: TileCoord,
    requested: ContentKind,
    reason: ContentError,
    out_events: &mut Vec<Event>,
) {
    out_events.push(Event::ContentRejected {
        tile,
        requested,
        reason,
    });
}
