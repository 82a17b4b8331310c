#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Defense.
//!
//! The world owns the board with its path field, the enemies walking it and
//! the shells in flight. All mutation goes through [`apply`]; read access goes
//! through the [`query`] module.

mod arena;
mod board;
mod enemies;
mod graph;
mod navigation;
mod shells;
mod spatial;
mod towers;

use grid_defense_core::{BoardSize, Command, EnemyId, Event, ShellId};
use tracing::{debug, trace};

use crate::{
    arena::Arena,
    board::Board,
    enemies::{Advance, Enemy},
    shells::{Flight, Shell},
};

pub use spatial::EnemyTargetIndex;

const DEFAULT_BOARD_COLUMNS: u32 = 11;
const DEFAULT_BOARD_ROWS: u32 = 11;

/// Represents the authoritative Grid Defense world state.
#[derive(Debug)]
pub struct World {
    board: Board,
    enemies: Arena<EnemyId, Enemy>,
    shells: Arena<ShellId, Shell>,
    tick_index: u64,
}

impl World {
    /// Creates a world with a cleared board of the default size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(BoardSize::new(DEFAULT_BOARD_COLUMNS, DEFAULT_BOARD_ROWS))
    }

    /// Creates a world with a cleared board of the provided size.
    #[must_use]
    pub fn with_size(size: BoardSize) -> Self {
        Self {
            board: Board::new(size),
            enemies: Arena::default(),
            shells: Arena::default(),
            tick_index: 0,
        }
    }

    fn reset_entities(&mut self) {
        self.enemies.clear();
        self.shells.clear();
    }

    fn advance_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let graph = self.board.graph();
        self.enemies.retain(|enemy, state| match state.advance(graph, dt) {
            Advance::Moving => true,
            Advance::Reclaimed(cause) => {
                trace!(?enemy, ?cause, "reclaimed enemy");
                out_events.push(Event::EnemyReclaimed { enemy, cause });
                false
            }
        });
    }

    fn advance_shells(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        self.shells.retain(|shell, state| match state.advance(dt) {
            Flight::Airborne => true,
            Flight::Detonated => {
                let launch = state.launch();
                trace!(?shell, position = ?launch.target_point, "shell detonated");
                out_events.push(Event::ShellDetonated {
                    shell,
                    position: launch.target_point,
                    blast_radius: launch.blast_radius,
                    damage: launch.damage,
                });
                false
            }
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard { columns, rows } => {
            world.reset_entities();
            world.board.rebuild(BoardSize::new(columns, rows), out_events);
        }
        Command::ClearBoard => {
            world.reset_entities();
            world.board.clear(out_events);
        }
        Command::ToggleWall { tile } => world.board.toggle_wall(tile, out_events),
        Command::ToggleDestination { tile } => world.board.toggle_destination(tile, out_events),
        Command::ToggleSpawnPoint { tile } => world.board.toggle_spawn_point(tile, out_events),
        Command::ToggleTower { tile, kind } => world.board.toggle_tower(tile, kind, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            let seconds = dt.as_secs_f32();
            world.advance_enemies(seconds, out_events);
            world.advance_shells(seconds, out_events);
        }
        Command::SpawnEnemy {
            spawn_point,
            profile,
        } => {
            let graph = world.board.graph();
            let spawned = world
                .board
                .spawn_points()
                .get(spawn_point)
                .and_then(|&tile| graph.index_of(tile))
                .and_then(|index| {
                    let enemy = Enemy::spawn(graph, index, profile)?;
                    Some((graph.tile(index).coord, enemy))
                });

            match spawned {
                Some((tile, enemy)) => {
                    let enemy = world.enemies.insert(enemy);
                    out_events.push(Event::EnemySpawned { enemy, tile });
                }
                None => {
                    debug!(spawn_point, "refused enemy spawn");
                    out_events.push(Event::SpawnRejected { spawn_point });
                }
            }
        }
        Command::DamageEnemy { enemy, amount } => {
            if let Some(state) = world.enemies.get_mut(enemy) {
                state.apply_damage(amount);
            }
        }
        Command::LaunchShell { tower, launch } => {
            let shell = world.shells.insert(Shell::new(launch));
            out_events.push(Event::ShellLaunched { shell, tower });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec3;
    use grid_defense_core::{
        BoardSize, EnemyId, EnemySnapshot, EnemyView, ShellSnapshot, TileCoord, TileSnapshot,
        TowerView,
    };

    use super::{EnemyTargetIndex, World};

    /// Dimensions of the board.
    #[must_use]
    pub fn board_size(world: &World) -> BoardSize {
        world.board.graph().size()
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the state of a single tile.
    #[must_use]
    pub fn tile(world: &World, coord: TileCoord) -> Option<TileSnapshot> {
        let graph = world.board.graph();
        graph.index_of(coord).map(|index| graph.snapshot(index))
    }

    /// Captures every tile in row-major order.
    #[must_use]
    pub fn tiles(world: &World) -> Vec<TileSnapshot> {
        let graph = world.board.graph();
        (0..graph.len()).map(|index| graph.snapshot(index)).collect()
    }

    /// Spawn points in the order they were added.
    #[must_use]
    pub fn spawn_points(world: &World) -> &[TileCoord] {
        world.board.spawn_points()
    }

    /// Tile containing the world-space point, ignoring height.
    #[must_use]
    pub fn tile_at_position(world: &World, position: Vec3) -> Option<TileCoord> {
        world.board.graph().tile_at_position(position)
    }

    /// Follows the path field from `start` to the destination it drains into.
    ///
    /// The returned tiles include both ends. Off-board coordinates yield an
    /// empty path.
    #[must_use]
    pub fn path_from(world: &World, start: TileCoord) -> Vec<TileCoord> {
        let graph = world.board.graph();
        let mut path = Vec::new();
        let mut current = graph.index_of(start);
        while let Some(index) = current {
            let tile = graph.tile(index);
            path.push(tile.coord);
            if path.len() > graph.len() {
                break;
            }
            current = tile.next_on_path;
        }
        path
    }

    /// Captures a read-only view of the towers placed on the board.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.board.towers().iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of the enemies on the board.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let graph = world.board.graph();
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|(id, enemy)| enemy.snapshot(id, graph))
                .collect(),
        )
    }

    /// Captures a single enemy, if the handle is still live.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<EnemySnapshot> {
        world
            .enemies
            .get(id)
            .map(|enemy| enemy.snapshot(id, world.board.graph()))
    }

    /// Number of live enemies.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures every shell in flight, ordered by handle.
    #[must_use]
    pub fn shell_snapshots(world: &World) -> Vec<ShellSnapshot> {
        let mut snapshots: Vec<ShellSnapshot> = world
            .shells
            .iter()
            .map(|(id, shell)| shell.snapshot(id))
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Number of shells in flight.
    #[must_use]
    pub fn shell_count(world: &World) -> usize {
        world.shells.len()
    }

    /// Builds a spatial index over the current enemy target points.
    #[must_use]
    pub fn target_index(world: &World) -> EnemyTargetIndex {
        EnemyTargetIndex::from_points(
            world
                .enemies
                .iter()
                .map(|(id, enemy)| enemy.target_point(id))
                .collect(),
        )
    }
}
