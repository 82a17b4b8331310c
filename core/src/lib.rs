#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Defense simulation.
//!
//! Board edits, spawns, damage and frame ticks travel to the world as
//! [`Command`] values; the world answers with [`Event`] values describing
//! content changes, reclaimed enemies and shell detonations. Enemies and
//! shells are addressed by slot map handles ([`EnemyId`], [`ShellId`]) that go
//! stale once the entity is reclaimed, while tiles are addressed by
//! [`TileCoord`] on a board of [`BoardSize`].
//!
//! Targeting queries go through [`SpatialIndex`], so towers can be driven by
//! any structure that answers capsule overlaps, including plain test doubles.

mod direction;

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

pub use direction::{rotation_from_angle, Direction, DirectionChange};

/// Smallest number of tile columns or rows a board may be configured with.
pub const MIN_BOARD_EXTENT: u32 = 2;

/// Gravitational acceleration applied to shells, in world units per second squared.
pub const GRAVITY: f32 = 9.81;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the board with the provided dimensions and resets its content.
    ConfigureBoard {
        /// Number of tile columns laid out on the board.
        columns: u32,
        /// Number of tile rows laid out on the board.
        rows: u32,
    },
    /// Resets every tile to its default content while keeping the dimensions.
    ClearBoard,
    /// Places a wall on an empty tile or removes an existing wall.
    ToggleWall {
        /// Tile targeted by the request.
        tile: TileCoord,
    },
    /// Places a destination on an empty tile or removes an existing one.
    ToggleDestination {
        /// Tile targeted by the request.
        tile: TileCoord,
    },
    /// Places a spawn point on an empty tile or removes an existing one.
    ToggleSpawnPoint {
        /// Tile targeted by the request.
        tile: TileCoord,
    },
    /// Places, replaces or removes a tower.
    ///
    /// A tower of the same kind is removed, a tower of another kind is
    /// replaced, and empty tiles or walls receive the tower.
    ToggleTower {
        /// Tile targeted by the request.
        tile: TileCoord,
        /// Kind of tower requested.
        kind: TowerKind,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests a new enemy on one of the board's spawn points.
    SpawnEnemy {
        /// Index into the board's spawn point list.
        spawn_point: usize,
        /// Physical parameters assigned to the enemy.
        profile: EnemyProfile,
    },
    /// Subtracts health from an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Non-negative amount of health removed.
        amount: f32,
    },
    /// Launches a ballistic shell on behalf of a tower.
    LaunchShell {
        /// Tower that fired the shell.
        tower: TowerId,
        /// Initial conditions of the shell.
        launch: ShellLaunch,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the board was rebuilt or cleared.
    BoardReset {
        /// Dimensions of the board after the reset.
        size: BoardSize,
    },
    /// Confirms that a tile's content changed and paths were refreshed.
    ContentChanged {
        /// Tile whose content changed.
        tile: TileCoord,
        /// Content held before the change.
        previous: ContentKind,
        /// Content held after the change.
        current: ContentKind,
    },
    /// Reports that a content mutation was rejected and rolled back.
    ContentRejected {
        /// Tile targeted by the rejected request.
        tile: TileCoord,
        /// Content the request attempted to establish.
        requested: ContentKind,
        /// Specific reason the request failed.
        reason: ContentError,
    },
    /// Confirms that a tower was placed on the board.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Kind of tower that was placed.
        kind: TowerKind,
        /// Tile the tower occupies.
        tile: TileCoord,
    },
    /// Confirms that a tower was removed from the board.
    TowerRemoved {
        /// Identifier of the tower that was removed.
        tower: TowerId,
        /// Tile the tower occupied.
        tile: TileCoord,
    },
    /// Confirms that an enemy entered the board.
    EnemySpawned {
        /// Handle allocated to the enemy.
        enemy: EnemyId,
        /// Spawn tile the enemy starts on.
        tile: TileCoord,
    },
    /// Reports that a spawn request could not be honoured.
    SpawnRejected {
        /// Spawn point index provided in the request.
        spawn_point: usize,
    },
    /// Announces that an enemy left the simulation and its slot was freed.
    EnemyReclaimed {
        /// Handle of the reclaimed enemy, now stale.
        enemy: EnemyId,
        /// Reason the enemy was reclaimed.
        cause: ReclaimCause,
    },
    /// Confirms that a shell was launched.
    ShellLaunched {
        /// Handle allocated to the shell.
        shell: ShellId,
        /// Tower that fired the shell.
        tower: TowerId,
    },
    /// Announces that a shell reached the ground and exploded.
    ShellDetonated {
        /// Handle of the detonated shell, now stale.
        shell: ShellId,
        /// Ground point where the blast is centred.
        position: Vec3,
        /// Horizontal radius of the blast.
        blast_radius: f32,
        /// Damage applied to every enemy within the blast.
        damage: f32,
    },
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Neighbouring coordinate in the provided heading, if it stays non-negative.
    ///
    /// Upper bounds are not checked; callers compare against their board size.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<TileCoord> {
        let (dx, dy) = direction.grid_offset();
        let column = u32::try_from(i64::from(self.column) + dx).ok()?;
        let row = u32::try_from(i64::from(self.row) + dy).ok()?;
        Some(TileCoord::new(column, row))
    }
}

/// Dimensions of the board measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    columns: u32,
    rows: u32,
}

impl BoardSize {
    /// Creates a board size, clamping each extent to [`MIN_BOARD_EXTENT`].
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns: columns.max(MIN_BOARD_EXTENT),
            rows: rows.max(MIN_BOARD_EXTENT),
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of tiles on the board.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column() < self.columns && tile.row() < self.rows
    }
}

/// Types of towers that can be constructed on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Continuous-beam tower that damages a single tracked target.
    Laser,
    /// Artillery tower that lobs shells dealing area damage.
    Mortar,
}

/// Occupant of a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Nothing occupies the tile.
    #[default]
    Empty,
    /// Impassable obstacle.
    Wall,
    /// Tile where enemies enter the board.
    SpawnPoint,
    /// Tile enemies travel toward.
    Destination,
    /// Impassable tower of the provided kind.
    Tower(TowerKind),
}

impl ContentKind {
    /// Reports whether paths may not pass through the content.
    #[must_use]
    pub const fn blocks_path(self) -> bool {
        matches!(self, Self::Wall | Self::Tower(_))
    }
}

/// Reasons a content mutation may be rejected by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum ContentError {
    /// The requested coordinate lies outside the board.
    #[error("tile lies outside the board")]
    OutOfBounds,
    /// The tile's current content does not allow the requested operation.
    #[error("tile already holds {current:?}")]
    Occupied {
        /// Content found on the tile.
        current: ContentKind,
    },
    /// The change would leave at least one tile without a path to a destination.
    #[error("change would cut tiles off from every destination")]
    Disconnected,
    /// The change would remove the last destination.
    #[error("board requires at least one destination")]
    NoDestination,
    /// The change would remove the last spawn point.
    #[error("board requires at least one spawn point")]
    LastSpawnPoint,
}

/// Reason an enemy was removed from the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReclaimCause {
    /// Health dropped to zero or below.
    Killed,
    /// The enemy walked off the board through a destination.
    ReachedDestination,
}

new_key_type! {
    /// Arena handle addressing an enemy.
    ///
    /// Handles carry the slot version, so a handle kept past its enemy's
    /// reclamation never aliases a newer enemy reusing the slot.
    pub struct EnemyId;

    /// Arena handle addressing a shell in flight.
    pub struct ShellId;
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Physical parameters of a newly spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    /// Uniform model scale; also scales health and bounding radius.
    pub scale: f32,
    /// Travel speed in tiles per second along straight segments.
    pub speed: f32,
    /// Lateral offset from the path centreline, within (-0.5, 0.5).
    pub lane_offset: f32,
}

impl Default for EnemyProfile {
    fn default() -> Self {
        Self {
            scale: 1.0,
            speed: 1.0,
            lane_offset: 0.0,
        }
    }
}

/// Initial conditions of a ballistic shell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShellLaunch {
    /// World position the shell leaves from.
    pub launch_point: Vec3,
    /// Ground point the shell was aimed at and explodes on.
    pub target_point: Vec3,
    /// Initial velocity in world units per second.
    pub velocity: Vec3,
    /// Horizontal radius of the blast.
    pub blast_radius: f32,
    /// Damage applied to every enemy within the blast.
    pub damage: f32,
}

/// Immutable representation of a single tile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Coordinate of the tile.
    pub coord: TileCoord,
    /// Content occupying the tile.
    pub content: ContentKind,
    /// Hop count to the nearest destination, if the tile was reached.
    pub distance: Option<u32>,
    /// Heading toward the next tile on the path, absent for destinations.
    pub path_direction: Option<Direction>,
    /// Next tile on the path, absent for destinations and unreached tiles.
    pub next_on_path: Option<TileCoord>,
    /// World-space point where the path leaves the tile.
    pub exit_point: Vec3,
    /// World-space centre of the tile.
    pub center: Vec3,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Arena handle of the enemy.
    pub id: EnemyId,
    /// World position of the enemy model.
    pub position: Vec3,
    /// Heading angle in degrees, clockwise from North.
    pub heading: f32,
    /// Uniform model scale.
    pub scale: f32,
    /// Remaining health.
    pub health: f32,
    /// Tile the current segment started on.
    pub tile: TileCoord,
}

/// Read-only snapshot describing all enemies on the board.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Tile the tower occupies.
    pub tile: TileCoord,
    /// World-space centre of the tower's tile at ground level.
    pub position: Vec3,
}

/// Read-only snapshot describing all towers placed on the board.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a tower by identifier.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a shell in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShellSnapshot {
    /// Arena handle of the shell.
    pub id: ShellId,
    /// Current world position.
    pub position: Vec3,
    /// Current velocity, used to orient the shell model.
    pub velocity: Vec3,
    /// Seconds elapsed since launch.
    pub age: f32,
}

/// Targetable point attached to an enemy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TargetPoint {
    /// Enemy owning the point.
    pub enemy: EnemyId,
    /// World position of the point.
    pub position: Vec3,
    /// Radius of the bounding sphere around the point.
    pub radius: f32,
}

/// Vertical capsule used for radius queries on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    /// Centre of the bottom cap.
    pub bottom: Vec3,
    /// Centre of the top cap.
    pub top: Vec3,
    /// Radius around the segment joining `bottom` and `top`.
    pub radius: f32,
}

impl Capsule {
    /// Height of the capsules produced by [`Capsule::upright`].
    pub const UPRIGHT_HEIGHT: f32 = 3.0;

    /// Capsule standing on `base` that approximates a ground-plane circle.
    #[must_use]
    pub fn upright(base: Vec3, radius: f32) -> Self {
        Self {
            bottom: base,
            top: base + Vec3::Y * Self::UPRIGHT_HEIGHT,
            radius,
        }
    }

    /// Reports whether a sphere touches the capsule.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let axis = self.top - self.bottom;
        let length_sq = axis.length_squared();
        let t = if length_sq <= f32::EPSILON {
            0.0
        } else {
            ((center - self.bottom).dot(axis) / length_sq).clamp(0.0, 1.0)
        };
        let closest = self.bottom + axis * t;
        let reach = self.radius + radius;
        closest.distance_squared(center) <= reach * reach
    }
}

/// Squared distance between two points ignoring the vertical axis.
#[must_use]
pub fn horizontal_distance_squared(a: Vec3, b: Vec3) -> f32 {
    let x = a.x - b.x;
    let z = a.z - b.z;
    x * x + z * z
}

/// Read-only spatial lookup over targetable enemy points.
///
/// The world provides a brute-force implementation; any structure that answers
/// the same queries may be substituted.
pub trait SpatialIndex {
    /// Writes the points whose bounding sphere touches `capsule` into `out`.
    ///
    /// At most `out.len()` points are written and the number written is
    /// returned, so a full buffer means "at least this many".
    fn overlap_capsule(&self, capsule: &Capsule, out: &mut [TargetPoint]) -> usize;

    /// Resolves the current target point of an enemy, if it still exists.
    fn target_point(&self, enemy: EnemyId) -> Option<TargetPoint>;

    /// Finds the point closest to `position` on the ground plane within `radius`.
    ///
    /// Every overlapping point is considered; the scratch buffer doubles until
    /// the overlap query no longer fills it. Ties resolve toward the smaller
    /// enemy handle.
    fn nearest_within_radius(&self, position: Vec3, radius: f32) -> Option<TargetPoint> {
        let capsule = Capsule::upright(position, radius);
        let mut buffer = vec![TargetPoint::default(); 64];
        loop {
            let count = self.overlap_capsule(&capsule, &mut buffer);
            if count < buffer.len() {
                buffer.truncate(count);
                break;
            }
            let grown = buffer.len() * 2;
            buffer.resize(grown, TargetPoint::default());
        }
        buffer.into_iter().min_by(|a, b| {
            let da = horizontal_distance_squared(a.position, position);
            let db = horizontal_distance_squared(b.position, position);
            da.total_cmp(&db).then_with(|| a.enemy.cmp(&b.enemy))
        })
    }
}
