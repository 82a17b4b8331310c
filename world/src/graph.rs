//! Fixed-topology tile graph that stores tile content and path linkage.

use glam::Vec3;
use grid_defense_core::{BoardSize, ContentKind, Direction, TileCoord, TileSnapshot};

/// Distance marker for tiles the path solver has not reached.
pub(crate) const UNVISITED: u32 = u32::MAX;

/// Single grid cell with its neighbour links, content and path state.
///
/// Neighbour links are indices into the owning [`TileGraph`] and never change
/// after construction. Path fields are only meaningful after a successful
/// solve.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tile {
    pub(crate) coord: TileCoord,
    pub(crate) center: Vec3,
    neighbors: [Option<usize>; 4],
    /// Checkerboard parity that flips the solver's neighbour expansion order.
    pub(crate) alternative: bool,
    pub(crate) content: ContentKind,
    pub(crate) distance: u32,
    pub(crate) path_direction: Option<Direction>,
    pub(crate) next_on_path: Option<usize>,
    pub(crate) exit_point: Vec3,
}

impl Tile {
    fn new(coord: TileCoord, center: Vec3) -> Self {
        let alternative = (coord.column() & 1 == 0) != (coord.row() & 1 == 0);
        Self {
            coord,
            center,
            neighbors: [None; 4],
            alternative,
            content: ContentKind::Empty,
            distance: UNVISITED,
            path_direction: None,
            next_on_path: None,
            exit_point: center,
        }
    }

    pub(crate) fn has_path(&self) -> bool {
        self.distance != UNVISITED
    }

    pub(crate) fn clear_path(&mut self) {
        self.distance = UNVISITED;
        self.path_direction = None;
        self.next_on_path = None;
        self.exit_point = self.center;
    }

    pub(crate) fn become_destination(&mut self) {
        self.distance = 0;
        self.path_direction = None;
        self.next_on_path = None;
        self.exit_point = self.center;
    }

    fn neighbor(&self, direction: Direction) -> Option<usize> {
        self.neighbors[slot(direction)]
    }
}

fn slot(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

/// Row-major rectangular array of tiles centred on the world origin.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TileGraph {
    size: BoardSize,
    tiles: Vec<Tile>,
}

impl TileGraph {
    /// Builds the graph and links every tile with its orthogonal neighbours.
    pub(crate) fn new(size: BoardSize) -> Self {
        let offset_x = (size.columns() as f32 - 1.0) * 0.5;
        let offset_z = (size.rows() as f32 - 1.0) * 0.5;

        let mut tiles = Vec::with_capacity(size.tile_count());
        for row in 0..size.rows() {
            for column in 0..size.columns() {
                let center = Vec3::new(column as f32 - offset_x, 0.0, row as f32 - offset_z);
                tiles.push(Tile::new(TileCoord::new(column, row), center));
            }
        }

        let mut graph = Self { size, tiles };
        for index in 0..graph.tiles.len() {
            let coord = graph.tiles[index].coord;
            for direction in Direction::ALL {
                let neighbor = coord
                    .step(direction)
                    .and_then(|neighbor| graph.index_of(neighbor));
                graph.tiles[index].neighbors[slot(direction)] = neighbor;
            }
        }
        graph
    }

    pub(crate) fn size(&self) -> BoardSize {
        self.size
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    pub(crate) fn tile_mut(&mut self, index: usize) -> &mut Tile {
        &mut self.tiles[index]
    }

    pub(crate) fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        self.tiles.get(index)?.neighbor(direction)
    }

    pub(crate) fn index_of(&self, coord: TileCoord) -> Option<usize> {
        if !self.size.contains(coord) {
            return None;
        }
        let row = usize::try_from(coord.row()).ok()?;
        let column = usize::try_from(coord.column()).ok()?;
        let width = usize::try_from(self.size.columns()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Tile containing the world-space point, ignoring height.
    pub(crate) fn tile_at_position(&self, position: Vec3) -> Option<TileCoord> {
        let x = (position.x + self.size.columns() as f32 * 0.5).floor();
        let z = (position.z + self.size.rows() as f32 * 0.5).floor();
        if x < 0.0 || z < 0.0 {
            return None;
        }
        let coord = TileCoord::new(x as u32, z as u32);
        self.size.contains(coord).then_some(coord)
    }

    pub(crate) fn snapshot(&self, index: usize) -> TileSnapshot {
        let tile = &self.tiles[index];
        TileSnapshot {
            coord: tile.coord,
            content: tile.content,
            distance: tile.has_path().then_some(tile.distance),
            path_direction: tile.path_direction,
            next_on_path: tile.next_on_path.map(|next| self.tiles[next].coord),
            exit_point: tile.exit_point,
            center: tile.center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_are_centred_on_the_origin() {
        let graph = TileGraph::new(BoardSize::new(3, 2));
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.tile(0).center, Vec3::new(-1.0, 0.0, -0.5));
        assert_eq!(graph.tile(5).center, Vec3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn neighbours_are_linked_orthogonally() {
        let graph = TileGraph::new(BoardSize::new(3, 3));
        let center = graph.index_of(TileCoord::new(1, 1)).expect("centre tile");
        assert_eq!(graph.neighbor(center, Direction::North), Some(7));
        assert_eq!(graph.neighbor(center, Direction::East), Some(5));
        assert_eq!(graph.neighbor(center, Direction::South), Some(1));
        assert_eq!(graph.neighbor(center, Direction::West), Some(3));
        assert_eq!(graph.neighbor(0, Direction::South), None);
        assert_eq!(graph.neighbor(0, Direction::West), None);
        assert_eq!(graph.neighbor(8, Direction::North), None);
        assert_eq!(graph.neighbor(8, Direction::East), None);
    }

    #[test]
    fn alternative_flag_forms_a_checkerboard() {
        let graph = TileGraph::new(BoardSize::new(4, 4));
        for tile in graph.tiles() {
            let expected = (tile.coord.column() + tile.coord.row()) % 2 == 1;
            assert_eq!(tile.alternative, expected, "{:?}", tile.coord);
        }
    }

    #[test]
    fn tile_at_position_maps_world_points_to_tiles() {
        let graph = TileGraph::new(BoardSize::new(4, 3));
        assert_eq!(
            graph.tile_at_position(Vec3::new(-1.9, 0.0, -1.4)),
            Some(TileCoord::new(0, 0))
        );
        assert_eq!(
            graph.tile_at_position(Vec3::new(0.2, 3.0, 0.1)),
            Some(TileCoord::new(2, 1))
        );
        assert_eq!(graph.tile_at_position(Vec3::new(-2.1, 0.0, 0.0)), None);
        assert_eq!(graph.tile_at_position(Vec3::new(0.0, 0.0, 1.6)), None);
    }
}
