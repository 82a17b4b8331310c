//! Direction field solver used by the board after every content change.

use std::collections::VecDeque;

use grid_defense_core::{ContentKind, Direction};

use crate::graph::TileGraph;

/// Expansion order for tiles flagged as alternative.
const ALTERNATIVE_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

/// Expansion order for all remaining tiles.
const STANDARD_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
];

/// Reasons the solver could not produce a usable direction field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum SolveError {
    #[error("board has no destination tile")]
    NoDestination,
    #[error("{unreached} tiles cannot reach any destination")]
    Disconnected { unreached: usize },
}

/// Multi-source breadth-first search seeded from every destination tile.
///
/// The frontier buffer is kept between solves so repeated board edits do not
/// reallocate. Tiles are visited at most once, so the first visit records the
/// shortest hop count. Walls and towers receive path fields when they border a
/// reached tile but are never expanded through.
#[derive(Debug, Default)]
pub(crate) struct PathSolver {
    frontier: VecDeque<usize>,
}

impl PathSolver {
    /// Rewrites the direction field of `graph`.
    ///
    /// On failure the graph's path fields are partial and must not be used for
    /// movement until the triggering edit is undone and the graph re-solved.
    pub(crate) fn solve(&mut self, graph: &mut TileGraph) -> Result<(), SolveError> {
        self.frontier.clear();

        for index in 0..graph.len() {
            let tile = graph.tile_mut(index);
            if tile.content == ContentKind::Destination {
                tile.become_destination();
                self.frontier.push_back(index);
            } else {
                tile.clear_path();
            }
        }

        if self.frontier.is_empty() {
            return Err(SolveError::NoDestination);
        }

        while let Some(index) = self.frontier.pop_front() {
            let tile = graph.tile(index);
            let distance = tile.distance;
            let order = if tile.alternative {
                ALTERNATIVE_ORDER
            } else {
                STANDARD_ORDER
            };

            for direction in order {
                let Some(neighbor) = graph.neighbor(index, direction) else {
                    continue;
                };
                if let Some(expanded) = grow_path(graph, index, neighbor, direction, distance) {
                    self.frontier.push_back(expanded);
                }
            }
        }

        let unreached = graph.tiles().iter().filter(|tile| !tile.has_path()).count();
        if unreached > 0 {
            return Err(SolveError::Disconnected { unreached });
        }

        Ok(())
    }
}

/// Links `to` back toward `from`, returning it when it may be expanded further.
fn grow_path(
    graph: &mut TileGraph,
    from: usize,
    to: usize,
    travel: Direction,
    distance: u32,
) -> Option<usize> {
    let tile = graph.tile_mut(to);
    if tile.has_path() {
        return None;
    }

    let heading = travel.opposite();
    tile.distance = distance + 1;
    tile.next_on_path = Some(from);
    tile.path_direction = Some(heading);
    tile.exit_point = tile.center + heading.half_vector();

    (!tile.content.blocks_path()).then_some(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_defense_core::{BoardSize, TileCoord};

    fn graph_with(size: (u32, u32), content: &[((u32, u32), ContentKind)]) -> TileGraph {
        let mut graph = TileGraph::new(BoardSize::new(size.0, size.1));
        for &((column, row), kind) in content {
            let index = graph
                .index_of(TileCoord::new(column, row))
                .expect("tile on board");
            graph.tile_mut(index).content = kind;
        }
        graph
    }

    fn tile_at(graph: &TileGraph, column: u32, row: u32) -> &crate::graph::Tile {
        let index = graph
            .index_of(TileCoord::new(column, row))
            .expect("tile on board");
        graph.tile(index)
    }

    #[test]
    fn centre_destination_yields_manhattan_distances() {
        let mut graph = graph_with((5, 5), &[((2, 2), ContentKind::Destination)]);
        assert_eq!(PathSolver::default().solve(&mut graph), Ok(()));

        let centre = TileCoord::new(2, 2);
        for tile in graph.tiles() {
            assert_eq!(tile.distance, tile.coord.manhattan_distance(centre));
            if let Some(next) = tile.next_on_path {
                let next = graph.tile(next);
                assert_eq!(next.distance + 1, tile.distance);
                let direction = tile.path_direction.expect("direction on path");
                assert_eq!(tile.coord.step(direction), Some(next.coord));
            }
        }
    }

    #[test]
    fn destination_exit_point_is_its_centre() {
        let mut graph = graph_with((3, 3), &[((1, 1), ContentKind::Destination)]);
        assert_eq!(PathSolver::default().solve(&mut graph), Ok(()));

        let destination = tile_at(&graph, 1, 1);
        assert_eq!(destination.exit_point, destination.center);
        assert_eq!(destination.path_direction, None);

        let south = tile_at(&graph, 1, 0);
        assert_eq!(south.path_direction, Some(Direction::North));
        assert_eq!(south.exit_point, south.center + Direction::North.half_vector());
    }

    #[test]
    fn expansion_order_alternates_on_the_checkerboard() {
        // (1,0) is alternative and expands north first, so (1,1) enters the
        // frontier ahead of the bottom corners. (1,1) is a standard tile and
        // claims both top corners before the bottom corners get a turn.
        let mut graph = graph_with((3, 2), &[((1, 0), ContentKind::Destination)]);
        assert_eq!(PathSolver::default().solve(&mut graph), Ok(()));

        assert_eq!(tile_at(&graph, 1, 1).path_direction, Some(Direction::South));
        assert_eq!(tile_at(&graph, 0, 0).path_direction, Some(Direction::East));
        assert_eq!(tile_at(&graph, 2, 0).path_direction, Some(Direction::West));
        assert_eq!(tile_at(&graph, 0, 1).distance, 2);
        assert_eq!(tile_at(&graph, 2, 1).distance, 2);
        assert_eq!(tile_at(&graph, 0, 1).path_direction, Some(Direction::East));
        assert_eq!(tile_at(&graph, 2, 1).path_direction, Some(Direction::West));
    }

    #[test]
    fn walls_receive_paths_but_are_not_expanded() {
        let mut graph = graph_with(
            (3, 3),
            &[
                ((0, 0), ContentKind::Destination),
                ((1, 0), ContentKind::Wall),
            ],
        );
        assert_eq!(PathSolver::default().solve(&mut graph), Ok(()));

        let wall = tile_at(&graph, 1, 0);
        assert_eq!(wall.distance, 1);
        assert_eq!(wall.path_direction, Some(Direction::West));
        assert_eq!(tile_at(&graph, 2, 0).distance, 4);
    }

    #[test]
    fn missing_destination_fails() {
        let mut graph = graph_with((3, 3), &[]);
        assert_eq!(
            PathSolver::default().solve(&mut graph),
            Err(SolveError::NoDestination)
        );
    }

    #[test]
    fn enclosed_tiles_fail_as_disconnected() {
        let mut graph = graph_with(
            (3, 3),
            &[
                ((0, 0), ContentKind::Destination),
                ((0, 1), ContentKind::Wall),
                ((1, 1), ContentKind::Wall),
                ((1, 0), ContentKind::Wall),
                ((2, 1), ContentKind::Wall),
            ],
        );
        // (2,0) is walled in by (1,0) and (2,1); the top row is cut off by the
        // middle walls.
        assert_eq!(
            PathSolver::default().solve(&mut graph),
            Err(SolveError::Disconnected { unreached: 6 })
        );
    }
}
