use grid_defense_core::{
    BoardSize, Command, ContentError, ContentKind, Event, TileCoord, TileSnapshot, TowerId,
    TowerKind,
};
use grid_defense_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn apply_all(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn assert_paths_drain_into_destinations(world: &World) {
    let tiles = query::tiles(world);
    for tile in &tiles {
        assert!(tile.distance.is_some(), "{:?} has no path", tile.coord);
        if tile.content.blocks_path() {
            continue;
        }

        let path = query::path_from(world, tile.coord);
        assert!(
            path.len() <= tiles.len(),
            "path from {:?} does not terminate",
            tile.coord
        );
        let end = path.last().copied().expect("path includes its start");
        let end = query::tile(world, end).expect("path stays on the board");
        assert_eq!(end.content, ContentKind::Destination);
        assert_eq!(path.len() - 1, tile.distance.unwrap_or_default() as usize);
    }
}

#[test]
fn centre_destination_gives_manhattan_distances() {
    let world = World::with_size(BoardSize::new(5, 5));
    let centre = TileCoord::new(2, 2);

    assert_eq!(query::spawn_points(&world), &[TileCoord::new(0, 0)]);
    for tile in query::tiles(&world) {
        assert_eq!(tile.distance, Some(tile.coord.manhattan_distance(centre)));
    }
}

#[test]
fn sealing_the_destination_is_rejected_and_rolled_back() {
    let mut world = World::with_size(BoardSize::new(5, 5));
    let walls = [
        TileCoord::new(1, 2),
        TileCoord::new(3, 2),
        TileCoord::new(2, 3),
    ];
    let events = apply_all(
        &mut world,
        walls.map(|tile| Command::ToggleWall { tile }),
    );
    assert_eq!(events.len(), 3);
    assert_paths_drain_into_destinations(&world);

    let before: Vec<TileSnapshot> = query::tiles(&world);
    let last = TileCoord::new(2, 1);
    let events = apply_all(&mut world, [Command::ToggleWall { tile: last }]);

    assert_eq!(
        events,
        vec![Event::ContentRejected {
            tile: last,
            requested: ContentKind::Wall,
            reason: ContentError::Disconnected,
        }]
    );
    assert_eq!(query::tiles(&world), before);
}

#[test]
fn removing_the_sole_spawn_point_is_a_no_op() {
    let mut world = World::with_size(BoardSize::new(4, 4));
    let before = query::tiles(&world);

    let events = apply_all(
        &mut world,
        [Command::ToggleSpawnPoint {
            tile: TileCoord::new(0, 0),
        }],
    );

    assert_eq!(
        events,
        vec![Event::ContentRejected {
            tile: TileCoord::new(0, 0),
            requested: ContentKind::Empty,
            reason: ContentError::LastSpawnPoint,
        }]
    );
    assert_eq!(query::tiles(&world), before);
    assert_eq!(query::spawn_points(&world), &[TileCoord::new(0, 0)]);
}

#[test]
fn towers_receive_increasing_identifiers() {
    let mut world = World::with_size(BoardSize::new(5, 5));
    let events = apply_all(
        &mut world,
        [
            Command::ToggleTower {
                tile: TileCoord::new(4, 4),
                kind: TowerKind::Laser,
            },
            Command::ToggleTower {
                tile: TileCoord::new(4, 0),
                kind: TowerKind::Mortar,
            },
        ],
    );

    let placed: Vec<TowerId> = events
        .iter()
        .filter_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(*tower),
            _ => None,
        })
        .collect();
    assert_eq!(placed, vec![TowerId::new(0), TowerId::new(1)]);

    let view = query::tower_view(&world);
    let mortar = view.get(TowerId::new(1)).expect("mortar placed");
    assert_eq!(mortar.kind, TowerKind::Mortar);
    assert_eq!(mortar.tile, TileCoord::new(4, 0));
    assert_eq!(mortar.position.x, 2.0);
    assert_eq!(mortar.position.z, -2.0);
}

#[test]
fn configure_board_resizes_and_resets() {
    let mut world = World::new();
    let events = apply_all(&mut world, [Command::ConfigureBoard { columns: 1, rows: 6 }]);

    let size = BoardSize::new(2, 6);
    assert_eq!(events, vec![Event::BoardReset { size }]);
    assert_eq!(query::board_size(&world), size);
    assert_paths_drain_into_destinations(&world);
}

#[test]
fn random_edit_sequences_keep_every_tile_routed() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_0f_b0a4d);
    let mut world = World::with_size(BoardSize::new(7, 6));

    for _ in 0..400 {
        let tile = TileCoord::new(rng.gen_range(0..8), rng.gen_range(0..7));
        let command = match rng.gen_range(0..5) {
            0 => Command::ToggleWall { tile },
            1 => Command::ToggleDestination { tile },
            2 => Command::ToggleSpawnPoint { tile },
            3 => Command::ToggleTower {
                tile,
                kind: TowerKind::Laser,
            },
            _ => Command::ToggleTower {
                tile,
                kind: TowerKind::Mortar,
            },
        };

        let before = query::tiles(&world);
        let events = apply_all(&mut world, [command.clone()]);
        let rejected = events
            .iter()
            .any(|event| matches!(event, Event::ContentRejected { .. }));
        if rejected {
            assert_eq!(query::tiles(&world), before, "{command:?} left traces");
        }

        assert_paths_drain_into_destinations(&world);
        assert!(!query::spawn_points(&world).is_empty());
        for &spawn in query::spawn_points(&world) {
            let tile = query::tile(&world, spawn).expect("spawn point on board");
            assert_eq!(tile.content, ContentKind::SpawnPoint);
        }
    }
}
