//! Scenario files describing a headless simulation run.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use grid_defense_core::{Command, TileCoord, TowerKind};
use grid_defense_system_spawning as spawning;
use grid_defense_system_tower_combat::{self as combat, LaserStats, MortarStats};
use grid_defense_system_tower_targeting::TargetPolicy;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a scenario file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read scenario file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file was read but is not a valid scenario.
    #[error("failed to parse scenario file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Complete scenario. Every section is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    pub(crate) board: BoardConfig,
    pub(crate) spawning: SpawningConfig,
    pub(crate) combat: CombatConfig,
    pub(crate) layout: Vec<LayoutEdit>,
}

impl SimulationConfig {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces both random seeds; combat uses the successor of `seed`.
    #[must_use]
    pub(crate) fn with_seed(mut self, seed: u64) -> Self {
        self.spawning.seed = seed;
        self.combat.seed = seed.wrapping_add(1);
        self
    }

    /// Commands that build the scenario's board from scratch.
    pub(crate) fn setup_commands(&self) -> impl Iterator<Item = Command> + '_ {
        std::iter::once(Command::ConfigureBoard {
            columns: self.board.columns,
            rows: self.board.rows,
        })
        .chain(self.layout.iter().map(LayoutEdit::command))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BoardConfig {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 11,
            rows: 11,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SpawningConfig {
    pub(crate) spawn_speed: f32,
    pub(crate) seed: u64,
    pub(crate) scale: [f32; 2],
    pub(crate) speed: [f32; 2],
    pub(crate) lane_offset: [f32; 2],
}

impl Default for SpawningConfig {
    fn default() -> Self {
        Self {
            spawn_speed: 1.0,
            seed: 0,
            scale: [0.5, 1.5],
            speed: [0.75, 1.25],
            lane_offset: [-0.25, 0.25],
        }
    }
}

impl SpawningConfig {
    pub(crate) fn system_config(&self) -> spawning::Config {
        let range = |[a, b]: [f32; 2]| spawning::FloatRange::new(a, b);
        spawning::Config::new(self.spawn_speed, self.seed)
            .with_scale(range(self.scale))
            .with_speed(range(self.speed))
            .with_lane_offset(range(self.lane_offset))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CombatConfig {
    pub(crate) policy: TargetPolicy,
    pub(crate) seed: u64,
    pub(crate) laser: LaserConfig,
    pub(crate) mortar: MortarConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            policy: TargetPolicy::default(),
            seed: 1,
            laser: LaserConfig::default(),
            mortar: MortarConfig::default(),
        }
    }
}

impl CombatConfig {
    pub(crate) fn system_config(&self) -> combat::Config {
        let laser = LaserStats::new(self.laser.range, self.laser.damage_per_second);
        let mortar = MortarStats::new(
            self.mortar.range,
            self.mortar.shots_per_second,
            self.mortar.blast_radius,
            self.mortar.damage,
        )
        .with_launch_height(self.mortar.launch_height);
        combat::Config::new(self.policy, self.seed)
            .with_laser(laser)
            .with_mortar(mortar)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LaserConfig {
    pub(crate) range: f32,
    pub(crate) damage_per_second: f32,
}

impl Default for LaserConfig {
    fn default() -> Self {
        let stats = LaserStats::default();
        Self {
            range: stats.range(),
            damage_per_second: stats.damage_per_second(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MortarConfig {
    pub(crate) range: f32,
    pub(crate) shots_per_second: f32,
    pub(crate) blast_radius: f32,
    pub(crate) damage: f32,
    pub(crate) launch_height: f32,
}

impl Default for MortarConfig {
    fn default() -> Self {
        let stats = MortarStats::default();
        Self {
            range: stats.range(),
            shots_per_second: stats.shots_per_second(),
            blast_radius: stats.blast_radius(),
            damage: stats.damage(),
            launch_height: stats.launch_height(),
        }
    }
}

/// Content toggled by a layout entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Toggle {
    Wall,
    Destination,
    SpawnPoint,
    Laser,
    Mortar,
}

/// Single `[[layout]]` entry, applied in file order after the board is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LayoutEdit {
    pub(crate) toggle: Toggle,
    pub(crate) tile: [u32; 2],
}

impl LayoutEdit {
    pub(crate) fn command(&self) -> Command {
        let [column, row] = self.tile;
        let tile = TileCoord::new(column, row);
        match self.toggle {
            Toggle::Wall => Command::ToggleWall { tile },
            Toggle::Destination => Command::ToggleDestination { tile },
            Toggle::SpawnPoint => Command::ToggleSpawnPoint { tile },
            Toggle::Laser => Command::ToggleTower {
                tile,
                kind: TowerKind::Laser,
            },
            Toggle::Mortar => Command::ToggleTower {
                tile,
                kind: TowerKind::Mortar,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: SimulationConfig = toml::from_str("").expect("empty scenario");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.board, BoardConfig { columns: 11, rows: 11 });
        assert_eq!(config.combat.policy, TargetPolicy::Random);
        assert!(config.layout.is_empty());
    }

    #[test]
    fn full_scenario_parses() {
        let config: SimulationConfig = toml::from_str(
            r#"
            [board]
            columns = 7
            rows = 5

            [spawning]
            spawn_speed = 2.5
            seed = 9
            lane_offset = [0.1, -0.1]

            [combat]
            policy = "nearest"

            [combat.mortar]
            damage = 40.0

            [[layout]]
            toggle = "wall"
            tile = [1, 2]

            [[layout]]
            toggle = "mortar"
            tile = [3, 3]
            "#,
        )
        .expect("valid scenario");

        assert_eq!(config.board, BoardConfig { columns: 7, rows: 5 });
        assert_eq!(config.spawning.spawn_speed, 2.5);
        assert_eq!(config.spawning.scale, [0.5, 1.5]);
        assert_eq!(config.combat.policy, TargetPolicy::Nearest);
        assert_eq!(config.combat.mortar.damage, 40.0);
        assert_eq!(config.combat.mortar.range, MortarStats::default().range());

        let commands: Vec<Command> = config.setup_commands().collect();
        assert_eq!(
            commands,
            vec![
                Command::ConfigureBoard { columns: 7, rows: 5 },
                Command::ToggleWall {
                    tile: TileCoord::new(1, 2),
                },
                Command::ToggleTower {
                    tile: TileCoord::new(3, 3),
                    kind: TowerKind::Mortar,
                },
            ]
        );
    }

    #[test]
    fn unknown_toggles_are_rejected() {
        let parsed = toml::from_str::<SimulationConfig>(
            r#"
            [[layout]]
            toggle = "moat"
            tile = [0, 0]
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_files_report_the_path() {
        let path = Path::new("does/not/exist.toml");
        let error = SimulationConfig::load(path).expect_err("missing file");
        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn seed_override_reaches_both_systems() {
        let config = SimulationConfig::default().with_seed(41);
        assert_eq!(config.spawning.seed, 41);
        assert_eq!(config.combat.seed, 42);
        assert_eq!(config.spawning.system_config(), spawning::Config::new(1.0, 41));
    }
}
