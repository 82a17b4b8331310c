//! Frame pump that wires the world to the spawning and tower combat systems.

use std::{fmt, time::Duration};

use grid_defense_core::{Command, Event, ReclaimCause};
use grid_defense_system_spawning::Spawning;
use grid_defense_system_tower_combat::TowerCombat;
use grid_defense_world::{self as world, query, World};
use tracing::warn;

use crate::config::SimulationConfig;

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct RunStats {
    pub(crate) frames: u64,
    pub(crate) spawned: u64,
    pub(crate) killed: u64,
    pub(crate) escaped: u64,
    pub(crate) shells_launched: u64,
    pub(crate) shells_detonated: u64,
    pub(crate) damage_dealt: f32,
    pub(crate) rejected_edits: u64,
    pub(crate) rejected_spawns: u64,
}

impl RunStats {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EnemySpawned { .. } => self.spawned += 1,
            Event::EnemyReclaimed { cause, .. } => match cause {
                ReclaimCause::Killed => self.killed += 1,
                ReclaimCause::ReachedDestination => self.escaped += 1,
            },
            Event::ShellLaunched { .. } => self.shells_launched += 1,
            Event::ShellDetonated { .. } => self.shells_detonated += 1,
            Event::ContentRejected {
                tile,
                requested,
                reason,
            } => {
                warn!(?tile, ?requested, %reason, "board edit rejected");
                self.rejected_edits += 1;
            }
            Event::SpawnRejected { .. } => self.rejected_spawns += 1,
            _ => {}
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames:           {}", self.frames)?;
        writeln!(f, "enemies spawned:  {}", self.spawned)?;
        writeln!(f, "enemies killed:   {}", self.killed)?;
        writeln!(f, "enemies escaped:  {}", self.escaped)?;
        writeln!(f, "shells launched:  {}", self.shells_launched)?;
        writeln!(f, "shells detonated: {}", self.shells_detonated)?;
        writeln!(f, "damage dealt:     {:.1}", self.damage_dealt)?;
        writeln!(f, "rejected edits:   {}", self.rejected_edits)?;
        write!(f, "rejected spawns:  {}", self.rejected_spawns)
    }
}

/// Headless simulation driven one frame at a time.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    spawning: Spawning,
    combat: TowerCombat,
    events: Vec<Event>,
    commands: Vec<Command>,
    stats: RunStats,
}

impl Simulation {
    /// Builds the scenario's board and the systems that act on it.
    pub(crate) fn new(config: &SimulationConfig) -> Self {
        let mut simulation = Self {
            world: World::new(),
            spawning: Spawning::new(config.spawning.system_config()),
            combat: TowerCombat::new(config.combat.system_config()),
            events: Vec::new(),
            commands: Vec::new(),
            stats: RunStats::default(),
        };
        for command in config.setup_commands() {
            simulation.apply(command);
        }
        simulation
    }

    /// Advances the world by `dt` and lets every system react to the frame.
    ///
    /// Systems react to the tick after it was applied, so enemies spawned and
    /// shells launched during a frame first move on the following frame.
    pub(crate) fn step(&mut self, dt: Duration) {
        self.apply(Command::Tick { dt });

        let ticked = std::mem::take(&mut self.events);
        self.spawning.handle(
            &ticked,
            query::spawn_points(&self.world).len(),
            &mut self.commands,
        );
        self.combat.handle(
            &ticked,
            &query::tower_view(&self.world),
            &query::target_index(&self.world),
            &mut self.commands,
        );
        self.events = ticked;

        for command in std::mem::take(&mut self.commands) {
            if let Command::DamageEnemy { amount, .. } = command {
                self.stats.damage_dealt += amount;
            }
            self.apply(command);
        }
        self.stats.frames += 1;
    }

    /// Counters accumulated so far.
    pub(crate) fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Number of enemies currently on the board.
    pub(crate) fn enemies_alive(&self) -> usize {
        query::enemy_count(&self.world)
    }

    fn apply(&mut self, command: Command) {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        for event in &self.events {
            self.stats.record(event);
        }
    }
}
