//! Enemy kinematics along the board's path field.
//!
//! Each enemy walks a sequence of segments. A segment either moves an anchor
//! point in a straight line or swings the heading around a pivot while the
//! anchor stays put. The rendered position is the anchor plus the lane offset
//! rotated by the heading.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use grid_defense_core::{
    rotation_from_angle, Direction, DirectionChange, EnemyId, EnemyProfile, EnemySnapshot,
    ReclaimCause, TargetPoint,
};

use crate::graph::TileGraph;

const HEALTH_PER_SCALE: f32 = 100.0;
const TARGET_HEIGHT_PER_SCALE: f32 = 0.25;
const TARGET_RADIUS_PER_SCALE: f32 = 0.125;
const MIN_TURN_AROUND_RADIUS: f32 = 0.2;

/// Segment of the walk currently being interpolated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Segment {
    /// Spawn tile centre to its exit point.
    Entering,
    /// Previous exit point to the current tile's exit point.
    Traversing(DirectionChange),
    /// Last exit point to the destination centre.
    Exiting,
}

/// Outcome of advancing an enemy by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    Moving,
    Reclaimed(ReclaimCause),
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    profile: EnemyProfile,
    health: f32,
    tile_from: usize,
    tile_to: Option<usize>,
    position_from: Vec3,
    position_to: Vec3,
    progress: f32,
    progress_factor: f32,
    direction: Direction,
    segment: Segment,
    angle_from: f32,
    angle_to: f32,
    anchor: Vec3,
    heading: f32,
    model_offset: f32,
}

impl Enemy {
    /// Places a new enemy on `tile`, or `None` when the tile leads nowhere.
    pub(crate) fn spawn(graph: &TileGraph, tile: usize, profile: EnemyProfile) -> Option<Self> {
        debug_assert!(
            profile.lane_offset > -0.5 && profile.lane_offset < 0.5,
            "lane offset {} leaves the path",
            profile.lane_offset
        );

        let start = graph.tile(tile);
        let next = start.next_on_path?;
        let direction = start.path_direction?;

        let mut enemy = Self {
            profile,
            health: HEALTH_PER_SCALE * profile.scale,
            tile_from: tile,
            tile_to: Some(next),
            position_from: start.center,
            position_to: start.exit_point,
            progress: 0.0,
            progress_factor: 0.0,
            direction,
            segment: Segment::Entering,
            angle_from: 0.0,
            angle_to: 0.0,
            anchor: start.center,
            heading: 0.0,
            model_offset: 0.0,
        };
        enemy.prepare_intro(graph);
        Some(enemy)
    }

    pub(crate) fn apply_damage(&mut self, amount: f32) {
        debug_assert!(amount >= 0.0, "negative damage {amount}");
        self.health -= amount;
    }

    /// Integrates `dt` seconds of travel, carrying leftover progress across
    /// segment boundaries so the result does not depend on frame length.
    pub(crate) fn advance(&mut self, graph: &TileGraph, dt: f32) -> Advance {
        if self.health <= 0.0 {
            return Advance::Reclaimed(ReclaimCause::Killed);
        }

        self.progress += dt * self.progress_factor;
        while self.progress >= 1.0 {
            let Some(arrived) = self.tile_to else {
                return Advance::Reclaimed(ReclaimCause::ReachedDestination);
            };
            self.progress = (self.progress - 1.0) / self.progress_factor;
            self.prepare_next_state(graph, arrived);
            self.progress *= self.progress_factor;
        }

        self.interpolate();
        Advance::Moving
    }

    fn interpolate(&mut self) {
        if self.is_turning() {
            self.heading = self.angle_from + (self.angle_to - self.angle_from) * self.progress;
        } else {
            self.anchor = self.position_from.lerp(self.position_to, self.progress);
        }
    }

    pub(crate) fn position(&self) -> Vec3 {
        self.anchor + rotation_from_angle(self.heading) * Vec3::new(self.model_offset, 0.0, 0.0)
    }

    pub(crate) fn target_point(&self, id: EnemyId) -> TargetPoint {
        TargetPoint {
            enemy: id,
            position: self.position() + Vec3::Y * (TARGET_HEIGHT_PER_SCALE * self.profile.scale),
            radius: TARGET_RADIUS_PER_SCALE * self.profile.scale,
        }
    }

    pub(crate) fn snapshot(&self, id: EnemyId, graph: &TileGraph) -> EnemySnapshot {
        EnemySnapshot {
            id,
            position: self.position(),
            heading: self.heading,
            scale: self.profile.scale,
            health: self.health,
            tile: graph.tile(self.tile_from).coord,
        }
    }

    fn is_turning(&self) -> bool {
        matches!(self.segment, Segment::Traversing(change) if change != DirectionChange::None)
    }

    fn prepare_intro(&mut self, graph: &TileGraph) {
        let tile = graph.tile(self.tile_from);
        self.position_from = tile.center;
        self.position_to = tile.exit_point;
        self.segment = Segment::Entering;
        self.angle_from = self.direction.angle();
        self.angle_to = self.angle_from;
        self.heading = self.angle_to;
        self.model_offset = self.profile.lane_offset;
        self.progress_factor = 2.0 * self.profile.speed;
    }

    fn prepare_outro(&mut self, graph: &TileGraph) {
        self.position_to = graph.tile(self.tile_from).center;
        self.segment = Segment::Exiting;
        self.angle_to = self.direction.angle();
        self.heading = self.angle_to;
        self.model_offset = self.profile.lane_offset;
        self.progress_factor = 2.0 * self.profile.speed;
    }

    fn prepare_next_state(&mut self, graph: &TileGraph, arrived: usize) {
        let tile = graph.tile(arrived);
        self.tile_from = arrived;
        self.tile_to = tile.next_on_path;
        self.position_from = self.position_to;

        let (Some(_), Some(next_direction)) = (tile.next_on_path, tile.path_direction) else {
            self.prepare_outro(graph);
            return;
        };

        self.position_to = tile.exit_point;
        let change = self.direction.change_to(next_direction);
        self.direction = next_direction;
        self.angle_from = self.angle_to;
        self.segment = Segment::Traversing(change);

        match change {
            DirectionChange::None => self.prepare_forward(),
            DirectionChange::TurnRight => self.prepare_turn_right(),
            DirectionChange::TurnLeft => self.prepare_turn_left(),
            DirectionChange::TurnAround => self.prepare_turn_around(),
        }
    }

    fn prepare_forward(&mut self) {
        self.angle_to = self.direction.angle();
        self.heading = self.angle_to;
        self.model_offset = self.profile.lane_offset;
        self.progress_factor = self.profile.speed;
    }

    fn prepare_turn_right(&mut self) {
        let lane = self.profile.lane_offset;
        self.angle_to = self.angle_from + 90.0;
        self.model_offset = lane - 0.5;
        self.anchor = self.position_from + self.direction.half_vector();
        self.progress_factor = self.profile.speed / (FRAC_PI_2 * (0.5 - lane));
    }

    fn prepare_turn_left(&mut self) {
        let lane = self.profile.lane_offset;
        self.angle_to = self.angle_from - 90.0;
        self.model_offset = lane + 0.5;
        self.anchor = self.position_from + self.direction.half_vector();
        self.progress_factor = self.profile.speed / (FRAC_PI_2 * (0.5 + lane));
    }

    fn prepare_turn_around(&mut self) {
        let lane = self.profile.lane_offset;
        self.angle_to = self.angle_from + if lane < 0.0 { 180.0 } else { -180.0 };
        self.model_offset = lane;
        self.anchor = self.position_from;
        self.progress_factor = self.profile.speed / (PI * lane.abs().max(MIN_TURN_AROUND_RADIUS));
    }
}
