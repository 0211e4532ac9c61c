//! Per-frame level update
//!
//! Order matters and is fixed:
//! 1. Carry the frog on its log (off-screen is lethal)
//! 2. Advance the animation in flight, or start a hop from input
//! 3. Capture a free exit the frog is sitting in
//! 4. Check for the win (vacuous when the level has no exits)
//! 5. Advance cars and logs
//! 6. Car collision
//! 7. Drowning
//!
//! Move and capture decisions use last frame's hazard layout since hazards
//! only advance in step 5.

use super::frog::{AnimationEnd, Heading};
use super::state::{DeathCause, GameEvent, Level};
use crate::consts::GRID_SIZE;

/// Directions held this frame, already debounced by the shell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl TickInput {
    /// Input with a single direction pressed
    pub fn press(heading: Heading) -> Self {
        let mut input = Self::default();
        match heading {
            Heading::North => input.up = true,
            Heading::South => input.down = true,
            Heading::West => input.left = true,
            Heading::East => input.right = true,
        }
        input
    }

    /// The one direction to act on: up, then down, then left, then right
    pub fn direction(&self) -> Option<Heading> {
        if self.up {
            Some(Heading::North)
        } else if self.down {
            Some(Heading::South)
        } else if self.left {
            Some(Heading::West)
        } else if self.right {
            Some(Heading::East)
        } else {
            None
        }
    }
}

impl Level {
    /// Advance the level by `dt` seconds
    pub fn update(&mut self, input: &TickInput, dt: f32) {
        tick(self, input, dt);
    }
}

/// Advance the level by one frame
///
/// Negative or non-finite `dt` counts as zero: nothing moves and no
/// animation progresses.
pub fn tick(level: &mut Level, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    ride_log(level, dt);
    animate_or_move(level, input, dt);
    capture_goal(level);
    check_win(level);

    let width = level.width;
    for lane in &mut level.lanes {
        lane.advance(dt, width);
    }

    check_road(level);
    check_water(level);
}

fn ride_log(level: &mut Level, dt: f32) {
    let Some(frog) = level.frog.as_ref() else {
        return;
    };
    if frog.is_animating() {
        return;
    }
    let Some(speed) = level
        .lane_at(frog.pos())
        .filter(|lane| lane.safe(frog))
        .and_then(|lane| lane.speed())
    else {
        return;
    };

    let width = level.pixel_size().x;
    let Some(frog) = level.frog.as_mut() else {
        return;
    };
    frog.shift_x(speed * dt);
    let x = frog.pos().x;
    if x <= 0.0 || x >= width {
        level.kill(DeathCause::SweptOffscreen);
    }
}

fn animate_or_move(level: &mut Level, input: &TickInput, dt: f32) {
    let timing = level.timing;
    let Some(frog) = level.frog.as_mut() else {
        return;
    };

    if frog.is_animating() {
        if frog.animate(dt, &timing) == Some(AnimationEnd::Died) {
            level.finish_death();
        }
        return;
    }

    if let Some(heading) = input.direction() {
        try_hop(level, heading);
    }
}

/// Turn the frog toward `heading` and hop if the target cell allows it
///
/// The heading changes even when the hop is refused.
fn try_hop(level: &mut Level, heading: Heading) -> bool {
    let Some(frog) = level.frog.as_mut() else {
        return false;
    };
    frog.set_heading(heading);
    let target = frog.pos() + heading.offset().as_vec2() * GRID_SIZE;

    let size = level.pixel_size();
    let in_grid = target.x >= 0.0 && target.x < size.x && target.y >= 0.0 && target.y < size.y;
    if !in_grid {
        log::trace!("Hop {heading:?} refused: off the grid");
        return false;
    }

    // Hedge tiles are walls except for openings, and for free exits entered
    // from below
    let (allowed, into_exit) = match level.lane_at(target) {
        Some(lane) if lane.is_hedge() => {
            let into_exit = heading == Heading::North
                && lane.contains_exit_at(target)
                && !lane.blocked_at(target);
            (lane.opening_at(target) || into_exit, into_exit)
        }
        _ => (true, false),
    };
    if !allowed {
        log::trace!("Hop {heading:?} refused: hedge");
        return false;
    }

    let hopped = level.frog.as_mut().is_some_and(|frog| frog.hop(heading));
    if hopped {
        level.events.push(GameEvent::Hopped { heading, into_exit });
    }
    hopped
}

fn capture_goal(level: &mut Level) {
    let Some(frog) = level.frog.as_ref() else {
        return;
    };
    if frog.is_animating() {
        return;
    }
    let Some(index) = level.lane_index_at(frog.pos()) else {
        return;
    };
    let lane = &mut level.lanes[index];
    if !lane.contains_exit(frog) || lane.blocked(frog) {
        return;
    }
    let Some(slot) = lane.capture(frog) else {
        return;
    };

    level.frog = None;
    level.events.push(GameEvent::GoalCaptured { lane: index, slot });
    log::info!("Goal captured: lane {index}, slot {slot}");
}

fn check_win(level: &mut Level) {
    if level.won {
        return;
    }
    let all_taken = level
        .lanes
        .iter()
        .filter(|lane| lane.is_hedge())
        .all(|lane| lane.all_captured());
    if all_taken {
        level.won = true;
        level.events.push(GameEvent::LevelWon);
        log::info!("All goals captured");
    }
}

fn check_road(level: &mut Level) {
    let Some(frog) = level.frog.as_ref() else {
        return;
    };
    if frog.is_dying() {
        return;
    }
    if level.lane_at(frog.pos()).is_some_and(|lane| lane.squash(frog)) {
        level.kill(DeathCause::Squashed);
    }
}

fn check_water(level: &mut Level) {
    let Some(frog) = level.frog.as_ref() else {
        return;
    };
    if frog.is_animating() {
        return;
    }
    let drowned = level
        .lane_at(frog.pos())
        .is_some_and(|lane| lane.is_water() && !lane.safe(frog));
    if drowned {
        level.kill(DeathCause::Drowned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FROG_LIVES, OPENING_KIND};
    use crate::sim::frog::{Animation, Frog};
    use crate::sim::geom::Aabb;
    use crate::sim::lane::{Exits, Lane, LaneKind, Traffic};
    use crate::sim::obstacle::Obstacle;
    use crate::sim::state::FrogSprite;
    use glam::{IVec2, Vec2};

    const DT: f32 = 1.0 / 60.0;

    fn sprite() -> FrogSprite {
        FrogSprite {
            size: Vec2::splat(GRID_SIZE),
            hitboxes: vec![Aabb::from_center(Vec2::ZERO, Vec2::splat(48.0))],
        }
    }

    fn obstacle(kind: &str, grid_x: f32, row: u32, width_cells: f32, speed: Option<f32>) -> Obstacle {
        let size = Vec2::new(width_cells * GRID_SIZE, GRID_SIZE);
        Obstacle::new(
            kind,
            grid_x,
            (row as f32 + 0.5) * GRID_SIZE,
            size,
            Aabb::from_center(Vec2::ZERO, size),
            speed,
        )
    }

    fn road(row: u32, width: u32, speed: f32, cars: &[f32]) -> Lane {
        let traffic = Traffic { speed, buffer: 1.0 };
        let cars = cars
            .iter()
            .map(|&x| obstacle("car1", x, row, 1.0, Some(speed)))
            .collect();
        Lane::new(LaneKind::Road(traffic), row, width, cars)
    }

    fn water(row: u32, width: u32, speed: f32, logs: &[(f32, f32)]) -> Lane {
        let traffic = Traffic { speed, buffer: 1.0 };
        let logs = logs
            .iter()
            .map(|&(x, len)| obstacle("log", x, row, len, Some(speed)))
            .collect();
        Lane::new(LaneKind::Water(traffic), row, width, logs)
    }

    fn hedge(row: u32, width: u32, slots: &[(&str, f32)]) -> Lane {
        let slots = slots
            .iter()
            .map(|&(kind, x)| obstacle(kind, x, row, 1.0, None))
            .collect();
        Lane::new(LaneKind::Hedge(Exits::default()), row, width, slots)
    }

    fn grass(row: u32, width: u32) -> Lane {
        Lane::new(LaneKind::Grass, row, width, Vec::new())
    }

    fn frog(level: &Level) -> &Frog {
        level.frog().expect("frog present")
    }

    /// Press `heading` for one frame, then idle until the hop lands
    fn hop(level: &mut Level, heading: Heading) {
        level.update(&TickInput::press(heading), DT);
        for _ in 0..120 {
            match level.frog().and_then(Frog::animation) {
                Some(Animation::Hop(_)) => level.update(&TickInput::default(), DT),
                _ => break,
            }
        }
    }

    #[test]
    fn test_input_priority() {
        let all = TickInput {
            up: true,
            down: true,
            left: true,
            right: true,
        };
        assert_eq!(all.direction(), Some(Heading::North));
        let lr = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(lr.direction(), Some(Heading::West));
        assert_eq!(TickInput::default().direction(), None);
    }

    #[test]
    fn test_blocked_move_still_reorients() {
        let lanes = vec![grass(0, 5), grass(1, 5)];
        let mut level = Level::new(5, 2, IVec2::new(0, 1), lanes, sprite());

        level.update(&TickInput::press(Heading::West), DT);
        assert_eq!(frog(&level).heading(), Heading::West);
        assert!(!frog(&level).is_animating());

        level.update(&TickInput::press(Heading::North), DT);
        assert_eq!(frog(&level).heading(), Heading::North);
        assert!(!frog(&level).is_animating());
        assert_eq!(frog(&level).pos(), Vec2::new(32.0, 96.0));
        assert!(level.events().is_empty());
    }

    #[test]
    fn test_input_ignored_while_hopping() {
        let lanes = vec![grass(0, 5), grass(1, 5), grass(2, 5)];
        let mut level = Level::new(5, 3, IVec2::new(2, 0), lanes, sprite());
        level.update(&TickInput::press(Heading::North), DT);
        level.update(&TickInput::press(Heading::East), DT);
        assert_eq!(frog(&level).heading(), Heading::North);
        assert_eq!(
            level.drain_events(),
            vec![GameEvent::Hopped {
                heading: Heading::North,
                into_exit: false,
            }]
        );
    }

    #[test]
    fn test_hop_into_car_costs_one_life() {
        let lanes = vec![grass(0, 7), road(1, 7, 0.0, &[3.0]), grass(2, 7)];
        let mut level = Level::new(7, 3, IVec2::new(3, 0), lanes, sprite());
        assert_eq!(level.lives(), 3);

        level.update(&TickInput::press(Heading::North), DT);
        for _ in 0..120 {
            if !level.actor_present() {
                break;
            }
            level.update(&TickInput::default(), DT);
        }

        assert!(!level.actor_present());
        assert_eq!(level.lives(), 2);
        assert!(!level.lives_exhausted());
        let events = level.drain_events();
        let deaths = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Died { .. }))
            .count();
        assert_eq!(deaths, 1);
        assert!(events.contains(&GameEvent::Died {
            cause: DeathCause::Squashed
        }));
        assert!(events.contains(&GameEvent::LifeLost { remaining: 2 }));
    }

    #[test]
    fn test_moving_car_wraps_in_level() {
        // 7 wide, buffer 1, car at cell 3 moving right at 120 px/s
        let lanes = vec![grass(0, 7), road(1, 7, 120.0, &[3.0])];
        let mut level = Level::new(7, 2, IVec2::new(0, 0), lanes, sprite());
        level.update(&TickInput::default(), 2.0);
        let car = level.lanes()[1].obstacles()[0].pos().x;
        assert_eq!(car, 3.5 * 64.0 + 240.0);

        // 464 + 120 = 584, 72 past the right bound of 512
        level.update(&TickInput::default(), 1.0);
        let car = level.lanes()[1].obstacles()[0].pos().x;
        assert!((car - (-64.0 + 72.0)).abs() < 1e-3);
    }

    #[test]
    fn test_hop_into_open_water_drowns() {
        let lanes = vec![grass(0, 5), water(1, 5, 0.0, &[(0.0, 1.0)])];
        let mut level = Level::new(5, 2, IVec2::new(3, 0), lanes, sprite());
        hop(&mut level, Heading::North);
        assert!(frog(&level).is_dying());
        assert!(level.events().contains(&GameEvent::Died {
            cause: DeathCause::Drowned
        }));
    }

    #[test]
    fn test_log_carries_frog() {
        let lanes = vec![grass(0, 7), water(1, 7, 60.0, &[(1.0, 3.0)])];
        let mut level = Level::new(7, 2, IVec2::new(2, 1), lanes, sprite());
        level.update(&TickInput::default(), 0.5);
        assert!((frog(&level).pos().x - (160.0 + 30.0)).abs() < 1e-3);
        assert!(!frog(&level).is_dying());
    }

    #[test]
    fn test_log_edge_fall_is_lethal() {
        // Log under the last column, carrying right
        let lanes = vec![grass(0, 7), water(1, 7, 100.0, &[(6.0, 1.0)])];
        let mut level = Level::new(7, 2, IVec2::new(6, 1), lanes, sprite());

        // 416 + 50 = 466, past the 448px window
        level.update(&TickInput::default(), 0.5);
        assert!(frog(&level).is_dying());
        assert_eq!(
            level.events(),
            &[GameEvent::Died {
                cause: DeathCause::SweptOffscreen
            }]
        );

        for _ in 0..60 {
            if !level.actor_present() {
                break;
            }
            level.update(&TickInput::default(), DT);
        }
        assert_eq!(level.lives(), FROG_LIVES - 1);
        let deaths = level
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Died { .. }))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_log_swept_off_left_edge_is_lethal() {
        // Log under the first column, carrying left
        let lanes = vec![grass(0, 7), water(1, 7, -100.0, &[(0.0, 1.0)])];
        let mut level = Level::new(7, 2, IVec2::new(0, 1), lanes, sprite());

        // 32 - 50 = -18, past the left edge
        level.update(&TickInput::default(), 0.5);
        assert!(frog(&level).is_dying());
        assert_eq!(
            level.events(),
            &[GameEvent::Died {
                cause: DeathCause::SweptOffscreen
            }]
        );

        for _ in 0..60 {
            if !level.actor_present() {
                break;
            }
            level.update(&TickInput::default(), DT);
        }
        assert!(!level.actor_present());
        assert_eq!(level.lives(), FROG_LIVES - 1);
        let deaths = level
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Died { .. }))
            .count();
        assert_eq!(deaths, 1);
        assert!(level.events().contains(&GameEvent::LifeLost {
            remaining: FROG_LIVES - 1
        }));
    }

    #[test]
    fn test_opening_is_passable_and_never_captured() {
        let lanes = vec![grass(0, 3), hedge(1, 3, &[("exit", 0.0), (OPENING_KIND, 2.0)])];
        let mut level = Level::new(3, 2, IVec2::new(2, 0), lanes, sprite());

        for _ in 0..3 {
            hop(&mut level, Heading::North);
            assert!(level.actor_present());
            assert_eq!(frog(&level).pos(), Vec2::new(160.0, 96.0));
            hop(&mut level, Heading::South);
            assert_eq!(frog(&level).pos(), Vec2::new(160.0, 32.0));
        }
        assert!(level.lanes()[1].captured().is_empty());
        assert!(!level.all_goals_captured());

        // Plain hedge at column 1 is a wall
        hop(&mut level, Heading::West);
        hop(&mut level, Heading::North);
        assert_eq!(frog(&level).pos(), Vec2::new(96.0, 32.0));
        assert_eq!(frog(&level).heading(), Heading::North);

        hop(&mut level, Heading::West);
        hop(&mut level, Heading::North);
        assert!(!level.actor_present());
        assert_eq!(level.lives(), FROG_LIVES);
        assert!(level.all_goals_captured());
        let events = level.drain_events();
        assert!(events.contains(&GameEvent::GoalCaptured { lane: 1, slot: 0 }));
        assert!(events.contains(&GameEvent::LevelWon));
    }

    #[test]
    fn test_captured_exit_blocks_reentry() {
        let lanes = vec![grass(0, 3), hedge(1, 3, &[("exit", 0.0), ("exit", 2.0)])];
        let mut level = Level::new(3, 2, IVec2::new(0, 0), lanes, sprite());

        hop(&mut level, Heading::North);
        assert!(!level.actor_present());
        assert!(!level.all_goals_captured());

        assert!(level.respawn());
        hop(&mut level, Heading::North);
        assert!(level.actor_present());
        assert_eq!(frog(&level).pos(), Vec2::new(32.0, 32.0));
        assert_eq!(level.lanes()[1].captured(), &[0]);
    }

    #[test]
    fn test_exit_not_entered_sideways() {
        let lanes = vec![
            grass(0, 3),
            hedge(1, 3, &[("exit", 0.0), (OPENING_KIND, 1.0)]),
        ];
        let mut level = Level::new(3, 2, IVec2::new(1, 0), lanes, sprite());
        hop(&mut level, Heading::North);
        assert_eq!(frog(&level).pos(), Vec2::new(96.0, 96.0));

        hop(&mut level, Heading::West);
        assert_eq!(frog(&level).pos(), Vec2::new(96.0, 96.0));
        assert_eq!(frog(&level).heading(), Heading::West);
    }

    #[test]
    fn test_one_capture_per_update() {
        let lanes = vec![grass(0, 3), hedge(1, 3, &[("exit", 1.0), ("exit", 1.0)])];
        let mut level = Level::new(3, 2, IVec2::new(1, 0), lanes, sprite());
        hop(&mut level, Heading::North);

        let captures: Vec<_> = level
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GoalCaptured { .. }))
            .collect();
        assert_eq!(captures, vec![GameEvent::GoalCaptured { lane: 1, slot: 0 }]);
        assert!(!level.all_goals_captured());
    }

    #[test]
    fn test_level_without_exits_is_won_at_once() {
        let no_hedge = vec![grass(0, 3)];
        let mut level = Level::new(3, 1, IVec2::new(1, 0), no_hedge, sprite());
        level.update(&TickInput::default(), DT);
        assert!(level.all_goals_captured());
        assert_eq!(level.drain_events(), vec![GameEvent::LevelWon]);

        let openings_only = vec![grass(0, 3), hedge(1, 3, &[(OPENING_KIND, 1.0)])];
        let mut level = Level::new(3, 2, IVec2::new(1, 0), openings_only, sprite());
        level.update(&TickInput::default(), DT);
        assert!(level.all_goals_captured());
    }

    #[test]
    fn test_win_waits_for_every_hedge() {
        let lanes = vec![
            grass(0, 3),
            hedge(1, 3, &[(OPENING_KIND, 1.0)]),
            hedge(2, 3, &[("exit", 1.0)]),
        ];
        let mut level = Level::new(3, 3, IVec2::new(1, 0), lanes, sprite());
        level.update(&TickInput::default(), DT);
        assert!(!level.all_goals_captured());

        hop(&mut level, Heading::North);
        hop(&mut level, Heading::North);
        assert!(!level.actor_present());
        assert!(level.all_goals_captured());
    }

    #[test]
    fn test_hop_into_free_exit_is_flagged() {
        let lanes = vec![grass(0, 3), hedge(1, 3, &[("exit", 1.0)])];
        let mut level = Level::new(3, 2, IVec2::new(1, 0), lanes, sprite());
        hop(&mut level, Heading::East);
        hop(&mut level, Heading::West);
        hop(&mut level, Heading::North);

        let hops: Vec<_> = level
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Hopped { into_exit, .. } => Some(into_exit),
                _ => None,
            })
            .collect();
        assert_eq!(hops, [false, false, true]);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let lanes = vec![grass(0, 5), road(1, 5, 100.0, &[0.0])];
        let mut level = Level::new(5, 2, IVec2::new(2, 0), lanes, sprite());
        level.update(&TickInput::default(), -1.0);
        level.update(&TickInput::default(), f32::NAN);
        assert_eq!(level.lanes()[1].obstacles()[0].pos().x, 32.0);
    }

    #[test]
    fn test_lives_run_out() {
        let lanes = vec![grass(0, 3), water(1, 3, 0.0, &[])];
        let mut level = Level::new(3, 2, IVec2::new(1, 0), lanes, sprite()).with_lives(2);
        for remaining in [1, 0] {
            hop(&mut level, Heading::North);
            for _ in 0..60 {
                if !level.actor_present() {
                    break;
                }
                level.update(&TickInput::default(), DT);
            }
            assert_eq!(level.lives(), remaining);
            level.respawn();
        }
        assert!(level.lives_exhausted());
        assert!(!level.actor_present());
    }
}
