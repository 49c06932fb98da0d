#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler that paces waves off the simulation clock.
//!
//! The scheduler never mutates the world. It watches the event stream, keeps
//! its own timers against the injected tick timestamp, and answers with
//! generation-tagged `BeginWave`, `SpawnEnemy` and `CompleteWave` commands.
//! When a game ends every pending timer is dropped, and the world discards any
//! command carrying an outdated generation.

use std::time::Duration;

use log::trace;
use path_defence_core::{Command, Event, Generation, WaveBalance, WavePhase, WaveSnapshot};

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    first_wave_delay: Duration,
    inter_wave_delay: Duration,
}

impl Config {
    /// Creates a new configuration from explicit delays.
    #[must_use]
    pub const fn new(
        spawn_interval: Duration,
        first_wave_delay: Duration,
        inter_wave_delay: Duration,
    ) -> Self {
        Self {
            spawn_interval,
            first_wave_delay,
            inter_wave_delay,
        }
    }

    /// Derives the configuration from a wave balance table.
    #[must_use]
    pub const fn from_balance(balance: &WaveBalance) -> Self {
        Self::new(
            balance.spawn_interval(),
            balance.first_wave_delay(),
            balance.inter_wave_delay(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// No game is running.
    Dormant,
    /// Waiting for `ready_at` before opening the next wave.
    Idle { ready_at: Duration },
    /// `BeginWave` sent; waiting for the world to confirm.
    Starting,
    Spawning { next_spawn_at: Duration },
    Draining,
    /// `CompleteWave` sent; waiting for the world to confirm.
    Clearing,
}

/// Pure system that drives the `Idle → Spawning → Draining → Idle` cycle.
#[derive(Debug)]
pub struct WaveScheduler {
    config: Config,
    phase: Phase,
    generation: Option<Generation>,
    now: Duration,
}

impl WaveScheduler {
    /// Creates a dormant scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Dormant,
            generation: None,
            now: Duration::ZERO,
        }
    }

    /// Phase of the current wave as presented to observers.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        match self.phase {
            Phase::Dormant | Phase::Idle { .. } | Phase::Starting => WavePhase::Idle,
            Phase::Spawning { .. } => WavePhase::Spawning,
            Phase::Draining | Phase::Clearing => WavePhase::Draining,
        }
    }

    /// Consumes world events and emits wave-opening and spawn commands whose
    /// timers have elapsed. At most one spawn is emitted per call.
    pub fn handle(&mut self, events: &[Event], wave: &WaveSnapshot, out: &mut Vec<Command>) {
        for event in events {
            self.observe(event);
        }

        let Some(generation) = self.generation else {
            return;
        };

        match self.phase {
            Phase::Idle { ready_at } if self.now >= ready_at => {
                trace!("opening wave {} at {:?}", wave.number, self.now);
                self.phase = Phase::Starting;
                out.push(Command::BeginWave { generation });
            }
            Phase::Spawning { next_spawn_at }
                if self.now >= next_spawn_at
                    && wave.in_progress
                    && wave.enemies_spawned < wave.enemies_per_wave =>
            {
                self.phase = Phase::Spawning {
                    next_spawn_at: self.now + self.config.spawn_interval,
                };
                out.push(Command::SpawnEnemy { generation });
            }
            _ => {}
        }
    }

    /// Evaluates the wave-clear condition after combat has resolved.
    ///
    /// Spawning turns into draining once the whole wave has entered the path,
    /// and a drained wave with no live enemies is completed.
    pub fn evaluate_clear(&mut self, wave: &WaveSnapshot, out: &mut Vec<Command>) {
        let Some(generation) = self.generation else {
            return;
        };

        if matches!(self.phase, Phase::Spawning { .. }) && wave.spawning_complete() {
            trace!("wave {} fully spawned", wave.number);
            self.phase = Phase::Draining;
        }

        if self.phase == Phase::Draining && wave.live_enemies == 0 {
            self.phase = Phase::Clearing;
            out.push(Command::CompleteWave { generation });
        }
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::GameStarted { generation, at } => {
                self.generation = Some(*generation);
                self.now = *at;
                self.phase = Phase::Idle {
                    ready_at: *at + self.config.first_wave_delay,
                };
            }
            Event::GameEnded { .. } => {
                self.generation = None;
                self.phase = Phase::Dormant;
            }
            Event::TimeAdvanced { now, .. } => self.now = *now,
            Event::WaveStarted { at, .. } => {
                self.now = self.now.max(*at);
                self.phase = Phase::Spawning { next_spawn_at: *at };
            }
            Event::WaveCleared { at, .. } => {
                self.now = self.now.max(*at);
                self.phase = Phase::Idle {
                    ready_at: *at + self.config.inter_wave_delay,
                };
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            Duration::from_millis(500),
            Duration::from_secs(2),
            Duration::from_secs(3),
        )
    }

    fn wave(spawned: u32, per_wave: u32, in_progress: bool, live: u32) -> WaveSnapshot {
        WaveSnapshot {
            generation: Generation::new(1),
            number: 1,
            enemies_spawned: spawned,
            enemies_per_wave: per_wave,
            in_progress,
            live_enemies: live,
        }
    }

    fn started() -> WaveScheduler {
        let mut scheduler = WaveScheduler::new(config());
        let mut out = Vec::new();
        scheduler.handle(
            &[Event::GameStarted {
                generation: Generation::new(1),
                at: Duration::ZERO,
            }],
            &wave(0, 3, false, 0),
            &mut out,
        );
        assert!(out.is_empty());
        scheduler
    }

    fn tick(now: Duration) -> Event {
        Event::TimeAdvanced {
            now,
            dt: Duration::from_millis(16),
        }
    }

    #[test]
    fn dormant_scheduler_is_silent() {
        let mut scheduler = WaveScheduler::new(config());
        let mut out = Vec::new();
        scheduler.handle(&[tick(Duration::from_secs(60))], &wave(0, 3, false, 0), &mut out);
        scheduler.evaluate_clear(&wave(3, 3, true, 0), &mut out);
        assert!(out.is_empty());
        assert_eq!(scheduler.phase(), WavePhase::Idle);
    }

    #[test]
    fn first_wave_opens_after_delay() {
        let mut scheduler = started();
        let mut out = Vec::new();

        let idle = wave(0, 3, false, 0);
        scheduler.handle(&[tick(Duration::from_millis(1_999))], &idle, &mut out);
        assert!(out.is_empty());

        scheduler.handle(&[tick(Duration::from_secs(2))], &idle, &mut out);
        assert_eq!(
            out,
            vec![Command::BeginWave {
                generation: Generation::new(1),
            }]
        );

        out.clear();
        scheduler.handle(&[tick(Duration::from_secs(3))], &idle, &mut out);
        assert!(out.is_empty(), "no second BeginWave while starting");
    }

    #[test]
    fn spawns_follow_interval_one_per_call() {
        let mut scheduler = started();
        let mut out = Vec::new();
        let at = Duration::from_secs(2);

        scheduler.handle(
            &[Event::WaveStarted {
                wave: 1,
                enemies: 3,
                at,
            }],
            &wave(0, 3, true, 0),
            &mut out,
        );
        assert_eq!(scheduler.phase(), WavePhase::Spawning);
        assert_eq!(out.len(), 1, "first enemy spawns as the wave begins");

        out.clear();
        let spawning = wave(1, 3, true, 1);
        scheduler.handle(&[tick(at + Duration::from_millis(499))], &spawning, &mut out);
        assert!(out.is_empty());

        scheduler.handle(&[tick(at + Duration::from_secs(5))], &spawning, &mut out);
        assert_eq!(out.len(), 1, "catching up is limited to one spawn per call");
    }

    #[test]
    fn wave_clears_only_when_spawned_and_drained() {
        let mut scheduler = started();
        let mut out = Vec::new();
        scheduler.handle(
            &[Event::WaveStarted {
                wave: 1,
                enemies: 2,
                at: Duration::from_secs(2),
            }],
            &wave(0, 2, true, 0),
            &mut out,
        );
        out.clear();

        scheduler.evaluate_clear(&wave(1, 2, true, 0), &mut out);
        assert!(out.is_empty(), "spawning not complete");

        scheduler.evaluate_clear(&wave(2, 2, true, 1), &mut out);
        assert!(out.is_empty(), "enemies still live");
        assert_eq!(scheduler.phase(), WavePhase::Draining);

        scheduler.evaluate_clear(&wave(2, 2, true, 0), &mut out);
        assert_eq!(
            out,
            vec![Command::CompleteWave {
                generation: Generation::new(1),
            }]
        );
    }

    #[test]
    fn clear_schedules_next_wave_after_inter_wave_delay() {
        let mut scheduler = started();
        let mut out = Vec::new();
        let cleared_at = Duration::from_secs(20);

        scheduler.handle(
            &[Event::WaveCleared {
                wave: 1,
                bonus: 30,
                at: cleared_at,
            }],
            &wave(0, 5, false, 0),
            &mut out,
        );
        let idle = wave(0, 5, false, 0);
        scheduler.handle(&[tick(cleared_at + Duration::from_millis(2_999))], &idle, &mut out);
        assert!(out.is_empty());

        scheduler.handle(&[tick(cleared_at + Duration::from_secs(3))], &idle, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn game_end_cancels_pending_timers() {
        let mut scheduler = started();
        let mut out = Vec::new();
        scheduler.handle(
            &[
                Event::WaveStarted {
                    wave: 1,
                    enemies: 3,
                    at: Duration::from_secs(2),
                },
                Event::GameEnded {
                    generation: Generation::new(1),
                    outcome: path_defence_core::GameOutcome::Abandoned,
                },
            ],
            &wave(1, 3, true, 1),
            &mut out,
        );
        scheduler.handle(&[tick(Duration::from_secs(30))], &wave(1, 3, true, 1), &mut out);
        scheduler.evaluate_clear(&wave(3, 3, true, 0), &mut out);

        assert!(out.is_empty());
    }
}
