#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round-based combat driver for the Cavern Skirmish engine.
//!
//! The engine owns the authoritative [`World`] and never mutates it directly.
//! Each turn it asks the target selector for an [`Action`], translates that
//! action into [`Command`] values and routes them through
//! [`cavern_skirmish_world::apply`], keeping every emitted [`Event`] in its
//! combat log.

mod config;

pub use config::{
    CalibrationConfig, CombatConfig, DEFAULT_CALIBRATION_MAX_POWER,
    DEFAULT_CALIBRATION_START_POWER, DEFAULT_MAX_ROUNDS,
};

use cavern_skirmish_core::{Action, Command, CombatReport, Event, Faction, UnitId};
use cavern_skirmish_system_outcome as outcome;
use cavern_skirmish_system_targeting::{select_attack, TargetSelector, TargetingError};
use cavern_skirmish_world::{
    self as world, query, Cavern, InvariantViolation, MalformedGridError, ParsedCavern, World,
};
use thiserror::Error;

/// Errors surfaced while running or calibrating a combat.
#[derive(Debug, Error)]
pub enum CombatError {
    /// The grid text could not be parsed.
    #[error(transparent)]
    Malformed(#[from] MalformedGridError),
    /// The world rejected a command the engine issued.
    #[error("world rejected a combat command")]
    Invariant(#[from] InvariantViolation),
    /// Target selection was handed an inconsistent view of the world.
    #[error("target selection failed")]
    Targeting(#[from] TargetingError),
    /// Both factions were still standing after the configured number of rounds.
    #[error("combat did not finish within {max_rounds} rounds")]
    RoundLimitExceeded {
        /// Configured round limit.
        max_rounds: u32,
    },
    /// The calibration sweep was asked to start above its upper bound.
    #[error("calibration range is empty: start power {start_power} exceeds max power {max_power}")]
    EmptyCalibrationRange {
        /// First attack power requested.
        start_power: u32,
        /// Last attack power requested.
        max_power: u32,
    },
    /// Every attack power in the sweep cost at least one elf.
    #[error("elves lose a unit at every attack power from {start_power} to {max_power}")]
    CalibrationExhausted {
        /// First attack power tried.
        start_power: u32,
        /// Last attack power tried.
        max_power: u32,
    },
}

/// Reason a combat stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatEnd {
    /// A unit found no living enemy at the start of its turn.
    FactionEliminated,
    /// An elf died while elf losses were forbidden.
    ElfLost,
}

/// Result of advancing the combat by one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Every unit that started the round got its turn.
    Completed {
        /// One-based number of the round that just completed.
        round: u32,
    },
    /// Combat stopped before or during the round; the round does not count.
    Ended(CombatEnd),
}

/// Drives a single combat to completion.
#[derive(Debug)]
pub struct CombatEngine {
    world: World,
    selector: TargetSelector,
    config: CombatConfig,
    log: Vec<Event>,
    elf_died: bool,
    ended: Option<CombatEnd>,
}

impl CombatEngine {
    /// Parses the grid text and prepares a combat with the given parameters.
    pub fn new(grid_text: &str, config: CombatConfig) -> Result<Self, CombatError> {
        let parsed = Cavern::parse(grid_text)?;
        Ok(Self::with_cavern(parsed, config))
    }

    /// Prepares a combat on an already parsed cavern.
    #[must_use]
    pub fn with_cavern(parsed: ParsedCavern, config: CombatConfig) -> Self {
        Self {
            world: World::new(parsed, config.elf_attack_power),
            selector: TargetSelector::new(),
            config,
            log: Vec::new(),
            elf_died: false,
            ended: None,
        }
    }

    /// Every event emitted so far, in the order it happened.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.log
    }

    /// Reason the combat stopped, if it has.
    #[must_use]
    pub fn ended(&self) -> Option<CombatEnd> {
        self.ended
    }

    /// Plays one round.
    ///
    /// Turn order is fixed from the reading order of the living units when the
    /// round begins. Units that die before their turn are skipped. Before each
    /// turn the acting unit checks for a living enemy; finding none ends the
    /// combat without counting the round.
    pub fn step_round(&mut self) -> Result<RoundOutcome, CombatError> {
        if let Some(end) = self.ended {
            return Ok(RoundOutcome::Ended(end));
        }

        let round = query::completed_rounds(&self.world).saturating_add(1);
        let span = tracing::debug_span!("round", round);
        let _entered = span.enter();

        for unit in query::unit_view(&self.world).initiative_order() {
            let Some(actor) = query::unit(&self.world, unit) else {
                continue;
            };
            if !actor.alive {
                tracing::trace!(unit = unit.get(), "skipping fallen unit");
                continue;
            }
            if query::living_count(&self.world, actor.faction.enemy()) == 0 {
                return Ok(self.finish(CombatEnd::FactionEliminated));
            }

            self.take_turn(unit)?;

            if self.config.require_no_elf_losses && self.elf_died {
                return Ok(self.finish(CombatEnd::ElfLost));
            }
        }

        self.dispatch(Command::CompleteRound)?;
        Ok(RoundOutcome::Completed { round })
    }

    /// Plays rounds until the combat ends and returns its report.
    ///
    /// Fails with [`CombatError::RoundLimitExceeded`] when the configured number
    /// of rounds completes with both factions still standing.
    pub fn run(&mut self) -> Result<CombatReport, CombatError> {
        while self.ended.is_none() {
            let completed = query::completed_rounds(&self.world);
            let contested = query::living_count(&self.world, Faction::Elf) > 0
                && query::living_count(&self.world, Faction::Goblin) > 0;
            if contested && completed >= self.config.max_rounds {
                tracing::warn!(completed, "combat reached its round limit");
                return Err(CombatError::RoundLimitExceeded {
                    max_rounds: self.config.max_rounds,
                });
            }

            let _ = self.step_round()?;
        }

        Ok(self.report())
    }

    /// Report describing the current state of the combat.
    #[must_use]
    pub fn report(&self) -> CombatReport {
        outcome::report(
            query::completed_rounds(&self.world),
            &query::unit_view(&self.world),
            self.elf_died,
            self.config.elf_attack_power,
        )
    }

    fn take_turn(&mut self, unit: UnitId) -> Result<(), CombatError> {
        let action = self.selector.select(
            unit,
            query::cavern(&self.world),
            query::occupancy_view(&self.world),
            &query::unit_view(&self.world),
        )?;

        match action {
            Action::Attack { target } => self.dispatch(Command::AttackUnit {
                attacker: unit,
                target,
            }),
            Action::Move { to } => {
                self.dispatch(Command::MoveUnit { unit, to })?;

                let units = query::unit_view(&self.world);
                let target = units.get(unit).and_then(|actor| {
                    select_attack(
                        actor,
                        query::cavern(&self.world),
                        query::occupancy_view(&self.world),
                        &units,
                    )
                });

                match target {
                    Some(target) => self.dispatch(Command::AttackUnit {
                        attacker: unit,
                        target,
                    }),
                    None => Ok(()),
                }
            }
            Action::Idle => {
                tracing::trace!(unit = unit.get(), "no reachable target");
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<(), CombatError> {
        let mut events = Vec::new();
        if let Err(violation) = world::apply(&mut self.world, command, &mut events) {
            tracing::error!(?command, %violation, "world rejected command");
            return Err(violation.into());
        }

        for event in &events {
            match *event {
                Event::UnitDied {
                    unit,
                    faction,
                    cell,
                } => {
                    if faction == Faction::Elf {
                        self.elf_died = true;
                    }
                    tracing::debug!(unit = unit.get(), ?faction, ?cell, "unit died");
                }
                Event::RoundCompleted { round } => {
                    tracing::debug!(round, "round completed");
                }
                _ => tracing::trace!(?event, "applied"),
            }
        }

        self.log.extend(events);
        Ok(())
    }

    fn finish(&mut self, end: CombatEnd) -> RoundOutcome {
        self.ended = Some(end);
        tracing::info!(
            ?end,
            completed_rounds = query::completed_rounds(&self.world),
            elf_attack_power = self.config.elf_attack_power,
            "combat ended"
        );
        RoundOutcome::Ended(end)
    }
}

/// Runs a full combat on the grid text and returns its report.
pub fn run_combat(grid_text: &str, config: &CombatConfig) -> Result<CombatReport, CombatError> {
    CombatEngine::new(grid_text, *config)?.run()
}

/// Weakest elf attack power that wins without losing a single elf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calibration {
    /// Attack power that produced the flawless run.
    pub elf_attack_power: u32,
    /// Report of that run.
    pub report: CombatReport,
}

/// Searches upward from the configured start power for the weakest elf attack
/// power under which no elf dies.
///
/// Every attempt replays the combat from the parsed starting grid and stops as
/// soon as an elf falls.
pub fn calibrate_elf_attack_power(
    grid_text: &str,
    config: &CalibrationConfig,
) -> Result<Calibration, CombatError> {
    if config.start_power > config.max_power {
        return Err(CombatError::EmptyCalibrationRange {
            start_power: config.start_power,
            max_power: config.max_power,
        });
    }

    let parsed = Cavern::parse(grid_text)?;

    for power in config.start_power..=config.max_power {
        let mut engine = CombatEngine::with_cavern(parsed.clone(), config.attempt(power));
        let report = engine.run()?;

        if report.elf_died {
            tracing::debug!(power, rounds = report.completed_rounds, "elf lost");
            continue;
        }

        tracing::info!(
            power,
            outcome = report.outcome_score,
            "calibrated elf attack power"
        );
        return Ok(Calibration {
            elf_attack_power: power,
            report,
        });
    }

    Err(CombatError::CalibrationExhausted {
        start_power: config.start_power,
        max_power: config.max_power,
    })
}
