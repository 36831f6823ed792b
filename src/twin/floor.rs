//! Production Floor
//!
//! The aggregate root: owns every machine, the simulation clock, the
//! iteration counter, the predictors and the random source used to sample
//! new bearings. Constructed and passed explicitly; all floor state lives in
//! one instance.
//!
//! One iteration ("sweep"):
//! 1. increment `total_iterations`
//! 2. take the set of machines that are on and not failed at sweep start
//! 3. tick each of them (sequentially, or on the rayon pool)
//! 4. emit one `BearingFailed` per machine that failed, in machine order
//! 5. emit `IterationComplete`

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::bearing::Bearing;
use super::clock::SimulationClock;
use super::error::TwinError;
use super::events::FloorEvent;
use super::machine::{Machine, MachineId, TickParams};
use super::sampler::BoundedRandomVector;
use super::snapshot::FloorSnapshot;
use crate::config::{AlertLevel, ConfigError, HealthThresholds, SweepMode, TwinConfig};
use crate::predictors::PredictorSet;
use crate::types::BearingState;

/// One bearing reported by [`ProductionFloor::bearings_needing_attention`].
#[derive(Debug, Clone, Copy)]
pub struct AttentionItem<'a> {
    pub machine: &'a Machine,
    pub bearing: &'a Bearing,
    pub index: usize,
}

impl AttentionItem<'_> {
    pub const fn rul(&self) -> f64 {
        self.bearing.rul()
    }
}

pub struct ProductionFloor {
    machines: Vec<Machine>,
    clock: SimulationClock,
    total_iterations: u64,
    paused: bool,
    predictors: PredictorSet,
    sampler: BoundedRandomVector,
    rng: StdRng,
    revolutions_per_iteration: f64,
    sweep: SweepMode,
    health: HealthThresholds,
}

impl std::fmt::Debug for ProductionFloor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductionFloor")
            .field("machines", &self.machines.len())
            .field("total_iterations", &self.total_iterations)
            .field("paused", &self.paused)
            .field("clock", &self.clock)
            .field("sweep", &self.sweep)
            .finish_non_exhaustive()
    }
}

impl ProductionFloor {
    /// Empty floor from a validated config, explicit predictors and RNG.
    pub fn new(config: &TwinConfig, predictors: PredictorSet, rng: StdRng) -> Result<Self, TwinError> {
        config.validate()?;
        let bounds = config
            .calibration
            .resolve()
            .map_err(|errors| TwinError::InvalidConfiguration(ConfigError::Validation(errors)))?;

        Ok(Self {
            machines: Vec::new(),
            clock: SimulationClock::new(config.simulation.seconds_per_iteration),
            total_iterations: 0,
            paused: false,
            predictors,
            sampler: BoundedRandomVector::new(bounds),
            rng,
            revolutions_per_iteration: config.simulation.revolutions_per_iteration,
            sweep: config.simulation.sweep,
            health: config.health.clone(),
        })
    }

    /// Load predictors from the config and seed the RNG from
    /// `simulation.seed` (entropy when absent).
    ///
    /// Fails with `PredictorUnavailable` if a model cannot be loaded.
    pub fn from_config(config: &TwinConfig) -> Result<Self, TwinError> {
        let predictors = PredictorSet::load(config.predictors.model_dir.as_deref())
            .map_err(TwinError::PredictorUnavailable)?;
        let rng = config
            .simulation
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let floor = Self::new(config, predictors, rng)?;
        info!(
            sweep = ?floor.sweep,
            seconds_per_iteration = floor.clock.seconds_per_iteration(),
            revolutions_per_iteration = floor.revolutions_per_iteration,
            "Production floor ready"
        );
        Ok(floor)
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    /// Feed real elapsed seconds to the clock; run one sweep if it fires.
    ///
    /// No-op while paused: the delta is discarded, not queued. A predictor
    /// error aborts the iteration with `SweepAborted`, which carries the
    /// failures committed before the error.
    pub fn tick(&mut self, real_delta_seconds: f64) -> Result<Vec<FloorEvent>, TwinError> {
        if self.paused || !self.clock.should_tick(real_delta_seconds) {
            return Ok(Vec::new());
        }
        self.run_iteration()
    }

    /// Run exactly one sweep, bypassing the clock. Ignores pause.
    pub fn force_tick(&mut self) -> Result<Vec<FloorEvent>, TwinError> {
        self.run_iteration()
    }

    /// Like [`tick`](Self::tick), but runs every iteration the delta pays
    /// for instead of at most one.
    ///
    /// If an iteration aborts, the `SweepAborted` error carries the failure
    /// events of every earlier iteration of this call as well.
    pub fn advance(&mut self, real_delta_seconds: f64) -> Result<Vec<FloorEvent>, TwinError> {
        if self.paused {
            return Ok(Vec::new());
        }
        self.clock.accumulate(real_delta_seconds);
        let mut events = Vec::new();
        while self.clock.consume_tick() {
            match self.run_iteration() {
                Ok(batch) => events.extend(batch),
                Err(e) => return Err(e.after(events)),
            }
        }
        Ok(events)
    }

    fn run_iteration(&mut self) -> Result<Vec<FloorEvent>, TwinError> {
        self.total_iterations += 1;
        let iteration = self.total_iterations;
        let params = TickParams {
            revolutions_step: self.revolutions_per_iteration,
            failure_rul: self.health.failure_rul,
        };

        // Eligibility is fixed at sweep start
        let eligible: Vec<usize> = self
            .machines
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_operational())
            .map(|(i, _)| i)
            .collect();

        let (failures, aborted) = match self.sweep {
            SweepMode::Sequential => self.sweep_sequential(&eligible, params),
            SweepMode::Parallel => self.sweep_parallel(&eligible, params),
        };

        let mut events: Vec<FloorEvent> = failures
            .into_iter()
            .map(|(machine_index, bearing_index)| {
                let machine = &self.machines[machine_index];
                FloorEvent::BearingFailed {
                    machine: machine.id(),
                    model: machine.model().to_string(),
                    bearing_index,
                    position: machine.bearings()[bearing_index].position(),
                    rul: machine.bearings()[bearing_index].rul(),
                    iteration,
                }
            })
            .collect();

        if let Some(source) = aborted {
            warn!(iteration, committed = events.len(), error = %source, "Iteration aborted");
            return Err(TwinError::SweepAborted {
                iteration,
                events,
                source: Box::new(source),
            });
        }
        events.push(FloorEvent::IterationComplete { iteration });

        debug!(
            iteration,
            advanced = eligible.len(),
            failed = events.len() - 1,
            "Iteration complete"
        );
        Ok(events)
    }

    /// `(machine index, failed bearing index)` pairs in machine order, plus
    /// the error that stopped the sweep early.
    fn sweep_sequential(&mut self, eligible: &[usize], params: TickParams) -> (Vec<(usize, usize)>, Option<TwinError>) {
        let degradation = self.predictors.degradation.as_ref();
        let rul = self.predictors.rul.as_ref();
        let mut failures = Vec::new();
        for &index in eligible {
            match self.machines[index].tick(degradation, rul, params) {
                Ok(Some(bearing)) => failures.push((index, bearing)),
                Ok(None) => {}
                Err(e) => return (failures, Some(e)),
            }
        }
        (failures, None)
    }

    /// Predictions run on the rayon pool against the unchanged floor, then
    /// are applied in machine order. An error stops the sweep at the same
    /// machine and bearing as the sequential sweep.
    fn sweep_parallel(&mut self, eligible: &[usize], params: TickParams) -> (Vec<(usize, usize)>, Option<TwinError>) {
        let degradation = self.predictors.degradation.as_ref();
        let rul = self.predictors.rul.as_ref();
        let machines = &self.machines;
        let plans: Vec<(usize, Vec<Result<BearingState, TwinError>>)> = eligible
            .par_iter()
            .map(|&index| (index, machines[index].predict_tick(degradation, rul, params)))
            .collect();

        let mut failures = Vec::new();
        for (index, predictions) in plans {
            match self.machines[index].apply_tick(predictions, params.failure_rul) {
                Ok(Some(bearing)) => failures.push((index, bearing)),
                Ok(None) => {}
                Err(e) => return (failures, Some(e)),
            }
        }
        (failures, None)
    }

    // ========================================================================
    // Clock controls
    // ========================================================================

    /// Clamped to >= 0 by the clock.
    pub fn set_time_multiplier(&mut self, multiplier: f64) {
        self.clock.set_time_multiplier(multiplier);
        debug!(multiplier = self.clock.time_multiplier(), "Time multiplier set");
    }

    /// Move one maintenance alert cut-off. The value must lie in `[0, 1]`
    /// and keep warning <= critical.
    pub fn set_alert_threshold(&mut self, level: AlertLevel, rul: f64) -> Result<(), TwinError> {
        let mut health = self.health.clone();
        health.set_alert(level, rul);
        if !(0.0..=1.0).contains(&rul) {
            return Err(ConfigError::Validation(vec![format!(
                "{level} alert threshold must be within [0, 1] (got {rul})"
            )])
            .into());
        }
        if health.alert_warning_rul > health.alert_critical_rul {
            return Err(ConfigError::Validation(vec![format!(
                "warning alert threshold ({:.3}) must be <= critical ({:.3})",
                health.alert_warning_rul, health.alert_critical_rul
            )])
            .into());
        }
        self.health = health;
        info!(%level, rul, "Alert threshold changed");
        Ok(())
    }

    pub fn pause(&mut self) {
        self.paused = true;
        info!(iteration = self.total_iterations, "Simulation paused");
    }

    pub fn resume(&mut self) {
        self.paused = false;
        info!(iteration = self.total_iterations, "Simulation resumed");
    }

    /// Remove every machine and return clock, counter and pause to their
    /// initial state.
    pub fn reset(&mut self) {
        let removed = self.machines.len();
        self.machines.clear();
        self.clock.reset();
        self.total_iterations = 0;
        self.paused = false;
        info!(removed, "Production floor reset");
    }

    // ========================================================================
    // Machines
    // ========================================================================

    pub fn add_machine(&mut self, machine: Machine) -> MachineId {
        let id = machine.id();
        info!(machine = %id, model = %machine.model(), bearings = machine.bearing_count(), "Machine added");
        self.machines.push(machine);
        id
    }

    /// Create a machine with bearings sampled from the floor's RNG.
    pub fn add_new_machine(&mut self, model: Option<&str>) -> MachineId {
        let machine = Machine::new(model, &self.sampler, &mut self.rng);
        self.add_machine(machine)
    }

    /// Add a machine with an explicit bearing count.
    pub fn add_machine_with_bearings(&mut self, model: Option<&str>, count: usize) -> Result<MachineId, TwinError> {
        let model = match model {
            Some(name) => name.to_string(),
            None => Machine::random_model(&mut self.rng),
        };
        let machine = Machine::with_bearing_count(model, count, &self.sampler, &mut self.rng)?;
        Ok(self.add_machine(machine))
    }

    pub fn remove_machine(&mut self, id: MachineId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.machines.remove(index);
                info!(machine = %id, "Machine removed");
                true
            }
            None => false,
        }
    }

    pub fn get_machine(&self, id: MachineId) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id() == id)
    }

    pub fn machine_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        self.machines.iter_mut().find(|m| m.id() == id)
    }

    /// Position in the current ordering. Not stable across removals.
    pub fn get_machine_by_index(&self, index: usize) -> Option<&Machine> {
        self.machines.get(index)
    }

    pub fn machine_by_index_mut(&mut self, index: usize) -> Option<&mut Machine> {
        self.machines.get_mut(index)
    }

    pub fn position(&self, id: MachineId) -> Option<usize> {
        self.machines.iter().position(|m| m.id() == id)
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Power on every machine that accepts it. Returns how many are now on
    /// that were off before.
    pub fn turn_all_on(&mut self) -> usize {
        let mut switched = 0;
        for machine in self.machines.iter_mut().filter(|m| !m.is_on()) {
            if machine.turn_on() {
                switched += 1;
            }
        }
        info!(switched, "All machines powered on");
        switched
    }

    pub fn turn_all_off(&mut self) -> usize {
        let mut switched = 0;
        for machine in self.machines.iter_mut().filter(|m| m.is_on()) {
            machine.turn_off();
            switched += 1;
        }
        info!(switched, "All machines powered off");
        switched
    }

    pub fn replace_bearing(&mut self, id: MachineId, index: usize) -> Result<(), TwinError> {
        let machine = self
            .machines
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(TwinError::MachineNotFound(id))?;
        machine.replace_bearing(index, &self.sampler, &mut self.rng)
    }

    pub fn replace_all_bearings(&mut self, id: MachineId) -> Result<(), TwinError> {
        let machine = self
            .machines
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(TwinError::MachineNotFound(id))?;
        machine.replace_all_bearings(&self.sampler, &mut self.rng);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Bearings on non-failed machines with `rul >= threshold`, most
    /// degraded first. Equal RULs keep floor order. Recomputed on every call.
    pub fn bearings_needing_attention(&self, threshold: f64) -> impl Iterator<Item = AttentionItem<'_>> {
        self.ranked_bearings(move |machine, bearing| !machine.has_failed() && bearing.rul() >= threshold)
    }

    /// Every bearing on the floor, failed machines included, most degraded first.
    pub fn bearings_by_degradation(&self) -> impl Iterator<Item = AttentionItem<'_>> {
        self.ranked_bearings(|_, _| true)
    }

    fn ranked_bearings<F>(&self, keep: F) -> impl Iterator<Item = AttentionItem<'_>>
    where
        F: Fn(&Machine, &Bearing) -> bool,
    {
        let mut items: Vec<AttentionItem<'_>> = self
            .machines
            .iter()
            .flat_map(|machine| {
                machine.bearings().iter().map(move |bearing| AttentionItem {
                    machine,
                    bearing,
                    index: bearing.index(),
                })
            })
            .filter(|item| keep(item.machine, item.bearing))
            .collect();
        items.sort_by(|a, b| b.rul().total_cmp(&a.rul()));
        items.into_iter()
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    /// Machines that are on (and therefore not failed).
    pub fn active_machine_count(&self) -> usize {
        self.machines.iter().filter(|m| m.is_operational()).count()
    }

    pub fn failed_machine_count(&self) -> usize {
        self.machines.iter().filter(|m| m.has_failed()).count()
    }

    /// Off and not failed.
    pub fn off_machine_count(&self) -> usize {
        self.machines
            .iter()
            .filter(|m| !m.is_on() && !m.has_failed())
            .count()
    }

    pub fn total_bearing_count(&self) -> usize {
        self.machines.iter().map(Machine::bearing_count).sum()
    }

    pub const fn total_iterations(&self) -> u64 {
        self.total_iterations
    }

    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub const fn time_multiplier(&self) -> f64 {
        self.clock.time_multiplier()
    }

    pub fn progress_to_next_tick(&self) -> f64 {
        self.clock.progress_to_next_tick()
    }

    pub const fn accumulated_seconds(&self) -> f64 {
        self.clock.accumulated_seconds()
    }

    pub const fn health_thresholds(&self) -> &HealthThresholds {
        &self.health
    }

    pub fn snapshot(&self) -> FloorSnapshot {
        FloorSnapshot::capture(self)
    }
}
