use prometheus::{
    Encoder, GaugeVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::core::error::MachineError;
use crate::machine::{CoffeeType, ContainerKind, StatusSnapshot};

/// Prometheus metrics for the machine
///
/// Each instance owns its registry, so several machines (or tests) can live in
/// one process without colliding on metric names.
#[derive(Clone)]
pub struct MachineMetrics {
    /// Registry the collectors below are registered with
    registry: Registry,
    /// Successful brews by recipe
    brews: IntCounterVec,
    /// Rejected operations by failure kind
    rejections: IntCounterVec,
    /// Saves the store refused
    persistence_failures: IntCounter,
    /// Successful fills by container
    fills: IntCounterVec,
    /// Current level by container, refreshed on scrape
    levels: GaugeVec,
    /// Lifetime counter mirrored from the machine state
    coffees_made: IntGauge,
}

impl MachineMetrics {
    /// Create the collectors and register them with a fresh registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let brews = IntCounterVec::new(
            Opts::new("coffee_machine_brews_total", "Successful brews by recipe"),
            &["recipe"],
        )?;
        let rejections = IntCounterVec::new(
            Opts::new("coffee_machine_rejections_total", "Rejected operations by failure kind"),
            &["kind"],
        )?;
        let persistence_failures = IntCounter::new(
            "coffee_machine_persistence_failures_total",
            "Operations that failed because the state could not be saved",
        )?;
        let fills = IntCounterVec::new(
            Opts::new("coffee_machine_fills_total", "Successful fills by container"),
            &["container"],
        )?;
        let levels = GaugeVec::new(
            Opts::new("coffee_machine_level", "Current container level"),
            &["container"],
        )?;
        let coffees_made = IntGauge::new(
            "coffee_machine_coffees_made",
            "Lifetime number of coffees made since the last reset",
        )?;

        registry.register(Box::new(brews.clone()))?;
        registry.register(Box::new(rejections.clone()))?;
        registry.register(Box::new(persistence_failures.clone()))?;
        registry.register(Box::new(fills.clone()))?;
        registry.register(Box::new(levels.clone()))?;
        registry.register(Box::new(coffees_made.clone()))?;

        Ok(Self {
            registry,
            brews,
            rejections,
            persistence_failures,
            fills,
            levels,
            coffees_made,
        })
    }

    pub fn record_brew(&self, coffee_type: CoffeeType) {
        self.brews.with_label_values(&[coffee_type.as_str()]).inc();
    }

    pub fn record_fill(&self, container: ContainerKind) {
        self.fills.with_label_values(&[container.as_str()]).inc();
    }

    /// Count a failed operation: storage faults apart from business rejections
    pub fn record_failure(&self, error: &MachineError) {
        match error {
            MachineError::Persistence(_) => self.persistence_failures.inc(),
            _ => self.rejections.with_label_values(&[error.kind()]).inc(),
        }
    }

    /// Copy the current levels and counter into the gauges
    pub fn observe_status(&self, status: &StatusSnapshot) {
        self.levels
            .with_label_values(&[ContainerKind::Water.as_str()])
            .set(status.water.level);
        self.levels
            .with_label_values(&[ContainerKind::Coffee.as_str()])
            .set(status.coffee.level);
        self.coffees_made
            .set(i64::try_from(status.total_coffees_made).unwrap_or(i64::MAX));
    }

    /// Encode every registered collector in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
