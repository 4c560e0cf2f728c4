//! Prometheus metrics registry for the device monitor.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and share it
//! through the router state.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format.

use prometheus::{Counter, Opts, Registry};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Devices registered since startup.
    pub devices_registered_total: Counter,
    /// Readings recorded since startup.
    pub readings_recorded_total: Counter,
    /// Reading partial updates applied since startup.
    pub readings_updated_total: Counter,
    /// Diagnostic evaluations served, both endpoints combined.
    pub diagnostics_runs_total: Counter,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated (should not happen in practice).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let devices_registered_total = Counter::with_opts(Opts::new(
            "device_monitor_devices_registered_total",
            "Devices registered since startup",
        ))?;

        let readings_recorded_total = Counter::with_opts(Opts::new(
            "device_monitor_readings_recorded_total",
            "Readings recorded since startup",
        ))?;

        let readings_updated_total = Counter::with_opts(Opts::new(
            "device_monitor_readings_updated_total",
            "Reading partial updates applied since startup",
        ))?;

        let diagnostics_runs_total = Counter::with_opts(Opts::new(
            "device_monitor_diagnostics_runs_total",
            "Diagnostic evaluations served",
        ))?;

        registry.register(Box::new(devices_registered_total.clone()))?;
        registry.register(Box::new(readings_recorded_total.clone()))?;
        registry.register(Box::new(readings_updated_total.clone()))?;
        registry.register(Box::new(diagnostics_runs_total.clone()))?;

        Ok(Self {
            devices_registered_total,
            readings_recorded_total,
            readings_updated_total,
            diagnostics_runs_total,
            registry,
        })
    }
}
