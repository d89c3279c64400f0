//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Settings Metrics
    pub static ref OPTIONS_REGISTERED: IntGauge = IntGauge::new(
        "activitypub_settings_options_registered",
        "Number of options in the registry"
    ).expect("metric can be created");
    pub static ref OPTION_WRITES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("activitypub_settings_option_writes_total", "Total number of option writes"),
        &["option", "status"]
    ).expect("metric can be created");
    pub static ref PROFILE_FIELD_SAVES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("activitypub_settings_profile_field_saves_total", "Total number of profile field saves"),
        &["status"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("activitypub_settings_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(OPTIONS_REGISTERED.clone()))
        .expect("OPTIONS_REGISTERED can be registered");
    REGISTRY
        .register(Box::new(OPTION_WRITES_TOTAL.clone()))
        .expect("OPTION_WRITES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(PROFILE_FIELD_SAVES_TOTAL.clone()))
        .expect("PROFILE_FIELD_SAVES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

/// Record the outcome of an option write
pub fn observe_option_write(option: &str, status: &str) {
    OPTION_WRITES_TOTAL.with_label_values(&[option, status]).inc();
}
