use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_lesson_completion(module_finished: bool, course_finished: bool) {
    metrics::counter!("lesson_completions_total").increment(1);
    if module_finished {
        metrics::counter!("module_completions_total").increment(1);
    }
    if course_finished {
        metrics::counter!("course_completions_total").increment(1);
    }
}

pub(crate) fn record_attempt_started() {
    metrics::counter!("test_attempts_started_total").increment(1);
}

pub(crate) fn record_attempt_completed(passed: bool) {
    metrics::counter!("test_attempts_completed_total", "passed" => passed.to_string())
        .increment(1);
}
