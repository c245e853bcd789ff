use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("wa_lead_tracker_statds")
        .with_description("WhatsApp lead tracker statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

/// `outcome`: "tracked", "ignored" or "failed"
pub fn incr_webhook_outcome_statds(outcome: &str) {
    incr_statds("webhook_outcome".to_string(), outcome.into())
}

pub fn incr_rule_match_statds(rule_type: &str) {
    incr_statds("rule_match".to_string(), rule_type.into())
}

pub fn incr_link_click_statds(instance: &str) {
    incr_statds("link_click".to_string(), instance.into())
}
