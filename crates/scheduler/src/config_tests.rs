// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_is_unbounded_with_half_second_poll() {
    let config = SchedulerConfig::default();
    assert_eq!(config.max_concurrent, None);
    assert_eq!(config.poll_interval, Duration::from_millis(500));
}

#[test]
fn parses_from_toml() {
    let config: SchedulerConfig = jobgraph_core::from_toml_str(
        r#"
        max_concurrent = 4
        poll_interval = 100
        "#,
    )
    .unwrap();
    assert_eq!(config.max_concurrent, Some(4));
    assert_eq!(config.poll_interval, Duration::from_millis(100));
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let config: SchedulerConfig = jobgraph_core::from_toml_str("max_concurrent = 2").unwrap();
    assert_eq!(config.max_concurrent, Some(2));
    assert_eq!(config.poll_interval, Duration::from_millis(500));
}
