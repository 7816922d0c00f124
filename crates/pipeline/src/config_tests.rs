// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn default_mirrors_scheduler_default() {
    let config = PipelineConfig::default();
    assert_eq!(config.scheduler.max_concurrent, None);
    assert_eq!(config.scheduler.poll_interval, Duration::from_millis(500));
}

#[test]
fn parses_nested_scheduler_table_from_toml() {
    let config: PipelineConfig = jobgraph_core::from_toml_str(
        r#"
        [scheduler]
        max_concurrent = 2
        poll_interval = 50
        "#,
    )
    .unwrap();
    assert_eq!(config.scheduler.max_concurrent, Some(2));
    assert_eq!(config.scheduler.poll_interval, Duration::from_millis(50));
}
