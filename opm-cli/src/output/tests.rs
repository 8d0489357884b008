//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use chrono::{DateTime, Duration, Utc};
    use opm_core::{
        Origin, Preset, PresetMeta, ProviderKind, QuotaRecord, QuotaStatus, QuotaWindow,
        ServiceDiff, TokenRecord,
    };
    use opm_quota::{QuotaReport, UniqueToken};
    use opm_store::SwitchReport;
    use std::path::PathBuf;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_200_000, 0).unwrap()
    }

    fn report_with(groups: Vec<(Origin, Vec<QuotaRecord>)>) -> QuotaReport {
        let fetched = groups
            .into_iter()
            .map(|(origin, records)| {
                let token = UniqueToken {
                    record: TokenRecord::new(ProviderKind::Openai).with_access("tok"),
                    origins: vec![origin],
                };
                (token, records)
            })
            .collect();
        QuotaReport::build(fetched, now())
    }

    #[test]
    fn test_progress_bar_empty() {
        let formatter = TextFormatter::new(false);
        let bar = formatter.progress_bar(0.0);
        assert_eq!(bar, "░░░░░░░░░░");
    }

    #[test]
    fn test_progress_bar_full() {
        let formatter = TextFormatter::new(false);
        let bar = formatter.progress_bar(100.0);
        assert_eq!(bar, "██████████");
    }

    #[test]
    fn test_progress_bar_half() {
        let formatter = TextFormatter::new(false);
        let bar = formatter.progress_bar(50.0);
        assert_eq!(bar, "█████░░░░░");
    }

    #[test]
    fn test_progress_bar_boundary_values() {
        let formatter = TextFormatter::new(false);

        let test_cases = vec![
            (0.0, "░░░░░░░░░░"),
            (10.0, "█░░░░░░░░░"),
            (25.0, "███░░░░░░░"), // 2.5 rounds to 3 blocks
            (50.0, "█████░░░░░"),
            (75.0, "████████░░"), // 7.5 rounds to 8 blocks
            (100.0, "██████████"),
        ];

        for (percent, expected) in test_cases {
            let bar = formatter.progress_bar(percent);
            assert_eq!(bar, expected, "Failed for {}%", percent);
        }
    }

    #[test]
    fn test_progress_bar_with_colors() {
        let formatter = TextFormatter::new(true);

        // Low remaining (critical) - should be red
        let bar = formatter.progress_bar(10.0);
        assert!(bar.contains("\x1b[31m"), "Should be red for <20%");

        // Medium remaining (warning) - should be yellow
        let bar = formatter.progress_bar(40.0);
        assert!(bar.contains("\x1b[33m"), "Should be yellow for <50%");

        // High remaining (good) - should be green
        let bar = formatter.progress_bar(80.0);
        assert!(bar.contains("\x1b[32m"), "Should be green for >=50%");
    }

    #[test]
    fn test_quota_report_groups_by_origin() {
        let formatter = TextFormatter::new(false);

        let record = QuotaRecord::ok(ProviderKind::Openai)
            .with_daily(QuotaWindow::new(70, Some(now() + Duration::hours(2))))
            .with_weekly(QuotaWindow::new(40, None));
        let report = report_with(vec![
            (Origin::ActiveFile, vec![record.clone()]),
            (Origin::Preset("work".to_string()), vec![record]),
        ]);

        let output = formatter.format_quota_report(&report, now());

        assert!(output.contains("(Current Active)"));
        assert!(output.contains("work"));
        assert!(output.contains("OpenAI"));
        assert!(output.contains("Daily:"));
        assert!(output.contains("Weekly:"));
        assert!(output.contains("70% left"));
        assert!(output.contains("resets"));
    }

    #[test]
    fn test_quota_report_tier_rows() {
        let formatter = TextFormatter::new(false);

        let records = vec![
            QuotaRecord::ok(ProviderKind::GoogleAntigravity)
                .with_tier("G3Pro")
                .with_daily(QuotaWindow::new(55, None)),
            QuotaRecord::ok(ProviderKind::GoogleAntigravity)
                .with_tier("Claude")
                .with_daily(QuotaWindow::new(90, None)),
        ];
        let report = report_with(vec![(Origin::ActiveFile, records)]);

        let output = formatter.format_quota_report(&report, now());

        assert!(output.contains("Antigravity"));
        assert!(output.contains("G3Pro:"));
        assert!(output.contains("Claude:"));
        // One provider header for both tier rows
        assert_eq!(output.matches("Antigravity").count(), 1);
    }

    #[test]
    fn test_quota_report_failure_rows() {
        let formatter = TextFormatter::new(false);

        let report = report_with(vec![(
            Origin::ActiveFile,
            vec![
                QuotaRecord::new(ProviderKind::Openai, QuotaStatus::Unauthorized),
                QuotaRecord::new(
                    ProviderKind::Openai,
                    QuotaStatus::failed("access token expired"),
                ),
            ],
        )]);

        let output = formatter.format_quota_report(&report, now());

        assert!(output.contains("unauthorized"));
        assert!(output.contains("failed: access token expired"));
        assert!(output.contains("2 rows could not be fetched"));
    }

    #[test]
    fn test_quota_report_empty() {
        let formatter = TextFormatter::new(false);
        let report = QuotaReport::build(Vec::new(), now());
        let output = formatter.format_quota_report(&report, now());
        assert!(output.contains("No OAuth tokens"));
    }

    #[test]
    fn test_preset_list_marks_current() {
        let formatter = TextFormatter::new(false);

        let presets = vec![
            Preset::new("personal", PresetMeta::default(), false),
            Preset::new("work", PresetMeta::default(), true),
        ];

        let output = formatter.format_preset_list(&presets);

        assert!(output.contains("* work"));
        assert!(output.contains("  personal"));
    }

    #[test]
    fn test_preset_list_empty() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_preset_list(&[]);
        assert!(output.contains("No presets saved"));
    }

    #[test]
    fn test_switch_report_diff_markers() {
        let formatter = TextFormatter::new(false);

        let report = SwitchReport {
            preset: "work".to_string(),
            diff: ServiceDiff {
                added: vec!["google".to_string()],
                removed: vec![],
                modified: vec!["openai".to_string()],
                unchanged: vec!["anthropic".to_string()],
            },
            backup: Some("before_work_20260101_120000.json".to_string()),
            source: PathBuf::from("/store/presets/work.json"),
            destination: PathBuf::from("/data/auth.json"),
            selected: None,
        };

        let output = formatter.format_switch_report(&report);

        assert!(output.contains("Switched to work"));
        assert!(output.contains("+ google"));
        assert!(output.contains("~ openai"));
        assert!(output.contains("= anthropic"));
        assert!(output.contains("before_work_20260101_120000.json"));
    }

    #[test]
    fn test_switch_report_noop_and_skipped_backup() {
        let formatter = TextFormatter::new(false);

        let report = SwitchReport {
            preset: "work".to_string(),
            diff: ServiceDiff::default(),
            backup: None,
            source: PathBuf::from("/store/presets/work.json"),
            destination: PathBuf::from("/data/auth.json"),
            selected: Some(vec!["openai".to_string()]),
        };

        let output = formatter.format_switch_report(&report);

        assert!(output.contains("no changes"));
        assert!(output.contains("Backup: skipped"));
        assert!(output.contains("Applied services: openai"));
    }

    #[test]
    fn test_status_missing_auth_file() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_status(
            std::path::Path::new("/data/auth.json"),
            None,
            None,
            None,
            &[],
        );
        assert!(output.contains("(missing)"));
        assert!(output.contains("Current preset: none"));
    }

    #[test]
    fn test_status_drift_note() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_status(
            std::path::Path::new("/data/auth.json"),
            None,
            None,
            Some("work"),
            &[],
        );
        assert!(output.contains("Last selected: work"));
        assert!(output.contains("drifted"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use chrono::{DateTime, Utc};
    use opm_core::{
        Origin, Preset, PresetMeta, ProviderKind, QuotaRecord, QuotaStatus, QuotaWindow,
        ServiceDiff, TokenRecord,
    };
    use opm_quota::{QuotaReport, UniqueToken};
    use opm_store::SwitchReport;
    use std::path::PathBuf;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_200_000, 0).unwrap()
    }

    #[test]
    fn test_format_pretty_json() {
        let formatter = JsonFormatter::new(true);

        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();

        // Pretty output should have newlines
        assert!(output.contains("\n"));
        assert!(output.contains("  ")); // Indentation
    }

    #[test]
    fn test_format_compact_json() {
        let formatter = JsonFormatter::new(false);

        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();

        assert_eq!(output, r#"{"key":"value"}"#);
    }

    #[test]
    fn test_quota_report_shape() {
        let formatter = JsonFormatter::new(false);

        let token = UniqueToken {
            record: TokenRecord::new(ProviderKind::Openai).with_access("tok"),
            origins: vec![Origin::ActiveFile],
        };
        let record = QuotaRecord::ok(ProviderKind::Openai)
            .with_daily(QuotaWindow::new(70, None));
        let report = QuotaReport::build(vec![(token, vec![record])], now());

        let output = formatter.format_quota_report(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(parsed.get("generatedAt").is_some());
        assert_eq!(parsed["failures"], 0);
        let entry = &parsed["entries"][0];
        assert_eq!(entry["originKind"], "active");
        assert_eq!(entry["provider"], "openai");
        assert_eq!(entry["daily"]["remainingPercent"], 70);
        assert_eq!(entry["status"], "ok");
        assert!(entry.get("error").is_none());
    }

    #[test]
    fn test_quota_failed_entry_carries_error() {
        let formatter = JsonFormatter::new(false);

        let token = UniqueToken {
            record: TokenRecord::new(ProviderKind::Openai).with_access("tok"),
            origins: vec![Origin::Preset("work".to_string())],
        };
        let record = QuotaRecord::new(ProviderKind::Openai, QuotaStatus::failed("timeout"));
        let report = QuotaReport::build(vec![(token, vec![record])], now());

        let output = formatter.format_quota_report(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["failures"], 1);
        let entry = &parsed["entries"][0];
        assert_eq!(entry["originKind"], "preset");
        assert_eq!(entry["origin"], "work");
        assert_eq!(entry["status"], "failed");
        assert_eq!(entry["error"], "timeout");
    }

    #[test]
    fn test_presets_output() {
        let formatter = JsonFormatter::new(false);

        let mut meta = PresetMeta::default();
        meta.services = vec!["openai".to_string()];
        let presets = vec![Preset::new("work", meta, true)];

        let output = formatter.format_presets(&presets).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(parsed.is_array());
        assert_eq!(parsed[0]["name"], "work");
        assert_eq!(parsed[0]["current"], true);
        assert_eq!(parsed[0]["watchedServices"][0], "openai");
    }

    #[test]
    fn test_switch_output_keys() {
        let formatter = JsonFormatter::new(false);

        let report = SwitchReport {
            preset: "work".to_string(),
            diff: ServiceDiff {
                added: vec!["google".to_string()],
                removed: vec![],
                modified: vec![],
                unchanged: vec![],
            },
            backup: Some("before_work_20260101_120000.json".to_string()),
            source: PathBuf::from("/store/presets/work.json"),
            destination: PathBuf::from("/data/auth.json"),
            selected: None,
        };

        let output = formatter.format_switch_report(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["preset"], "work");
        assert_eq!(parsed["added"][0], "google");
        assert_eq!(parsed["backup"], "before_work_20260101_120000.json");
        assert_eq!(parsed["destination"], "/data/auth.json");
        assert!(parsed.get("selected").is_none());
    }

    #[test]
    fn test_status_output_keys() {
        let formatter = JsonFormatter::new(false);

        let output = formatter
            .format_status(
                std::path::Path::new("/data/auth.json"),
                None,
                None,
                Some("work"),
                &[],
            )
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["authPath"], "/data/auth.json");
        assert_eq!(parsed["authFilePresent"], false);
        assert_eq!(parsed["lastSelected"], "work");
        assert!(parsed.get("detectedPreset").is_none());
    }
}

// ============================================================================
// Output Snapshot Tests (for regression testing)
// ============================================================================

#[cfg(test)]
mod output_snapshot_tests {
    use super::super::text::TextFormatter;
    use chrono::{DateTime, Utc};
    use opm_core::{Origin, ProviderKind, QuotaRecord, QuotaWindow, TokenRecord};
    use opm_quota::{QuotaReport, UniqueToken};

    #[test]
    fn test_progress_bar_width_consistency() {
        let formatter = TextFormatter::new(false);

        // All progress bars should have the same width
        for percent in [0.0, 25.0, 50.0, 75.0, 100.0] {
            let bar = formatter.progress_bar(percent);
            let char_count: usize = bar.chars().count();
            assert_eq!(char_count, 10, "Bar for {}% has {} chars", percent, char_count);
        }
    }

    #[test]
    fn test_quota_text_without_colors_has_no_ansi() {
        let formatter = TextFormatter::new(false);

        let now: DateTime<Utc> = DateTime::from_timestamp(1_767_200_000, 0).unwrap();
        let token = UniqueToken {
            record: TokenRecord::new(ProviderKind::Openai).with_access("tok"),
            origins: vec![Origin::ActiveFile],
        };
        let record = QuotaRecord::ok(ProviderKind::Openai)
            .with_daily(QuotaWindow::new(15, None));
        let report = QuotaReport::build(vec![(token, vec![record])], now);

        let output = formatter.format_quota_report(&report, now);
        assert!(!output.contains('\x1b'), "Plain output must not carry ANSI codes");
    }
}
