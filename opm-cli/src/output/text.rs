//! Text output formatting with progress bars and colors.

use chrono::{DateTime, Utc};
use std::path::Path;

use opm_core::{AuthDocument, Origin, Preset, ProviderKind, QuotaRecord, QuotaStatus, QuotaWindow};
use opm_quota::QuotaReport;
use opm_store::SwitchReport;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    // ========================================================================
    // Quota report
    // ========================================================================

    /// Formats the consolidated quota report, grouped by origin.
    pub fn format_quota_report(&self, report: &QuotaReport, now: DateTime<Utc>) -> String {
        if report.is_empty() {
            return self
                .dim("No OAuth tokens found in the active file, presets, or external accounts.");
        }

        let mut lines = Vec::new();
        lines.push(self.bold("Quota Overview"));
        lines.push("─".repeat(56));

        let mut last_origin: Option<&Origin> = None;
        let mut last_provider: Option<ProviderKind> = None;
        for entry in &report.entries {
            if last_origin != Some(&entry.origin) {
                lines.push(String::new());
                lines.push(self.bold(&entry.origin.label()));
                last_origin = Some(&entry.origin);
                last_provider = None;
            }
            self.push_record_lines(&mut lines, &entry.record, &mut last_provider, now);
        }

        let failures = report.failure_count();
        if failures > 0 {
            lines.push(String::new());
            lines.push(self.dim(&format!(
                "{failures} row{} could not be fetched.",
                if failures == 1 { "" } else { "s" }
            )));
        }

        lines.join("\n")
    }

    /// Appends the lines for one record, emitting a provider header when the
    /// provider changes within an origin group.
    fn push_record_lines(
        &self,
        lines: &mut Vec<String>,
        record: &QuotaRecord,
        last_provider: &mut Option<ProviderKind>,
        now: DateTime<Utc>,
    ) {
        if *last_provider != Some(record.provider) {
            let mut header = format!("  {}", record.provider.display_name());
            if let Some(account) = &record.account {
                header.push_str(&format!(" {}", self.dim(&format!("({account})"))));
            }
            lines.push(header);
            *last_provider = Some(record.provider);
        }

        match &record.status {
            QuotaStatus::Ok => {
                if let Some(tier) = &record.tier {
                    if let Some(daily) = &record.daily {
                        lines.push(self.window_line(tier, daily, now));
                    }
                } else {
                    if let Some(daily) = &record.daily {
                        lines.push(self.window_line("Daily", daily, now));
                    }
                    if let Some(weekly) = &record.weekly {
                        lines.push(self.window_line("Weekly", weekly, now));
                    }
                }
            }
            QuotaStatus::Unauthorized => {
                lines.push(format!("    {}", self.red("unauthorized (reauthenticate)")));
            }
            QuotaStatus::RateLimited => {
                // A 429 can still carry figures (the endpoint reports the
                // exhausted window); show them under the status line.
                lines.push(format!("    {}", self.yellow("rate-limited")));
                if let Some(daily) = &record.daily {
                    lines.push(self.window_line("Daily", daily, now));
                }
                if let Some(weekly) = &record.weekly {
                    lines.push(self.window_line("Weekly", weekly, now));
                }
            }
            QuotaStatus::Failed { detail } => {
                lines.push(format!("    {}", self.red(&format!("failed: {detail}"))));
            }
        }
    }

    /// Formats one usage window row with progress bar and reset countdown.
    fn window_line(&self, label: &str, window: &QuotaWindow, now: DateTime<Utc>) -> String {
        let remaining = f64::from(window.remaining_percent);
        let bar = self.progress_bar(remaining);
        let pct = self.color_for_percent(
            remaining,
            &format!("{:>3}% left", window.remaining_percent),
        );

        let mut line = format!("    {:<8} {} {}", format!("{label}:"), bar, pct);

        let countdown = window.countdown(now);
        if countdown != "-" {
            line.push_str(&format!("  {}", self.dim(&format!("resets {countdown}"))));
        }
        line
    }

    /// Formats a progress bar.
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        let filled = ((percent_remaining / 100.0) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    // ========================================================================
    // Presets
    // ========================================================================

    /// Formats the preset listing as a table.
    pub fn format_preset_list(&self, presets: &[Preset]) -> String {
        if presets.is_empty() {
            return self.dim("No presets saved. Run `opm save <name>` to create one.");
        }

        let mut lines = Vec::new();
        lines.push(format!(
            "  {:<18} {:<24} {}",
            self.bold("Name"),
            self.bold("Services"),
            self.bold("Description")
        ));

        for preset in presets {
            lines.push(self.format_preset_line(preset));
        }
        lines.join("\n")
    }

    /// Formats a single preset row. The current preset is marked with `*`.
    fn format_preset_line(&self, preset: &Preset) -> String {
        let marker = if preset.is_current {
            self.green("*")
        } else {
            " ".to_string()
        };

        let services = if preset.meta.services.is_empty() {
            self.dim("(empty)")
        } else {
            preset.meta.services.join(", ")
        };

        format!(
            "{marker} {:<18} {:<24} {}",
            preset.name,
            services,
            self.dim(&preset.meta.description)
        )
    }

    /// Formats the detail view for one preset.
    pub fn format_preset_info(&self, preset: &Preset, document: &AuthDocument) -> String {
        let mut lines = Vec::new();

        let title = if preset.is_current {
            format!("{} {}", self.bold(&preset.name), self.green("(current)"))
        } else {
            self.bold(&preset.name)
        };
        lines.push(title);
        lines.push("─".repeat(40));

        if !preset.meta.description.is_empty() {
            lines.push(format!("Description: {}", preset.meta.description));
        }
        let services: Vec<&str> = document.services().collect();
        lines.push(format!(
            "Services:    {}",
            if services.is_empty() {
                self.dim("(none)")
            } else {
                services.join(", ")
            }
        ));
        lines.push(format!(
            "Watched:     {}",
            self.cyan(&preset.meta.watched_services.join(", "))
        ));
        if let Some(created) = preset.meta.created_at {
            lines.push(format!("Saved:       {}", self.format_timestamp(created)));
        }
        if let Some(used) = preset.meta.last_used {
            lines.push(format!("Last used:   {}", self.format_timestamp(used)));
        }

        lines.join("\n")
    }

    // ========================================================================
    // Switch
    // ========================================================================

    /// Formats the result of a completed switch: per-service diff lines,
    /// then the backup written before the replace.
    pub fn format_switch_report(&self, report: &SwitchReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Switched to {}", self.bold(&report.preset)));
        if let Some(selected) = &report.selected {
            lines.push(format!(
                "Applied services: {}",
                self.cyan(&selected.join(", "))
            ));
        }

        for service in &report.diff.added {
            lines.push(format!("  {} {service}", self.green("+")));
        }
        for service in &report.diff.removed {
            lines.push(format!("  {} {service}", self.red("-")));
        }
        for service in &report.diff.modified {
            lines.push(format!("  {} {service}", self.yellow("~")));
        }
        for service in &report.diff.unchanged {
            lines.push(format!("  {} {service}", self.dim("=")));
        }
        if report.diff.is_noop() {
            lines.push(self.dim("  no changes (active file already matched)"));
        }

        if let Some(backup) = &report.backup {
            lines.push(format!("Backup: {}", self.dim(backup)));
        } else {
            lines.push(self.dim("Backup: skipped"));
        }

        lines.join("\n")
    }

    // ========================================================================
    // Status overview
    // ========================================================================

    /// Formats the no-subcommand status overview.
    pub fn format_status(
        &self,
        auth_path: &Path,
        active: Option<&AuthDocument>,
        detected: Option<&str>,
        selected: Option<&str>,
        presets: &[Preset],
    ) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("opm status"));
        lines.push("─".repeat(56));

        match active {
            Some(document) => {
                let services: Vec<&str> = document.services().collect();
                lines.push(format!(
                    "Active file: {} {}",
                    auth_path.display(),
                    self.dim(&format!(
                        "({} service{}: {})",
                        services.len(),
                        if services.len() == 1 { "" } else { "s" },
                        services.join(", ")
                    ))
                ));
            }
            None => {
                lines.push(format!(
                    "Active file: {} {}",
                    auth_path.display(),
                    self.yellow("(missing)")
                ));
            }
        }

        match (detected, selected) {
            (Some(name), _) => {
                lines.push(format!("Current preset: {}", self.green(name)));
            }
            (None, Some(name)) => {
                lines.push(format!(
                    "Last selected: {} {}",
                    name,
                    self.yellow("(active file has drifted)")
                ));
            }
            (None, None) => {
                lines.push(format!("Current preset: {}", self.dim("none")));
            }
        }

        lines.push(String::new());
        lines.push(self.format_preset_list(presets));

        lines.join("\n")
    }

    fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        ts.format("%Y-%m-%d %H:%M UTC").to_string()
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent < 20.0 {
            self.red(text)
        } else if percent < 50.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        if self.use_colors {
            format!("{GREEN}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn yellow(&self, text: &str) -> String {
        if self.use_colors {
            format!("{YELLOW}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn red(&self, text: &str) -> String {
        if self.use_colors {
            format!("{RED}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn cyan(&self, text: &str) -> String {
        if self.use_colors {
            format!("{CYAN}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}
