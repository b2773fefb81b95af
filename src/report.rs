use chrono::{Datelike, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{format_hours_with_format, TeamMember};
use crate::config::TimeFormat;
use crate::schedule::{DateWindow, Granularity, UtilizationReport};

#[derive(Serialize)]
pub struct WindowReport {
    pub window_start: String,
    pub window_end: String,
    pub exported_at: String,
    pub capacity_hours_per_day: f64,
    pub team_average_percent: f64,
    pub members: Vec<MemberReport>,
}

#[derive(Serialize)]
pub struct MemberReport {
    pub member_id: String,
    pub member_name: String,
    pub average_percent: f64,
    pub days: Vec<DayReport>,
}

#[derive(Serialize)]
pub struct DayReport {
    pub date: String,
    pub hours: f64,
    pub hours_display: String,
    pub utilization_percent: f64,
    pub is_time_off: bool,
    pub is_weekend: bool,
}

fn report_filename(window: &DateWindow) -> String {
    match window.granularity {
        Granularity::Day => format!("utilization-{}.json", window.anchor.format("%Y-%m-%d")),
        Granularity::Week => {
            let iso_week = window.anchor.iso_week();
            format!("utilization-{}-W{:02}.json", iso_week.year(), iso_week.week())
        }
        Granularity::Month => format!("utilization-{}.json", window.anchor.format("%Y-%m")),
    }
}

/// Export the window's utilization report to a JSON file in `out_dir`.
/// Returns the path of the created file on success.
pub fn export_utilization(
    report: &UtilizationReport,
    roster: &[TeamMember],
    window: &DateWindow,
    capacity_hours_per_day: f64,
    time_format: TimeFormat,
    out_dir: &Path,
) -> Result<PathBuf, String> {
    fs::create_dir_all(out_dir)
        .map_err(|e| format!("Failed to create report directory: {}", e))?;

    let file_path = out_dir.join(report_filename(window));

    let members = report
        .members
        .iter()
        .map(|member| {
            let member_name = roster
                .iter()
                .find(|m| m.id == member.member_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| member.member_id.clone());

            MemberReport {
                member_id: member.member_id.clone(),
                member_name,
                average_percent: member.average_percent,
                days: member
                    .days
                    .iter()
                    .map(|day| DayReport {
                        date: day.date.format("%Y-%m-%d").to_string(),
                        hours: day.hours,
                        hours_display: format_hours_with_format(day.hours, time_format),
                        utilization_percent: day.utilization_percent,
                        is_time_off: day.is_time_off,
                        is_weekend: day.is_weekend,
                    })
                    .collect(),
            }
        })
        .collect();

    let log = WindowReport {
        window_start: window.start.format("%Y-%m-%d").to_string(),
        window_end: window.end.format("%Y-%m-%d").to_string(),
        exported_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        capacity_hours_per_day,
        team_average_percent: report.team_average_percent,
        members,
    };

    let json = serde_json::to_string_pretty(&log)
        .map_err(|e| format!("Failed to serialize: {}", e))?;
    fs::write(&file_path, json).map_err(|e| format!("Failed to write file: {}", e))?;

    Ok(file_path)
}
