use colored::Colorize;
use comfy_table::Table;
use formwork_core::utils;
use formwork_pm::duration::ShiftProfile;
use formwork_pm::report::ScheduleReport;
use formwork_pm::{compute_metrics, expand, schedule, RonProjectLoader};
use std::path::Path;

pub fn execute_schedule(project: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let input = RonProjectLoader::load(project)?;
    let calendar = input.calendar.clone().into_calendar();
    let project_start = calendar.current_date;
    let shift_profile = ShiftProfile::new(input.shift_profile.clone());

    let expansion = expand(&input)?;
    let mut report = ScheduleReport::new();
    let outcome = schedule(
        expansion.tasks,
        &calendar,
        project_start,
        &input.workers,
        &input.equipment,
        &input.acceleration,
        &shift_profile,
        &mut report,
    )?;

    let mut table = Table::new();
    table.set_header(vec!["Task", "Start", "End", "Crews", "Equipment"]);
    for task in outcome.tasks.values() {
        let start = task.earliest_start.map(|d| d.to_string()).unwrap_or_default();
        let end = task.scheduled_end.map(|d| d.to_string()).unwrap_or_default();
        let equipment: Vec<String> =
            task.allocated_equipment.iter().map(|(name, units)| format!("{name}x{units}")).collect();
        table.add_row(vec![task.id.clone(), start, end, task.allocated_crews.to_string(), equipment.join(", ")]);
    }
    println!("{table}");

    let project_end = outcome.tasks.values().filter_map(|t| t.scheduled_end).max();
    if let Some(end) = project_end {
        println!("project finish: {}", end.to_string().green());
    }

    let metrics = compute_metrics(
        &outcome.tasks,
        project_start,
        &calendar,
        &input.workers,
        &input.equipment,
        &outcome.worker_pool,
        &outcome.equipment_pool,
    );
    println!("project duration: {} working days", metrics.project_duration.to_string().green());
    println!("total cost: {}", format!("{:.2}", metrics.total_cost).green());

    let mut util_table = Table::new();
    util_table.set_header(vec!["Resource", "Capacity", "Peak Usage", "Utilization"]);
    for u in metrics.worker_utilization.values().chain(metrics.equipment_utilization.values()) {
        util_table.add_row(vec![
            u.name.clone(),
            u.capacity.to_string(),
            u.peak_concurrent_usage.to_string(),
            format!("{:.0}%", u.utilization * 100.0),
        ]);
    }
    println!("{util_table}");

    if report.has_warnings() {
        println!("\n{}", format!("{} warnings:", report.warning_count()).yellow());
        println!("{}", report.summary());
    }

    if let Some(out) = out {
        let content = utils::format_ron_pretty(&outcome.tasks)?;
        utils::write_string_to_file(out, &content)?;
        println!("\nwrote schedule to {}", out.display());
    }

    Ok(())
}
