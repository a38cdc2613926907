use colored::Colorize;
use comfy_table::Table;
use formwork_core::utils;
use formwork_pm::{expand, RonProjectLoader};
use std::path::Path;

pub fn execute_expand(project: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let input = RonProjectLoader::load(project)?;
    let result = expand(&input)?;

    let mut table = Table::new();
    table.set_header(vec!["Task", "Discipline", "Floor", "Zone", "Predecessors"]);
    for task in result.tasks.values() {
        table.add_row(vec![
            task.id.clone(),
            task.discipline.clone(),
            task.floor.to_string(),
            task.zone.clone(),
            task.predecessors.len().to_string(),
        ]);
    }
    println!("{table}");
    println!("{} task instances expanded", result.tasks.len().to_string().green());

    if result.report.has_warnings() {
        println!("\n{}", format!("{} warnings:", result.report.warning_count()).yellow());
        println!("{}", result.report.summary());
    }

    if let Some(out) = out {
        let content = utils::format_ron_pretty(&result.tasks)?;
        utils::write_string_to_file(out, &content)?;
        println!("\nwrote expanded tasks to {}", out.display());
    }

    Ok(())
}
