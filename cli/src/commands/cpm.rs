use colored::Colorize;
use comfy_table::Table;
use formwork_pm::{expand, CpmAnalyzer, RonProjectLoader};
use std::path::Path;

pub fn execute_cpm(project: &Path) -> anyhow::Result<()> {
    let input = RonProjectLoader::load(project)?;
    let expansion = expand(&input)?;

    let mut cpm = CpmAnalyzer::new();
    cpm.forward_pass(&expansion.tasks)?;
    cpm.backward_pass()?;

    let critical_path: std::collections::HashSet<String> = cpm.critical_path().into_iter().collect();

    let mut table = Table::new();
    table.set_header(vec!["Task", "ES", "EF", "LS", "LF", "Float", "Critical"]);
    for id in expansion.tasks.keys() {
        let es = cpm.early_start(id).unwrap_or(0.0);
        let ef = cpm.early_finish(id).unwrap_or(0.0);
        let ls = cpm.late_start(id).unwrap_or(0.0);
        let lf = cpm.late_finish(id).unwrap_or(0.0);
        let float = cpm.float(id).unwrap_or(0.0);
        let is_critical = critical_path.contains(id);
        let row = vec![
            id.clone(),
            format!("{es:.1}"),
            format!("{ef:.1}"),
            format!("{ls:.1}"),
            format!("{lf:.1}"),
            format!("{float:.1}"),
            if is_critical { "yes".red().to_string() } else { "no".to_string() },
        ];
        table.add_row(row);
    }
    println!("{table}");
    println!("project duration: {} days", cpm.project_duration().to_string().green());

    let paths = cpm.critical_paths();
    println!("critical path: {}", paths.iter().max_by_key(|p| p.len()).cloned().unwrap_or_default().join(" -> "));
    if paths.len() > 1 {
        println!("{} critical paths total:", paths.len());
        for path in &paths {
            println!("  {}", path.join(" -> "));
        }
    }

    Ok(())
}
