use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;
use field_reorder::config::Config;
use field_reorder::replay::{run_script, ReplayReport, ReplayScript};

fn print_usage() {
    println!("{}", "drag_replay - replay scripted header drags".bold());
    println!();
    println!("Usage: drag_replay <script.json> [--json] [--verbose] [--default-settings]");
    println!();
    println!("  {}              - print the report as JSON only", "--json".green());
    println!("  {}           - dump the engine log after the table", "--verbose".green());
    println!("  {}  - ignore ~/.config/field-reorder/config.toml", "--default-settings".green());
}

fn print_report(report: &ReplayReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["#", "step", "consumed", "placeholder", "scroll", "ticks"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for (idx, trace) in report.steps.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            trace.step.clone(),
            trace.consumed.to_string(),
            trace
                .placeholder
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            trace.scroll_offset.to_string(),
            trace.ticks.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("{} {}", "Final order:".bold(), report.final_order.join(", "));
    println!("{} {:?}", "Selection:".bold(), report.selection);

    for moved in &report.moves {
        println!(
            "{} {:?} {} -> {} (len {})",
            "Moved".green(),
            moved.field_names,
            moved.from,
            moved.to,
            moved.length
        );
    }
    println!(
        "{} {} move(s), {} drag(s) ended, undo depth {}, redo depth {}",
        "Summary:".bold(),
        report.moves.len(),
        report.drags_ended,
        report.undo_depth,
        report.redo_depth
    );
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let Some(script_path) = args.iter().skip(1).find(|a| !a.starts_with("--")) else {
        print_usage();
        std::process::exit(2);
    };

    let log_buffer = field_reorder::logging::init_tracing();

    let settings = if args.contains(&"--default-settings".to_string()) {
        Config::default().engine_settings()
    } else {
        Config::load()
            .context("Failed to load configuration")?
            .engine_settings()
    };

    let script = ReplayScript::from_path(script_path)?;
    let report = run_script(&script, settings)?;

    if args.contains(&"--json".to_string()) {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);

    if args.contains(&"--verbose".to_string()) {
        println!();
        for entry in log_buffer.get_recent(log_buffer.len()) {
            println!("{}", entry.format_for_display());
        }
    }

    Ok(())
}
