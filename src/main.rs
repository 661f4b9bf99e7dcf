use crossterm::style::Stylize;
use field_reorder::config::Config;
use field_reorder::ui::reorder_demo::run_reorder_demo;
use std::io;

fn print_help() {
    println!("{}", "Field Reorder".bold());
    println!();
    println!("Usage: field-reorder [FILE.csv]");
    println!();
    println!("  {} - Write a commented config file", "--generate-config".green());
    println!("  {}            - Show this help", "--help".green());
    println!();
    println!("Drag header cells with the mouse to reorder fields. Hold the pointer");
    println!("near either edge to scroll. Esc cancels a drag, u/r undo and redo.");
    println!("Without a file a built-in sample grid is shown.");
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_help();
        return Ok(());
    }

    // Check for config file generation
    if args.contains(&"--generate-config".to_string()) {
        match Config::get_config_path() {
            Ok(path) => {
                let config_content = Config::create_default_with_comments();
                if let Some(parent) = path.parent() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        eprintln!("Error creating config directory: {}", e);
                        std::process::exit(1);
                    }
                }
                if let Err(e) = std::fs::write(&path, config_content) {
                    eprintln!("Error writing config file: {}", e);
                    std::process::exit(1);
                }
                println!("Configuration file created at: {:?}", path);
                println!("Edit this file to tune drag and autoscroll behavior.");
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error determining config path: {}", e);
                std::process::exit(1);
            }
        }
    }

    field_reorder::logging::init_tracing();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: could not load config ({}), using defaults", e);
            Config::default()
        }
    };

    let data_file = args
        .iter()
        .skip(1)
        .find(|arg| !arg.starts_with("--") && arg.ends_with(".csv"))
        .cloned();

    if let Err(e) = run_reorder_demo(data_file.as_deref(), config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
