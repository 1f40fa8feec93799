use super::resolve_config;
use crate::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use gofmts_config::discover_files;
use gofmts_engine::{Engine, Issue};
use std::path::PathBuf;
use std::process;

pub async fn run(
    config_path: Option<PathBuf>,
    paths: Vec<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let engine = Engine::new(&config);
    let files = discover_files(&config, &paths).context("Failed to collect files")?;

    let mut total_issues = 0;
    let mut total_errors = 0;

    for path in &files {
        let file_path = path.display().to_string();

        let source = match tokio::fs::read_to_string(path).await {
            Ok(source) => source,
            Err(e) => {
                total_errors += 1;
                print_error(format, &file_path, &format!("Failed to read file: {e}"));
                continue;
            }
        };

        match engine.check(&source) {
            Ok(report) => {
                total_issues += report.issues.len();
                for issue in &report.issues {
                    match format {
                        OutputFormat::Human => println!("{}", human_issue(&file_path, issue)),
                        OutputFormat::Json => println!("{}", json_issue(&file_path, issue)),
                    }
                }
            }
            Err(e) => {
                total_errors += 1;
                print_error(format, &file_path, &e.to_string());
            }
        }
    }

    // Summary
    if matches!(format, OutputFormat::Human) {
        if total_issues == 0 && total_errors == 0 {
            println!(
                "{}",
                format!("✓ No issues in {} file(s)", files.len()).green().bold()
            );
        } else {
            println!();
            if total_issues > 0 {
                println!("{}", format!("Found {total_issues} issue(s)").yellow());
            }
            if total_errors > 0 {
                println!("{}", format!("{total_errors} file(s) could not be checked").red());
            }
        }
    }

    if total_issues > 0 || total_errors > 0 {
        process::exit(1);
    }

    Ok(())
}

fn print_error(format: OutputFormat, file_path: &str, message: &str) {
    match format {
        OutputFormat::Human => eprintln!("{} {file_path}: {message}", "✗".red()),
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({ "file": file_path, "error": message })
        ),
    }
}

fn human_issue(file_path: &str, issue: &Issue) -> String {
    let position = issue.position();
    let location = format!("{file_path}:{}:{}:", position.line, position.column);
    let details = if issue.replacement().is_some() {
        issue.details().yellow()
    } else {
        issue.details().red()
    };
    format!("{} {details}", location.bold())
}

fn json_issue(file_path: &str, issue: &Issue) -> serde_json::Value {
    let position = issue.position();
    serde_json::json!({
        "file": file_path,
        "line": position.line,
        "column": position.column,
        "code": issue.code(),
        "message": issue.details(),
        "fixable": issue.replacement().is_some(),
    })
}
