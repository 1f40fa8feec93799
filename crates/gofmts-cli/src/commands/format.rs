use super::{issue_line, resolve_config, unresolved};
use anyhow::{bail, Context, Result};
use gofmts_config::discover_files;
use gofmts_engine::Engine;
use std::path::PathBuf;
use std::process;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const STDIN_NAME: &str = "<standard input>";

/// What rewriting one source unit came to
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Unchanged,
    Changed(String),
    /// Lines explaining why nothing was written
    Failed(Vec<String>),
}

fn format_unit(engine: &Engine, name: &str, source: &str) -> Outcome {
    match engine.rewrite(source) {
        Ok(text) if text == source => Outcome::Unchanged,
        Ok(text) => Outcome::Changed(text),
        Err(err) => {
            let lines = unresolved(&err).map_or_else(
                || vec![format!("{name}: {err}")],
                |issues| issues.iter().map(|issue| issue_line(name, issue)).collect(),
            );
            Outcome::Failed(lines)
        }
    }
}

pub async fn run(
    config_path: Option<PathBuf>,
    files: Vec<PathBuf>,
    write: bool,
    set_exit_status: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let engine = Engine::new(&config);

    let mut changed = 0;
    let mut failed = 0;

    if files.is_empty() {
        if write {
            bail!("cannot use -w with standard input");
        }

        let mut source = String::new();
        tokio::io::stdin()
            .read_to_string(&mut source)
            .await
            .context("Failed to read standard input")?;

        let text = match format_unit(&engine, STDIN_NAME, &source) {
            Outcome::Unchanged => source,
            Outcome::Changed(text) => {
                changed += 1;
                text
            }
            Outcome::Failed(lines) => {
                failed += 1;
                report(&lines);
                source
            }
        };
        if failed == 0 {
            emit(&text).await?;
        }
    } else {
        let files = discover_files(&config, &files).context("Failed to collect files")?;
        if files.len() > 1 && !write {
            bail!("formatting {} files requires -w", files.len());
        }

        for path in &files {
            let name = path.display().to_string();
            let source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {name}"))?;

            match format_unit(&engine, &name, &source) {
                Outcome::Unchanged => {
                    if !write {
                        emit(&source).await?;
                    }
                }
                Outcome::Changed(text) => {
                    changed += 1;
                    if write {
                        tracing::info!("Rewriting {name}");
                        tokio::fs::write(path, text)
                            .await
                            .with_context(|| format!("Failed to write {name}"))?;
                    } else {
                        emit(&text).await?;
                    }
                }
                Outcome::Failed(lines) => {
                    failed += 1;
                    report(&lines);
                }
            }
        }
    }

    tracing::debug!(changed, failed, "format finished");

    if failed > 0 || (set_exit_status && changed > 0) {
        process::exit(1);
    }

    Ok(())
}

fn report(lines: &[String]) {
    for line in lines {
        eprintln!("{line}");
    }
}

async fn emit(text: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_source() {
        let outcome = format_unit(&Engine::default(), "main.go", "package main\n");
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_changed_source() {
        let source = "package main\n\nvar a = `1+2` //gofmts:go\n";
        let outcome = format_unit(&Engine::default(), "main.go", source);
        assert_eq!(
            outcome,
            Outcome::Changed("package main\n\nvar a = `1 + 2` //gofmts:go\n".to_string())
        );
    }

    #[test]
    fn test_unresolved_issues_are_listed() {
        let source = "package main\n\n//gofmts:yaml\nvar a = `x: 1`\n";
        let outcome = format_unit(&Engine::default(), "main.go", source);
        assert_eq!(
            outcome,
            Outcome::Failed(vec![
                "main.go:3:1: unknown directive `gofmts:yaml`".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let outcome = format_unit(&Engine::default(), "main.go", "package main\n\nfunc f() {\n");
        let Outcome::Failed(lines) = outcome else {
            panic!("Expected a failure");
        };
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("main.go: Parse error:"));
    }
}
