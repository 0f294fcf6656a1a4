use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::Cli;
use crate::error::{Result, UnveilError};
use crate::host::{Request, Response};
use crate::page::PageCapture;

pub async fn run(
    cli: &Cli,
    page: &Path,
    id: Option<&str>,
    all: bool,
    restore: bool,
    out: Option<&Path>,
) -> Result<()> {
    if id.is_none() && !all {
        return Err(UnveilError::Other(
            "pass --id <element-id> or --all".to_string(),
        ));
    }

    let (mut host, page_id) = super::open_host(page)?;

    // Populate the scan generation first; reveal operates on its ids.
    let response = host.request(&page_id, Request::DiscoverElements).await?;
    let Response::Discovery(discovery) = response else {
        return Err(UnveilError::Other(
            "unexpected response to DISCOVER_ELEMENTS".to_string(),
        ));
    };

    let reveal_payload = if all {
        let spinner = progress_spinner(cli, "Revealing elements...");
        let response = host.request(&page_id, Request::RevealAll).await?;
        spinner.finish_and_clear();

        let Response::RevealSummary(summary) = response else {
            return Err(UnveilError::Other(
                "unexpected response to REVEAL_ALL".to_string(),
            ));
        };

        if !cli.json {
            println!(
                "{} Revealed {}/{} element(s){}",
                "✓".green(),
                summary.successful,
                summary.total,
                if summary.failed > 0 {
                    format!(" ({} failed)", summary.failed).yellow().to_string()
                } else {
                    String::new()
                }
            );
        }
        serde_json::to_value(summary)?
    } else {
        let element_id = id.expect("checked above").to_string();
        let response = host
            .request(
                &page_id,
                Request::RevealElement {
                    element_id: element_id.clone(),
                },
            )
            .await?;

        let Response::Reveal(outcome) = response else {
            return Err(UnveilError::Other(
                "unexpected response to REVEAL_ELEMENT".to_string(),
            ));
        };

        if !cli.json {
            if outcome.success {
                println!("{} Revealed {}", "✓".green(), element_id.cyan());
            } else {
                match &outcome.error {
                    Some(error) => println!("{} {}", "!".yellow(), error),
                    None => println!(
                        "{} No reveal strategy worked for {}",
                        "!".yellow(),
                        element_id.cyan()
                    ),
                }
            }
        }
        serde_json::to_value(outcome)?
    };

    let restore_payload = if restore {
        let request = if all {
            Request::RestoreAll
        } else {
            Request::RestoreElement {
                element_id: id.expect("checked above").to_string(),
            }
        };
        let response = host.request(&page_id, request).await?;
        let payload = match response {
            Response::RestoreSummary(summary) => {
                if !cli.json {
                    println!(
                        "{} Restored {}/{} element(s)",
                        "✓".green(),
                        summary.restored,
                        summary.total
                    );
                }
                serde_json::to_value(summary)?
            }
            Response::Restore(outcome) => {
                if !cli.json {
                    if outcome.success {
                        println!("{} Restored original presentation", "✓".green());
                    } else if let Some(error) = &outcome.error {
                        println!("{} {}", "!".yellow(), error);
                    }
                }
                serde_json::to_value(outcome)?
            }
            _ => {
                return Err(UnveilError::Other(
                    "unexpected response to restore request".to_string(),
                ))
            }
        };
        Some(payload)
    } else {
        None
    };

    if let Some(out) = out {
        let doc = host.detach(&page_id).await?;
        PageCapture::from_document(&doc).save(out)?;
        if !cli.json {
            println!(
                "{} Wrote page capture: {}",
                "✓".green(),
                out.display().to_string().dimmed()
            );
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "discovered": discovery.total,
                "reveal": reveal_payload,
                "restore": restore_payload,
            }))?
        );
    }

    Ok(())
}

fn progress_spinner(cli: &Cli, message: &'static str) -> ProgressBar {
    if cli.json {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static template is valid"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
