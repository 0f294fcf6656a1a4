use std::path::Path;

use colored::Colorize;

use crate::cli::Cli;
use crate::error::{Result, UnveilError};
use crate::host::{Request, Response};

pub async fn run(cli: &Cli, page: &Path) -> Result<()> {
    let (mut host, page_id) = super::open_host(page)?;

    let response = host.request(&page_id, Request::DiscoverElements).await?;
    let Response::Discovery(discovery) = response else {
        return Err(UnveilError::Other(
            "unexpected response to DISCOVER_ELEMENTS".to_string(),
        ));
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&discovery)?);
        return Ok(());
    }

    if discovery.total == 0 {
        println!("{} No hidden elements found", "✓".green());
        return Ok(());
    }

    println!(
        "{} {} hidden element(s) found",
        "✓".green(),
        discovery.total
    );
    println!();

    for (category, count) in &discovery.categories {
        println!("{}", format!("{} ({})", category, count).bold());
        for el in discovery
            .elements
            .iter()
            .filter(|el| el.category == *category)
        {
            println!(
                "  {}  {}  {}",
                el.id.cyan(),
                el.selector,
                el.hiding_method.dimmed()
            );
            if !el.preview.is_empty() {
                println!("      {}", el.preview.dimmed());
            }
            if cli.verbose {
                println!(
                    "      {}",
                    format!(
                        "{}x{} | {} buttons, {} inputs, {} links",
                        el.size.width,
                        el.size.height,
                        el.interactivity.buttons,
                        el.interactivity.inputs,
                        el.interactivity.links
                    )
                    .dimmed()
                );
            }
        }
        println!();
    }

    Ok(())
}
