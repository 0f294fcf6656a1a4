use std::path::Path;

use colored::Colorize;

use crate::cli::Cli;
use crate::error::{Result, UnveilError};
use crate::host::{Request, Response};

pub async fn run(cli: &Cli, page: &Path, id: &str) -> Result<()> {
    let (mut host, page_id) = super::open_host(page)?;

    let response = host.request(&page_id, Request::DiscoverElements).await?;
    let Response::Discovery(discovery) = response else {
        return Err(UnveilError::Other(
            "unexpected response to DISCOVER_ELEMENTS".to_string(),
        ));
    };

    let element = discovery
        .elements
        .iter()
        .find(|el| el.id == id)
        .ok_or_else(|| UnveilError::ElementNotFound(id.to_string()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(element)?);
        return Ok(());
    }

    println!("{}", element.id.cyan().bold());
    println!("  Category:  {}", element.category);
    println!("  Selector:  {}", element.selector);
    println!("  Hidden by: {}", element.hiding_method);
    println!(
        "  Size:      {}x{}",
        element.size.width, element.size.height
    );
    println!(
        "  Contains:  {} buttons, {} inputs, {} links, {} clickable",
        element.interactivity.buttons,
        element.interactivity.inputs,
        element.interactivity.links,
        element.interactivity.clickable
    );
    if !element.preview.is_empty() {
        println!("  Preview:   {}", element.preview.dimmed());
    }

    Ok(())
}
