//! `dailyfetch sources`: show parsed source lists.

use anyhow::Result;
use dailyfetch_core::sources::load_sources;
use std::path::Path;

pub fn run_sources(channels: &Path, playlists: &Path) -> Result<()> {
    let sources = load_sources(channels, playlists)?;
    if sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }
    println!("{:<9} {:<36} {:<24} {}", "KIND", "CONTAINER", "KEYWORDS", "LABEL");
    for s in sources {
        let keywords = if s.keywords.is_empty() {
            "-".to_string()
        } else {
            s.keywords.join(",")
        };
        println!(
            "{:<9} {:<36} {:<24} {}",
            s.kind.as_str(),
            s.container_id,
            keywords,
            s.label
        );
    }
    Ok(())
}
