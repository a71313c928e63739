//! Demo Board
//!
//! Fills an empty database with a small board to click around in.

use crate::domain::{Container, DomainResult, Item};
use super::{ContainerRepository, ItemRepository, Repository};

const DEMO_BOARD: &[(&str, &[&str])] = &[
    ("To do", &["Briefing", "Wireframes"]),
    ("Doing", &["Landing page"]),
    ("Done", &[]),
];

/// Create the demo board. Returns false (and writes nothing) if any
/// container already exists.
pub async fn seed_demo_board(
    containers: &ContainerRepository,
    items: &ItemRepository,
) -> DomainResult<bool> {
    if !containers.list().await?.is_empty() {
        log::info!("board not empty, skipping demo seed");
        return Ok(false);
    }

    for (name, titles) in DEMO_BOARD {
        let container = containers.create(&Container::new(*name)).await?;
        for title in titles.iter() {
            items.create(&Item::new(container.id, *title)).await?;
        }
    }
    log::info!("seeded demo board with {} containers", DEMO_BOARD.len());
    Ok(true)
}
