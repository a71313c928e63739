//! Kanban Reorder Backend
//!
//! Layered architecture:
//! - domain: Core entities and errors
//! - repository: SQLite access and position primitives
//! - service: Atomic item and container moves
//! - commands: Request validation and method routing
//! - transport: JSON-lines front end

use std::path::PathBuf;

pub mod commands;
pub mod config;
pub mod domain;
pub mod repository;
pub mod service;
pub mod transport;

use config::Config;
use domain::DomainResult;
use repository::{init_db, ContainerRepository, DbState, ItemRepository};
use service::ReorderService;

/// Application state shared across commands
pub struct AppState {
    pub db_path: PathBuf,
    pub containers: ContainerRepository,
    pub items: ItemRepository,
    pub reorder: ReorderService,
}

impl AppState {
    pub fn new(db_state: DbState, db_path: PathBuf) -> Self {
        let conn = db_state.connection();
        Self {
            containers: ContainerRepository::new(conn.clone()),
            items: ItemRepository::new(conn),
            reorder: ReorderService::new(db_state),
            db_path,
        }
    }

    /// Open (and migrate) the configured database, seeding it if asked
    pub async fn open(config: &Config) -> DomainResult<Self> {
        let db_path = config.database.path.clone();
        let db_state = init_db(&db_path, config.database.busy_timeout()).await?;
        let state = Self::new(db_state, db_path);

        if config.seed_demo {
            repository::seed_demo_board(&state.containers, &state.items).await?;
        }
        Ok(state)
    }
}
