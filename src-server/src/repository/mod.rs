//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod container_repo;
mod item_repo;
pub(crate) mod positioning;
mod seed;


pub use traits::Repository;
pub use db::{init_db, DbState};
pub use container_repo::ContainerRepository;
pub use item_repo::ItemRepository;
pub use seed::seed_demo_board;

pub(crate) use db::now_millis;
pub(crate) use container_repo::{containers_on_board, container_exists, fetch_container};
pub(crate) use item_repo::{fetch_item, items_in_container};
