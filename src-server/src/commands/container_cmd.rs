//! Container Commands

use crate::domain::{BoardColumn, Container, DomainResult};
use crate::repository::Repository;
use crate::AppState;
use super::request::{CreateContainerArgs, MoveContainerRequest, RenameContainerArgs};

/// Full board: containers by order, each with items by order
pub async fn load_board(state: &AppState) -> DomainResult<Vec<BoardColumn>> {
    state.containers.board().await
}

pub async fn create_container(state: &AppState, args: CreateContainerArgs) -> DomainResult<Container> {
    let name = args.validate()?;
    state.containers.create(&Container::new(name)).await
}

pub async fn get_container(state: &AppState, id: u32) -> DomainResult<Container> {
    state.containers.get(id).await
}

pub async fn rename_container(state: &AppState, args: RenameContainerArgs) -> DomainResult<Container> {
    let (id, name) = args.validate()?;
    let existing = get_container(state, id).await?;
    state.containers.update(&Container { name, ..existing }).await
}

/// Delete a container and its items
pub async fn delete_container(state: &AppState, id: u32) -> DomainResult<()> {
    state.containers.delete(id).await
}

/// Move a container to a board position
pub async fn move_container(state: &AppState, req: MoveContainerRequest) -> DomainResult<Container> {
    let cmd = req.validate()?;
    state.reorder.move_container(&cmd).await
}
