//! Item Commands
//!
//! CRUD plus the move operation, as exposed over the transport.

use crate::domain::{DomainResult, Item};
use crate::repository::Repository;
use crate::AppState;
use super::request::{CreateItemArgs, MoveItemRequest, UpdateItemArgs};

/// Create a new item at the end of its container
pub async fn create_item(state: &AppState, args: CreateItemArgs) -> DomainResult<Item> {
    let args = args.validate()?;
    let mut item = Item::new(args.container_id, args.title);
    item.content = args.content;
    state.items.create(&item).await
}

/// Get item by ID
pub async fn get_item(state: &AppState, id: u32) -> DomainResult<Item> {
    state.items.get(id).await
}

/// Update title and/or content
pub async fn update_item(state: &AppState, args: UpdateItemArgs) -> DomainResult<Item> {
    let args = args.validate()?;
    let existing = get_item(state, args.id).await?;

    let updated = Item {
        title: args.title.unwrap_or(existing.title),
        content: args.content.or(existing.content),
        ..existing
    };
    state.items.update(&updated).await
}

/// Delete item
pub async fn delete_item(state: &AppState, id: u32) -> DomainResult<()> {
    state.items.delete(id).await
}

/// Move item to a container at an index
pub async fn move_item(state: &AppState, req: MoveItemRequest) -> DomainResult<Item> {
    let cmd = req.validate()?;
    state.reorder.move_item(&cmd).await
}
