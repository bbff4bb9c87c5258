//! Client commands.

use tracing::debug;
use vitrine_core::{Client, NewClient};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Clients ordered by name, optionally filtered by a name or phone fragment.
pub async fn list_clients(state: &AppState, query: Option<&str>) -> Vec<Client> {
    let mut clients = state.store.clients().await;
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        let needle = query.to_lowercase();
        let digits: String = query.chars().filter(char::is_ascii_digit).collect();
        clients.retain(|c| {
            c.name.to_lowercase().contains(&needle)
                || (!digits.is_empty() && c.phone.contains(&digits))
        });
    }
    clients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    clients
}

pub async fn get_client(state: &AppState, id: &str) -> ApiResult<Client> {
    state
        .store
        .client(id)
        .await
        .ok_or_else(|| ApiError::not_found("Client", id))
}

pub async fn add_client(state: &AppState, input: NewClient) -> ApiResult<Client> {
    debug!(name = %input.name, "add_client command");
    Ok(state.store.add_client(input).await?)
}

pub async fn update_client(state: &AppState, id: &str, input: NewClient) -> ApiResult<Client> {
    debug!(client_id = %id, "update_client command");
    Ok(state.store.update_client(id, input).await?)
}

pub async fn delete_client(state: &AppState, id: &str) -> ApiResult<()> {
    debug!(client_id = %id, "delete_client command");
    Ok(state.store.delete_client(id).await?)
}
