//! Login and operator management.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::{Identity, Role};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// What the header bar shows for the acting operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub identity: Option<Identity>,
    pub store_name: String,
}

pub async fn login(state: &AppState, email: &str, password: &str) -> ApiResult<Identity> {
    debug!(email = %email, "login command");
    Ok(state.store.login(email, password).await?)
}

/// Logs out and drops the draft cart with it.
pub async fn logout(state: &AppState) {
    debug!("logout command");
    state.store.logout().await;
    state.cart.with_cart_mut(|c| c.clear());
}

pub async fn current_session(state: &AppState) -> SessionInfo {
    SessionInfo {
        identity: state.store.identity().await,
        store_name: state.store.settings().await.store_name,
    }
}

pub async fn list_users(state: &AppState) -> ApiResult<Vec<Identity>> {
    Ok(state.store.list_users().await?)
}

pub async fn create_user(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> ApiResult<Identity> {
    debug!(email = %email, role = role.as_str(), "create_user command");
    if password.chars().count() < 8 {
        return Err(ApiError::validation("Password must have at least 8 characters"));
    }
    Ok(state.store.create_user(name, email, password, role).await?)
}

pub async fn change_role(state: &AppState, user_id: &str, role: Role) -> ApiResult<()> {
    debug!(user_id = %user_id, role = role.as_str(), "change_role command");
    Ok(state.store.change_role(user_id, role).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{app, ADMIN_EMAIL, PASSWORD};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_session_info_follows_login() {
        let (state, _) = app().await;
        let info = current_session(&state).await;
        assert_eq!(info.identity.unwrap().email, ADMIN_EMAIL);
        assert_eq!(info.store_name, "Vitrine Boutique");

        logout(&state).await;
        assert!(current_session(&state).await.identity.is_none());

        let err = login(&state, ADMIN_EMAIL, "errada").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
        login(&state, ADMIN_EMAIL, PASSWORD).await.unwrap();
    }

    #[tokio::test]
    async fn test_short_passwords_are_refused() {
        let (state, _) = app().await;
        let err = create_user(&state, "Caio", "caio@vitrine.local", "123", Role::Seller)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let caio = create_user(&state, "Caio", "caio@vitrine.local", PASSWORD, Role::Seller)
            .await
            .unwrap();
        change_role(&state, &caio.user_id, Role::Manager).await.unwrap();
        let users = list_users(&state).await.unwrap();
        assert!(users
            .iter()
            .any(|u| u.user_id == caio.user_id && u.role == Role::Manager));
    }
}
