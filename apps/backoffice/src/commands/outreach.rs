//! Outreach lists. Sending is left to the operator's WhatsApp.

use vitrine_core::outreach::OutreachMessage;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn debt_reminders(state: &AppState) -> ApiResult<Vec<OutreachMessage>> {
    Ok(state.store.debt_reminders().await?)
}

pub async fn birthday_messages(state: &AppState) -> ApiResult<Vec<OutreachMessage>> {
    Ok(state.store.birthday_messages().await?)
}
