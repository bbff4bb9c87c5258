//! # Permission Policy
//!
//! One table, role × action, checked once at the action boundary.
//!
//! ```text
//!                        SELLER  MANAGER  ADMIN
//!   manage clients         ✔        ✔       ✔
//!   record sale / bag      ✔        ✔       ✔
//!   record payment         ✔        ✔       ✔
//!   settle bag             ✔        ✔       ✔
//!   operate register       ✔        ✔       ✔
//!   supply / bleed         ✔        ✔       ✔
//!   manage products                 ✔       ✔
//!   manage expenses                 ✔       ✔
//!   view reports                    ✔       ✔
//!   delete records                  ✔       ✔
//!   change roles                            ✔
//!   update settings                         ✔
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Role;

/// Everything the action surface can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Action {
    ManageClients,
    DeleteClient,
    ManageProducts,
    DeleteProduct,
    RecordSale,
    RecordPayment,
    SettleBag,
    ManageExpenses,
    DeleteExpense,
    OperateRegister,
    RecordCashMovement,
    ViewReports,
    ChangeRoles,
    UpdateSettings,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ManageClients => "manage clients",
            Action::DeleteClient => "delete clients",
            Action::ManageProducts => "manage products",
            Action::DeleteProduct => "delete products",
            Action::RecordSale => "record sales",
            Action::RecordPayment => "record payments",
            Action::SettleBag => "settle bags",
            Action::ManageExpenses => "manage expenses",
            Action::DeleteExpense => "delete expenses",
            Action::OperateRegister => "open or close the register",
            Action::RecordCashMovement => "record cash movements",
            Action::ViewReports => "view reports",
            Action::ChangeRoles => "change user roles",
            Action::UpdateSettings => "update store settings",
        }
    }
}

const SELLER: &[Action] = &[
    Action::ManageClients,
    Action::RecordSale,
    Action::RecordPayment,
    Action::SettleBag,
    Action::OperateRegister,
    Action::RecordCashMovement,
];

const MANAGER: &[Action] = &[
    Action::ManageClients,
    Action::DeleteClient,
    Action::ManageProducts,
    Action::DeleteProduct,
    Action::RecordSale,
    Action::RecordPayment,
    Action::SettleBag,
    Action::ManageExpenses,
    Action::DeleteExpense,
    Action::OperateRegister,
    Action::RecordCashMovement,
    Action::ViewReports,
];

/// Actions granted to a role.
pub fn permissions(role: Role) -> &'static [Action] {
    match role {
        Role::Seller => SELLER,
        Role::Manager => MANAGER,
        // admin is unrestricted
        Role::Admin => &[],
    }
}

pub fn allows(role: Role, action: Action) -> bool {
    role == Role::Admin || permissions(role).contains(&action)
}

/// The single permission check every action goes through.
pub fn authorize(role: Role, action: Action) -> CoreResult<()> {
    if allows(role, action) {
        Ok(())
    } else {
        Err(CoreError::PermissionDenied {
            role: role.as_str().to_string(),
            action: action.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seller_sells_but_cannot_delete() {
        assert!(authorize(Role::Seller, Action::RecordSale).is_ok());
        assert!(authorize(Role::Seller, Action::SettleBag).is_ok());
        let err = authorize(Role::Seller, Action::DeleteClient).unwrap_err();
        assert_eq!(err.to_string(), "Permission denied: SELLER cannot delete clients");
    }

    #[test]
    fn test_only_admin_changes_roles_and_settings() {
        for role in [Role::Seller, Role::Manager] {
            assert!(!allows(role, Action::ChangeRoles));
            assert!(!allows(role, Action::UpdateSettings));
        }
        assert!(allows(Role::Admin, Action::ChangeRoles));
        assert!(allows(Role::Admin, Action::UpdateSettings));
    }

    #[test]
    fn test_manager_runs_back_office() {
        assert!(allows(Role::Manager, Action::ViewReports));
        assert!(allows(Role::Manager, Action::DeleteProduct));
        assert!(!allows(Role::Seller, Action::ViewReports));
    }
}
