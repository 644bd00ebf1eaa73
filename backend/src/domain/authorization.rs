//! Role gate and superadmin protection.
//!
//! Both checks are pure. Authentication (a valid, current token) is resolved
//! before either runs, so failures here are always `Forbidden`.

use super::user::{Role, SUPERADMIN_ID, UserId};
use super::Error;

/// Allow the call when `role` is one of `required`.
///
/// # Examples
/// ```
/// use storefront::domain::{authorize, ErrorCode, Role};
///
/// assert!(authorize(Role::Admin, &[Role::Admin]).is_ok());
/// let err = authorize(Role::User, &[Role::Admin]).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// ```
pub fn authorize(role: Role, required: &[Role]) -> Result<(), Error> {
    if required.contains(&role) {
        Ok(())
    } else {
        Err(Error::forbidden("insufficient permissions"))
    }
}

/// Administrative mutation aimed at another account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMutation {
    /// Remove the account.
    Delete,
    /// Assign a new role.
    ChangeRole(Role),
}

/// Reject deletion of the superadmin and any role change away from admin.
pub fn ensure_superadmin_mutation_allowed(
    target: UserId,
    mutation: AccountMutation,
) -> Result<(), Error> {
    if target != SUPERADMIN_ID {
        return Ok(());
    }
    match mutation {
        AccountMutation::Delete => Err(Error::forbidden("the superadmin cannot be deleted")),
        AccountMutation::ChangeRole(Role::Admin) => Ok(()),
        AccountMutation::ChangeRole(_) => {
            Err(Error::forbidden("the superadmin role cannot be changed"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn user(id: i64) -> UserId {
        UserId::new(id).expect("valid id")
    }

    #[rstest]
    #[case(Role::Guest)]
    #[case(Role::User)]
    #[case(Role::Seller)]
    #[case(Role::Editor)]
    fn non_admins_are_forbidden_from_admin_calls(#[case] role: Role) {
        let err = authorize(role, &[Role::Admin]).expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn any_listed_role_is_allowed() {
        assert!(authorize(Role::Seller, &[Role::Seller, Role::Admin]).is_ok());
    }

    #[rstest]
    #[case(AccountMutation::Delete)]
    #[case(AccountMutation::ChangeRole(Role::User))]
    #[case(AccountMutation::ChangeRole(Role::Guest))]
    fn superadmin_is_protected(#[case] mutation: AccountMutation) {
        let err = ensure_superadmin_mutation_allowed(SUPERADMIN_ID, mutation)
            .expect_err("protected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn superadmin_may_stay_admin() {
        assert!(
            ensure_superadmin_mutation_allowed(SUPERADMIN_ID, AccountMutation::ChangeRole(Role::Admin))
                .is_ok()
        );
    }

    #[rstest]
    #[case(AccountMutation::Delete)]
    #[case(AccountMutation::ChangeRole(Role::Guest))]
    fn other_accounts_are_unrestricted(#[case] mutation: AccountMutation) {
        assert!(ensure_superadmin_mutation_allowed(user(2), mutation).is_ok());
    }
}
