//! Permission evaluation for UI gating.
//!
//! These checks decide what navigation and actions get *rendered*; the
//! server remains the authority on every request. Absence of data denies:
//! no user, no permissions, no access.

use crate::session::SessionUser;

/// Secondary role label that bypasses permission checks, matched
/// case-insensitively against `SessionUser::roles`.
const SUPER_ADMIN_LABEL: &str = "superadmin";

/// Decide whether `user` satisfies a permission requirement.
///
/// Precedence, first match wins:
/// 1. No user → deny.
/// 2. Platform-owner role → allow, unconditionally.
/// 3. A case-insensitive "superadmin" label in `user.roles` → allow.
/// 4. Empty requirement → allow (public within the authenticated app).
/// 5. User with no permissions → deny.
/// 6. Otherwise allow iff ANY required permission is held (OR, not AND).
pub fn check_permission<S: AsRef<str>>(user: Option<&SessionUser>, required: &[S]) -> bool {
    let Some(user) = user else {
        return false;
    };

    if user.role.is_platform_owner() {
        return true;
    }

    if user
        .roles
        .iter()
        .any(|label| label.eq_ignore_ascii_case(SUPER_ADMIN_LABEL))
    {
        return true;
    }

    if required.is_empty() {
        return true;
    }

    if user.permissions.is_empty() {
        return false;
    }

    required
        .iter()
        .any(|req| user.permissions.iter().any(|held| held == req.as_ref()))
}

/// Convenience for call sites holding a whole session option.
pub fn session_can<S: AsRef<str>>(
    session: Option<&crate::session::Session>,
    required: &[S],
) -> bool {
    check_permission(session.and_then(|s| s.user.as_ref()), required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, TenancyRole};

    fn test_user(role: TenancyRole, permissions: &[&str]) -> SessionUser {
        SessionUser {
            id: 1,
            name: "Test".into(),
            email: None,
            status: None,
            avatar: None,
            role,
            roles: vec![],
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            company_id: None,
        }
    }

    // ========================================================================
    // Deny without a user
    // ========================================================================

    #[test]
    fn no_user_denies_everything() {
        assert!(!check_permission::<&str>(None, &[]));
        assert!(!check_permission(None, &["lead.index"]));
    }

    // ========================================================================
    // Platform-owner bypass
    // ========================================================================

    #[test]
    fn platform_owner_passes_any_requirement() {
        let owner = test_user(TenancyRole::CrmOwner, &[]);
        assert!(check_permission(Some(&owner), &["user.delete"]));
        assert!(check_permission(Some(&owner), &["anything.at.all"]));
        assert!(check_permission::<&str>(Some(&owner), &[]));
    }

    #[test]
    fn platform_owner_ignores_own_permission_list() {
        // Bypass happens before the permission list is even consulted.
        let owner = test_user(TenancyRole::CrmOwner, &["lead.index"]);
        assert!(check_permission(Some(&owner), &["invoice.index"]));
    }

    // ========================================================================
    // Superadmin label bypass
    // ========================================================================

    #[test]
    fn superadmin_label_bypasses_case_insensitively() {
        for label in ["superadmin", "SuperAdmin", "SUPERADMIN", "sUpErAdMiN"] {
            let mut user = test_user(TenancyRole::CompanyUser, &[]);
            user.roles = vec!["staff".into(), label.into()];
            assert!(
                check_permission(Some(&user), &["user.delete"]),
                "label {label:?} should bypass"
            );
        }
    }

    #[test]
    fn other_labels_do_not_bypass() {
        let mut user = test_user(TenancyRole::CompanyUser, &[]);
        user.roles = vec!["admin".into(), "manager".into()];
        assert!(!check_permission(Some(&user), &["user.delete"]));
    }

    // ========================================================================
    // Empty requirement / empty grants
    // ========================================================================

    #[test]
    fn empty_requirement_is_public_for_any_user() {
        let user = test_user(TenancyRole::CompanyUser, &[]);
        assert!(check_permission::<&str>(Some(&user), &[]));
    }

    #[test]
    fn empty_grants_deny_nonempty_requirement() {
        let user = test_user(TenancyRole::CompanyAdmin, &[]);
        assert!(!check_permission(Some(&user), &["lead.index"]));
    }

    // ========================================================================
    // OR semantics
    // ========================================================================

    #[test]
    fn any_single_match_allows() {
        let user = test_user(TenancyRole::CompanyAdmin, &["lead.index"]);
        // Second requirement is absent from the user's grants; one match is enough.
        assert!(check_permission(Some(&user), &["lead.index", "invoice.index"]));
        assert!(check_permission(Some(&user), &["invoice.index", "lead.index"]));
    }

    #[test]
    fn no_overlap_denies() {
        let user = test_user(TenancyRole::CompanyAdmin, &["lead.index", "lead.show"]);
        assert!(!check_permission(Some(&user), &["invoice.index", "user.edit"]));
    }

    #[test]
    fn exact_string_match_only() {
        let user = test_user(TenancyRole::CompanyAdmin, &["lead.index"]);
        assert!(!check_permission(Some(&user), &["lead"]));
        assert!(!check_permission(Some(&user), &["lead.index.all"]));
        assert!(!check_permission(Some(&user), &["LEAD.INDEX"]));
    }

    #[test]
    fn unknown_role_gets_no_bypass() {
        let user = test_user(TenancyRole::Unknown, &["lead.index"]);
        assert!(check_permission(Some(&user), &["lead.index"]));
        assert!(!check_permission(Some(&user), &["invoice.index"]));
    }

    // ========================================================================
    // Session-level wrapper
    // ========================================================================

    #[test]
    fn session_can_reads_through_to_user() {
        let session = Session::new(
            test_user(TenancyRole::CompanyAdmin, &["lead.index"]),
            "tok",
        );
        assert!(session_can(Some(&session), &["lead.index"]));
        assert!(!session_can(Some(&session), &["invoice.index"]));
        assert!(!session_can::<&str>(None, &[]));
    }

    #[test]
    fn session_without_user_denies() {
        let session = Session {
            user: None,
            token: Some("tok".into()),
        };
        assert!(!session_can::<&str>(Some(&session), &[]));
    }
}
