use serde::{Deserialize, Serialize};

/// Coarse tenancy role. Every user carries exactly one.
///
/// The platform owner (`crm_owner`) administers all tenants and bypasses
/// permission filtering entirely; the company roles are scoped to a single
/// tenant. Wire values the client does not recognize decode to `Unknown`,
/// which grants nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenancyRole {
    CrmOwner,
    CompanyAdmin,
    CompanyOwner,
    CompanyUser,
    #[serde(other)]
    Unknown,
}

impl TenancyRole {
    /// The platform-owner role that short-circuits all permission checks.
    pub fn is_platform_owner(&self) -> bool {
        matches!(self, TenancyRole::CrmOwner)
    }

    /// Company admin or company owner, the tenant-level administrators.
    pub fn is_company_admin(&self) -> bool {
        matches!(self, TenancyRole::CompanyAdmin | TenancyRole::CompanyOwner)
    }

    /// Wire-format name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            TenancyRole::CrmOwner => "crm_owner",
            TenancyRole::CompanyAdmin => "company_admin",
            TenancyRole::CompanyOwner => "company_owner",
            TenancyRole::CompanyUser => "company_user",
            TenancyRole::Unknown => "unknown",
        }
    }
}

impl Default for TenancyRole {
    fn default() -> Self {
        TenancyRole::Unknown
    }
}

/// The authenticated user record as delivered by the login/profile API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: u64,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Account status string (e.g. "active").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Tenancy role. Drives whole menu-tree selection.
    #[serde(default)]
    pub role: TenancyRole,

    /// Secondary role labels, distinct from `role`. A case-insensitive
    /// "superadmin" entry here bypasses permission checks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Fine-grained permission strings (e.g. "user.edit").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,

    /// Tenant the user belongs to. Absent for the platform owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,
}

/// Process-wide session snapshot.
///
/// `is_authenticated()` holds iff both `token` and `user` are present;
/// there is no separate flag to keep in sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Session {
    /// An empty, unauthenticated session.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(user: SessionUser, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }

    /// True iff both token and user are present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn role(&self) -> Option<TenancyRole> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn permissions(&self) -> &[String] {
        self.user
            .as_ref()
            .map(|u| u.permissions.as_slice())
            .unwrap_or(&[])
    }
}
