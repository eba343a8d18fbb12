//! Static menu definitions.
//!
//! Two disjoint trees exist: the platform-owner console and the tenant
//! console. Owner entries carry no permission requirements (the role
//! alone grants the tree); tenant entries are gated per item and
//! filtered at composition time.

/// One entry in a menu definition. Entries with children act as
/// collapsible groups; their own `permissions` list stays empty because
/// visibility is decided by the surviving children.
#[derive(Debug, Clone)]
pub struct MenuItem {
    pub title: &'static str,
    pub icon: &'static str,
    pub path: &'static str,
    /// Any one of these grants visibility (OR semantics).
    pub permissions: &'static [&'static str],
    pub badge: Option<&'static str>,
    pub children: Vec<MenuItem>,
    /// Path prefixes that pre-expand this group.
    pub open_when: &'static [&'static str],
}

impl MenuItem {
    fn leaf(title: &'static str, icon: &'static str, path: &'static str) -> Self {
        Self {
            title,
            icon,
            path,
            permissions: &[],
            badge: None,
            children: Vec::new(),
            open_when: &[],
        }
    }

    fn gated(
        title: &'static str,
        icon: &'static str,
        path: &'static str,
        permissions: &'static [&'static str],
    ) -> Self {
        Self {
            permissions,
            ..Self::leaf(title, icon, path)
        }
    }

    fn group(
        title: &'static str,
        icon: &'static str,
        path: &'static str,
        open_when: &'static [&'static str],
        children: Vec<MenuItem>,
    ) -> Self {
        Self {
            children,
            open_when,
            ..Self::leaf(title, icon, path)
        }
    }

    fn badged(mut self, badge: &'static str) -> Self {
        self.badge = Some(badge);
        self
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Console tree for the platform owner. Served unfiltered.
pub fn owner_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::leaf("Dashboard", "home", "/"),
        MenuItem::group(
            "Company Management",
            "building",
            "/companies",
            &["/companies"],
            vec![
                MenuItem::leaf("All Companies", "building", "/companies"),
                MenuItem::leaf("Add Company", "building", "/companies/add"),
                MenuItem::leaf("Company Settings", "building", "/companies/settings"),
            ],
        ),
        MenuItem::group(
            "User Management",
            "user-check",
            "/users",
            &["/users"],
            vec![
                MenuItem::leaf("All Users", "users", "/users"),
                MenuItem::leaf("Add User", "users", "/users/add"),
                MenuItem::leaf("Roles & Permissions", "shield", "/users/roles"),
            ],
        ),
        MenuItem::leaf("Analytics", "bar-chart", "/analytics").badged("New"),
        MenuItem::group(
            "Settings",
            "settings",
            "/settings",
            &["/settings"],
            vec![
                MenuItem::leaf("General Settings", "settings", "/settings/general"),
                MenuItem::leaf("Security", "shield", "/settings/security"),
                MenuItem::leaf("Integrations", "plug", "/settings/integrations"),
            ],
        ),
    ]
}

/// Console tree for tenant roles, gated per item.
pub fn tenant_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::leaf("Dashboard", "home", "/"),
        MenuItem::group(
            "Lead Management",
            "users",
            "/leads",
            &["/leads", "/invoices"],
            vec![
                MenuItem::gated("Leads", "users", "/leads", &["lead.index"]),
                MenuItem::gated("Add Lead", "user-plus", "/leads/add", &["lead.create"]),
                MenuItem::gated("Invoices", "file-text", "/invoices", &["invoice.index"]),
            ],
        ),
        MenuItem::group(
            "User Management",
            "user-check",
            "/users",
            &["/users"],
            vec![
                MenuItem::gated("All Users", "users", "/users", &["user.index"]),
                MenuItem::gated("Add User", "users", "/users/add", &["user.create"]),
                MenuItem::gated(
                    "Roles & Permissions",
                    "shield",
                    "/users/roles",
                    &["permission.index"],
                ),
            ],
        ),
        MenuItem::group(
            "Settings",
            "settings",
            "/settings",
            &["/settings"],
            vec![
                MenuItem::leaf("General Settings", "settings", "/settings/general"),
                MenuItem::gated("Security", "shield", "/settings/security", &["user.edit"]),
            ],
        ),
    ]
}
