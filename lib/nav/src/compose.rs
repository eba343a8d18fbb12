//! Menu composition against the current session and path.

use serde::Serialize;

use opencrm_core::{Session, SessionUser, check_permission};

use crate::menu::{MenuItem, owner_menu, tenant_menu};

/// One entry of the composed tree, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct ComposedItem {
    pub title: &'static str,
    pub icon: &'static str,
    pub path: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<&'static str>,
    pub active: bool,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComposedItem>,
}

/// The root path only matches exactly; everything else matches by
/// prefix, so `/leads/add` lights up both `/leads` entries.
fn is_active(path: &str, current: &str) -> bool {
    if path == "/" {
        current == "/"
    } else {
        current.starts_with(path)
    }
}

/// Compose the menu tree for the current session.
///
/// Platform owners get their console unfiltered; tenant roles get the
/// tenant console with every entry checked against the session's
/// permission set. An unauthenticated session composes to nothing.
pub fn compose_menu(session: &Session, current_path: &str) -> Vec<ComposedItem> {
    let Some(user) = session.user.as_ref() else {
        return Vec::new();
    };
    let tree = if user.role.is_platform_owner() {
        owner_menu()
    } else {
        tenant_menu()
    };
    compose_items(tree, user, current_path)
}

fn compose_items(items: Vec<MenuItem>, user: &SessionUser, current: &str) -> Vec<ComposedItem> {
    items
        .into_iter()
        .filter_map(|item| compose_item(item, user, current))
        .collect()
}

fn compose_item(item: MenuItem, user: &SessionUser, current: &str) -> Option<ComposedItem> {
    let MenuItem {
        title,
        icon,
        path,
        permissions,
        badge,
        children,
        open_when,
    } = item;

    if children.is_empty() {
        if !check_permission(Some(user), permissions) {
            return None;
        }
        return Some(ComposedItem {
            title,
            icon,
            path,
            badge,
            active: is_active(path, current),
            expanded: false,
            children: Vec::new(),
        });
    }

    // Groups live and die by their children.
    let children = compose_items(children, user, current);
    if children.is_empty() {
        return None;
    }
    let active = is_active(path, current) || children.iter().any(|child| child.active);
    let expanded = open_when.iter().any(|prefix| current.starts_with(prefix));
    Some(ComposedItem {
        title,
        icon,
        path,
        badge,
        active,
        expanded,
        children,
    })
}
