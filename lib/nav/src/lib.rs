pub mod compose;
pub mod menu;

pub use compose::{ComposedItem, compose_menu};
pub use menu::{MenuItem, owner_menu, tenant_menu};
