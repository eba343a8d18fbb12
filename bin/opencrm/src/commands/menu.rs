//! Composed-menu inspection.

use anyhow::Result;

use opencrm_nav::{ComposedItem, compose_menu};

use crate::app::App;

pub fn menu(app: &App, path: &str, json_output: bool) -> Result<()> {
    let session = app.session.current();
    if !session.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }

    let tree = compose_menu(&session, path);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    print_tree(&tree, 0);
    Ok(())
}

fn print_tree(items: &[ComposedItem], depth: usize) {
    for item in items {
        let marker = if item.active { "*" } else { " " };
        let badge = item
            .badge
            .map(|badge| format!(" [{badge}]"))
            .unwrap_or_default();
        println!(
            "{}{} {}{}  ({})",
            "  ".repeat(depth),
            marker,
            item.title,
            badge,
            item.path
        );
        print_tree(&item.children, depth + 1);
    }
}
