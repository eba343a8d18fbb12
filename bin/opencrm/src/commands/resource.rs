//! Generic resource listing.
//!
//! `opencrm get leads --page 2 --search acme`, etc. Goes through the
//! same paginated source the console tables use, cache included.

use anyhow::Result;
use serde_json::Value;

use opencrm_client::endpoints;
use opencrm_data::{FetchPlan, PageSource};

use crate::app::App;

pub async fn get(
    app: &App,
    resource: &str,
    page: u64,
    per_page: u64,
    search: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let endpoint = endpoints::resource_endpoint(resource)
        .ok_or_else(|| anyhow::anyhow!("Unknown resource type: {}", resource))?;

    let source = PageSource::new(app.client.clone(), app.page_cache.clone(), endpoint);
    let mut plan = FetchPlan::default().page(page).limit(per_page);
    if let Some(term) = search {
        plan = plan.search(term);
    }

    let Some(data) = source.fetch(plan).await else {
        anyhow::bail!("Failed to fetch {}.", resource);
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&data.root)?);
        return Ok(());
    }

    for row in &data.rows {
        println!("{:>8}  {}", cell(row, "id"), row_label(row));
    }
    println!("{} of {} rows (page {}).", data.rows.len(), data.total, page);
    Ok(())
}

fn cell(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "-".to_string(),
    }
}

fn row_label(row: &Value) -> String {
    for key in ["name", "title", "email", "label"] {
        if let Some(Value::String(s)) = row.get(key) {
            if !s.is_empty() {
                return s.clone();
            }
        }
    }
    "-".to_string()
}
