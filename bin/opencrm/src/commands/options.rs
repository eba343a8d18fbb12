//! Filter option resolution.

use anyhow::Result;

use opencrm_data::{FilterDomain, FilterResolver};

use crate::app::App;

const SEARCH_LIMIT: u64 = 20;

pub async fn options(
    app: &App,
    domain_name: &str,
    search: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let domain = FilterDomain::from_name(domain_name)
        .ok_or_else(|| anyhow::anyhow!("Unknown filter domain: {}", domain_name))?;

    let resolver = FilterResolver::new(app.client.clone(), app.option_cache.clone(), [domain]);
    let term = search.unwrap_or("").trim();
    let limit = if term.is_empty() {
        domain.default_limit()
    } else {
        SEARCH_LIMIT
    };

    if let Err(err) = resolver.fetch_options(domain, 1, limit, term).await {
        // Roles degrade to the built-in fallback list; everything else
        // has nothing to show.
        if domain != FilterDomain::Role {
            anyhow::bail!("option fetch failed: {}", err.notification_message());
        }
    }

    let options = resolver.options(domain);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    for option in &options {
        match &option.email {
            Some(email) => println!("{:>12}  {}  <{}>", option.value, option.label, email),
            None => println!("{:>12}  {}", option.value, option.label),
        }
    }
    println!("{} options.", options.len());
    Ok(())
}
