//! Session status command.

use anyhow::Result;

use crate::app::App;

/// Show who is logged in, verifying the token with a profile fetch.
pub async fn status(app: &App, json_output: bool) -> Result<()> {
    if !app.session.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }

    let user = app
        .client
        .refresh_profile()
        .await
        .map_err(|err| anyhow::anyhow!("profile fetch failed: {}", err.notification_message()))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!("User:        {}", user.name);
    if let Some(email) = &user.email {
        println!("Email:       {email}");
    }
    println!("Role:        {}", user.role.as_str());
    if !user.roles.is_empty() {
        println!("Roles:       {}", user.roles.join(", "));
    }
    println!("Permissions: {}", user.permissions.len());
    if let Some(company) = user.company_id {
        println!("Company:     {company}");
    }
    Ok(())
}
