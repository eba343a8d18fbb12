//! Login / logout commands.

use anyhow::Result;

use crate::app::App;

pub async fn login(app: &App, email: &str, password: &str) -> Result<()> {
    let session = app
        .client
        .login(email, password)
        .await
        .map_err(|err| anyhow::anyhow!("login failed: {}", err.notification_message()))?;

    let user = session
        .user
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("server returned no user record"))?;
    println!("Logged in as {} ({}).", user.name, user.role.as_str());
    println!("Session saved to {}.", app.session_path.display());
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    if !app.session.is_authenticated() {
        println!("No active session.");
        return Ok(());
    }
    app.client.logout().await;
    println!("Logged out.");
    Ok(())
}
