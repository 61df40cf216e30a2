use std::collections::HashMap;

pub(crate) const SERVICE_NAME: &str = "leadtrack-session";

async fn connect() -> Result<oo7::Keyring, String> {
    oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))
}

fn attributes(project_url: &str) -> HashMap<&str, &str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("project", project_url);
    attrs
}

/// Keep the refresh token so the next run can restore the session.
pub async fn store_session(project_url: &str, refresh_token: &str) -> Result<(), String> {
    let keyring = connect().await?;

    keyring
        .create_item(
            &format!("leadtrack session ({})", project_url),
            &attributes(project_url),
            refresh_token.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| format!("Failed to store session: {}", e))?;

    Ok(())
}

pub async fn load_refresh_token(project_url: &str) -> Result<Option<String>, String> {
    let keyring = connect().await?;

    let items = keyring
        .search_items(&attributes(project_url))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let token = String::from_utf8(secret.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        if !token.is_empty() {
            return Ok(Some(token));
        }
    }

    Ok(None)
}

/// Forget the stored session (sign-out).
pub async fn clear_session(project_url: &str) -> Result<(), String> {
    let keyring = connect().await?;

    let items = keyring
        .search_items(&attributes(project_url))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete session: {}", e))?;
    }

    Ok(())
}
