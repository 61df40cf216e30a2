//! Typed reads and writes over the backend collections.
//!
//! Rows are decoded here, at the edge. Anything that doesn't decode is dropped
//! with a warning instead of reaching the derivations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{
    FOLLOW_UPS, Filter, NOTIFICATIONS, RemoteClient, RemoteError, USER_ROLES, USER_SETTINGS,
    USER_TOURS, decode_rows,
};
use crate::core::follow_up::FollowUp;
use crate::core::notification::Notification;
use crate::core::role::{RoleSet, UserRole};
use crate::core::session::Session;
use crate::core::settings::UserSettings;
use crate::core::tour::TourProgress;

fn owned_by(session: &Session) -> Filter {
    Filter::new().where_eq("user_id", session.user_id)
}

async fn write<C, T>(client: &C, collection: &str, record: &T) -> Result<T, RemoteError>
where
    C: RemoteClient,
    T: Serialize + DeserializeOwned,
{
    let stored = client.upsert(collection, serde_json::to_value(record)?).await?;
    Ok(serde_json::from_value(stored)?)
}

fn check_owner(session: &Session, owner: uuid::Uuid, what: &str) -> Result<(), RemoteError> {
    if owner == session.user_id {
        Ok(())
    } else {
        Err(RemoteError::Invalid(format!(
            "Refusing to write {} owned by another user",
            what
        )))
    }
}

pub async fn fetch_follow_ups<C: RemoteClient>(
    client: &C,
    session: &Session,
) -> Result<Vec<FollowUp>, RemoteError> {
    let rows = client
        .select(FOLLOW_UPS, &owned_by(session).order_asc("data_agendada"))
        .await?;
    Ok(decode_rows(FOLLOW_UPS, rows))
}

pub async fn save_follow_up<C: RemoteClient>(
    client: &C,
    session: &Session,
    follow_up: &FollowUp,
) -> Result<FollowUp, RemoteError> {
    check_owner(session, follow_up.user_id, "a follow-up")?;
    let saved = write(client, FOLLOW_UPS, follow_up).await?;
    log::info!(
        "Saved {} follow-up {} ({})",
        saved.kind.as_str(),
        saved.id,
        saved.status.as_str()
    );
    Ok(saved)
}

pub async fn fetch_notifications<C: RemoteClient>(
    client: &C,
    session: &Session,
) -> Result<Vec<Notification>, RemoteError> {
    let rows = client
        .select(NOTIFICATIONS, &owned_by(session).order_desc("created_at"))
        .await?;
    Ok(decode_rows(NOTIFICATIONS, rows))
}

pub async fn mark_notification_read<C: RemoteClient>(
    client: &C,
    session: &Session,
    notification: &Notification,
) -> Result<Notification, RemoteError> {
    check_owner(session, notification.user_id, "a notification")?;
    let mut read = notification.clone();
    read.read = true;
    write(client, NOTIFICATIONS, &read).await
}

pub async fn fetch_roles<C: RemoteClient>(
    client: &C,
    session: &Session,
) -> Result<RoleSet, RemoteError> {
    let rows = client.select(USER_ROLES, &owned_by(session)).await?;
    let roles: Vec<UserRole> = decode_rows(USER_ROLES, rows);
    Ok(RoleSet::from_rows(session.user_id, &roles))
}

/// The user's settings row, or defaults with `default_lead_hours` when there
/// is none yet.
pub async fn fetch_settings<C: RemoteClient>(
    client: &C,
    session: &Session,
    default_lead_hours: u32,
) -> Result<UserSettings, RemoteError> {
    let rows = client.select(USER_SETTINGS, &owned_by(session)).await?;
    let settings = decode_rows::<UserSettings>(USER_SETTINGS, rows)
        .into_iter()
        .next()
        .unwrap_or_else(|| {
            log::debug!("No settings stored for {}, using defaults", session.user_id);
            UserSettings::default_for(session.user_id).with_lead_time(default_lead_hours)
        });
    Ok(settings)
}

pub async fn save_settings<C: RemoteClient>(
    client: &C,
    session: &Session,
    settings: &UserSettings,
) -> Result<UserSettings, RemoteError> {
    check_owner(session, settings.user_id, "settings")?;
    write(client, USER_SETTINGS, settings).await
}

pub async fn fetch_tours<C: RemoteClient>(
    client: &C,
    session: &Session,
) -> Result<Vec<TourProgress>, RemoteError> {
    let rows = client.select(USER_TOURS, &owned_by(session)).await?;
    Ok(decode_rows(USER_TOURS, rows))
}

pub async fn complete_tour<C: RemoteClient>(
    client: &C,
    session: &Session,
    tour: &str,
    at: DateTime<Utc>,
) -> Result<TourProgress, RemoteError> {
    let mut progress = TourProgress::new(session.user_id, tour);
    progress.complete(at);
    write(client, USER_TOURS, &progress).await
}
