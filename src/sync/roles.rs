use super::RemoteClient;
use super::records::fetch_roles;
use super::snapshot::{RefreshOutcome, Snapshot};
use crate::core::role::{AppRole, RoleSet};
use crate::core::session::Session;

/// Role membership of the signed-in user, answered from the last good fetch.
///
/// Before the first successful fetch every predicate is false. A failed
/// refresh is logged and leaves the previous answers untouched.
#[derive(Debug, Default)]
pub struct RoleStore {
    snapshot: Snapshot<RoleSet>,
}

impl RoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh<C: RemoteClient>(&self, client: &C, session: &Session) -> RefreshOutcome {
        let outcome = self
            .snapshot
            .refresh("user_roles", fetch_roles(client, session))
            .await;
        if outcome == RefreshOutcome::Updated {
            log::debug!("Roles for {}: {:?}", session.user_id, self.roles().sorted());
        }
        outcome
    }

    pub fn has_role(&self, role: AppRole) -> bool {
        self.snapshot
            .with(|roles| roles.is_some_and(|r| r.has_role(role)))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(AppRole::Admin)
    }

    pub fn is_moderator(&self) -> bool {
        self.has_role(AppRole::Moderator)
    }

    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.is_moderator()
    }

    /// Whether any fetch has succeeded, as opposed to the user having no roles.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.with(|roles| roles.is_some())
    }

    pub fn roles(&self) -> RoleSet {
        self.snapshot.get().unwrap_or_default()
    }

    /// Forget the snapshot and ignore any fetch still in flight (sign-out).
    pub fn clear(&self) {
        self.snapshot.clear();
    }
}
