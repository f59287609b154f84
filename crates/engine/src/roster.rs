//! Roster confirmation collaborator.
//!
//! While a session is `PROCESSING_FACES` the engine hands its roster to a
//! [`RosterConfirmer`] and awaits the confirmed list of player ids. Photo
//! matching and any other recognition work live behind this trait.

use std::fmt::Debug;

use async_trait::async_trait;
use uuid::Uuid;

use crate::ResultEngine;

#[async_trait]
pub trait RosterConfirmer: Debug + Send + Sync {
    /// Returns the confirmed player ids for `session_id`, given the ids of
    /// its active participants (host included).
    async fn confirm(&self, session_id: Uuid, roster: &[Uuid]) -> ResultEngine<Vec<Uuid>>;
}

/// Confirms the roster unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepRoster;

#[async_trait]
impl RosterConfirmer for KeepRoster {
    async fn confirm(&self, _session_id: Uuid, roster: &[Uuid]) -> ResultEngine<Vec<Uuid>> {
        Ok(roster.to_vec())
    }
}
