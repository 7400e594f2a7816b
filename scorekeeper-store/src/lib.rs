//! Persistence of match results and tournaments on top of a string [`KeyValueStore`].
//!
//! Both collections are stored as a single JSON array under a fixed key. Every write is a single
//! read-modify-write cycle of the whole collection.
mod backend;
mod id;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use id::tournament_id;

use chrono::Utc;
use scorekeeper_core::{MatchResult, Tournament, TournamentId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// The key of the match history collection.
pub const MATCH_HISTORY_KEY: &str = "match_history";
/// The key of the tournaments collection.
pub const TOURNAMENTS_KEY: &str = "tournaments";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid stored data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug)]
pub struct Store<S>
where
    S: KeyValueStore,
{
    backend: S,
}

impl<S> Store<S>
where
    S: KeyValueStore,
{
    #[inline]
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    #[inline]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    #[inline]
    pub fn history(&self) -> HistoryClient<'_, S> {
        HistoryClient { store: self }
    }

    #[inline]
    pub fn tournaments(&self) -> TournamentsClient<'_, S> {
        TournamentsClient { store: self }
    }

    /// Reads the collection at `key`. A missing key is an empty collection.
    fn read<T>(&self, key: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let res = self.backend.get(key).and_then(|value| match value {
            Some(value) => Ok(serde_json::from_str(&value)?),
            None => Ok(Vec::new()),
        });

        if let Err(err) = &res {
            log::error!("Failed to read {:?}: {}", key, err);
        }

        res
    }

    fn write<T>(&self, key: &str, values: &[T]) -> Result<()>
    where
        T: Serialize,
    {
        let res = serde_json::to_string(values)
            .map_err(Error::from)
            .and_then(|value| self.backend.set(key, &value));

        if let Err(err) = &res {
            log::error!("Failed to write {:?}: {}", key, err);
        }

        res
    }

    fn remove(&self, key: &str) -> Result<()> {
        let res = self.backend.remove(key);

        if let Err(err) = &res {
            log::error!("Failed to remove {:?}: {}", key, err);
        }

        res
    }
}

/// The list of confirmed matches, oldest first.
#[derive(Copy, Clone, Debug)]
pub struct HistoryClient<'a, S>
where
    S: KeyValueStore,
{
    store: &'a Store<S>,
}

impl<'a, S> HistoryClient<'a, S>
where
    S: KeyValueStore,
{
    /// Appends a new [`MatchResult`] to the history.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the history cannot be read or written.
    pub fn push(&self, result: &MatchResult) -> Result<()> {
        let mut history: Vec<MatchResult> = self.store.read(MATCH_HISTORY_KEY)?;
        history.push(result.clone());
        self.store.write(MATCH_HISTORY_KEY, &history)?;

        log::debug!("Stored match {} ({} matches)", result.id, history.len());
        Ok(())
    }

    /// Returns all stored [`MatchResult`]s in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the history cannot be read.
    pub fn list(&self) -> Result<Vec<MatchResult>> {
        self.store.read(MATCH_HISTORY_KEY)
    }

    /// Deletes the whole history.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the backend fails to remove the history.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(MATCH_HISTORY_KEY)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct TournamentsClient<'a, S>
where
    S: KeyValueStore,
{
    store: &'a Store<S>,
}

impl<'a, S> TournamentsClient<'a, S>
where
    S: KeyValueStore,
{
    /// Returns all stored [`Tournament`]s in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the tournaments cannot be read.
    pub fn list(&self) -> Result<Vec<Tournament>> {
        self.store.read(TOURNAMENTS_KEY)
    }

    /// Returns all stored [`Tournament`]s, the most recently started first.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the tournaments cannot be read.
    pub fn list_by_start_date(&self) -> Result<Vec<Tournament>> {
        let mut tournaments = self.list()?;
        tournaments.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(tournaments)
    }

    /// Returns the [`Tournament`] with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the tournaments cannot be read.
    pub fn get(&self, id: &TournamentId) -> Result<Option<Tournament>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|tournament| tournament.id.as_ref() == Some(id)))
    }

    /// Stores a [`Tournament`], replacing the stored tournament with the same id. A tournament
    /// without an id is assigned a new one and appended. Returns the stored tournament.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the tournaments cannot be read or written.
    pub fn upsert(&self, mut tournament: Tournament) -> Result<Tournament> {
        let mut tournaments: Vec<Tournament> = self.store.read(TOURNAMENTS_KEY)?;

        let id = match &tournament.id {
            Some(id) => id.clone(),
            None => {
                let id = tournament_id(Utc::now(), &mut rand::thread_rng());
                tournament.id = Some(id.clone());
                id
            }
        };

        match tournaments
            .iter_mut()
            .find(|stored| stored.id.as_ref() == Some(&id))
        {
            Some(stored) => *stored = tournament.clone(),
            None => tournaments.push(tournament.clone()),
        }

        self.store.write(TOURNAMENTS_KEY, &tournaments)?;

        log::debug!("Stored tournament {}", id);
        Ok(tournament)
    }

    /// Deletes the [`Tournament`] with the given `id`. Returns `false` if no tournament with the
    /// id exists.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the tournaments cannot be read or written.
    pub fn remove(&self, id: &TournamentId) -> Result<bool> {
        let mut tournaments: Vec<Tournament> = self.store.read(TOURNAMENTS_KEY)?;

        let len = tournaments.len();
        tournaments.retain(|tournament| tournament.id.as_ref() != Some(id));

        if tournaments.len() == len {
            return Ok(false);
        }

        self.store.write(TOURNAMENTS_KEY, &tournaments)?;
        Ok(true)
    }
}
