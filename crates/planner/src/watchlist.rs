//! Movies, shows and books to get through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::storage::{Collection, Storage};
use crate::{contains_ignore_case, new_id, non_blank, remove_by_id};

/// Storage key for the watchlist.
pub const WATCHLIST_KEY: &str = "watchlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
    Book,
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            "book" => Ok(Self::Book),
            _ => Err(format!("invalid media type: {s}")),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
            Self::Book => "book",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatchStatus {
    #[default]
    WantToWatch,
    Watching,
    Completed,
}

impl std::str::FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "want-to-watch" => Ok(Self::WantToWatch),
            "watching" => Ok(Self::Watching),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid watch status: {s}")),
        }
    }
}

impl std::fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::WantToWatch => "want-to-watch",
            Self::Watching => "watching",
            Self::Completed => "completed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
    pub status: WatchStatus,
    /// 1 to 5 stars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub date_added: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Input for [`Watchlist::add`].
#[derive(Debug, Clone, Default)]
pub struct NewWatchlistItem {
    pub title: String,
    pub kind: MediaType,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub notes: Option<String>,
}

/// Watchlist filter. The default matches every item.
#[derive(Debug, Clone, Default)]
pub struct WatchlistFilter {
    /// Matched against title and genre, ignoring case.
    pub search: String,
    pub kind: Option<MediaType>,
    pub status: Option<WatchStatus>,
}

impl WatchlistFilter {
    #[must_use]
    pub fn matches(&self, item: &WatchlistItem) -> bool {
        let matches_search = contains_ignore_case(&item.title, &self.search)
            || item
                .genre
                .as_deref()
                .is_some_and(|g| contains_ignore_case(g, &self.search));
        matches_search
            && self.kind.is_none_or(|k| k == item.kind)
            && self.status.is_none_or(|s| s == item.status)
    }
}

/// Item counts shown above the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchlistCounts {
    pub total: usize,
    pub watching: usize,
    pub completed: usize,
}

/// The persisted watchlist.
pub struct Watchlist<'a> {
    items: Collection<'a, WatchlistItem>,
}

impl<'a> Watchlist<'a> {
    #[must_use]
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self {
            items: Collection::new(storage, WATCHLIST_KEY),
        }
    }

    /// All items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage cannot be read.
    pub fn all(&self) -> Result<Vec<WatchlistItem>, PlannerError> {
        self.items.load()
    }

    /// Add an item at the front, marked want-to-watch.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Required` if the title is blank.
    pub fn add(&self, new: NewWatchlistItem, now: DateTime<Utc>) -> Result<WatchlistItem, PlannerError> {
        let title = non_blank(Some(&new.title)).ok_or(PlannerError::Required("title"))?;
        let item = WatchlistItem {
            id: new_id(),
            title,
            kind: new.kind,
            status: WatchStatus::WantToWatch,
            rating: None,
            notes: non_blank(new.notes.as_deref()),
            date_added: now,
            date_completed: None,
            genre: non_blank(new.genre.as_deref()),
            year: new.year,
        };

        self.items.update(|items| {
            items.insert(0, item.clone());
            Ok(())
        })?;
        Ok(item)
    }

    /// Move an item to `status`; completion time is set only for `Completed`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::NotFound` if no item has this id.
    pub fn update_status(
        &self,
        id: &str,
        status: WatchStatus,
        now: DateTime<Utc>,
    ) -> Result<WatchlistItem, PlannerError> {
        self.modify(id, |item| {
            item.status = status;
            item.date_completed = (status == WatchStatus::Completed).then_some(now);
        })
    }

    /// Set a 1 to 5 star rating.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidRating` or `PlannerError::NotFound`.
    pub fn rate(&self, id: &str, rating: u8) -> Result<WatchlistItem, PlannerError> {
        if !(1..=5).contains(&rating) {
            return Err(PlannerError::InvalidRating(rating));
        }
        self.modify(id, |item| item.rating = Some(rating))
    }

    /// Remove an item. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage fails.
    pub fn delete(&self, id: &str) -> Result<bool, PlannerError> {
        self.items
            .update(|items| Ok(remove_by_id(items, id, |i: &WatchlistItem| &i.id)))
    }

    fn modify(
        &self,
        id: &str,
        change: impl FnOnce(&mut WatchlistItem),
    ) -> Result<WatchlistItem, PlannerError> {
        self.items.update(|items| {
            let item = items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| PlannerError::not_found("watchlist item", id))?;
            change(item);
            Ok(item.clone())
        })
    }
}

/// Items matching `filter`, in list order.
#[must_use]
pub fn filter<'w>(items: &'w [WatchlistItem], filter: &WatchlistFilter) -> Vec<&'w WatchlistItem> {
    items.iter().filter(|i| filter.matches(i)).collect()
}

#[must_use]
pub fn counts(items: &[WatchlistItem]) -> WatchlistCounts {
    let with_status = |status| items.iter().filter(|i| i.status == status).count();
    WatchlistCounts {
        total: items.len(),
        watching: with_status(WatchStatus::Watching),
        completed: with_status(WatchStatus::Completed),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::storage::MemoryStorage;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 20, 0, 0).unwrap()
    }

    fn new_item(title: &str, kind: MediaType, genre: Option<&str>) -> NewWatchlistItem {
        NewWatchlistItem {
            title: title.to_string(),
            kind,
            genre: genre.map(str::to_string),
            ..NewWatchlistItem::default()
        }
    }

    #[test]
    fn test_add_starts_as_want_to_watch() {
        let storage = MemoryStorage::new();
        let list = Watchlist::new(&storage);

        let item = list.add(new_item("Dune", MediaType::Book, Some("")), now()).unwrap();
        assert_eq!(item.status, WatchStatus::WantToWatch);
        assert_eq!(item.genre, None);
        assert!(matches!(
            list.add(new_item(" ", MediaType::Movie, None), now()),
            Err(PlannerError::Required("title"))
        ));
        assert_eq!(list.all().unwrap().len(), 1);
    }

    #[test]
    fn test_completion_date_follows_status() {
        let storage = MemoryStorage::new();
        let list = Watchlist::new(&storage);
        let item = list.add(new_item("Severance", MediaType::Tv, None), now()).unwrap();

        let done = list.update_status(&item.id, WatchStatus::Completed, now()).unwrap();
        assert_eq!(done.date_completed, Some(now()));

        let again = list.update_status(&item.id, WatchStatus::Watching, now()).unwrap();
        assert_eq!(again.date_completed, None);
        assert_eq!(list.all().unwrap()[0].status, WatchStatus::Watching);
    }

    #[test]
    fn test_rate_bounds() {
        let storage = MemoryStorage::new();
        let list = Watchlist::new(&storage);
        let item = list.add(new_item("Alien", MediaType::Movie, None), now()).unwrap();

        assert_eq!(list.rate(&item.id, 5).unwrap().rating, Some(5));
        assert!(matches!(list.rate(&item.id, 0), Err(PlannerError::InvalidRating(0))));
        assert!(matches!(list.rate(&item.id, 6), Err(PlannerError::InvalidRating(6))));
        assert!(matches!(list.rate("nope", 3), Err(PlannerError::NotFound { .. })));
    }

    #[test]
    fn test_filter_counts_and_delete() {
        let storage = MemoryStorage::new();
        let list = Watchlist::new(&storage);
        let alien = list.add(new_item("Alien", MediaType::Movie, Some("Sci-Fi")), now()).unwrap();
        let dune = list.add(new_item("Dune", MediaType::Book, Some("sci-fi")), now()).unwrap();
        list.add(new_item("Heat", MediaType::Movie, Some("Crime")), now()).unwrap();
        list.update_status(&dune.id, WatchStatus::Watching, now()).unwrap();

        let all = list.all().unwrap();
        let scifi = WatchlistFilter {
            search: "SCI".to_string(),
            ..WatchlistFilter::default()
        };
        assert_eq!(filter(&all, &scifi).len(), 2);

        let movies = WatchlistFilter {
            kind: Some(MediaType::Movie),
            ..WatchlistFilter::default()
        };
        assert_eq!(filter(&all, &movies).len(), 2);

        assert_eq!(
            counts(&all),
            WatchlistCounts {
                total: 3,
                watching: 1,
                completed: 0
            }
        );

        assert!(list.delete(&alien.id).unwrap());
        assert!(list.all().unwrap().iter().all(|i| i.id != alien.id));
        assert_eq!(list.all().unwrap().len(), 2);
    }

    #[test]
    fn test_serializes_client_field_names() {
        let storage = MemoryStorage::new();
        let list = Watchlist::new(&storage);
        list.add(new_item("Alien", MediaType::Tv, None), now()).unwrap();

        let raw = storage.get_item(WATCHLIST_KEY).unwrap().unwrap();
        assert!(raw.contains(r#""type":"tv""#));
        assert!(raw.contains(r#""status":"want-to-watch""#));
        assert!(raw.contains(r#""dateAdded""#));
    }
}
