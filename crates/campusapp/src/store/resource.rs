use super::Repository;
use crate::error::{CampusError, Result};
use crate::listing::{ListState, Page, RecordFilter, Searchable};
use crate::model::Record;
use crate::requests::RequestTracker;
use tracing::{debug, warn};

/// What to show when a load fails.
#[derive(Debug, Clone)]
pub enum LoadFailure<T> {
    /// Empty the collection.
    Clear,
    /// Show these records instead (homepage sample data).
    Fallback(Vec<T>),
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(usize),
    /// A newer load for the same collection started; nothing was applied.
    Superseded,
    Failed {
        error: CampusError,
        /// True when fallback records were installed instead of clearing.
        fell_back: bool,
    },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

/// The in-memory copy of one collection.
///
/// The records are only ever replaced wholesale: by the result of a
/// successful `list`, or by the failure policy when it fails. Mutations go
/// straight to the repository and are followed by a [`ResourceStore::load`].
pub struct ResourceStore<T, R> {
    repo: R,
    records: Vec<T>,
    on_failure: LoadFailure<T>,
    tracker: RequestTracker,
    purpose: String,
}

impl<T: Record, R: Repository<T>> ResourceStore<T, R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            records: Vec::new(),
            on_failure: LoadFailure::Clear,
            tracker: RequestTracker::new(),
            purpose: format!("load:{}", T::NOUN),
        }
    }

    pub fn with_fallback(mut self, records: Vec<T>) -> Self {
        self.on_failure = LoadFailure::Fallback(records);
        self
    }

    /// Share request generations with other stores of the same collection.
    pub fn with_tracker(mut self, tracker: RequestTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn load(&mut self) -> LoadOutcome {
        let ticket = self.tracker.begin(&self.purpose);
        let result = self.repo.list();

        match self.tracker.accept(&ticket, result) {
            None => LoadOutcome::Superseded,
            Some(Ok(records)) => {
                debug!(source = %self.repo.describe(), count = records.len(), "loaded {}s", T::NOUN);
                let count = records.len();
                self.records = records;
                LoadOutcome::Loaded(count)
            }
            Some(Err(error)) => {
                warn!(source = %self.repo.describe(), error = %error, "failed to load {}s", T::NOUN);
                let fell_back = match &self.on_failure {
                    LoadFailure::Clear => {
                        self.records.clear();
                        false
                    }
                    LoadFailure::Fallback(records) => {
                        self.records = records.clone();
                        true
                    }
                };
                LoadOutcome::Failed { error, fell_back }
            }
        }
    }

    /// Load ahead of a lookup by id. A failed or superseded load is an error
    /// here, never an empty collection.
    pub fn load_fresh(&mut self) -> Result<usize> {
        match self.load() {
            LoadOutcome::Loaded(count) => Ok(count),
            LoadOutcome::Superseded => Err(CampusError::Superseded(format!("{}s", T::NOUN))),
            LoadOutcome::Failed { error, .. } => Err(error),
        }
    }

    /// Search, filter and paginate the loaded records. Clamps the page in
    /// `state` to the available range.
    pub fn view<F>(&self, state: &mut ListState<F>) -> Page<T>
    where
        T: Searchable,
        F: RecordFilter<T>,
    {
        state.apply(&self.records).cloned()
    }
}
