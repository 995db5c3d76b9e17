//! Pure search lifecycle state machine.
//!
//! [`SearchMachine`] decides what should happen for each input; it performs
//! no I/O and owns no timer. The dispatcher carries out the returned
//! [`Action`]s.

/// Where the interactive search currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    /// No active search; the neutral prompt is shown.
    Idle,
    /// Debounce timer armed for `query`.
    Pending { query: String },
    /// Search `request_id` is in flight.
    Searching { request_id: u64, query: String },
    /// Results of `request_id` are on screen.
    Displaying { request_id: u64 },
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Cancel any armed timer and show the neutral prompt.
    GoIdle,
    /// Cancel any armed timer and arm a new one for `query`.
    Arm(String),
    /// Cancel any armed timer and start search `request_id` now.
    Dispatch { request_id: u64, query: String },
    /// Nothing to do.
    Ignore,
}

#[derive(Debug)]
pub struct SearchMachine {
    state: SearchState,
    min_query_len: usize,
    last_request_id: u64,
}

impl SearchMachine {
    /// A minimum of 0 is raised to 1 so blank input never arms a search.
    #[must_use]
    pub fn new(min_query_len: usize) -> Self {
        Self {
            state: SearchState::Idle,
            min_query_len: min_query_len.max(1),
            last_request_id: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// The input text changed.
    ///
    /// Input shorter than the minimum (after trimming) returns to idle and
    /// orphans any in-flight search; anything else (re)arms the debounce.
    pub fn query_changed(&mut self, text: &str) -> Action {
        let query = text.trim();
        if query.chars().count() < self.min_query_len {
            self.state = SearchState::Idle;
            return Action::GoIdle;
        }
        self.state = SearchState::Pending {
            query: query.to_owned(),
        };
        Action::Arm(query.to_owned())
    }

    /// Explicit submit: search immediately, skipping the debounce wait.
    ///
    /// A blank query is refused and returns to idle.
    pub fn submit(&mut self, text: &str) -> Action {
        let query = text.trim();
        if query.is_empty() {
            self.state = SearchState::Idle;
            return Action::GoIdle;
        }
        self.dispatch(query.to_owned())
    }

    /// The debounce timer armed for `query` elapsed.
    pub fn timer_fired(&mut self, query: &str) -> Action {
        match &self.state {
            SearchState::Pending { query: pending } if pending == query => {
                self.dispatch(query.to_owned())
            }
            _ => Action::Ignore,
        }
    }

    /// Starts the debounce-pending search now, if there is one.
    pub fn flush(&mut self) -> Action {
        match &self.state {
            SearchState::Pending { query } => {
                let query = query.clone();
                self.dispatch(query)
            }
            _ => Action::Ignore,
        }
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        matches!(self.state, SearchState::Searching { .. })
    }

    /// A worker finished search `request_id`.
    ///
    /// Returns `true` when its result should be delivered, i.e. it is the
    /// search currently in flight. Results of superseded or orphaned
    /// searches return `false` and leave the state untouched.
    pub fn complete(&mut self, request_id: u64) -> bool {
        match self.state {
            SearchState::Searching { request_id: current, .. } if current == request_id => {
                self.state = SearchState::Displaying { request_id };
                true
            }
            _ => false,
        }
    }

    fn dispatch(&mut self, query: String) -> Action {
        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.state = SearchState::Searching {
            request_id,
            query: query.clone(),
        };
        Action::Dispatch { request_id, query }
    }
}
