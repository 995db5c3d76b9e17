//! Interactive search lifecycle: debounced keystrokes in, one product search
//! at a time out, results delivered to a presenter on a single task.

pub mod backend;
pub mod dispatcher;
pub mod presenter;
pub mod state;
pub mod timer;

pub use backend::SearchBackend;
pub use dispatcher::{
    spawn, DispatchConfig, DispatchError, DispatchEvent, Dispatcher, DispatcherHandle,
};
pub use presenter::Presenter;
pub use state::{Action, SearchMachine, SearchState};
pub use timer::DebounceTimer;
