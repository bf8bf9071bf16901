// postline-core: Fetch lifecycle, debounced search, and persisted query state.

pub mod config;
pub mod controller;
pub mod convert;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod model;
pub mod notify;
pub mod persist;
pub mod source;
pub mod state;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification};
pub use controller::{Controller, Services};
pub use debounce::SearchDebouncer;
pub use error::CoreError;
pub use filter::filter_records;
pub use model::{Record, RecordSnapshot};
pub use notify::{ChannelNotifier, Notification, NotificationSink};
pub use persist::{MemorySearchStore, SEARCH_KEY, SearchStore};
pub use source::{ConnectivityProbe, RecordSource, SourceError};
pub use state::{ControllerState, ErrorKind, FetchError, FetchStatus, RefreshTrigger};
pub use stream::{StateStream, StateWatchStream};
