//! Client side of the two-party message exchange: configuration, the per-user
//! dispatcher that talks to the backend, and the state each user's panel shows.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod state;
pub mod transport;

pub use config::{load_settings, Settings};
pub use dispatcher::{Dispatcher, DispatcherSet};
pub use error::{ConfigError, DispatchError, DispatchErrorKind};
pub use state::{
    ExchangeState, Operation, OperationError, Reduction, RequestTicket, UserPanelState,
};
pub use transport::{HttpTransport, MessageTransport};
