//! Client side of proposal-kit.
//!
//! - [`http::ApiClient`]: typed access to the server's HTTP API
//! - [`poller::Poller`]: interval-driven progress polling for one run
//! - [`view::TerminalView`]: progress output for terminals
//! - [`markup::render_terminal`]: Markdown proposals as styled text

pub mod error;
pub mod http;
pub mod markup;
pub mod poller;
pub mod view;

pub use error::ClientError;
pub use http::ApiClient;
pub use poller::{PollOutcome, Poller, ProgressSource, ProgressView};
pub use view::TerminalView;
