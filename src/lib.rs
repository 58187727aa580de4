pub mod config;
pub mod connection;
pub mod fields;
pub mod message;
pub mod series;
pub mod state;
pub mod writer;

pub use config::Config;
pub use connection::StreamClient;
pub use fields::FieldCatalog;
pub use message::{RemoteState, ServerMessage};
pub use series::{SeriesPoint, WindowedSeries};
pub use state::{CommandState, StateProjector, StatusState, Telemetry};
pub use writer::{CommandWriter, WriteStatus};
