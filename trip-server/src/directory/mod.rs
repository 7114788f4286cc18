//! Community transit directory.
//!
//! The directory is the whole network as a nested terminal → route → stop
//! structure. It is contributed by users, so the wire format is loose and
//! every record is validated on the way in (see [`convert_directory`]).
//!
//! It can be served by the directory API or, for development, by a JSON file
//! with the same content.

mod client;
mod convert;
mod error;
mod file;
mod types;

use std::fmt;

use tracing::info;

use crate::domain::Directory;

pub use client::{DirectoryClient, DirectoryClientConfig};
pub use convert::{ConversionError, IngestReport, convert_directory, convert_route};
pub use error::DirectoryError;
pub use file::FileDirectory;
pub use types::{LooseCity, LooseId, LooseNumber, RouteDto, StopDto, TerminalDto};

/// Where the directory is loaded from.
#[derive(Debug, Clone)]
pub enum DirectorySource {
    Http(DirectoryClient),
    File(FileDirectory),
}

impl DirectorySource {
    /// Fetch and validate the directory.
    ///
    /// Fails only when the source cannot be read or is not JSON; invalid
    /// records are skipped and counted in the report.
    pub async fn load(&self) -> Result<(Directory, IngestReport), DirectoryError> {
        let terminals = match self {
            DirectorySource::Http(client) => client.fetch_all().await?,
            DirectorySource::File(file) => file.fetch_all().await?,
        };

        let (directory, report) = convert_directory(&terminals);
        info!(
            source = %self,
            terminals = report.terminals_kept,
            routes = report.routes_kept,
            terminals_skipped = report.terminals_skipped,
            routes_skipped = report.routes_skipped,
            "loaded directory"
        );

        Ok((directory, report))
    }
}

impl fmt::Display for DirectorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectorySource::Http(client) => f.write_str(&client.url()),
            DirectorySource::File(file) => write!(f, "{}", file.path().display()),
        }
    }
}

/// Parse a directory body: a JSON array of terminals.
fn parse_terminals(body: &str) -> Result<Vec<TerminalDto>, DirectoryError> {
    serde_json::from_str(body).map_err(|e| DirectoryError::Json {
        message: e.to_string(),
    })
}
