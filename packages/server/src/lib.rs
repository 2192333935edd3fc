// Notice Board API Core
//
// HTTP front end and CLI for the notices library: fetches the parent
// portal's notice tab with the deployment's session cookie, returns the
// notices as JSON and optionally records them in SQLite.

pub mod config;
pub mod server;

pub use config::*;
