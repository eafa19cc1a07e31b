//! Route adapter layer
//!
//! Maps routing operations (create a route for a URI, migrate a
//! placeholder, relocate children of a superseded route, redirect) onto a
//! document store session.

mod error;
mod patcher;
mod route_adapter;
mod types;

pub use error::{AdapterError, AdapterResult};
pub use patcher::{PlaceholderPatcher, RouteStack};
pub use route_adapter::RouteAdapter;
pub use types::{UriContext, TAG_NO_MULTILANG};
