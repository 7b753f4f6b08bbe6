//! Persistence module split across logical submodules.

mod connection;
mod entries;

pub use connection::{ensure_schema, open_in_memory};
pub use entries::{create_entry, delete_entry, fetch_entries, fetch_entry, update_entry};
