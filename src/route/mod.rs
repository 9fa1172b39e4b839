//! Route entries and the ordered route table.
//!
//! A [`RouteEntry`] is either a leaf handler chain or a delegation to a
//! nested dispatcher; the two states are mutually exclusive and transition
//! only through [`RouteEntry::set_router`]. A [`RouteTable`] preserves
//! insertion order and indexes entries by normalized path string.

mod entry;
mod table;

pub use entry::{RouteEntry, RouteTarget};
pub use table::RouteTable;
