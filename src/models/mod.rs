//! Request and Response models for the cache server API
//!
//! DTOs for the HTTP bodies. Values are carried as arbitrary JSON.

pub mod requests;
pub mod responses;

pub use requests::{SetRequest, StatsQuery, MAX_KEY_LEN};
pub use responses::{
    DeleteResponse, EntriesResponse, EntryView, ErrorResponse, GetResponse, HealthResponse,
    SetResponse, StatsResponse,
};
