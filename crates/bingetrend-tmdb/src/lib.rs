pub mod client;
pub mod enrich;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::TmdbClient;
pub use enrich::{
    backdrop_url, enrich_program, fallback, merge_details, poster_url, BACKDROP_SIZE,
    NO_DESCRIPTION, NO_OVERVIEW, POSTER_SIZE,
};
pub use error::TmdbError;
pub use types::{Credits, FindResponse, FindResult, NamedRef, TmdbCast, TmdbCrew, TmdbDetails};
