/// HTTP client wrappers.
///
/// This module isolates every network call behind two clients: the
/// application's own REST backend (session-aware, bearer auth) and the
/// third-party movie catalog (API-key auth, retry on transient
/// failures). UI code never touches the transport directly.
use crate::{
    error::ClientResult,
    models::{DiscoverFilter, Genre, MovieDetails, MovieSummary, Page, TimeWindow},
};

pub mod backend;
pub mod catalog;

pub use backend::BackendClient;
pub use catalog::CatalogClient;

/// Read-only movie catalog abstraction.
///
/// Keeps listing, search, and detail call sites independent of the
/// concrete catalog vendor so a different metadata source can be
/// swapped in behind the same contract.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Movies trending over the given window.
    async fn trending(&self, window: TimeWindow) -> ClientResult<Page<MovieSummary>>;

    /// Current popular movies.
    async fn popular(&self, page: u32) -> ClientResult<Page<MovieSummary>>;

    /// All-time top-rated movies.
    async fn top_rated(&self, page: u32) -> ClientResult<Page<MovieSummary>>;

    /// Movies currently in theaters.
    async fn now_playing(&self, page: u32) -> ClientResult<Page<MovieSummary>>;

    /// Upcoming releases.
    async fn upcoming(&self, page: u32) -> ClientResult<Page<MovieSummary>>;

    /// Full movie record with credits, videos, images, and related
    /// titles expanded in one call.
    async fn movie_details(&self, movie_id: u64) -> ClientResult<MovieDetails>;

    /// Free-text movie search.
    async fn search(&self, query: &str, page: u32) -> ClientResult<Page<MovieSummary>>;

    /// Filtered discovery listing.
    async fn discover(&self, filter: &DiscoverFilter) -> ClientResult<Page<MovieSummary>>;

    /// The catalog's genre list.
    async fn genres(&self) -> ClientResult<Vec<Genre>>;

    /// Discovery listing restricted to a single genre.
    async fn movies_by_genre(&self, genre_id: u64, page: u32) -> ClientResult<Page<MovieSummary>>;
}
