use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod catalog;

pub use catalog::{
    CastMember, Credits, CrewMember, DiscoverFilter, Genre, ImageCollection, ImageRecord,
    ImageSize, MovieDetails, MovieSummary, Page, TimeWindow, Video, VideoList,
};

/// Registered account identity returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Login payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Profile fields the backend accepts on update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// `{ user, token }` envelope returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Row from `GET /watchlist`: the watchlist linkage joined with the
/// denormalized movie columns.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistRow {
    pub id: i64,
    pub tmdb_id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Client-side watchlist entry: a denormalized movie record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub tmdb_id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    pub added_at: DateTime<Utc>,
}

impl From<&MovieSummary> for WatchlistEntry {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            tmdb_id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
            added_at: Utc::now(),
        }
    }
}

impl From<WatchlistRow> for WatchlistEntry {
    fn from(row: WatchlistRow) -> Self {
        Self {
            tmdb_id: row.tmdb_id,
            title: row.title,
            poster_path: row.poster_path,
            release_date: row.release_date,
            vote_average: row.vote_average,
            added_at: row.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// A user review with its author fields joined in.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub id: i64,
    pub rating: u8,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Review submission. The backend upserts per (user, movie), so
/// resubmitting replaces the previous rating and text.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDraft {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
}

/// Aggregate rating for a movie. The backend renders the average with
/// one decimal place, as a string, and sends null with no reviews.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MovieRating {
    #[serde(rename = "averageRating")]
    pub average_rating: Option<String>,
    #[serde(rename = "reviewCount")]
    pub review_count: i64,
}

/// A comment with one level of threaded replies.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub comment_text: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

/// Comment submission, optionally replying to an existing comment.
#[derive(Debug, Clone, Serialize)]
pub struct CommentDraft {
    pub comment_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}
