/// Backend REST API client.
///
/// Injects the session's bearer token on every request and tears the
/// session down when the backend answers 401. The client never
/// navigates: hosts subscribe to the invalidation event on the session
/// handle and decide what an expired session looks like.
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{ApiError, ClientResult},
    models::{
        AuthResponse, Comment, CommentDraft, Credentials, MovieRating, MovieSummary, NewUser,
        ProfileUpdate, Review, ReviewDraft, User, WatchlistRow,
    },
    store::session::SessionHandle,
};

/// Header carrying the client-generated correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct BackendClient {
    http_client: HttpClient,
    base_url: String,
    session: SessionHandle,
}

impl BackendClient {
    pub fn new(config: &Config, session: SessionHandle) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: config.backend_api_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Session handle shared with the stores.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Builds a request with the JSON content type, a correlation ID,
    /// and the bearer token when a session exists.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http_client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());

        if let Some(token) = self.session.token() {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }

        builder
    }

    /// Sends the request and decodes a JSON body, mapping failures into
    /// the crate error taxonomy. A 401 clears the session before the
    /// error is returned to the caller.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await.map_err(ApiError::from)?;
        let response = self.check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn check_status(&self, response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = read_error_body(response).await;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Backend rejected the session token, clearing session");
            self.session.invalidate();
            return Err(ApiError::Unauthorized);
        }

        Err(match status.as_u16() {
            404 => ApiError::NotFound(message),
            code if status.is_server_error() => ApiError::Server {
                status: code,
                message,
            },
            code if status.is_client_error() => ApiError::Client {
                status: code,
                message,
            },
            code => ApiError::Unexpected {
                status: code,
                message,
            },
        })
    }

    // Authentication

    pub async fn register(&self, new_user: &NewUser) -> ClientResult<AuthResponse> {
        self.execute(self.request(Method::POST, "/auth/register").json(new_user))
            .await
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        self.execute(self.request(Method::POST, "/auth/login").json(credentials))
            .await
    }

    pub async fn current_user(&self) -> ClientResult<User> {
        #[derive(Deserialize)]
        struct UserEnvelope {
            user: User,
        }

        let envelope: UserEnvelope = self.execute(self.request(Method::GET, "/auth/me")).await?;
        Ok(envelope.user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        #[derive(Deserialize)]
        struct UserEnvelope {
            user: User,
        }

        let envelope: UserEnvelope = self
            .execute(self.request(Method::PUT, "/auth/profile").json(update))
            .await?;
        Ok(envelope.user)
    }

    // Watchlist

    pub async fn watchlist(&self) -> ClientResult<Vec<WatchlistRow>> {
        #[derive(Deserialize)]
        struct WatchlistEnvelope {
            watchlist: Vec<WatchlistRow>,
        }

        let envelope: WatchlistEnvelope =
            self.execute(self.request(Method::GET, "/watchlist")).await?;
        Ok(envelope.watchlist)
    }

    pub async fn add_to_watchlist(&self, movie: &MovieSummary) -> ClientResult<()> {
        #[derive(Serialize)]
        struct AddBody<'a> {
            #[serde(rename = "movieData")]
            movie_data: MoviePayload<'a>,
        }

        self.execute::<serde_json::Value>(self.request(Method::POST, "/watchlist").json(&AddBody {
            movie_data: MoviePayload::from(movie),
        }))
        .await?;
        Ok(())
    }

    pub async fn remove_from_watchlist(&self, tmdb_id: u64) -> ClientResult<()> {
        self.execute::<serde_json::Value>(
            self.request(Method::DELETE, &format!("/watchlist/{tmdb_id}")),
        )
        .await?;
        Ok(())
    }

    pub async fn in_watchlist(&self, tmdb_id: u64) -> ClientResult<bool> {
        #[derive(Deserialize)]
        struct CheckEnvelope {
            #[serde(rename = "inWatchlist")]
            in_watchlist: bool,
        }

        let envelope: CheckEnvelope = self
            .execute(self.request(Method::GET, &format!("/watchlist/check/{tmdb_id}")))
            .await?;
        Ok(envelope.in_watchlist)
    }

    // Reviews

    pub async fn movie_reviews(&self, tmdb_id: u64) -> ClientResult<Vec<Review>> {
        #[derive(Deserialize)]
        struct ReviewsEnvelope {
            reviews: Vec<Review>,
        }

        let envelope: ReviewsEnvelope = self
            .execute(self.request(Method::GET, &format!("/reviews/movie/{tmdb_id}")))
            .await?;
        Ok(envelope.reviews)
    }

    /// Submits a review; the backend upserts per (user, movie).
    pub async fn submit_review(&self, tmdb_id: u64, draft: &ReviewDraft) -> ClientResult<()> {
        self.execute::<serde_json::Value>(
            self.request(Method::POST, &format!("/reviews/movie/{tmdb_id}"))
                .json(draft),
        )
        .await?;
        Ok(())
    }

    pub async fn user_review(&self, tmdb_id: u64) -> ClientResult<Option<Review>> {
        #[derive(Deserialize)]
        struct ReviewEnvelope {
            review: Option<Review>,
        }

        let envelope: ReviewEnvelope = self
            .execute(self.request(Method::GET, &format!("/reviews/movie/{tmdb_id}/user")))
            .await?;
        Ok(envelope.review)
    }

    pub async fn movie_rating(&self, tmdb_id: u64) -> ClientResult<MovieRating> {
        self.execute(self.request(Method::GET, &format!("/reviews/movie/{tmdb_id}/rating")))
            .await
    }

    pub async fn delete_review(&self, review_id: i64) -> ClientResult<()> {
        self.execute::<serde_json::Value>(
            self.request(Method::DELETE, &format!("/reviews/{review_id}")),
        )
        .await?;
        Ok(())
    }

    // Comments

    pub async fn movie_comments(&self, tmdb_id: u64) -> ClientResult<Vec<Comment>> {
        #[derive(Deserialize)]
        struct CommentsEnvelope {
            comments: Vec<Comment>,
        }

        let envelope: CommentsEnvelope = self
            .execute(self.request(Method::GET, &format!("/comments/movie/{tmdb_id}")))
            .await?;
        Ok(envelope.comments)
    }

    pub async fn add_comment(&self, tmdb_id: u64, draft: &CommentDraft) -> ClientResult<Comment> {
        #[derive(Deserialize)]
        struct CommentEnvelope {
            comment: Comment,
        }

        let envelope: CommentEnvelope = self
            .execute(
                self.request(Method::POST, &format!("/comments/movie/{tmdb_id}"))
                    .json(draft),
            )
            .await?;
        Ok(envelope.comment)
    }

    pub async fn update_comment(&self, comment_id: i64, comment_text: &str) -> ClientResult<()> {
        #[derive(Serialize)]
        struct UpdateBody<'a> {
            comment_text: &'a str,
        }

        self.execute::<serde_json::Value>(
            self.request(Method::PUT, &format!("/comments/{comment_id}"))
                .json(&UpdateBody { comment_text }),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_comment(&self, comment_id: i64) -> ClientResult<()> {
        self.execute::<serde_json::Value>(
            self.request(Method::DELETE, &format!("/comments/{comment_id}")),
        )
        .await?;
        Ok(())
    }
}

/// Denormalized movie columns the backend persists on first sight of a
/// movie. The catalog's `id` travels as `tmdb_id`.
#[derive(Serialize)]
struct MoviePayload<'a> {
    tmdb_id: u64,
    title: &'a str,
    original_title: Option<&'a str>,
    overview: Option<&'a str>,
    release_date: Option<&'a str>,
    vote_average: Option<f64>,
    vote_count: Option<u64>,
    popularity: Option<f64>,
    poster_path: Option<&'a str>,
    backdrop_path: Option<&'a str>,
    original_language: Option<&'a str>,
}

impl<'a> From<&'a MovieSummary> for MoviePayload<'a> {
    fn from(movie: &'a MovieSummary) -> Self {
        Self {
            tmdb_id: movie.id,
            title: &movie.title,
            original_title: movie.original_title.as_deref(),
            overview: movie.overview.as_deref(),
            release_date: movie.release_date.as_deref(),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            popularity: movie.popularity,
            poster_path: movie.poster_path.as_deref(),
            backdrop_path: movie.backdrop_path.as_deref(),
            original_language: movie.original_language.as_deref(),
        }
    }
}

async fn read_error_body(response: Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let raw = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&raw) {
        Ok(body) => body.error,
        Err(_) => raw,
    }
}
