/// Third-party movie catalog client.
///
/// Every call goes out with the API key as a query parameter and comes
/// back through one classification path: transient failures are retried
/// on a single-retry schedule, terminal failures are mapped into the
/// crate error taxonomy and reported through the notifier. 404 stays
/// silent so callers can decide their own fallback rendering.
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    clients::CatalogSource,
    config::Config,
    error::{ApiError, ClientResult},
    models::{DiscoverFilter, Genre, ImageSize, MovieDetails, MovieSummary, Page, TimeWindow},
    notify::{LogNotifier, Notifier, NoticeLevel},
    retry::RetryPolicy,
};

/// Delay before the catalog client's single retry.
const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Sub-resources expanded on the movie detail call.
const DETAIL_APPENDS: &str = "credits,videos,images,similar,recommendations";

#[derive(Clone)]
pub struct CatalogClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base: String,
    timeout: Duration,
    retry: RetryPolicy,
    notifier: Arc<dyn Notifier>,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Self {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    pub fn with_notifier(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key: config.catalog_api_key.clone(),
            api_url: config.catalog_api_url.trim_end_matches('/').to_string(),
            image_base: config.catalog_image_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.catalog_timeout_secs),
            retry: RetryPolicy::single_retry(RETRY_DELAY),
            notifier,
        }
    }

    /// Overrides the retry schedule. Tests use short delays.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Absolute image URL for a catalog-relative path, or `None` when
    /// the record has no image. Callers render their own placeholder.
    pub fn image_url(&self, path: &str, size: ImageSize) -> Option<String> {
        if path.is_empty() {
            return None;
        }
        Some(format!("{}/{}{}", self.image_base, size.as_str(), path))
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        self.http_client
            .get(url)
            .timeout(self.timeout)
            .query(&[("api_key", self.api_key.as_str())])
    }

    /// Issues a GET under the retry schedule and reports whatever is
    /// still failing after it.
    async fn fetch<T, F>(&self, build: F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let result = self.retry.run(|| Self::dispatch::<T>(build())).await;

        if let Err(err) = &result {
            tracing::warn!(error = %err, "Catalog request failed");
            self.report(err);
        }

        result
    }

    /// One request/response cycle with status classification.
    async fn dispatch<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return Err(ApiError::Network(err.to_string())),
        };

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 => ApiError::InvalidApiKey,
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimited,
            code if status.is_server_error() => ApiError::Server {
                status: code,
                message: body,
            },
            code if status.is_client_error() => ApiError::Client {
                status: code,
                message: body,
            },
            code => ApiError::Unexpected {
                status: code,
                message: body,
            },
        })
    }

    /// User-facing notification for a failed call.
    fn report(&self, err: &ApiError) {
        let message = match err {
            ApiError::Network(_) => "Network error. Please check your internet connection.",
            ApiError::InvalidApiKey => "API key is invalid. Please check your configuration.",
            ApiError::RateLimited => "Too many requests. Please try again later.",
            ApiError::Server { .. } => "Server error. Please try again later.",
            ApiError::Client { .. } | ApiError::Unexpected { .. } => {
                "An unexpected error occurred. Please try again."
            }
            // 404 is the caller's call; decode and storage failures are
            // programmer-facing, not user-facing.
            ApiError::NotFound(_)
            | ApiError::Unauthorized
            | ApiError::Storage(_)
            | ApiError::Decode(_) => return,
        };

        self.notifier.notify(NoticeLevel::Error, message);
    }
}

#[async_trait::async_trait]
impl CatalogSource for CatalogClient {
    async fn trending(&self, window: TimeWindow) -> ClientResult<Page<MovieSummary>> {
        self.fetch(|| self.request(&format!("/trending/movie/{}", window.as_str())))
            .await
    }

    async fn popular(&self, page: u32) -> ClientResult<Page<MovieSummary>> {
        self.fetch(|| self.request("/movie/popular").query(&[("page", page)]))
            .await
    }

    async fn top_rated(&self, page: u32) -> ClientResult<Page<MovieSummary>> {
        self.fetch(|| self.request("/movie/top_rated").query(&[("page", page)]))
            .await
    }

    async fn now_playing(&self, page: u32) -> ClientResult<Page<MovieSummary>> {
        self.fetch(|| self.request("/movie/now_playing").query(&[("page", page)]))
            .await
    }

    async fn upcoming(&self, page: u32) -> ClientResult<Page<MovieSummary>> {
        self.fetch(|| self.request("/movie/upcoming").query(&[("page", page)]))
            .await
    }

    async fn movie_details(&self, movie_id: u64) -> ClientResult<MovieDetails> {
        self.fetch(|| {
            self.request(&format!("/movie/{movie_id}"))
                .query(&[("append_to_response", DETAIL_APPENDS)])
        })
        .await
    }

    async fn search(&self, query: &str, page: u32) -> ClientResult<Page<MovieSummary>> {
        self.fetch(|| {
            self.request("/search/movie")
                .query(&[("query", query)])
                .query(&[("page", page)])
        })
        .await
    }

    async fn discover(&self, filter: &DiscoverFilter) -> ClientResult<Page<MovieSummary>> {
        self.fetch(|| self.request("/discover/movie").query(filter)).await
    }

    async fn genres(&self) -> ClientResult<Vec<Genre>> {
        #[derive(Deserialize)]
        struct GenreEnvelope {
            genres: Vec<Genre>,
        }

        let envelope: GenreEnvelope = self.fetch(|| self.request("/genre/movie/list")).await?;
        Ok(envelope.genres)
    }

    async fn movies_by_genre(&self, genre_id: u64, page: u32) -> ClientResult<Page<MovieSummary>> {
        self.fetch(|| {
            self.request("/discover/movie")
                .query(&[("with_genres", genre_id)])
                .query(&[("page", page)])
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MockNotifier;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_url: &str) -> Config {
        Config {
            backend_api_url: "http://localhost:5000/api".to_string(),
            catalog_api_key: "test_key".to_string(),
            catalog_api_url: api_url.to_string(),
            catalog_image_url: "https://image.tmdb.org/t/p".to_string(),
            catalog_timeout_secs: 5,
            sync_watchlist_on_login: false,
            data_dir: None,
        }
    }

    #[test]
    fn test_image_url_concatenates_base_size_and_path() {
        let client = CatalogClient::new(&test_config("http://test.local"));
        assert_eq!(
            client.image_url("/poster.jpg", ImageSize::W500),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg".to_string())
        );
    }

    #[test]
    fn test_image_url_empty_path_is_none() {
        let client = CatalogClient::new(&test_config("http://test.local"));
        assert_eq!(client.image_url("", ImageSize::Original), None);
    }

    #[tokio::test]
    async fn test_api_key_travels_as_query_parameter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/movie/popular"))
            .and(query_param("api_key", "test_key"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1, "results": [], "total_pages": 0, "total_results": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CatalogClient::new(&test_config(&server.uri()));
        client.popular(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_not_found_stays_silent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/movie/999"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status_message": "The resource you requested could not be found."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let client =
            CatalogClient::with_notifier(&test_config(&server.uri()), Arc::new(notifier));

        let result = client.movie_details(999).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_key_notifies_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/genre/movie/list"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|level, message| {
                *level == NoticeLevel::Error
                    && message == "API key is invalid. Please check your configuration."
            })
            .times(1)
            .return_const(());

        let client =
            CatalogClient::with_notifier(&test_config(&server.uri()), Arc::new(notifier));

        let result = client.genres().await;
        assert_eq!(result.unwrap_err(), ApiError::InvalidApiKey);
    }
}
