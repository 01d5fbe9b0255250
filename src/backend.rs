//! Sample movie backend used as a local upstream.
//!
//! Serves `GET {context}/movies/{movie_id}` with a canned [`Movie`] and
//! accepts `POST {context}/movies`. Both handlers log the request headers
//! so the effect of the gateway (API key in, authorization out,
//! correlation id set) is visible end to end.

use std::fmt;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: String,
}

impl Movie {
    #[must_use]
    pub fn canned(id: i64) -> Self {
        Self {
            id,
            title: "Title".into(),
            release_date: "2020-01-01".into(),
        }
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ id={}, title=\"{}\", release_date={} }}",
            self.id, self.title, self.release_date
        )
    }
}

/// Render headers as `[Name:"value", ...]`.
#[must_use]
pub fn format_headers(headers: &HeaderMap) -> String {
    let rendered: Vec<String> = headers
        .iter()
        .map(|(name, value)| {
            format!(
                "{}:\"{}\"",
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes())
            )
        })
        .collect();
    format!("[{}]", rendered.join(", "))
}

async fn get_movie(Path(movie_id): Path<i64>, headers: HeaderMap) -> Json<Movie> {
    tracing::info!(
        movie_id,
        headers = %format_headers(&headers),
        "received request to get movie"
    );
    Json(Movie::canned(movie_id))
}

async fn save_movie(headers: HeaderMap, Json(movie): Json<Movie>) -> StatusCode {
    tracing::info!(
        movie = %movie,
        headers = %format_headers(&headers),
        "received request to save movie"
    );
    StatusCode::OK
}

#[must_use]
pub fn router(context_path: &str) -> Router {
    let movies = Router::new()
        .route("/movies/{movie_id}", get(get_movie))
        .route("/movies", post(save_movie));

    let context = context_path.trim_end_matches('/');
    if context.is_empty() {
        movies
    } else {
        Router::new().nest(context, movies)
    }
}
