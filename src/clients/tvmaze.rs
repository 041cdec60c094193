use chrono::NaiveDate;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::clients::{GatewayError, ShowSource};
use crate::domain::ShowId;
use crate::models::{Episode, Schedule, Season, ShowDetail, ShowSummary};

pub const TVMAZE_API: &str = "https://api.tvmaze.com";

const DEFAULT_MAX_RESULTS: usize = 50;
const SUMMARY_WRAP_WIDTH: usize = 10_000;

#[derive(Debug, Deserialize)]
struct SearchHit {
    score: Option<f64>,
    show: Option<TvMazeShow>,
}

#[derive(Debug, Deserialize)]
struct TvMazeShow {
    id: Option<u32>,
    name: Option<String>,
    language: Option<String>,
    genres: Option<Vec<String>>,
    status: Option<String>,
    runtime: Option<u32>,
    #[serde(rename = "averageRuntime")]
    average_runtime: Option<u32>,
    premiered: Option<String>,
    ended: Option<String>,
    #[serde(rename = "officialSite")]
    official_site: Option<String>,
    schedule: Option<TvMazeSchedule>,
    rating: Option<Rating>,
    network: Option<Channel>,
    #[serde(rename = "webChannel")]
    web_channel: Option<Channel>,
    image: Option<Image>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvMazeSchedule {
    time: Option<String>,
    days: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Rating {
    average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Image {
    medium: Option<String>,
    original: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvMazeEpisode {
    id: u32,
    name: Option<String>,
    season: u32,
    number: Option<u32>,
    airdate: Option<String>,
    runtime: Option<u32>,
    rating: Option<Rating>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvMazeSeason {
    id: u32,
    number: u32,
    name: Option<String>,
    #[serde(rename = "episodeOrder")]
    episode_order: Option<u32>,
    #[serde(rename = "premiereDate")]
    premiere_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

/// HTTP client for the public TVMaze API.
#[derive(Clone)]
pub struct TvMazeClient {
    client: Client,
    base_url: String,
    max_results: usize,
}

impl TvMazeClient {
    /// Wraps an already configured client. The request timeout is whatever
    /// the shared client was built with.
    pub fn with_shared_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "TVMaze request");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "TVMaze request failed");
            return Err(classify_status(status));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Network(format!("invalid response body: {e}")))
    }
}

#[async_trait::async_trait]
impl ShowSource for TvMazeClient {
    async fn search_shows(&self, query: &str) -> Result<Vec<ShowSummary>, GatewayError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GatewayError::validation("search query is empty"));
        }

        let path = format!("/search/shows?q={}", urlencoding::encode(query));
        let hits: Vec<SearchHit> = self.get_json(&path).await?;

        Ok(map_search_hits(hits, self.max_results))
    }

    async fn show_details(&self, id: ShowId) -> Result<ShowDetail, GatewayError> {
        ensure_valid(id)?;
        let show: TvMazeShow = self.get_json(&format!("/shows/{id}")).await?;
        map_show_detail(show)
            .ok_or_else(|| GatewayError::Generic(format!("show {id} payload has no id")))
    }

    async fn show_episodes(&self, id: ShowId) -> Result<Vec<Episode>, GatewayError> {
        ensure_valid(id)?;
        let episodes: Vec<TvMazeEpisode> =
            self.get_json(&format!("/shows/{id}/episodes")).await?;
        Ok(episodes.into_iter().map(map_episode).collect())
    }

    async fn show_seasons(&self, id: ShowId) -> Result<Vec<Season>, GatewayError> {
        ensure_valid(id)?;
        let seasons: Vec<TvMazeSeason> = self.get_json(&format!("/shows/{id}/seasons")).await?;
        Ok(seasons.into_iter().map(map_season).collect())
    }
}

fn ensure_valid(id: ShowId) -> Result<(), GatewayError> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(GatewayError::validation(format!("invalid show id {id}")))
    }
}

/// Maps a non-success HTTP status onto the error taxonomy.
pub(crate) fn classify_status(status: StatusCode) -> GatewayError {
    if status == StatusCode::NOT_FOUND {
        GatewayError::NotFound
    } else if status.is_server_error() {
        GatewayError::Server(status.as_u16())
    } else {
        GatewayError::Generic(format!("HTTP {}", status.as_u16()))
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Network("request timed out".to_string())
    } else {
        GatewayError::Network(err.to_string())
    }
}

fn map_search_hits(hits: Vec<SearchHit>, max_results: usize) -> Vec<ShowSummary> {
    let mut results: Vec<ShowSummary> = hits
        .into_iter()
        .filter_map(|hit| {
            let score = hit.score.unwrap_or_default();
            hit.show.and_then(|show| map_show_summary(show, score))
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(max_results);
    results
}

fn map_show_summary(show: TvMazeShow, score: f64) -> Option<ShowSummary> {
    Some(ShowSummary {
        id: ShowId::new(show.id.filter(|id| *id > 0)?),
        name: show.name.unwrap_or_default(),
        image: show.image.and_then(|i| i.medium.or(i.original)),
        rating: show.rating.and_then(|r| r.average),
        genres: show.genres.unwrap_or_default(),
        status: show.status,
        premiered: parse_date(show.premiered.as_deref()),
        score,
    })
}

fn map_show_detail(show: TvMazeShow) -> Option<ShowDetail> {
    let id = ShowId::new(show.id.filter(|id| *id > 0)?);
    let (image, image_original) = show
        .image
        .map_or((None, None), |i| (i.medium, i.original));

    let schedule = show
        .schedule
        .map(|s| Schedule {
            time: s.time.filter(|t| !t.is_empty()),
            days: s.days.unwrap_or_default(),
        })
        .filter(|s| !s.is_empty());

    Some(ShowDetail {
        id,
        name: show.name.unwrap_or_default(),
        image,
        image_original,
        rating: show.rating.and_then(|r| r.average),
        genres: show.genres.unwrap_or_default(),
        status: show.status,
        premiered: parse_date(show.premiered.as_deref()),
        ended: parse_date(show.ended.as_deref()),
        language: show.language,
        runtime: show.runtime.or(show.average_runtime),
        network: show
            .network
            .and_then(|n| n.name)
            .or_else(|| show.web_channel.and_then(|w| w.name)),
        official_site: show.official_site,
        schedule,
        summary: show.summary.as_deref().and_then(strip_html),
        total_episodes: 0,
        total_seasons: 0,
    })
}

fn map_episode(ep: TvMazeEpisode) -> Episode {
    Episode {
        id: ep.id,
        name: ep.name,
        season: ep.season,
        number: ep.number,
        airdate: parse_date(ep.airdate.as_deref()),
        runtime: ep.runtime,
        rating: ep.rating.and_then(|r| r.average),
        summary: ep.summary.as_deref().and_then(strip_html),
    }
}

fn map_season(season: TvMazeSeason) -> Season {
    Season {
        id: season.id,
        number: season.number,
        name: season.name.filter(|n| !n.is_empty()),
        episode_order: season.episode_order,
        premiere_date: parse_date(season.premiere_date.as_deref()),
        end_date: parse_date(season.end_date.as_deref()),
    }
}

/// TVMaze sends `""` for unknown dates, so parse leniently.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn strip_html(html: &str) -> Option<String> {
    let text = html2text::from_read(html.as_bytes(), SUMMARY_WRAP_WIDTH).ok()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
