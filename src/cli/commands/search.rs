use std::collections::HashSet;

use crate::domain::SortBy;
use crate::domain::state::{SearchSnapshot, sort_shows};
use crate::models::ShowSummary;
use crate::state::AppState;

pub struct SearchFilters {
    pub sort: SortBy,
    pub genre: Option<String>,
    pub min_rating: Option<f32>,
    pub stats: bool,
}

pub async fn cmd_search(state: &AppState, query: &str, filters: &SearchFilters) -> anyhow::Result<()> {
    state.search.submit_immediate(query).await?;
    let snapshot = state.search.snapshot();

    if let Some(message) = snapshot.error_message() {
        anyhow::bail!("{message}");
    }

    if !snapshot.has_searched {
        println!(
            "Query must be at least {} characters",
            state.search.settings().min_query_length
        );
        return Ok(());
    }

    let shows = apply_filters(&snapshot, filters);
    if shows.is_empty() {
        println!("No shows found matching '{}'", query.trim());
        return Ok(());
    }

    println!("Search Results for '{}':", snapshot.last_query);
    println!("{:-<60}", "");
    for show in &shows {
        print_summary(show);
    }

    if filters.stats {
        print_stats(&snapshot);
    }

    println!("For details: tvapi show <id>");
    Ok(())
}

fn apply_filters(snapshot: &SearchSnapshot, filters: &SearchFilters) -> Vec<ShowSummary> {
    let rated: HashSet<_> = snapshot
        .filter_by_rating(filters.min_rating.unwrap_or_default())
        .into_iter()
        .map(|show| show.id)
        .collect();

    let shows = snapshot
        .filter_by_genre(filters.genre.as_deref().unwrap_or_default())
        .into_iter()
        .filter(|show| rated.contains(&show.id))
        .cloned()
        .collect();

    sort_shows(shows, filters.sort)
}

fn print_summary(show: &ShowSummary) {
    let year = show
        .premiered
        .map_or_else(|| "?".to_string(), |d| d.format("%Y").to_string());
    let rating = show
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));

    println!("• {} ({year})", show.name);
    println!(
        "  ID: {} | Rating: {rating} | Status: {}",
        show.id,
        show.status.as_deref().unwrap_or("Unknown")
    );
    if !show.genres.is_empty() {
        println!("  Genres: {}", show.genres.join(", "));
    }
    println!();
}

fn print_stats(snapshot: &SearchSnapshot) {
    let stats = snapshot.stats();

    println!("Summary");
    println!("{:-<60}", "");
    println!("Total:    {}", stats.total);
    if stats.average_rating > 0.0 {
        println!(
            "Rating:   avg {:.1} (min {:.1}, max {:.1})",
            stats.average_rating, stats.rating_range.0, stats.rating_range.1
        );
    }
    for (status, count) in &stats.by_status {
        println!("Status:   {status} x{count}");
    }
    for (genre, count) in &stats.by_genre {
        println!("Genre:    {genre} x{count}");
    }
    println!();
}
