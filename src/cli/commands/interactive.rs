use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::clients::GatewayError;
use crate::domain::state::SearchSnapshot;
use crate::models::ShowSummary;
use crate::state::AppState;

const MAX_LISTED: usize = 10;

/// Each input line replaces the current query and goes through the debounced
/// search, so typing several lines quickly only fetches the last one.
pub async fn cmd_interactive(state: &AppState) -> anyhow::Result<()> {
    println!("Type to search. Commands: :retry :clear :history :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = state.search.subscribe();
    let mut shown = RenderKey::default();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    ":quit" | ":q" => break,
                    ":retry" => {
                        if state.search.retry().is_none() {
                            println!("Nothing to retry");
                        }
                    }
                    ":clear" => state.search.clear_search(),
                    ":history" => {
                        for query in state.search.history() {
                            println!("  {query}");
                        }
                    }
                    _ => {
                        state.search.submit(&line);
                        let suggestions = state.search.suggestions(&line);
                        if !suggestions.is_empty() {
                            println!("  recent: {}", suggestions.join(" | "));
                        }
                    }
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                let key = RenderKey::of(&snapshot);
                if key != shown {
                    render(&snapshot);
                    shown = key;
                }
            }
        }
    }

    Ok(())
}

/// The parts of a snapshot worth redrawing for. Edits that only change the
/// typed text are not.
#[derive(Default)]
struct RenderKey {
    is_loading: bool,
    has_searched: bool,
    last_query: String,
    error: Option<GatewayError>,
    results: Arc<Vec<ShowSummary>>,
}

impl RenderKey {
    fn of(snapshot: &SearchSnapshot) -> Self {
        Self {
            is_loading: snapshot.is_loading,
            has_searched: snapshot.has_searched,
            last_query: snapshot.last_query.clone(),
            error: snapshot.error.clone(),
            results: Arc::clone(&snapshot.results),
        }
    }
}

impl PartialEq for RenderKey {
    /// Result lists compare by identity: the held clone keeps the allocation
    /// alive, so a new list never aliases the shown one.
    fn eq(&self, other: &Self) -> bool {
        self.is_loading == other.is_loading
            && self.has_searched == other.has_searched
            && self.last_query == other.last_query
            && self.error == other.error
            && Arc::ptr_eq(&self.results, &other.results)
    }
}

fn render(snapshot: &SearchSnapshot) {
    if snapshot.is_loading {
        println!("Searching for '{}'...", snapshot.query.trim());
        return;
    }

    if let Some(message) = snapshot.error_message() {
        println!("⚠ {message} (type :retry)");
        return;
    }

    if !snapshot.has_searched {
        return;
    }

    if snapshot.is_empty() {
        println!("No shows found for '{}'", snapshot.last_query);
        return;
    }

    println!(
        "{} results for '{}':",
        snapshot.results_count(),
        snapshot.last_query
    );
    for show in snapshot.results.iter().take(MAX_LISTED) {
        let rating = show
            .rating
            .map_or_else(String::new, |r| format!(" [{r:.1}]"));
        println!("  {:>6}  {}{rating}", show.id.value(), show.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShowId;

    fn searched(results: Arc<Vec<ShowSummary>>) -> SearchSnapshot {
        SearchSnapshot {
            query: "lost".to_string(),
            results,
            has_searched: true,
            last_query: "lost".to_string(),
            ..SearchSnapshot::default()
        }
    }

    fn lost() -> Vec<ShowSummary> {
        vec![ShowSummary {
            id: ShowId::new(123),
            name: "Lost".to_string(),
            image: None,
            rating: None,
            genres: vec![],
            status: None,
            premiered: None,
            score: 1.0,
        }]
    }

    #[test]
    fn typing_alone_does_not_redraw() {
        let shown = searched(Arc::new(lost()));
        let mut typed = shown.clone();
        typed.query = "los".to_string();

        assert!(RenderKey::of(&shown) == RenderKey::of(&typed));
    }

    #[test]
    fn refreshed_results_redraw_even_when_equal() {
        let first = searched(Arc::new(lost()));
        let key = RenderKey::of(&first);
        drop(first);

        let refreshed = searched(Arc::new(lost()));
        assert!(key != RenderKey::of(&refreshed));
    }
}
