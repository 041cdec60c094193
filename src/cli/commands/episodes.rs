use super::parse_show_id;
use crate::state::AppState;

pub async fn cmd_episodes(state: &AppState, id_str: &str, season: Option<u32>) -> anyhow::Result<()> {
    let Some(id) = parse_show_id(id_str) else {
        println!("Invalid show ID: {id_str}");
        return Ok(());
    };

    let episodes = state
        .shows
        .episodes(id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;

    let episodes: Vec<_> = episodes
        .into_iter()
        .filter(|ep| season.is_none_or(|s| ep.season == s))
        .collect();

    if episodes.is_empty() {
        println!("No episodes found");
        return Ok(());
    }

    println!("Episodes for show {id}");
    println!("{:-<70}", "");

    let mut current_season = None;
    for ep in &episodes {
        if current_season != Some(ep.season) {
            current_season = Some(ep.season);
            println!();
            println!("Season {}", ep.season);
        }

        let title = ep.name.as_deref().unwrap_or("(No title)");
        let aired = ep
            .airdate
            .map_or_else(String::new, |d| format!(" - {d}"));
        println!("  {} {title}{aired}", ep.label());
    }

    println!();
    println!("{} episodes", episodes.len());
    Ok(())
}
