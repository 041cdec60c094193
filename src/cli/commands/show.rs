use super::parse_show_id;
use crate::state::AppState;

pub async fn cmd_show(state: &AppState, id_str: &str) -> anyhow::Result<()> {
    let Some(id) = parse_show_id(id_str) else {
        println!("Invalid show ID: {id_str}");
        return Ok(());
    };

    let Some(show) = state.shows.load_show(id).await else {
        let message = state
            .shows
            .snapshot()
            .error_message()
            .unwrap_or("Show not found");
        anyhow::bail!("{message}");
    };

    println!("Show Info");
    println!("{:-<60}", "");
    println!("Title:    {}", show.name);
    println!("ID:       {}", show.id);
    if let Some(status) = &show.status {
        println!("Status:   {status}");
    }
    if let Some(premiered) = show.premiered {
        match show.ended {
            Some(ended) => println!("Aired:    {premiered} to {ended}"),
            None => println!("Aired:    {premiered}"),
        }
    }
    if let Some(network) = &show.network {
        println!("Network:  {network}");
    }
    if let Some(language) = &show.language {
        println!("Language: {language}");
    }
    if let Some(runtime) = show.runtime {
        println!("Runtime:  {runtime} min");
    }
    if let Some(rating) = show.rating {
        println!("Rating:   {rating:.1}");
    }
    if !show.genres.is_empty() {
        println!("Genres:   {}", show.genres.join(", "));
    }
    if let Some(schedule) = show.schedule.as_ref().filter(|s| !s.is_empty()) {
        println!(
            "Airs:     {} {}",
            schedule.days.join(", "),
            schedule.time.as_deref().unwrap_or("")
        );
    }
    println!(
        "Episodes: {} across {} seasons",
        show.total_episodes, show.total_seasons
    );
    if let Some(site) = &show.official_site {
        println!("Website:  {site}");
    }

    if let Some(summary) = &show.summary {
        println!();
        println!("{summary}");
    }

    println!();
    Ok(())
}
