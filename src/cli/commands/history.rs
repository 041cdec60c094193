use crate::state::AppState;

pub fn cmd_history(state: &AppState, clear: bool) -> anyhow::Result<()> {
    if clear {
        state.search.clear_history();
        println!("✓ Search history cleared");
        return Ok(());
    }

    let history = state.search.history();
    if history.is_empty() {
        println!("No recent searches");
        return Ok(());
    }

    println!("Recent Searches");
    println!("{:-<40}", "");
    for (i, query) in history.iter().enumerate() {
        println!("{:>2}. {query}", i + 1);
    }
    Ok(())
}
