use crate::state::AppState;

pub fn cmd_suggest(state: &AppState, partial: &str) -> anyhow::Result<()> {
    for suggestion in state.search.suggestions(partial) {
        println!("{suggestion}");
    }
    Ok(())
}
