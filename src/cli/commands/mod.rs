mod episodes;
mod history;
mod init;
mod interactive;
mod search;
mod show;
mod suggest;

pub use episodes::cmd_episodes;
pub use history::cmd_history;
pub use init::cmd_init;
pub use interactive::cmd_interactive;
pub use search::{SearchFilters, cmd_search};
pub use show::cmd_show;
pub use suggest::cmd_suggest;

use crate::domain::ShowId;

fn parse_show_id(id_str: &str) -> Option<ShowId> {
    id_str.parse::<ShowId>().ok().filter(ShowId::is_valid)
}
