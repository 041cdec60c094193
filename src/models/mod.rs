pub mod episode;
pub mod show;

pub use episode::{Episode, Season};
pub use show::{Schedule, ShowDetail, ShowSummary};
