pub mod history;
pub use history::{SearchHistory, SharedHistory};

pub mod search;
pub use search::{SearchService, SearchSettings};

pub mod shows;
pub use shows::ShowService;
