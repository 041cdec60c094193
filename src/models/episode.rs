use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u32,
    pub name: Option<String>,
    pub season: u32,
    /// `None` for specials that sit outside the regular numbering.
    pub number: Option<u32>,
    pub airdate: Option<NaiveDate>,
    pub runtime: Option<u32>,
    pub rating: Option<f32>,
    pub summary: Option<String>,
}

impl Episode {
    /// `S01E05` style label; specials are labelled `S01 Special`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.number {
            Some(number) => format!("S{:02}E{:02}", self.season, number),
            None => format!("S{:02} Special", self.season),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: u32,
    pub number: u32,
    pub name: Option<String>,
    pub episode_order: Option<u32>,
    pub premiere_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
