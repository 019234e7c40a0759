//! Stat categories and their listing URLs

use std::fmt;

/// Player stat categories published on nfl.com
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Passing,
    Rushing,
    Receiving,
    Fumbles,
    Tackles,
    Interceptions,
    FieldGoals,
    Kickoffs,
    KickoffReturns,
    Punts,
    PuntReturns,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Passing,
        Category::Rushing,
        Category::Receiving,
        Category::Fumbles,
        Category::Tackles,
        Category::Interceptions,
        Category::FieldGoals,
        Category::Kickoffs,
        Category::KickoffReturns,
        Category::Punts,
        Category::PuntReturns,
    ];

    /// URL path segment
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Passing => "passing",
            Category::Rushing => "rushing",
            Category::Receiving => "receiving",
            Category::Fumbles => "fumbles",
            Category::Tackles => "tackles",
            Category::Interceptions => "interceptions",
            Category::FieldGoals => "field-goals",
            Category::Kickoffs => "kickoffs",
            Category::KickoffReturns => "kickoff-returns",
            Category::Punts => "punts",
            Category::PuntReturns => "punt-returns",
        }
    }

    /// Column the listing is sorted on (descending)
    pub fn sort_key(&self) -> &'static str {
        match self {
            Category::Passing => "passingyards",
            Category::Rushing => "rushingyards",
            Category::Receiving => "receivingreceptions",
            Category::Fumbles => "defensiveforcedfumble",
            Category::Tackles => "defensivecombinetackles",
            Category::Interceptions => "defensiveinterceptions",
            Category::FieldGoals => "kickingfgmade",
            Category::Kickoffs => "kickofftotal",
            Category::KickoffReturns => "kickreturnsaverageyards",
            Category::Punts => "puntingaverageyards",
            Category::PuntReturns => "puntreturnsaverageyards",
        }
    }

    /// Regular-season player listing for a year
    pub fn player_stats_url(&self, root_url: &str, year: u16) -> String {
        format!(
            "{}/stats/player-stats/category/{}/{}/reg/all/{}/desc",
            root_url.trim_end_matches('/'),
            self.slug(),
            year,
            self.sort_key()
        )
    }

    /// Regular-season team defense listing for a year
    pub fn team_defense_url(&self, root_url: &str, year: u16) -> String {
        format!(
            "{}/stats/team-stats/defense/{}/{}/reg/all",
            root_url.trim_end_matches('/'),
            self.slug(),
            year
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}
