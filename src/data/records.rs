//! Typed stat records
//!
//! Every record is built from one table row by column position. The position
//! of each field lives in the record's `SCHEMA` table and nowhere else, so a
//! layout change on the site is a one-line edit there.

use super::category::Category;
use crate::{Result, StatsError};
use rusqlite::types::Value;

/// A record that can be written to the store
pub trait Persist {
    const TABLE: &'static str;
    /// Column names, in the order of [`Persist::values`]
    const COLUMNS: &'static [&'static str];

    fn values(&self) -> Vec<Value>;
}

/// A per-season record scraped from a category listing
pub trait StatRecord: Persist + Sized {
    /// Source columns in table order; column 0 is the player or team name
    const SCHEMA: &'static [&'static str];
    const CATEGORY: Category;

    fn listing_url(root_url: &str, year: u16) -> String;

    fn from_row(year: u16, row: &Row<'_>) -> Result<Self>;
}

/// One table row viewed through a schema
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    schema: &'static [&'static str],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Rejects rows too short to hold every schema column
    pub fn new(schema: &'static [&'static str], cells: &'a [String]) -> Result<Self> {
        if cells.len() < schema.len() {
            return Err(StatsError::Parse(format!(
                "row has {} cells, expected {}",
                cells.len(),
                schema.len()
            )));
        }
        Ok(Row { schema, cells })
    }

    fn cell(&self, field: &str) -> Result<&'a str> {
        let idx = self
            .schema
            .iter()
            .position(|f| *f == field)
            .ok_or_else(|| StatsError::Parse(format!("no column named {}", field)))?;
        Ok(self.cells[idx].trim())
    }

    pub fn text(&self, field: &str) -> Result<String> {
        Ok(self.cell(field)?.to_string())
    }

    /// Integer cell; blank reads as 0
    pub fn int(&self, field: &str) -> Result<i64> {
        let cell = self.cell(field)?;
        if cell.is_empty() {
            return Ok(0);
        }
        cell.replace(',', "")
            .parse()
            .map_err(|_| StatsError::Parse(format!("{}: not an integer: {:?}", field, cell)))
    }

    /// Decimal cell; blank reads as 0.0
    pub fn float(&self, field: &str) -> Result<f64> {
        let cell = self.cell(field)?;
        if cell.is_empty() {
            return Ok(0.0);
        }
        cell.replace(',', "")
            .parse()
            .map_err(|_| StatsError::Parse(format!("{}: not a number: {:?}", field, cell)))
    }
}

/// First half of a name the site renders twice ("DallasDallas")
pub fn halve_repeated(name: &str) -> String {
    let half = name.chars().count() / 2;
    name.chars().take(half).collect::<String>().trim().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassingStats {
    pub year: u16,
    pub player: String,
    pub pass_yds: i64,
    pub yds_att: f64,
    pub att: i64,
    pub cmp: i64,
    pub cmp_pct: f64,
    pub td: i64,
    pub interceptions: i64,
    pub rate: f64,
    pub first_downs: i64,
    pub first_pct: f64,
    pub twenty_plus: i64,
    pub forty_plus: i64,
    pub lng: i64,
    pub sck: i64,
    pub scky: i64,
}

impl StatRecord for PassingStats {
    const SCHEMA: &'static [&'static str] = &[
        "player", "pass_yds", "yds_att", "att", "cmp", "cmp_pct", "td", "interceptions",
        "rate", "first_downs", "first_pct", "twenty_plus", "forty_plus", "lng", "sck", "scky",
    ];

    const CATEGORY: Category = Category::Passing;

    fn listing_url(root_url: &str, year: u16) -> String {
        Self::CATEGORY.player_stats_url(root_url, year)
    }

    fn from_row(year: u16, row: &Row<'_>) -> Result<Self> {
        Ok(PassingStats {
            year,
            player: row.text("player")?,
            pass_yds: row.int("pass_yds")?,
            yds_att: row.float("yds_att")?,
            att: row.int("att")?,
            cmp: row.int("cmp")?,
            cmp_pct: row.float("cmp_pct")?,
            td: row.int("td")?,
            interceptions: row.int("interceptions")?,
            rate: row.float("rate")?,
            first_downs: row.int("first_downs")?,
            first_pct: row.float("first_pct")?,
            twenty_plus: row.int("twenty_plus")?,
            forty_plus: row.int("forty_plus")?,
            lng: row.int("lng")?,
            sck: row.int("sck")?,
            scky: row.int("scky")?,
        })
    }
}

impl Persist for PassingStats {
    const TABLE: &'static str = "passing_stats";
    const COLUMNS: &'static [&'static str] = &[
        "year", "player", "pass_yds", "yds_att", "att", "cmp", "cmp_pct", "td", "interceptions",
        "rate", "first_downs", "first_pct", "twenty_plus", "forty_plus", "lng", "sck", "scky",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.year.into(),
            self.player.clone().into(),
            self.pass_yds.into(),
            self.yds_att.into(),
            self.att.into(),
            self.cmp.into(),
            self.cmp_pct.into(),
            self.td.into(),
            self.interceptions.into(),
            self.rate.into(),
            self.first_downs.into(),
            self.first_pct.into(),
            self.twenty_plus.into(),
            self.forty_plus.into(),
            self.lng.into(),
            self.sck.into(),
            self.scky.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RushingStats {
    pub year: u16,
    pub player: String,
    pub rush_yds: i64,
    pub att: i64,
    pub td: i64,
    pub twenty_plus: i64,
    pub forty_plus: i64,
    pub lng: i64,
    pub rush_first: i64,
    pub rush_first_pct: f64,
    pub rush_fum: i64,
}

impl StatRecord for RushingStats {
    const SCHEMA: &'static [&'static str] = &[
        "player", "rush_yds", "att", "td", "twenty_plus", "forty_plus", "lng", "rush_first",
        "rush_first_pct", "rush_fum",
    ];

    const CATEGORY: Category = Category::Rushing;

    fn listing_url(root_url: &str, year: u16) -> String {
        Self::CATEGORY.player_stats_url(root_url, year)
    }

    fn from_row(year: u16, row: &Row<'_>) -> Result<Self> {
        Ok(RushingStats {
            year,
            player: row.text("player")?,
            rush_yds: row.int("rush_yds")?,
            att: row.int("att")?,
            td: row.int("td")?,
            twenty_plus: row.int("twenty_plus")?,
            forty_plus: row.int("forty_plus")?,
            lng: row.int("lng")?,
            rush_first: row.int("rush_first")?,
            rush_first_pct: row.float("rush_first_pct")?,
            rush_fum: row.int("rush_fum")?,
        })
    }
}

impl Persist for RushingStats {
    const TABLE: &'static str = "rushing_stats";
    const COLUMNS: &'static [&'static str] = &[
        "year", "player", "rush_yds", "att", "td", "twenty_plus", "forty_plus", "lng",
        "rush_first", "rush_first_pct", "rush_fum",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.year.into(),
            self.player.clone().into(),
            self.rush_yds.into(),
            self.att.into(),
            self.td.into(),
            self.twenty_plus.into(),
            self.forty_plus.into(),
            self.lng.into(),
            self.rush_first.into(),
            self.rush_first_pct.into(),
            self.rush_fum.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivingStats {
    pub year: u16,
    pub player: String,
    pub rec: i64,
    pub yds: i64,
    pub td: i64,
    pub twenty_plus: i64,
    pub forty_plus: i64,
    pub lng: i64,
    pub rec_first: i64,
    pub first_pct: f64,
    pub rec_fum: i64,
    pub rec_yac_r: i64,
    pub tgts: i64,
}

impl StatRecord for ReceivingStats {
    const SCHEMA: &'static [&'static str] = &[
        "player", "rec", "yds", "td", "twenty_plus", "forty_plus", "lng", "rec_first",
        "first_pct", "rec_fum", "rec_yac_r", "tgts",
    ];

    const CATEGORY: Category = Category::Receiving;

    fn listing_url(root_url: &str, year: u16) -> String {
        Self::CATEGORY.player_stats_url(root_url, year)
    }

    fn from_row(year: u16, row: &Row<'_>) -> Result<Self> {
        Ok(ReceivingStats {
            year,
            player: row.text("player")?,
            rec: row.int("rec")?,
            yds: row.int("yds")?,
            td: row.int("td")?,
            twenty_plus: row.int("twenty_plus")?,
            forty_plus: row.int("forty_plus")?,
            lng: row.int("lng")?,
            rec_first: row.int("rec_first")?,
            first_pct: row.float("first_pct")?,
            rec_fum: row.int("rec_fum")?,
            rec_yac_r: row.int("rec_yac_r")?,
            tgts: row.int("tgts")?,
        })
    }
}

impl Persist for ReceivingStats {
    const TABLE: &'static str = "receiving_stats";
    const COLUMNS: &'static [&'static str] = &[
        "year", "player", "rec", "yds", "td", "twenty_plus", "forty_plus", "lng", "rec_first",
        "first_pct", "rec_fum", "rec_yac_r", "tgts",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.year.into(),
            self.player.clone().into(),
            self.rec.into(),
            self.yds.into(),
            self.td.into(),
            self.twenty_plus.into(),
            self.forty_plus.into(),
            self.lng.into(),
            self.rec_first.into(),
            self.first_pct.into(),
            self.rec_fum.into(),
            self.rec_yac_r.into(),
            self.tgts.into(),
        ]
    }
}

/// Field goals by distance band; the band cells are "made/attempted" text
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGoalStats {
    pub year: u16,
    pub player: String,
    pub fgm: i64,
    pub att: i64,
    pub fg_pct: f64,
    pub one_nineteen_a_m: String,
    pub twenty_twentynine_a_m: String,
    pub thirty_thirtynine_a_m: String,
    pub forty_fortynine_a_m: String,
    pub fifty_fiftynine_a_m: String,
    pub sixty_plus_a_m: String,
    pub lng: i64,
    pub fg_blk: i64,
}

impl StatRecord for FieldGoalStats {
    const SCHEMA: &'static [&'static str] = &[
        "player", "fgm", "att", "fg_pct", "one_nineteen_a_m", "twenty_twentynine_a_m",
        "thirty_thirtynine_a_m", "forty_fortynine_a_m", "fifty_fiftynine_a_m", "sixty_plus_a_m",
        "lng", "fg_blk",
    ];

    const CATEGORY: Category = Category::FieldGoals;

    fn listing_url(root_url: &str, year: u16) -> String {
        Self::CATEGORY.player_stats_url(root_url, year)
    }

    fn from_row(year: u16, row: &Row<'_>) -> Result<Self> {
        Ok(FieldGoalStats {
            year,
            player: row.text("player")?,
            fgm: row.int("fgm")?,
            att: row.int("att")?,
            fg_pct: row.float("fg_pct")?,
            one_nineteen_a_m: row.text("one_nineteen_a_m")?,
            twenty_twentynine_a_m: row.text("twenty_twentynine_a_m")?,
            thirty_thirtynine_a_m: row.text("thirty_thirtynine_a_m")?,
            forty_fortynine_a_m: row.text("forty_fortynine_a_m")?,
            fifty_fiftynine_a_m: row.text("fifty_fiftynine_a_m")?,
            sixty_plus_a_m: row.text("sixty_plus_a_m")?,
            lng: row.int("lng")?,
            fg_blk: row.int("fg_blk")?,
        })
    }
}

impl Persist for FieldGoalStats {
    const TABLE: &'static str = "field_goal_stats";
    const COLUMNS: &'static [&'static str] = &[
        "year", "player", "fgm", "att", "fg_pct", "one_nineteen_a_m", "twenty_twentynine_a_m",
        "thirty_thirtynine_a_m", "forty_fortynine_a_m", "fifty_fiftynine_a_m", "sixty_plus_a_m",
        "lng", "fg_blk",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.year.into(),
            self.player.clone().into(),
            self.fgm.into(),
            self.att.into(),
            self.fg_pct.into(),
            self.one_nineteen_a_m.clone().into(),
            self.twenty_twentynine_a_m.clone().into(),
            self.thirty_thirtynine_a_m.clone().into(),
            self.forty_fortynine_a_m.clone().into(),
            self.fifty_fiftynine_a_m.clone().into(),
            self.sixty_plus_a_m.clone().into(),
            self.lng.into(),
            self.fg_blk.into(),
        ]
    }
}

/// Passing allowed by a team defense over a season
#[derive(Debug, Clone, PartialEq)]
pub struct DefensePassingStats {
    pub team: String,
    pub year: u16,
    pub attempts: i64,
    pub completions: i64,
    pub completion_percentage: f64,
    pub yds_att: f64,
    pub yards: i64,
    pub touchdowns: i64,
    pub interceptions: i64,
    pub first_downs: i64,
    pub first_down_percentage: f64,
    pub sacks: i64,
}

impl StatRecord for DefensePassingStats {
    const SCHEMA: &'static [&'static str] = &[
        "team", "attempts", "completions", "completion_percentage", "yds_att", "yards",
        "touchdowns", "interceptions", "first_downs", "first_down_percentage", "sacks",
    ];

    const CATEGORY: Category = Category::Passing;

    fn listing_url(root_url: &str, year: u16) -> String {
        Self::CATEGORY.team_defense_url(root_url, year)
    }

    fn from_row(year: u16, row: &Row<'_>) -> Result<Self> {
        Ok(DefensePassingStats {
            team: halve_repeated(&row.text("team")?),
            year,
            attempts: row.int("attempts")?,
            completions: row.int("completions")?,
            completion_percentage: row.float("completion_percentage")?,
            yds_att: row.float("yds_att")?,
            yards: row.int("yards")?,
            touchdowns: row.int("touchdowns")?,
            interceptions: row.int("interceptions")?,
            first_downs: row.int("first_downs")?,
            first_down_percentage: row.float("first_down_percentage")?,
            sacks: row.int("sacks")?,
        })
    }
}

impl Persist for DefensePassingStats {
    const TABLE: &'static str = "defense_passing_stats";
    const COLUMNS: &'static [&'static str] = &[
        "team", "year", "attempts", "completions", "completion_percentage", "yds_att", "yards",
        "touchdowns", "interceptions", "first_downs", "first_down_percentage", "sacks",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.team.clone().into(),
            self.year.into(),
            self.attempts.into(),
            self.completions.into(),
            self.completion_percentage.into(),
            self.yds_att.into(),
            self.yards.into(),
            self.touchdowns.into(),
            self.interceptions.into(),
            self.first_downs.into(),
            self.first_down_percentage.into(),
            self.sacks.into(),
        ]
    }
}

/// One game from an active quarterback's recent game log
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStats {
    pub name: String,
    pub week: i64,
    pub opponent: String,
    pub home: bool,
    pub game_result: String,
    pub pass_completions: i64,
    pub pass_attempts: i64,
    pub pass_yards: i64,
    pub pass_avg: f64,
    pub pass_touchdowns: i64,
    pub interceptions: i64,
    pub sacks: i64,
    pub sack_yards: i64,
    pub rating: f64,
    pub rush_attempts: i64,
    pub rush_yards: i64,
    pub rush_avg: f64,
    pub rush_touchdowns: i64,
    pub fumbles: i64,
    pub fumbles_lost: i64,
}

impl ActiveStats {
    pub const SCHEMA: &'static [&'static str] = &[
        "week", "opponent", "game_result", "pass_completions", "pass_attempts", "pass_yards",
        "pass_avg", "pass_touchdowns", "interceptions", "sacks", "sack_yards", "rating",
        "rush_attempts", "rush_yards", "rush_avg", "rush_touchdowns", "fumbles", "fumbles_lost",
    ];

    /// `@` in the opponent cell marks an away game
    pub fn from_row(name: &str, row: &Row<'_>) -> Result<Self> {
        let opponent = row.text("opponent")?;
        let result = row.text("game_result")?;

        Ok(ActiveStats {
            name: name.to_string(),
            week: row.int("week")?,
            home: !opponent.contains('@'),
            opponent: opponent.replace('@', "").trim().to_string(),
            game_result: result.split_whitespace().next().unwrap_or_default().to_string(),
            pass_completions: row.int("pass_completions")?,
            pass_attempts: row.int("pass_attempts")?,
            pass_yards: row.int("pass_yards")?,
            pass_avg: row.float("pass_avg")?,
            pass_touchdowns: row.int("pass_touchdowns")?,
            interceptions: row.int("interceptions")?,
            sacks: row.int("sacks")?,
            sack_yards: row.int("sack_yards")?,
            rating: row.float("rating")?,
            rush_attempts: row.int("rush_attempts")?,
            rush_yards: row.int("rush_yards")?,
            rush_avg: row.float("rush_avg")?,
            rush_touchdowns: row.int("rush_touchdowns")?,
            fumbles: row.int("fumbles")?,
            fumbles_lost: row.int("fumbles_lost")?,
        })
    }
}

impl Persist for ActiveStats {
    const TABLE: &'static str = "active_stats";
    const COLUMNS: &'static [&'static str] = &[
        "name", "week", "opponent", "home", "game_result", "pass_completions", "pass_attempts",
        "pass_yards", "pass_avg", "pass_touchdowns", "interceptions", "sacks", "sack_yards",
        "rating", "rush_attempts", "rush_yards", "rush_avg", "rush_touchdowns", "fumbles",
        "fumbles_lost",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.week.into(),
            self.opponent.clone().into(),
            self.home.into(),
            self.game_result.clone().into(),
            self.pass_completions.into(),
            self.pass_attempts.into(),
            self.pass_yards.into(),
            self.pass_avg.into(),
            self.pass_touchdowns.into(),
            self.interceptions.into(),
            self.sacks.into(),
            self.sack_yards.into(),
            self.rating.into(),
            self.rush_attempts.into(),
            self.rush_yards.into(),
            self.rush_avg.into(),
            self.rush_touchdowns.into(),
            self.fumbles.into(),
            self.fumbles_lost.into(),
        ]
    }
}

/// A player's profile; every measurement is `None` when the site leaves it out
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub name: String,
    pub position: String,
    pub active: bool,
    pub team: Option<String>,
    /// Inches
    pub height: Option<i64>,
    pub weight: Option<i64>,
    pub arms: Option<f64>,
    pub hands: Option<f64>,
    pub experience: Option<i64>,
    pub college: Option<String>,
    pub age: Option<i64>,
    pub hometown: Option<String>,
}

impl Persist for PlayerInfo {
    const TABLE: &'static str = "players";
    const COLUMNS: &'static [&'static str] = &[
        "name", "position", "active", "team", "height", "weight", "arms", "hands", "experience",
        "college", "age", "hometown",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.position.clone().into(),
            self.active.into(),
            self.team.clone().into(),
            self.height.into(),
            self.weight.into(),
            self.arms.into(),
            self.hands.into(),
            self.experience.into(),
            self.college.clone().into(),
            self.age.into(),
            self.hometown.clone().into(),
        ]
    }
}
