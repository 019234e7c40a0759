//! Player profile backfill
//!
//! Stats tables link every player to a profile page. The first time a name is
//! seen its profile is scraped and stored, along with the recent game log for
//! active quarterbacks. Names already in the store are never fetched again.

use super::database::Database;
use super::fetcher::{element_text, parse_table, selector, EntityReference, PageSource};
use super::records::{ActiveStats, PlayerInfo, Row};
use crate::{Result, StatsError};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Resolves player references into stored profiles
pub struct PlayerResolver<'a, S: PageSource + ?Sized> {
    source: &'a S,
    db: &'a Database,
    root_url: &'a str,
}

impl<'a, S: PageSource + ?Sized> PlayerResolver<'a, S> {
    pub fn new(source: &'a S, db: &'a Database, root_url: &'a str) -> Self {
        PlayerResolver {
            source,
            db,
            root_url,
        }
    }

    /// Fetch and store every referenced player not yet known.
    ///
    /// A failure on one player is logged and skipped.
    pub fn resolve(&self, references: &[EntityReference]) {
        for reference in references {
            match self.resolve_one(reference) {
                Ok(Some(player)) => {
                    log::info!("Stored player {} ({})", player.name, player.position)
                }
                Ok(None) => {}
                Err(e) => log::warn!("Skipping player {}: {}", reference.href, e),
            }
        }
    }

    /// Resolve a single reference; `None` when the player was already stored
    pub fn resolve_one(&self, reference: &EntityReference) -> Result<Option<PlayerInfo>> {
        let id = reference.identifier().ok_or_else(|| {
            StatsError::Parse(format!("no player id in link {:?}", reference.href))
        })?;

        if !reference.name.is_empty() && self.db.player_exists(&reference.name)? {
            log::debug!("Player {} already stored", reference.name);
            return Ok(None);
        }

        log::info!("Fetching NFL player info for: {}", id);
        let html = self.source.get_html(&reference.detail_url(self.root_url))?;
        let page = Html::parse_document(&html);

        let name = player_name(&page)?;
        if self.db.player_exists(&name)? {
            log::debug!("Player {} already stored", name);
            return Ok(None);
        }

        let player = parse_player(&page, name)?;

        let activity = if player.active && player.position == "QB" {
            self.fetch_activity(&player.name, reference)?
        } else {
            Vec::new()
        };

        self.db.save_player(&player, &activity)?;
        Ok(Some(player))
    }

    fn fetch_activity(&self, name: &str, reference: &EntityReference) -> Result<Vec<ActiveStats>> {
        log::info!("Fetching recent game stats for: {}", name);

        let html = self.source.get_html(&reference.stats_url(self.root_url))?;
        let page = Html::parse_document(&html);

        let table_selector = selector("table");
        match page.select(&table_selector).next() {
            Some(table) => parse_activity(name, &table),
            None => Ok(Vec::new()),
        }
    }
}

fn player_name(page: &Html) -> Result<String> {
    let header = selector("h1.nfl-c-player-header__title");
    page.select(&header)
        .next()
        .map(|h| element_text(&h))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| StatsError::Parse("missing player name header".to_string()))
}

/// Parse a player profile page whose display name is already known
pub fn parse_player(page: &Html, name: String) -> Result<PlayerInfo> {
    let position_selector = selector("span.nfl-c-player-header__position");
    let status_selector = selector("h3.nfl-c-player-header__roster-status--act");
    let team_selector = selector("div.nfl-c-player-header__team a.nfl-o-cta--link");

    let position: String = page
        .select(&position_selector)
        .next()
        .ok_or_else(|| StatsError::Parse(format!("{}: missing position", name)))?
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect();

    let active = page
        .select(&status_selector)
        .next()
        .map(|h| element_text(&h) == "active")
        .unwrap_or(false);

    let physical = info_list(page, "ul.nfl-c-player-info__physical-data")?;
    let career = info_list(page, "ul.nfl-c-player-info__career-data")?;

    let team = if active {
        let team = page
            .select(&team_selector)
            .next()
            .map(|a| element_text(&a))
            .ok_or_else(|| StatsError::Parse(format!("{}: active but no team link", name)))?;
        Some(team)
    } else {
        None
    };

    Ok(PlayerInfo {
        position,
        active,
        team,
        height: field(&physical, "Height").map(parse_height).transpose()?,
        weight: field(&physical, "Weight").map(parse_int).transpose()?,
        arms: field(&physical, "Arms").map(parse_measurement).transpose()?,
        hands: field(&physical, "Hands").map(parse_measurement).transpose()?,
        experience: field(&career, "Experience").map(parse_int).transpose()?,
        college: field(&career, "College").map(str::to_string),
        age: field(&career, "Age").map(parse_int).transpose()?,
        hometown: field(&career, "Hometown").map(str::to_string),
        name,
    })
}

/// Key/value pairs from one of the profile info lists
fn info_list(page: &Html, list_css: &str) -> Result<HashMap<String, String>> {
    let list_selector = selector(list_css);
    let item_selector = selector("li.d3-o-list__item");
    let key_selector = selector("div.nfl-c-player-info__key");
    let value_selector = selector("div.nfl-c-player-info__value");

    let list = page
        .select(&list_selector)
        .next()
        .ok_or_else(|| StatsError::Parse(format!("missing {}", list_css)))?;

    Ok(list
        .select(&item_selector)
        .map(|item| {
            (
                first_text(&item, &key_selector),
                first_text(&item, &value_selector),
            )
        })
        .filter(|(key, _)| !key.is_empty())
        .collect())
}

fn first_text(item: &ElementRef, sel: &Selector) -> String {
    item.select(sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

/// Non-blank value for `key`
fn field<'m>(map: &'m HashMap<String, String>, key: &str) -> Option<&'m str> {
    map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// "6-2" -> 74 inches
pub fn parse_height(value: &str) -> Result<i64> {
    let re = Regex::new(r"^(\d+)\s*-\s*(\d+)$").map_err(|e| StatsError::Parse(e.to_string()))?;
    let caps = re
        .captures(value.trim())
        .ok_or_else(|| StatsError::Parse(format!("bad height {:?}", value)))?;

    let feet: i64 = caps[1]
        .parse()
        .map_err(|_| StatsError::Parse(format!("bad height {:?}", value)))?;
    let inches: i64 = caps[2]
        .parse()
        .map_err(|_| StatsError::Parse(format!("bad height {:?}", value)))?;
    Ok(feet * 12 + inches)
}

/// Whole number with an optional fraction: "32 1/4" -> 32.25, "32" -> 32.0
pub fn parse_measurement(value: &str) -> Result<f64> {
    let re = Regex::new(r"^(\d+(?:\.\d+)?)(?:\s+(\d+)/(\d+))?$")
        .map_err(|e| StatsError::Parse(e.to_string()))?;
    let bad = || StatsError::Parse(format!("bad measurement {:?}", value));
    let caps = re.captures(value.trim()).ok_or_else(bad)?;

    let whole: f64 = caps[1].parse().map_err(|_| bad())?;
    match (caps.get(2), caps.get(3)) {
        (Some(num), Some(den)) => {
            let num: f64 = num.as_str().parse().map_err(|_| bad())?;
            let den: f64 = den.as_str().parse().map_err(|_| bad())?;
            if den == 0.0 {
                return Err(bad());
            }
            Ok(whole + num / den)
        }
        _ => Ok(whole),
    }
}

fn parse_int(value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| StatsError::Parse(format!("not an integer: {:?}", value)))
}

/// Game log rows from a player's stats page
pub fn parse_activity(name: &str, table: &ElementRef) -> Result<Vec<ActiveStats>> {
    parse_table(table)
        .rows
        .iter()
        .map(|cells| ActiveStats::from_row(name, &Row::new(ActiveStats::SCHEMA, cells)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetcher::MemorySource;

    const ROOT: &str = "https://www.nfl.com";

    fn profile(name: &str, position: &str, status: &str, team: &str, physical: &str) -> String {
        format!(
            r#"<html><body>
            <div class="nfl-c-player-header">
              <h1 class="nfl-c-player-header__title">{name}</h1>
              <div class="nfl-c-player-header__player-data">
                <span class="nfl-c-player-header__position"> {position} </span>
              </div>
              <h3 class="nfl-c-player-header__roster-status nfl-c-player-header__roster-status--act nfl-u-hide-empty">{status}</h3>
              <div class="nfl-c-player-header__team nfl-u-hide-empty">
                <a class="nfl-o-cta--link" href="/teams/kansas-city-chiefs/">{team}</a>
              </div>
            </div>
            <ul class="d3-o-list nfl-c-player-info__physical-data">{physical}</ul>
            <ul class="d3-o-list nfl-c-player-info__career-data">
              <li class="d3-o-list__item"><div class="nfl-c-player-info__key">Experience</div><div class="nfl-c-player-info__value">7</div></li>
              <li class="d3-o-list__item"><div class="nfl-c-player-info__key">College</div><div class="nfl-c-player-info__value">Texas Tech</div></li>
              <li class="d3-o-list__item"><div class="nfl-c-player-info__key">Hometown</div><div class="nfl-c-player-info__value">Tyler, TX</div></li>
              <li class="d3-o-list__item"><div class="nfl-c-player-info__key">Age</div><div class="nfl-c-player-info__value"></div></li>
            </ul>
            </body></html>"#
        )
    }

    fn physical(height: &str, weight: &str, arms: &str, hands: &str) -> String {
        [("Height", height), ("Weight", weight), ("Arms", arms), ("Hands", hands)]
            .iter()
            .map(|(k, v)| {
                format!(
                    r#"<li class="d3-o-list__item"><div class="nfl-c-player-info__key">{k}</div><div class="nfl-c-player-info__value">{v}</div></li>"#
                )
            })
            .collect()
    }

    const GAME_LOG: &str = r#"<html><body><table>
        <thead><tr><th>WK</th><th>OPP</th><th>RESULT</th><th>COMP</th><th>ATT</th><th>YDS</th>
          <th>AVG</th><th>TD</th><th>INT</th><th>SCK</th><th>SCKY</th><th>RATE</th><th>ATT</th>
          <th>YDS</th><th>AVG</th><th>TD</th><th>FUM</th><th>LOST</th></tr></thead>
        <tbody>
          <tr><td>1</td><td>@ ARI</td><td>W 44-21</td><td>30</td><td>39</td><td>360</td><td>9.2</td>
            <td>5</td><td>0</td><td></td><td>0</td><td>144.2</td><td>2</td><td>16</td><td>8.0</td>
            <td>0</td><td>0</td><td>0</td></tr>
          <tr><td>2</td><td>LAC</td><td>W 27-24</td><td>24</td><td>35</td><td>235</td><td>6.7</td>
            <td>2</td><td>0</td><td>1</td><td>9</td><td>102.3</td><td>4</td><td>20</td><td>5.0</td>
            <td>0</td><td>1</td><td>0</td></tr>
        </tbody></table></body></html>"#;

    fn mahomes_source(status: &str) -> MemorySource {
        MemorySource::new()
            .with_page(
                "https://www.nfl.com/players/patrick-mahomes/",
                profile(
                    "Patrick Mahomes",
                    "QB",
                    status,
                    "Kansas City Chiefs",
                    &physical("6-2", "225", "33 1/4", "9 1/4"),
                ),
            )
            .with_page("https://www.nfl.com/players/patrick-mahomes/stats/", GAME_LOG)
    }

    fn mahomes() -> EntityReference {
        EntityReference::new("Patrick Mahomes", "/players/patrick-mahomes/")
    }

    #[test]
    fn test_parse_height() {
        assert_eq!(parse_height("6-2").unwrap(), 74);
        assert_eq!(parse_height("5-11").unwrap(), 71);
        assert!(parse_height("six two").is_err());
    }

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement("32 1/4").unwrap(), 32.25);
        assert_eq!(parse_measurement("32").unwrap(), 32.0);
        assert_eq!(parse_measurement("9 5/8").unwrap(), 9.625);
        assert!(parse_measurement("32 1/0").is_err());
    }

    #[test]
    fn test_blank_fields_are_unknown() {
        let html = profile(
            "Tom Brady",
            "QB",
            "",
            "",
            &physical("", "", "", ""),
        );
        let page = Html::parse_document(&html);
        let player = parse_player(&page, "Tom Brady".to_string()).unwrap();

        assert_eq!(player.height, None);
        assert_eq!(player.weight, None);
        assert_eq!(player.arms, None);
        assert_eq!(player.hands, None);
        assert_eq!(player.age, None);
        assert_eq!(player.experience, Some(7));
        assert_eq!(player.college.as_deref(), Some("Texas Tech"));
        assert!(!player.active);
        assert_eq!(player.team, None);
    }

    #[test]
    fn test_hands_parsed_independently() {
        let html = profile("Jalen Hurts", "QB", "active", "Philadelphia Eagles", &physical("6-1", "223", "", "9 1/2"));
        let page = Html::parse_document(&html);
        let player = parse_player(&page, "Jalen Hurts".to_string()).unwrap();

        assert_eq!(player.arms, None);
        assert_eq!(player.hands, Some(9.5));
        assert_eq!(player.team.as_deref(), Some("Philadelphia Eagles"));
    }

    #[test]
    fn test_resolve_active_quarterback() {
        let source = mahomes_source("active");
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        let player = resolver.resolve_one(&mahomes()).unwrap().unwrap();
        assert_eq!(player.position, "QB");
        assert!(player.active);
        assert_eq!(player.team.as_deref(), Some("Kansas City Chiefs"));
        assert_eq!(player.height, Some(74));
        assert_eq!(player.arms, Some(33.25));
        assert_eq!(player.hometown.as_deref(), Some("Tyler, TX"));

        let games = db.get_active_stats("Patrick Mahomes").unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].opponent, "ARI");
        assert!(!games[0].home);
        assert_eq!(games[0].sacks, 0);
        assert_eq!(games[1].opponent, "LAC");
        assert!(games[1].home);
        assert_eq!(games[1].game_result, "W");
    }

    #[test]
    fn test_resolve_twice_fetches_once() {
        let source = mahomes_source("active");
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        resolver.resolve(&[mahomes(), mahomes()]);
        resolver.resolve(&[mahomes()]);

        assert_eq!(source.request_count("https://www.nfl.com/players/patrick-mahomes/"), 1);
        assert_eq!(source.request_count("https://www.nfl.com/players/patrick-mahomes/stats/"), 1);
        assert_eq!(db.count::<PlayerInfo>().unwrap(), 1);
    }

    #[test]
    fn test_known_display_name_skips_game_log() {
        let source = mahomes_source("active");
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        // Link text differs from the profile header
        let reference = EntityReference::new("P. Mahomes", "/players/patrick-mahomes/");
        resolver.resolve_one(&mahomes()).unwrap();
        let again = resolver.resolve_one(&reference).unwrap();

        assert!(again.is_none());
        assert_eq!(source.request_count("https://www.nfl.com/players/patrick-mahomes/stats/"), 1);
    }

    #[test]
    fn test_inactive_player_has_no_game_log() {
        let source = mahomes_source("");
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        let player = resolver.resolve_one(&mahomes()).unwrap().unwrap();
        assert!(!player.active);
        assert_eq!(player.team, None);
        assert!(source.requests().iter().all(|u| !u.ends_with("/stats/")));
        assert!(db.get_active_stats("Patrick Mahomes").unwrap().is_empty());
    }

    #[test]
    fn test_active_non_quarterback_has_no_game_log() {
        let source = MemorySource::new().with_page(
            "https://www.nfl.com/players/travis-kelce/",
            profile(
                "Travis Kelce",
                "TE",
                "active",
                "Kansas City Chiefs",
                &physical("6-5", "250", "", ""),
            ),
        );
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        let player = resolver
            .resolve_one(&EntityReference::new("Travis Kelce", "/players/travis-kelce/"))
            .unwrap()
            .unwrap();

        assert!(player.active);
        assert_eq!(player.position, "TE");
        assert_eq!(player.team.as_deref(), Some("Kansas City Chiefs"));
        assert_eq!(
            source.requests(),
            vec!["https://www.nfl.com/players/travis-kelce/".to_string()]
        );
        assert!(db.get_active_stats("Travis Kelce").unwrap().is_empty());
    }

    #[test]
    fn test_game_log_without_table_stores_player() {
        let source = mahomes_source("active")
            .with_page("https://www.nfl.com/players/patrick-mahomes/stats/", "<html><p>no games</p></html>");
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        assert!(resolver.resolve_one(&mahomes()).unwrap().is_some());
        assert!(db.player_exists("Patrick Mahomes").unwrap());
        assert!(db.get_active_stats("Patrick Mahomes").unwrap().is_empty());
    }

    #[test]
    fn test_missing_game_log_drops_player() {
        let source = MemorySource::new().with_page(
            "https://www.nfl.com/players/patrick-mahomes/",
            profile(
                "Patrick Mahomes",
                "QB",
                "active",
                "Kansas City Chiefs",
                &physical("6-2", "225", "", ""),
            ),
        );
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        let err = resolver.resolve_one(&mahomes()).unwrap_err();
        assert!(matches!(err, StatsError::Fetch { .. }));
        assert!(!db.player_exists("Patrick Mahomes").unwrap());

        // The batch form logs and moves on
        resolver.resolve(&[mahomes()]);
        assert_eq!(db.count::<PlayerInfo>().unwrap(), 0);
    }

    #[test]
    fn test_short_game_log_row_drops_player() {
        let source = mahomes_source("active").with_page(
            "https://www.nfl.com/players/patrick-mahomes/stats/",
            "<table><tbody><tr><td>1</td><td>@ ARI</td><td>W 44-21</td></tr></tbody></table>",
        );
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        let err = resolver.resolve_one(&mahomes()).unwrap_err();
        assert!(matches!(err, StatsError::Parse(_)));
        assert!(!db.player_exists("Patrick Mahomes").unwrap());
        assert!(db.get_active_stats("Patrick Mahomes").unwrap().is_empty());
    }

    #[test]
    fn test_roster_status_must_read_active() {
        let status = |text: &str| {
            let html = profile("Jalen Hurts", "QB", text, "Philadelphia Eagles", &physical("", "", "", ""));
            parse_player(&Html::parse_document(&html), "Jalen Hurts".to_string())
                .unwrap()
                .active
        };

        assert!(status("active"));
        assert!(status("  active\n"));
        assert!(!status("Active"));
        assert!(!status("inactive"));
        assert!(!status(""));
    }

    #[test]
    fn test_malformed_page_is_skipped() {
        let source = MemorySource::new()
            .with_page(
                "https://www.nfl.com/players/broken/",
                r#"<h1 class="nfl-c-player-header__title">Broken Page</h1>"#,
            )
            .with_page(
                "https://www.nfl.com/players/patrick-mahomes/",
                profile("Patrick Mahomes", "QB", "", "", &physical("6-2", "225", "", "")),
            );
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        resolver.resolve(&[
            EntityReference::new("Broken Page", "/players/broken/"),
            EntityReference::new("Missing", "/players/missing/"),
            mahomes(),
        ]);

        assert!(!db.player_exists("Broken Page").unwrap());
        assert!(db.player_exists("Patrick Mahomes").unwrap());
    }

    #[test]
    fn test_reference_without_id() {
        let source = MemorySource::new();
        let db = Database::in_memory().unwrap();
        let resolver = PlayerResolver::new(&source, &db, ROOT);

        let err = resolver
            .resolve_one(&EntityReference::new("Nobody", "/players"))
            .unwrap_err();
        assert!(matches!(err, StatsError::Parse(_)));
        assert!(source.requests().is_empty());
    }
}
