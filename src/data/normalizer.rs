//! Category table normalization
//!
//! Walks every page of a category listing for each requested season, hands the
//! player links on each page to the [`PlayerResolver`], and coerces the
//! accumulated rows into typed records.

use super::fetcher::{fetch_page, PageSource};
use super::players::PlayerResolver;
use super::records::{Row, StatRecord};
use crate::Result;
use std::ops::Range;

pub struct CategoryNormalizer<'a, S: PageSource + ?Sized> {
    source: &'a S,
    root_url: &'a str,
    resolver: PlayerResolver<'a, S>,
}

impl<'a, S: PageSource + ?Sized> CategoryNormalizer<'a, S> {
    pub fn new(source: &'a S, root_url: &'a str, resolver: PlayerResolver<'a, S>) -> Self {
        CategoryNormalizer {
            source,
            root_url,
            resolver,
        }
    }

    /// Records for every season in `start_year..end_year`, in season, page,
    /// then row order
    pub fn normalize_category<R: StatRecord>(
        &self,
        start_year: u16,
        end_year: u16,
    ) -> Result<Vec<R>> {
        let mut records = Vec::new();
        for year in start_year..end_year {
            records.extend(self.normalize_year::<R>(year)?);
        }
        Ok(records)
    }

    /// Lazily fetch one season per item. Calling again starts over.
    pub fn season_records<'s, R: StatRecord + 's>(
        &'s self,
        years: Range<u16>,
    ) -> impl Iterator<Item = Result<Vec<R>>> + 's {
        years.map(move |year| self.normalize_year::<R>(year))
    }

    /// Records for one season
    pub fn normalize_year<R: StatRecord>(&self, year: u16) -> Result<Vec<R>> {
        let url = R::listing_url(self.root_url, year);
        log::info!("Fetching NFL {} {} stats: {}", year, R::CATEGORY, url);

        let rows = self.fetch_rows(&url)?;
        let total = rows.len();

        let records: Vec<R> = rows
            .iter()
            .filter(|cells| has_name(cells))
            .filter_map(|cells| match to_record::<R>(year, cells) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Rejected {} row {:?}: {}", year, cells.first(), e);
                    None
                }
            })
            .collect();

        log::debug!("{}: kept {} of {} rows", url, records.len(), total);
        Ok(records)
    }

    /// Rows of every page starting at `url`, following next-page links
    pub fn fetch_rows(&self, url: &str) -> Result<Vec<Vec<String>>> {
        let mut rows = Vec::new();
        let mut next = Some(url.to_string());

        while let Some(url) = next {
            let page = fetch_page(self.source, &url, self.root_url)?;
            log::debug!("{}: {} rows", url, page.table.rows.len());

            self.resolver.resolve(&page.references);

            rows.extend(page.table.rows);
            next = page.next_page;
        }

        Ok(rows)
    }
}

fn has_name(cells: &[String]) -> bool {
    cells.first().map_or(false, |name| !name.trim().is_empty())
}

fn to_record<R: StatRecord>(year: u16, cells: &[String]) -> Result<R> {
    R::from_row(year, &Row::new(R::SCHEMA, cells)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::database::Database;
    use crate::data::fetcher::MemorySource;
    use crate::data::records::{DefensePassingStats, PassingStats, PlayerInfo, RushingStats};
    use crate::StatsError;

    const ROOT: &str = "https://www.nfl.com";

    fn rushing_row(name: &str, yards: u32) -> String {
        format!(
            "<tr><td>{name}</td><td>{yards}</td><td>200</td><td>10</td><td>5</td><td>1</td>\
             <td>60</td><td>50</td><td>25.0</td><td>2</td></tr>"
        )
    }

    fn rushing_page(rows: &[String], next: Option<&str>) -> String {
        let next = next
            .map(|href| format!(r#"<a class="nfl-o-table-pagination__next" href="{href}">Next</a>"#))
            .unwrap_or_default();
        format!(
            "<html><body><table><thead><tr><th>Player</th><th>Rush Yds</th></tr></thead>\
             <tbody>{}</tbody></table>{next}</body></html>",
            rows.concat()
        )
    }

    fn rushing_url(year: u16) -> String {
        RushingStats::listing_url(ROOT, year)
    }

    #[test]
    fn test_pages_are_concatenated_in_order() {
        let source = MemorySource::new()
            .with_page(
                rushing_url(2022),
                rushing_page(
                    &[rushing_row("A", 1), rushing_row("B", 2), rushing_row("C", 3)],
                    Some("/stats/rushing?page=2"),
                ),
            )
            .with_page(
                "https://www.nfl.com/stats/rushing?page=2",
                rushing_page(&[rushing_row("D", 4), rushing_row("E", 5)], None),
            );
        let db = Database::in_memory().unwrap();
        let normalizer =
            CategoryNormalizer::new(&source, ROOT, PlayerResolver::new(&source, &db, ROOT));

        let records: Vec<RushingStats> = normalizer.normalize_category(2022, 2023).unwrap();

        let names: Vec<_> = records.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
        assert!(records.iter().all(|r| r.year == 2022));
        assert_eq!(records[3].rush_yds, 4);
        assert_eq!(source.requests().len(), 2);
    }

    #[test]
    fn test_blank_name_rows_dropped() {
        let source = MemorySource::new().with_page(
            rushing_url(2021),
            rushing_page(&[rushing_row("", 100), rushing_row("Smith", 900)], None),
        );
        let db = Database::in_memory().unwrap();
        let normalizer =
            CategoryNormalizer::new(&source, ROOT, PlayerResolver::new(&source, &db, ROOT));

        let records: Vec<RushingStats> = normalizer.normalize_category(2021, 2022).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player, "Smith");
    }

    #[test]
    fn test_year_range_is_end_exclusive() {
        let source = MemorySource::new()
            .with_page(rushing_url(2020), rushing_page(&[rushing_row("A", 1)], None))
            .with_page(rushing_url(2021), rushing_page(&[rushing_row("B", 2)], None));
        let db = Database::in_memory().unwrap();
        let normalizer =
            CategoryNormalizer::new(&source, ROOT, PlayerResolver::new(&source, &db, ROOT));

        let records: Vec<RushingStats> = normalizer.normalize_category(2020, 2022).unwrap();
        assert_eq!(
            records.iter().map(|r| (r.year, r.player.as_str())).collect::<Vec<_>>(),
            vec![(2020, "A"), (2021, "B")]
        );
        assert_eq!(source.request_count(&rushing_url(2022)), 0);
    }

    #[test]
    fn test_season_records_are_lazy() {
        let source = MemorySource::new()
            .with_page(rushing_url(2020), rushing_page(&[rushing_row("A", 1)], None));
        let db = Database::in_memory().unwrap();
        let normalizer =
            CategoryNormalizer::new(&source, ROOT, PlayerResolver::new(&source, &db, ROOT));

        let mut seasons = normalizer.season_records::<RushingStats>(2020..2022);
        assert!(source.requests().is_empty());

        assert_eq!(seasons.next().unwrap().unwrap().len(), 1);
        assert!(seasons.next().unwrap().is_err());
        assert!(seasons.next().is_none());

        // Restartable
        let again: Vec<_> = normalizer.season_records::<RushingStats>(2020..2021).collect();
        assert_eq!(again.len(), 1);
        assert_eq!(source.request_count(&rushing_url(2020)), 2);
    }

    #[test]
    fn test_fetch_failure_aborts_category() {
        let source = MemorySource::new()
            .with_page(rushing_url(2020), rushing_page(&[rushing_row("A", 1)], Some("/gone")));
        let db = Database::in_memory().unwrap();
        let normalizer =
            CategoryNormalizer::new(&source, ROOT, PlayerResolver::new(&source, &db, ROOT));

        let err = normalizer.normalize_category::<RushingStats>(2020, 2021).unwrap_err();
        assert!(matches!(err, StatsError::Fetch { .. }));
    }

    #[test]
    fn test_malformed_row_rejected() {
        let short = "<tr><td>Short</td><td>5</td></tr>".to_string();
        let source = MemorySource::new().with_page(
            rushing_url(2020),
            rushing_page(&[short, rushing_row("Full", 7)], None),
        );
        let db = Database::in_memory().unwrap();
        let normalizer =
            CategoryNormalizer::new(&source, ROOT, PlayerResolver::new(&source, &db, ROOT));

        let records: Vec<RushingStats> = normalizer.normalize_category(2020, 2021).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player, "Full");
    }

    #[test]
    fn test_player_links_forwarded_despite_failures() {
        let row = r#"<tr><td><a class="d3-o-player-fullname nfl-o-cta--link" href="/players/ghost/">Ghost</a></td>
            <td>5250</td><td>8.1</td><td>648</td><td>435</td><td>67.1</td><td>41</td><td>12</td>
            <td>105.2</td><td>280</td><td>43.2</td><td>59</td><td>14</td><td>67</td><td>26</td><td>188</td></tr>"#;
        let source = MemorySource::new().with_page(
            PassingStats::listing_url(ROOT, 2022),
            format!("<table><tbody>{row}</tbody></table>"),
        );
        let db = Database::in_memory().unwrap();
        let normalizer =
            CategoryNormalizer::new(&source, ROOT, PlayerResolver::new(&source, &db, ROOT));

        let records: Vec<PassingStats> = normalizer.normalize_category(2022, 2023).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player, "Ghost");
        assert_eq!(source.request_count("https://www.nfl.com/players/ghost/"), 1);
        assert_eq!(db.count::<PlayerInfo>().unwrap(), 0);
    }

    #[test]
    fn test_team_defense_names() {
        let source = MemorySource::new().with_page(
            DefensePassingStats::listing_url(ROOT, 2022),
            "<table><tbody>\
             <tr><td>Cowboys Cowboys</td><td>560</td><td>351</td><td>62.7</td><td>6.5</td>\
             <td>3665</td><td>21</td><td>11</td><td>183</td><td>32.7</td><td>54</td></tr>\
             <tr><td>BillsBills</td><td>556</td><td>349</td><td>62.8</td><td>6.1</td>\
             <td>3398</td><td>20</td><td>14</td><td>170</td><td>30.6</td><td></td></tr>\
             </tbody></table>",
        );
        let db = Database::in_memory().unwrap();
        let normalizer =
            CategoryNormalizer::new(&source, ROOT, PlayerResolver::new(&source, &db, ROOT));

        let records: Vec<DefensePassingStats> = normalizer.normalize_category(2022, 2023).unwrap();
        assert_eq!(records[0].team, "Cowboys");
        assert_eq!(records[1].team, "Bills");
        assert_eq!(records[1].sacks, 0);
    }
}
