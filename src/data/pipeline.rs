//! Ingestion runs
//!
//! Each category run realizes every season into one batch and stores it with a
//! single bulk write. A fetch failure aborts the category before anything of
//! it is written.

use super::database::Database;
use super::fetcher::{HttpSource, PageSource};
use super::normalizer::CategoryNormalizer;
use super::players::PlayerResolver;
use super::records::{
    DefensePassingStats, FieldGoalStats, PassingStats, ReceivingStats, RushingStats, StatRecord,
};
use crate::{Config, Result};

/// Owns the page source and store for a series of runs
pub struct Pipeline<S: PageSource> {
    source: S,
    db: Database,
    root_url: String,
}

impl Pipeline<HttpSource> {
    /// HTTP source and on-disk database as configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = HttpSource::new(&config.scrape)?;
        let db = Database::open(&config.data.database_path)?;
        Ok(Pipeline::new(source, db, &config.scrape.root_url))
    }
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, db: Database, root_url: &str) -> Self {
        Pipeline {
            source,
            db,
            root_url: root_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Close the pipeline, handing back the store
    pub fn into_database(self) -> Database {
        self.db
    }

    pub fn normalizer(&self) -> CategoryNormalizer<'_, S> {
        let resolver = PlayerResolver::new(&self.source, &self.db, &self.root_url);
        CategoryNormalizer::new(&self.source, &self.root_url, resolver)
    }

    /// Player passing stats, then team passing defense
    pub fn run(&self, start_year: u16, end_year: u16) -> Result<()> {
        log::info!("Running NFL stats ingestion for {}..{}", start_year, end_year);
        self.run_passing(start_year, end_year)?;
        self.run_team_defense(start_year, end_year)?;
        Ok(())
    }

    pub fn run_passing(&self, start_year: u16, end_year: u16) -> Result<usize> {
        self.run_category::<PassingStats>(start_year, end_year)
    }

    pub fn run_rushing(&self, start_year: u16, end_year: u16) -> Result<usize> {
        self.run_category::<RushingStats>(start_year, end_year)
    }

    pub fn run_receiving(&self, start_year: u16, end_year: u16) -> Result<usize> {
        self.run_category::<ReceivingStats>(start_year, end_year)
    }

    pub fn run_field_goals(&self, start_year: u16, end_year: u16) -> Result<usize> {
        self.run_category::<FieldGoalStats>(start_year, end_year)
    }

    pub fn run_team_defense(&self, start_year: u16, end_year: u16) -> Result<usize> {
        self.run_category::<DefensePassingStats>(start_year, end_year)
    }

    /// Normalize every season of one category and store it as one batch.
    ///
    /// Returns the number of newly stored rows.
    pub fn run_category<R: StatRecord>(&self, start_year: u16, end_year: u16) -> Result<usize> {
        let records: Vec<R> = self
            .normalizer()
            .normalize_category(start_year, end_year)?;

        let inserted = self.db.bulk_upsert(&records)?;
        log::info!(
            "{}: stored {} of {} records",
            R::TABLE,
            inserted,
            records.len()
        );
        Ok(inserted)
    }
}
