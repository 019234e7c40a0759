//! SQLite storage for scraped stats

use super::records::{
    ActiveStats, DefensePassingStats, FieldGoalStats, PassingStats, Persist, PlayerInfo,
    ReceivingStats, RushingStats,
};
use crate::Result;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                name TEXT NOT NULL,
                position TEXT NOT NULL,
                active INTEGER NOT NULL,
                team TEXT,
                height INTEGER,
                weight INTEGER,
                arms REAL,
                hands REAL,
                experience INTEGER,
                college TEXT,
                age INTEGER,
                hometown TEXT,
                PRIMARY KEY (name, position)
            );

            CREATE TABLE IF NOT EXISTS active_stats (
                name TEXT NOT NULL,
                week INTEGER NOT NULL,
                opponent TEXT NOT NULL,
                home INTEGER NOT NULL,
                game_result TEXT NOT NULL,
                pass_completions INTEGER NOT NULL,
                pass_attempts INTEGER NOT NULL,
                pass_yards INTEGER NOT NULL,
                pass_avg REAL NOT NULL,
                pass_touchdowns INTEGER NOT NULL,
                interceptions INTEGER NOT NULL,
                sacks INTEGER NOT NULL,
                sack_yards INTEGER NOT NULL,
                rating REAL NOT NULL,
                rush_attempts INTEGER NOT NULL,
                rush_yards INTEGER NOT NULL,
                rush_avg REAL NOT NULL,
                rush_touchdowns INTEGER NOT NULL,
                fumbles INTEGER NOT NULL,
                fumbles_lost INTEGER NOT NULL,
                PRIMARY KEY (name, week)
            );

            CREATE TABLE IF NOT EXISTS passing_stats (
                year INTEGER NOT NULL,
                player TEXT NOT NULL,
                pass_yds INTEGER NOT NULL,
                yds_att REAL NOT NULL,
                att INTEGER NOT NULL,
                cmp INTEGER NOT NULL,
                cmp_pct REAL NOT NULL,
                td INTEGER NOT NULL,
                interceptions INTEGER NOT NULL,
                rate REAL NOT NULL,
                first_downs INTEGER NOT NULL,
                first_pct REAL NOT NULL,
                twenty_plus INTEGER NOT NULL,
                forty_plus INTEGER NOT NULL,
                lng INTEGER NOT NULL,
                sck INTEGER NOT NULL,
                scky INTEGER NOT NULL,
                PRIMARY KEY (year, player)
            );

            CREATE TABLE IF NOT EXISTS rushing_stats (
                year INTEGER NOT NULL,
                player TEXT NOT NULL,
                rush_yds INTEGER NOT NULL,
                att INTEGER NOT NULL,
                td INTEGER NOT NULL,
                twenty_plus INTEGER NOT NULL,
                forty_plus INTEGER NOT NULL,
                lng INTEGER NOT NULL,
                rush_first INTEGER NOT NULL,
                rush_first_pct REAL NOT NULL,
                rush_fum INTEGER NOT NULL,
                PRIMARY KEY (year, player)
            );

            CREATE TABLE IF NOT EXISTS receiving_stats (
                year INTEGER NOT NULL,
                player TEXT NOT NULL,
                rec INTEGER NOT NULL,
                yds INTEGER NOT NULL,
                td INTEGER NOT NULL,
                twenty_plus INTEGER NOT NULL,
                forty_plus INTEGER NOT NULL,
                lng INTEGER NOT NULL,
                rec_first INTEGER NOT NULL,
                first_pct REAL NOT NULL,
                rec_fum INTEGER NOT NULL,
                rec_yac_r INTEGER NOT NULL,
                tgts INTEGER NOT NULL,
                PRIMARY KEY (year, player)
            );

            CREATE TABLE IF NOT EXISTS field_goal_stats (
                year INTEGER NOT NULL,
                player TEXT NOT NULL,
                fgm INTEGER NOT NULL,
                att INTEGER NOT NULL,
                fg_pct REAL NOT NULL,
                one_nineteen_a_m TEXT NOT NULL,
                twenty_twentynine_a_m TEXT NOT NULL,
                thirty_thirtynine_a_m TEXT NOT NULL,
                forty_fortynine_a_m TEXT NOT NULL,
                fifty_fiftynine_a_m TEXT NOT NULL,
                sixty_plus_a_m TEXT NOT NULL,
                lng INTEGER NOT NULL,
                fg_blk INTEGER NOT NULL,
                PRIMARY KEY (year, player)
            );

            CREATE TABLE IF NOT EXISTS defense_passing_stats (
                team TEXT NOT NULL,
                year INTEGER NOT NULL,
                attempts INTEGER NOT NULL,
                completions INTEGER NOT NULL,
                completion_percentage REAL NOT NULL,
                yds_att REAL NOT NULL,
                yards INTEGER NOT NULL,
                touchdowns INTEGER NOT NULL,
                interceptions INTEGER NOT NULL,
                first_downs INTEGER NOT NULL,
                first_down_percentage REAL NOT NULL,
                sacks INTEGER NOT NULL,
                PRIMARY KEY (team, year)
            );

            CREATE INDEX IF NOT EXISTS idx_players_name ON players(name);
            "#,
        )?;
        Ok(())
    }

    // ==================== Bulk Writes ====================

    /// Insert records, ignoring any whose key is already stored.
    ///
    /// Returns how many rows were actually inserted.
    pub fn bulk_upsert<T: Persist>(&self, records: &[T]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = insert_all(&tx, records)?;
        tx.commit()?;

        let skipped = records.len() - inserted;
        if skipped > 0 {
            log::info!("{}: skipped {} already stored rows", T::TABLE, skipped);
        }
        log::debug!("{}: inserted {} rows", T::TABLE, inserted);
        Ok(inserted)
    }

    /// Store a player together with their game log in one transaction
    pub fn save_player(&self, player: &PlayerInfo, activity: &[ActiveStats]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        insert_all(&tx, activity)?;
        insert_all(&tx, std::slice::from_ref(player))?;
        tx.commit()?;
        Ok(())
    }

    // ==================== Player Queries ====================

    /// Whether any player with this exact name is stored
    pub fn player_exists(&self, name: &str) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM players WHERE name = ?1)",
            params![name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Find a player by name
    pub fn get_player(&self, name: &str) -> Result<Option<PlayerInfo>> {
        let player = self
            .conn
            .query_row(
                "SELECT name, position, active, team, height, weight, arms, hands,
                        experience, college, age, hometown
                 FROM players WHERE name = ?1 LIMIT 1",
                params![name],
                |row| {
                    Ok(PlayerInfo {
                        name: row.get(0)?,
                        position: row.get(1)?,
                        active: row.get(2)?,
                        team: row.get(3)?,
                        height: row.get(4)?,
                        weight: row.get(5)?,
                        arms: row.get(6)?,
                        hands: row.get(7)?,
                        experience: row.get(8)?,
                        college: row.get(9)?,
                        age: row.get(10)?,
                        hometown: row.get(11)?,
                    })
                },
            )
            .optional()?;
        Ok(player)
    }

    /// Game log for a player, by week
    pub fn get_active_stats(&self, name: &str) -> Result<Vec<ActiveStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, week, opponent, home, game_result, pass_completions, pass_attempts,
                    pass_yards, pass_avg, pass_touchdowns, interceptions, sacks, sack_yards,
                    rating, rush_attempts, rush_yards, rush_avg, rush_touchdowns, fumbles,
                    fumbles_lost
             FROM active_stats
             WHERE name = ?1
             ORDER BY week",
        )?;

        let games = stmt
            .query_map(params![name], |row| {
                Ok(ActiveStats {
                    name: row.get(0)?,
                    week: row.get(1)?,
                    opponent: row.get(2)?,
                    home: row.get(3)?,
                    game_result: row.get(4)?,
                    pass_completions: row.get(5)?,
                    pass_attempts: row.get(6)?,
                    pass_yards: row.get(7)?,
                    pass_avg: row.get(8)?,
                    pass_touchdowns: row.get(9)?,
                    interceptions: row.get(10)?,
                    sacks: row.get(11)?,
                    sack_yards: row.get(12)?,
                    rating: row.get(13)?,
                    rush_attempts: row.get(14)?,
                    rush_yards: row.get(15)?,
                    rush_avg: row.get(16)?,
                    rush_touchdowns: row.get(17)?,
                    fumbles: row.get(18)?,
                    fumbles_lost: row.get(19)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
    }

    /// Names of every active quarterback
    pub fn active_quarterbacks(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM players WHERE position = 'QB' AND active = 1 ORDER BY name")?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Teams with defense stats for a season
    pub fn defense_teams(&self, year: u16) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT team FROM defense_passing_stats WHERE year = ?1 ORDER BY team")?;

        let teams = stmt
            .query_map(params![year], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(teams)
    }

    /// Passing line for a player in a season
    pub fn get_passing_stats(&self, player: &str, year: u16) -> Result<Option<PassingStats>> {
        let stats = self
            .conn
            .query_row(
                "SELECT year, player, pass_yds, yds_att, att, cmp, cmp_pct, td, interceptions,
                        rate, first_downs, first_pct, twenty_plus, forty_plus, lng, sck, scky
                 FROM passing_stats WHERE player = ?1 AND year = ?2",
                params![player, year],
                |row| {
                    Ok(PassingStats {
                        year: row.get(0)?,
                        player: row.get(1)?,
                        pass_yds: row.get(2)?,
                        yds_att: row.get(3)?,
                        att: row.get(4)?,
                        cmp: row.get(5)?,
                        cmp_pct: row.get(6)?,
                        td: row.get(7)?,
                        interceptions: row.get(8)?,
                        rate: row.get(9)?,
                        first_downs: row.get(10)?,
                        first_pct: row.get(11)?,
                        twenty_plus: row.get(12)?,
                        forty_plus: row.get(13)?,
                        lng: row.get(14)?,
                        sck: row.get(15)?,
                        scky: row.get(16)?,
                    })
                },
            )
            .optional()?;
        Ok(stats)
    }

    // ==================== Statistics ====================

    /// Row count of a record table
    pub fn count<T: Persist>(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", T::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            player_count: self.count::<PlayerInfo>()?,
            game_log_count: self.count::<ActiveStats>()?,
            passing_count: self.count::<PassingStats>()?,
            rushing_count: self.count::<RushingStats>()?,
            receiving_count: self.count::<ReceivingStats>()?,
            field_goal_count: self.count::<FieldGoalStats>()?,
            defense_count: self.count::<DefensePassingStats>()?,
        })
    }
}

fn insert_all<T: Persist>(conn: &Connection, records: &[T]) -> Result<usize> {
    let placeholders = (1..=T::COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT OR IGNORE INTO {} ({}) VALUES ({})",
        T::TABLE,
        T::COLUMNS.join(", "),
        placeholders
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = 0;
    for record in records {
        inserted += stmt.execute(params_from_iter(record.values()))?;
    }
    Ok(inserted)
}

/// Database statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub player_count: usize,
    pub game_log_count: usize,
    pub passing_count: usize,
    pub rushing_count: usize,
    pub receiving_count: usize,
    pub field_goal_count: usize,
    pub defense_count: usize,
}
