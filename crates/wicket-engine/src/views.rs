//! Curated read views.
//!
//! Some tables read better through a join that swaps foreign keys for names
//! and labels columns for display. Lookups are case-insensitive on the table
//! name; any table without an override is read with `SELECT * FROM <table>`.

use crate::identifier::{IdentifierError, validate_identifier};
use std::collections::HashMap;
use std::sync::LazyLock;

const STANDINGS: &str = "\
SELECT
    RANK() OVER (ORDER BY S.points DESC, S.net_run_rate DESC) AS 'Rank',
    T.team_name AS 'Team Name',
    S.matches_played AS 'Matches Played',
    S.wins AS 'Wins',
    S.losses AS 'Losses',
    S.ties AS 'Ties',
    S.points AS 'Points',
    S.net_run_rate AS 'Net Run Rate'
FROM STANDINGS S
JOIN TEAMS T ON S.team_id = T.team_id
ORDER BY S.points DESC, S.net_run_rate DESC";

const PLAYER_STATS: &str = "\
SELECT
    P.player_name AS 'Player Name',
    P.role AS 'Role',
    P.batting_style AS 'Batting Style',
    P.bowling_style AS 'Bowling Style',
    PS.runs_scored AS 'Runs Scored',
    PS.wickets_taken AS 'Wickets Taken',
    PS.boundaries AS 'Boundaries',
    T.team_name AS 'Team'
FROM PLAYER_STATS PS
JOIN PLAYERS P ON PS.player_id = P.player_id
JOIN TEAMS T ON P.team_id = T.team_id
ORDER BY T.team_name, P.player_name";

const MATCH_RESULTS: &str = "\
SELECT
    MR.result_id AS 'Result ID',
    M.match_id AS 'Match ID',
    H.team_name AS 'Home Team',
    A.team_name AS 'Away Team',
    W.team_name AS 'Winner Team',
    P.player_name AS 'Man of the Match'
FROM MATCH_RESULTS MR
JOIN MATCHES M ON MR.match_id = M.match_id
JOIN TEAMS H ON M.home_team_id = H.team_id
JOIN TEAMS A ON M.away_team_id = A.team_id
LEFT JOIN TEAMS W ON MR.winner_team_id = W.team_id
JOIN PLAYERS P ON MR.man_of_the_match = P.player_id
ORDER BY M.match_id";

const MATCHES: &str = "\
SELECT
    M.match_id AS 'Match ID',
    H.team_name AS 'Home Team',
    A.team_name AS 'Away Team',
    M.status AS 'Status',
    M.match_type AS 'Match Type',
    M.match_date AS 'Match Date',
    V.venue_name AS 'Venue'
FROM MATCHES M
JOIN TEAMS H ON M.home_team_id = H.team_id
JOIN TEAMS A ON M.away_team_id = A.team_id
JOIN VENUES V ON M.venue_id = V.venue_id
ORDER BY M.match_date";

const PLAYERS: &str = "\
SELECT
    P.player_name AS 'Player Name',
    P.DOB AS 'Date of Birth',
    P.role AS 'Role',
    P.batting_style AS 'Batting Style',
    P.bowling_style AS 'Bowling Style',
    T.team_name AS 'Team'
FROM PLAYERS P
JOIN TEAMS T ON P.team_id = T.team_id
ORDER BY T.team_name";

const PLAYERS_CONTACTS: &str = "\
SELECT
    P.player_name AS 'Player Name',
    PC.contact_no AS 'Contact Number',
    T.team_name AS 'Team'
FROM PLAYERS_CONTACTS PC
JOIN PLAYERS P ON PC.player_id = P.player_id
JOIN TEAMS T ON P.team_id = T.team_id
ORDER BY T.team_name";

const TEAMS: &str = "\
SELECT
    team_name AS 'Team Name',
    coach_name AS 'Coach Name',
    home_city AS 'Home City'
FROM TEAMS";

const VENUES: &str = "\
SELECT
    venue_name AS 'Venue Name',
    city AS 'City',
    capacity AS 'Capacity'
FROM VENUES";

static STANDARD: LazyLock<CuratedViews> = LazyLock::new(|| {
    CuratedViews::from_pairs([
        ("STANDINGS", STANDINGS),
        ("PLAYER_STATS", PLAYER_STATS),
        ("MATCH_RESULTS", MATCH_RESULTS),
        ("MATCHES", MATCHES),
        ("PLAYERS", PLAYERS),
        ("PLAYERS_CONTACTS", PLAYERS_CONTACTS),
        ("TEAMS", TEAMS),
        ("VENUES", VENUES),
    ])
});

/// Table name to fixed read statement.
///
/// Immutable once built. Keys are stored upper-cased.
#[derive(Debug, Clone, Default)]
pub struct CuratedViews {
    overrides: HashMap<String, &'static str>,
}

impl CuratedViews {
    /// An empty set: every table is read generically.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The league views, shared process-wide.
    pub fn standard() -> &'static CuratedViews {
        &STANDARD
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        let overrides = pairs
            .into_iter()
            .map(|(table, query)| (table.to_ascii_uppercase(), query))
            .collect();
        Self { overrides }
    }

    /// The override for `table`, if one exists.
    pub fn get(&self, table: &str) -> Option<&'static str> {
        self.overrides.get(&table.to_ascii_uppercase()).copied()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.get(table).is_some()
    }

    /// Overridden table names, sorted.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self.overrides.keys().map(String::as_str).collect();
        tables.sort_unstable();
        tables
    }

    /// The read statement for `table`.
    ///
    /// The generic fallback interpolates the table name, so it must pass
    /// the identifier check. Overrides need no check.
    pub fn resolve(&self, table: &str) -> Result<String, IdentifierError> {
        if let Some(query) = self.get(table) {
            return Ok(query.to_string());
        }
        validate_identifier(table)?;
        Ok(format!("SELECT * FROM {}", table))
    }
}

/// Resolve `table` against the standard views.
pub fn resolve_read_query(table: &str) -> Result<String, IdentifierError> {
    CuratedViews::standard().resolve(table)
}
