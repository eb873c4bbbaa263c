//! Entity linking against the player dimension
//!
//! Staged rows are resolved to a `player_id` through an [`IdentityResolver`].
//! Three strategies exist:
//!
//! - [`ExactNameResolver`]: normalized name only (roster-style join)
//! - [`NameTeamYearResolver`]: normalized name, team code and year (contract-style join)
//! - [`PrefixHeuristicResolver`]: the loose name-prefix + id-token match used
//!   when merging external dead money
//!
//! Name collisions are not disambiguated: the first dimension row wins.
//! An unresolved row keeps an empty `player_id`.

use crate::store::ProcessedStore;
use deadcap_core::{
    normalize_name, normalize_team, parse_year, LinkStrategy, PipelineConfig, Player, Result,
    Table, WrittenFile,
};
use deadcap_staging::DatasetKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a staged or external row knows about a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkQuery<'a> {
    pub name: &'a str,
    pub team: Option<&'a str>,
    pub year: Option<i32>,
}

impl<'a> LinkQuery<'a> {
    pub fn new(name: &'a str, team: Option<&'a str>, year: Option<i32>) -> Self {
        Self { name, team, year }
    }
}

/// Resolve a raw player reference to a dimension identity
pub trait IdentityResolver {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// `player_id` of the matching dimension row, if any
    fn resolve(&self, query: &LinkQuery<'_>) -> Option<String>;
}

/// Split `PFR_<NAME>_<TEAM>_<YEAR>` into its team and year tokens
pub fn player_id_team_year(player_id: &str) -> Option<(&str, i32)> {
    let mut parts = player_id.rsplitn(3, '_');
    let year = parts.next()?.parse().ok()?;
    let team = parts.next()?;
    parts.next()?;
    Some((team, year))
}

/// Join on the normalized name alone
#[derive(Debug, Clone, Default)]
pub struct ExactNameResolver {
    by_name: HashMap<String, String>,
}

impl ExactNameResolver {
    pub fn new(players: &[Player]) -> Self {
        let mut by_name = HashMap::new();
        for player in players {
            by_name
                .entry(normalize_name(&player.player_name))
                .or_insert_with(|| player.player_id.clone());
        }
        Self { by_name }
    }
}

impl IdentityResolver for ExactNameResolver {
    fn name(&self) -> &'static str {
        "name"
    }

    fn resolve(&self, query: &LinkQuery<'_>) -> Option<String> {
        let key = normalize_name(query.name);
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key).cloned()
    }
}

/// Join on normalized name, canonical team code and year.
///
/// Team and year of a dimension row come from its `player_id`.
#[derive(Debug, Clone, Default)]
pub struct NameTeamYearResolver {
    by_key: HashMap<(String, String, i32), String>,
}

impl NameTeamYearResolver {
    pub fn new(players: &[Player]) -> Self {
        let mut by_key = HashMap::new();
        for player in players {
            let Some((team, year)) = player_id_team_year(&player.player_id) else {
                continue;
            };
            by_key
                .entry((normalize_name(&player.player_name), normalize_team(team), year))
                .or_insert_with(|| player.player_id.clone());
        }
        Self { by_key }
    }
}

impl IdentityResolver for NameTeamYearResolver {
    fn name(&self) -> &'static str {
        "name_team_year"
    }

    fn resolve(&self, query: &LinkQuery<'_>) -> Option<String> {
        let key = (
            normalize_name(query.name),
            normalize_team(query.team?),
            query.year?,
        );
        self.by_key.get(&key).cloned()
    }
}

/// Loose match for external dead money exports.
///
/// A dimension row matches when its uppercased name contains the first
/// `prefix_len` characters of the query name, its `player_id` ends with
/// `_<YEAR>`, and its team token agrees with the query team. Teams agree when
/// `player_id` contains `_<TEAM>_` verbatim or when both sides normalize to the
/// same franchise code, so `TB`, `TAM` and `Tampa Bay Buccaneers` all match.
#[derive(Debug, Clone)]
pub struct PrefixHeuristicResolver {
    entries: Vec<PrefixEntry>,
    prefix_len: usize,
}

#[derive(Debug, Clone)]
struct PrefixEntry {
    player_id: String,
    name_upper: String,
    canonical_team: Option<String>,
}

impl PrefixHeuristicResolver {
    pub fn new(players: &[Player], prefix_len: usize) -> Self {
        let entries = players
            .iter()
            .map(|p| PrefixEntry {
                player_id: p.player_id.clone(),
                name_upper: p.player_name.to_uppercase(),
                canonical_team: player_id_team_year(&p.player_id).map(|(team, _)| normalize_team(team)),
            })
            .collect();
        Self {
            entries,
            prefix_len,
        }
    }
}

impl IdentityResolver for PrefixHeuristicResolver {
    fn name(&self) -> &'static str {
        "prefix_heuristic"
    }

    fn resolve(&self, query: &LinkQuery<'_>) -> Option<String> {
        let name = query.name.trim().to_uppercase();
        let team = query.team?.trim().to_uppercase();
        let year = query.year?;
        if name.is_empty() || team.is_empty() {
            return None;
        }

        let prefix: String = name.chars().take(self.prefix_len).collect();
        let year_suffix = format!("_{}", year);
        let team_token = format!("_{}_", team);
        let canonical = normalize_team(&team);

        self.entries
            .iter()
            .find(|entry| {
                entry.name_upper.contains(&prefix)
                    && entry.player_id.ends_with(&year_suffix)
                    && (entry.player_id.contains(&team_token)
                        || entry.canonical_team.as_deref() == Some(canonical.as_str()))
            })
            .map(|entry| entry.player_id.clone())
    }
}

/// Build the resolver for a configured strategy
pub fn resolver_for(strategy: LinkStrategy, players: &[Player]) -> Box<dyn IdentityResolver> {
    match strategy {
        LinkStrategy::Name => Box::new(ExactNameResolver::new(players)),
        LinkStrategy::NameTeamYear => Box::new(NameTeamYearResolver::new(players)),
    }
}

/// Outcome of normalizing one staged file into the processed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// Output written; `linked` rows received a `player_id`
    Written { file: WrittenFile, linked: usize },

    /// Staging input absent; nothing written
    MissingInput { path: PathBuf },
}

/// Processed file name, e.g. `stg_dead_money_2024.csv`
pub fn processed_file_name(kind: DatasetKind, year: i32) -> String {
    format!("stg_{}_{}.csv", kind.slug(), year)
}

/// Staging → processed normalization
#[derive(Debug, Clone)]
pub struct EntityLinker {
    staging_dir: PathBuf,
    store: ProcessedStore,
    strategy: LinkStrategy,
}

impl EntityLinker {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            staging_dir: config.staging_path(),
            store: ProcessedStore::new(config),
            strategy: config.linking.strategy,
        }
    }

    /// Add a canonical `team` code column to the staged team cap snapshot
    pub fn normalize_team_cap(&self, year: i32) -> Result<NormalizeOutcome> {
        let Some(mut table) = self.read_staged(DatasetKind::TeamCap, year)? else {
            return Ok(self.missing(DatasetKind::TeamCap, year));
        };

        table.set_column("team", |t, i| {
            normalize_team(t.get(i, "team_name").unwrap_or_default())
        });

        self.write(DatasetKind::TeamCap, year, &table, 0)
    }

    /// Link staged player rankings to the dimension
    pub fn normalize_player_rankings(&self, year: i32) -> Result<NormalizeOutcome> {
        self.normalize_linked(DatasetKind::PlayerRankings, year)
    }

    /// Link staged dead money to the dimension
    pub fn normalize_dead_money(&self, year: i32) -> Result<NormalizeOutcome> {
        self.normalize_linked(DatasetKind::DeadMoney, year)
    }

    /// Normalize every dataset kind for a year
    pub fn normalize_all(&self, year: i32) -> Result<Vec<(DatasetKind, NormalizeOutcome)>> {
        Ok(vec![
            (DatasetKind::TeamCap, self.normalize_team_cap(year)?),
            (DatasetKind::PlayerRankings, self.normalize_player_rankings(year)?),
            (DatasetKind::DeadMoney, self.normalize_dead_money(year)?),
        ])
    }

    fn normalize_linked(&self, kind: DatasetKind, year: i32) -> Result<NormalizeOutcome> {
        let Some(mut table) = self.read_staged(kind, year)? else {
            return Ok(self.missing(kind, year));
        };

        let players = match self.store.try_load_players()? {
            Some(players) => players,
            None => {
                warn!(dataset = %kind, year, "player dimension missing; links left empty");
                Vec::new()
            }
        };

        let resolver = resolver_for(self.strategy, &players);
        let linked = link_player_ids(&mut table, resolver.as_ref());
        debug!(
            dataset = %kind,
            year,
            resolver = resolver.name(),
            linked,
            unresolved = table.len() - linked,
            "linked"
        );

        self.write(kind, year, &table, linked)
    }

    fn read_staged(&self, kind: DatasetKind, year: i32) -> Result<Option<Table>> {
        let path = self.staged_path(kind, year);
        if !path.exists() {
            return Ok(None);
        }
        Table::read(&path).map(Some)
    }

    fn staged_path(&self, kind: DatasetKind, year: i32) -> PathBuf {
        self.staging_dir.join(kind.staged_file_name(year))
    }

    fn missing(&self, kind: DatasetKind, year: i32) -> NormalizeOutcome {
        let path = self.staged_path(kind, year);
        warn!(dataset = %kind, year, path = %path.display(), "staging input missing");
        NormalizeOutcome::MissingInput { path }
    }

    fn write(&self, kind: DatasetKind, year: i32, table: &Table, linked: usize) -> Result<NormalizeOutcome> {
        let file = table.write(&self.store.path(&processed_file_name(kind, year)))?;
        info!(dataset = %kind, year, path = %file.path.display(), rows = file.rows, "normalized");
        Ok(NormalizeOutcome::Written { file, linked })
    }
}

/// Set the `player_id` column from `resolver`. Returns the number of linked rows.
pub fn link_player_ids(table: &mut Table, resolver: &dyn IdentityResolver) -> usize {
    let mut linked = 0;
    table.set_column("player_id", |t, i| {
        let name = t.get(i, "player_name").unwrap_or_default();
        let team = t.get(i, "team").filter(|s| !s.trim().is_empty());
        let year = t.get(i, "year").and_then(parse_year);

        match resolver.resolve(&LinkQuery::new(name, team, year)) {
            Some(player_id) => {
                linked += 1;
                player_id
            }
            None => String::new(),
        }
    });
    linked
}

/// Staged files of one kind in `dir`, sorted by name
pub(crate) fn staged_files(dir: &Path, kind: DatasetKind) -> Vec<PathBuf> {
    let prefix = kind.staged_prefix();
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.starts_with(&prefix) && name.ends_with(".csv")
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dimension() -> Vec<Player> {
        vec![
            Player::new("PFR_TOMBRADY_TB_2019", "Tom Brady", "QB"),
            Player::new("PFR_TOMBRADY_TAM_2020", "Tom Brady", "QB"),
            Player::new("PFR_ODELLBECKHAMJR_CLE_2020", "Odell Beckham Jr.", "WR"),
        ]
    }

    #[test]
    fn player_id_tokens() {
        assert_eq!(player_id_team_year("PFR_TOMBRADY_TB_2019"), Some(("TB", 2019)));
        assert_eq!(player_id_team_year("PFR_X_UNK_2024"), Some(("UNK", 2024)));
        assert_eq!(player_id_team_year("no_year_here"), None);
        assert_eq!(player_id_team_year("TB_2019"), None);
    }

    #[test]
    fn exact_name_ignores_suffix_and_case() {
        let resolver = ExactNameResolver::new(&dimension());
        let found = resolver.resolve(&LinkQuery::new("odell beckham", None, None));
        assert_eq!(found.as_deref(), Some("PFR_ODELLBECKHAMJR_CLE_2020"));

        // First dimension row wins on a collision
        let found = resolver.resolve(&LinkQuery::new("TOM BRADY", None, None));
        assert_eq!(found.as_deref(), Some("PFR_TOMBRADY_TB_2019"));

        assert_eq!(resolver.resolve(&LinkQuery::new("  ", None, None)), None);
    }

    #[test]
    fn name_team_year_uses_canonical_codes() {
        let resolver = NameTeamYearResolver::new(&dimension());

        let found = resolver.resolve(&LinkQuery::new("Tom Brady", Some("Tampa Bay Buccaneers"), Some(2020)));
        assert_eq!(found.as_deref(), Some("PFR_TOMBRADY_TAM_2020"));

        let found = resolver.resolve(&LinkQuery::new("Tom Brady", Some("TAM"), Some(2019)));
        assert_eq!(found.as_deref(), Some("PFR_TOMBRADY_TB_2019"));

        assert_eq!(resolver.resolve(&LinkQuery::new("Tom Brady", None, Some(2019))), None);
    }

    #[test]
    fn prefix_heuristic_matches_loosely() {
        let resolver = PrefixHeuristicResolver::new(&dimension(), 5);

        let found = resolver.resolve(&LinkQuery::new("Tom Brady", Some("TB"), Some(2019)));
        assert_eq!(found.as_deref(), Some("PFR_TOMBRADY_TB_2019"));

        let found = resolver.resolve(&LinkQuery::new("tom b.", Some("tb"), Some(2020)));
        assert_eq!(found.as_deref(), Some("PFR_TOMBRADY_TAM_2020"));

        let found = resolver.resolve(&LinkQuery::new("Tom Brady", Some("TAM"), Some(2019)));
        assert_eq!(found.as_deref(), Some("PFR_TOMBRADY_TB_2019"));

        let found = resolver.resolve(&LinkQuery::new("Tom Brady", Some("Tampa Bay Buccaneers"), Some(2019)));
        assert_eq!(found.as_deref(), Some("PFR_TOMBRADY_TB_2019"));

        assert_eq!(resolver.resolve(&LinkQuery::new("Tom Brady", Some("NE"), Some(2019))), None);
        assert_eq!(resolver.resolve(&LinkQuery::new("Tom Brady", Some("TB"), Some(2018))), None);
    }

    #[test]
    fn unresolved_rows_keep_empty_link() {
        let mut table = Table::from_reader(
            "player_name,team,year\nTom Brady,TB,2019\nNobody Known,DAL,2019\n".as_bytes(),
        )
        .unwrap();

        let resolver = ExactNameResolver::new(&dimension());
        let linked = link_player_ids(&mut table, &resolver);

        assert_eq!(linked, 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "player_id"), Some("PFR_TOMBRADY_TB_2019"));
        assert_eq!(table.get(1, "player_id"), Some(""));
    }
}
