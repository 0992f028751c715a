use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct TeamRoster {
    by_name: BTreeMap<String, String>,
    by_id: HashMap<String, String>,
}

impl TeamRoster {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open roster {}", path.display()))?;
        let roster =
            Self::from_reader(file).with_context(|| format!("parse roster {}", path.display()))?;
        info!(path = %path.display(), teams = roster.by_name.len(), "roster loaded");
        Ok(roster)
    }

    /// Expects `name` and `team` columns. Later rows win on duplicate names.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(rdr);
        let headers = reader.headers().context("read roster header")?.clone();
        let name_col = headers
            .iter()
            .position(|h| h == "name")
            .ok_or_else(|| anyhow!("roster has no `name` column"))?;
        let team_col = headers
            .iter()
            .position(|h| h == "team")
            .ok_or_else(|| anyhow!("roster has no `team` column"))?;

        let mut pairs = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row.with_context(|| format!("read roster row {}", line + 1))?;
            let name = row.get(name_col).unwrap_or_default();
            let team = row.get(team_col).unwrap_or_default();
            if name.is_empty() || team.is_empty() {
                continue;
            }
            pairs.push((name.to_string(), team.to_string()));
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn from_pairs<I, N, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        let mut by_name = BTreeMap::new();
        let mut first_seen = Vec::new();
        for (name, team) in pairs {
            let name: String = name.into();
            if !by_name.contains_key(&name) {
                first_seen.push(name.clone());
            }
            by_name.insert(name, team.into());
        }
        // Reverse lookup walks names in first-seen order; the last one per id wins.
        let mut by_id = HashMap::with_capacity(by_name.len());
        for name in first_seen {
            if let Some(team) = by_name.get(&name) {
                by_id.insert(team.clone(), name);
            }
        }
        Self { by_name, by_id }
    }

    pub fn resolve(&self, display_name: &str) -> Option<&str> {
        self.by_name.get(display_name).map(String::as_str)
    }

    pub fn display_name(&self, team_id: &str) -> Option<&str> {
        self.by_id.get(team_id).map(String::as_str)
    }

    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn team_ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_directions() {
        let raw = "team,name,city\nBOS,Boston Celtics,Boston\nLAL,Los Angeles Lakers,LA\n";
        let roster = TeamRoster::from_reader(raw.as_bytes()).unwrap();
        assert_eq!(roster.resolve("Boston Celtics"), Some("BOS"));
        assert_eq!(roster.display_name("LAL"), Some("Los Angeles Lakers"));
        assert_eq!(roster.resolve("Boston"), None);
    }

    #[test]
    fn names_are_sorted_and_blank_rows_skipped() {
        let raw = "team,name\nNYK,New York Knicks\nATL,\nBOS,Boston Celtics\n";
        let roster = TeamRoster::from_reader(raw.as_bytes()).unwrap();
        let names: Vec<&str> = roster.display_names().collect();
        assert_eq!(names, vec!["Boston Celtics", "New York Knicks"]);
    }

    #[test]
    fn later_duplicate_name_wins() {
        let roster = TeamRoster::from_pairs([("Lakers", "MNL"), ("Lakers", "LAL")]);
        assert_eq!(roster.resolve("Lakers"), Some("LAL"));
        assert_eq!(roster.len(), 1);
    }
}
