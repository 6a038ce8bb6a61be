//! Token ids that must not be whitelisted, read from JSON snapshots.
//!
//! A snapshot is a JSON array. Entries are either plain token ids, or records exported from the
//! collection's tooling which number tokens from one: `{"deadGodId": 12}` or `{"id": "DeGod #12"}`.

use {
    anyhow::{
        anyhow,
        Context,
        Result,
    },
    serde::Deserialize,
    std::{
        collections::BTreeSet,
        fs,
        path::Path,
    },
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    TokenId(u16),
    DeadGod {
        #[serde(rename = "deadGodId")]
        dead_god_id: u16,
    },
    Named {
        id: String,
    },
}

impl Entry {
    fn token_id(&self) -> Result<u16> {
        let one_based = match self {
            Entry::TokenId(id) => return Ok(*id),
            Entry::DeadGod { dead_god_id } => *dead_god_id,
            Entry::Named { id } => {
                let number = id.rsplit('#').next().unwrap_or(id).trim();
                number
                    .parse()
                    .with_context(|| format!("unrecognized token name {:?}", id))?
            }
        };
        one_based
            .checked_sub(1)
            .ok_or_else(|| anyhow!("token numbers start at 1"))
    }
}

pub fn parse(json: &str) -> Result<BTreeSet<u16>> {
    let entries: Vec<Entry> = serde_json::from_str(json)?;
    entries.iter().map(Entry::token_id).collect()
}

pub fn load(path: &Path) -> Result<BTreeSet<u16>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read exclusion list {}", path.display()))?;
    parse(&json).with_context(|| format!("invalid exclusion list {}", path.display()))
}

/// Whitelist covering the whole collection except for `excluded`.
pub fn whitelist(collection_size: u16, excluded: &BTreeSet<u16>) -> Vec<bool> {
    (0..collection_size)
        .map(|id| !excluded.contains(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kinds() {
        let ids = parse(r#"[3, {"deadGodId": 10}, {"id": "DeGod #21"}, {"id": "5"}]"#).unwrap();
        assert_eq!(vec![3, 4, 9, 20], ids.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(parse(r#"[{"deadGodId": 0}]"#).is_err());
        assert!(parse(r#"[{"id": "DeGod"}]"#).is_err());
        assert!(parse(r#"{"id": 1}"#).is_err());
    }

    #[test]
    fn whitelist_skips_excluded() {
        let excluded: BTreeSet<u16> = [1, 3].into_iter().collect();
        assert_eq!(
            vec![true, false, true, false, true],
            whitelist(5, &excluded)
        );
        assert!(whitelist(0, &excluded).is_empty());
    }
}
