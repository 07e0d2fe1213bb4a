use crate::data::table::ChampionshipIndex;
use crate::foundation::core::Year;

/// One team's standing in a [`YearRanking`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RankEntry {
    pub team: String,
    pub count: u32,
}

/// Every known team with its cumulative championship count through `year`, most titles first.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct YearRanking {
    pub year: Year,
    pub entries: Vec<RankEntry>,
}

impl YearRanking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_for(&self, team: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.team == team)
            .map(|e| e.count)
    }

    /// Largest count in this ranking (0 when empty).
    pub fn leader_count(&self) -> u32 {
        self.entries.first().map(|e| e.count).unwrap_or(0)
    }
}

/// Number of `years` at or before `year`.
pub fn cumulative_count(years: &[Year], year: Year) -> u32 {
    years.iter().filter(|&&y| y <= year).count() as u32
}

/// Rank every team in `index` by titles won through `year`.
///
/// Entries start in team-name order and are stable-sorted by count descending, so ties keep
/// name order.
pub fn rank_for_year(index: &ChampionshipIndex, year: Year) -> YearRanking {
    let mut entries: Vec<RankEntry> = index
        .iter()
        .map(|(team, years)| RankEntry {
            team: team.to_owned(),
            count: cumulative_count(years, year),
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    YearRanking { year, entries }
}

/// Highest total any team reaches over the whole table.
pub fn max_final_count(index: &ChampionshipIndex) -> u32 {
    index
        .iter()
        .map(|(_, years)| years.len() as u32)
        .max()
        .unwrap_or(0)
}
