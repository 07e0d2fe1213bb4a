use std::collections::BTreeMap;

use crate::assets::color::ColorDef;
use crate::data::table::ChampionshipIndex;

/// Team name -> bar color, fixed for the whole race.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamColors {
    colors: BTreeMap<String, [u8; 4]>,
}

impl TeamColors {
    /// Spread the hue wheel over all teams in name order.
    ///
    /// Hues sit at `i / (n + 1)` of the wheel for `i in 1..=n`, so the first and last team never
    /// share the red end.
    pub fn assign(index: &ChampionshipIndex) -> Self {
        let n = index.len();
        let colors = index
            .teams()
            .enumerate()
            .map(|(i, team)| {
                let hue = 360.0 * (i as f64 + 1.0) / (n as f64 + 1.0);
                (team.to_owned(), ColorDef::from_hue(hue).to_rgba8())
            })
            .collect();
        Self { colors }
    }

    pub fn get(&self, team: &str) -> Option<[u8; 4]> {
        self.colors.get(team).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::ChampionshipRecord;

    fn index(teams: &[&str]) -> ChampionshipIndex {
        let records: Vec<ChampionshipRecord> = teams
            .iter()
            .enumerate()
            .map(|(i, t)| ChampionshipRecord {
                team: (*t).to_owned(),
                year: 2000 + i as i32,
                logo: String::new(),
            })
            .collect();
        ChampionshipIndex::from_records(&records)
    }

    #[test]
    fn covers_every_team_with_distinct_colors() {
        let idx = index(&["Nets", "Bucks", "Suns", "Hawks", "Magic"]);
        let colors = TeamColors::assign(&idx);

        assert_eq!(colors.len(), 5);
        assert_eq!(colors.teams().collect::<Vec<_>>(), idx.teams().collect::<Vec<_>>());

        let mut seen: Vec<[u8; 4]> = colors.teams().filter_map(|t| colors.get(t)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn assignment_depends_only_on_team_set() {
        let a = TeamColors::assign(&index(&["B", "A", "C"]));
        let b = TeamColors::assign(&index(&["C", "B", "A", "A"]));
        assert_eq!(a, b);
        assert_eq!(a.get("missing"), None);
    }

    #[test]
    fn single_team_is_cyan_midpoint() {
        let c = TeamColors::assign(&index(&["Solo"]));
        assert_eq!(c.get("Solo"), Some([0, 255, 255, 255]));
    }
}
