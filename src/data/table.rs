use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::foundation::core::{Year, YearSpan};
use crate::foundation::error::{RaceError, RaceResult};

/// Header names the input table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Team", "Year", "Logo"];

/// Longest race that will be rendered, one frame per season.
pub const MAX_SPAN_YEARS: u64 = 10_000;

/// One row of the input table.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChampionshipRecord {
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Year")]
    pub year: Year,
    #[serde(rename = "Logo", default)]
    pub logo: String,
}

/// Team name -> seasons won. Teams iterate in ascending name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChampionshipIndex {
    teams: BTreeMap<String, Vec<Year>>,
}

impl ChampionshipIndex {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ChampionshipRecord>) -> Self {
        let mut teams = BTreeMap::<String, Vec<Year>>::new();
        for r in records {
            teams.entry(r.team.clone()).or_default().push(r.year);
        }
        Self { teams }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.teams.keys().map(String::as_str)
    }

    pub fn years(&self, team: &str) -> Option<&[Year]> {
        self.teams.get(team).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Year])> {
        self.teams.iter().map(|(t, y)| (t.as_str(), y.as_slice()))
    }

    /// Seasons from the earliest to the latest championship, or `None` for an empty index.
    pub fn span(&self) -> Option<YearSpan> {
        let all = self.teams.values().flatten().copied();
        let (min, max) = all.fold(None, |acc: Option<(Year, Year)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })?;
        Some(YearSpan {
            first: min,
            last: max,
        })
    }
}

/// Team name -> logo image path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogoIndex {
    logos: BTreeMap<String, PathBuf>,
}

impl LogoIndex {
    /// Build from table rows. Later non-empty logo cells replace earlier ones for the same team;
    /// relative paths are joined onto `root`.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a ChampionshipRecord>,
        root: &Path,
    ) -> Self {
        let mut logos = BTreeMap::new();
        for r in records {
            let cell = r.logo.trim();
            if cell.is_empty() {
                continue;
            }
            let p = Path::new(cell);
            let resolved = if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            };
            logos.insert(r.team.clone(), resolved);
        }
        Self { logos }
    }

    pub fn get(&self, team: &str) -> Option<&Path> {
        self.logos.get(team).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.logos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logos.is_empty()
    }
}

/// Everything the race needs from the input table.
#[derive(Clone, Debug)]
pub struct ChampionshipTable {
    pub index: ChampionshipIndex,
    pub logos: LogoIndex,
    pub rows: usize,
}

impl ChampionshipTable {
    /// Seasons to render. A loaded table always has at least one row.
    pub fn span(&self) -> RaceResult<YearSpan> {
        let span = self
            .index
            .span()
            .ok_or_else(|| RaceError::data("championship table has no rows"))?;
        if span.len_years() > MAX_SPAN_YEARS {
            return Err(RaceError::data(format!(
                "years {}..={} span more than {MAX_SPAN_YEARS} seasons",
                span.first, span.last
            )));
        }
        Ok(span)
    }
}

/// Load the championship table at `path`. Logo paths resolve against the table's directory.
#[tracing::instrument]
pub fn load_table(path: &Path) -> RaceResult<ChampionshipTable> {
    let f = std::fs::File::open(path).map_err(|e| {
        RaceError::Io(std::io::Error::new(
            e.kind(),
            format!("open championship table '{}': {e}", path.display()),
        ))
    })?;
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    let table = load_from_reader(f, root)?;
    tracing::info!(
        rows = table.rows,
        teams = table.index.len(),
        logos = table.logos.len(),
        "loaded championship table"
    );
    Ok(table)
}

/// Parse a championship table from any reader.
pub fn load_from_reader<R: Read>(reader: R, logo_root: &Path) -> RaceResult<ChampionshipTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| RaceError::data(format!("failed to read header row: {e}")))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(RaceError::data(format!(
                "missing required column '{column}' (found: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            )));
        }
    }

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<ChampionshipRecord>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record = row.map_err(|e| RaceError::data(format!("line {line}: {e}")))?;
        if record.team.is_empty() {
            return Err(RaceError::data(format!("line {line}: empty Team")));
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(RaceError::data("championship table has no rows"));
    }

    Ok(ChampionshipTable {
        index: ChampionshipIndex::from_records(&records),
        logos: LogoIndex::from_records(&records, logo_root),
        rows: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> RaceResult<ChampionshipTable> {
        load_from_reader(csv.as_bytes(), Path::new("data"))
    }

    #[test]
    fn groups_years_by_team() {
        let t = parse(
            "Team,Year,Logo\n\
             Lakers,1980,logos/lakers.png\n\
             Celtics,1981,logos/celtics.png\n\
             Lakers,1982,logos/lakers.png\n",
        )
        .unwrap();

        assert_eq!(t.rows, 3);
        assert_eq!(t.index.len(), 2);
        assert_eq!(t.index.years("Lakers"), Some(&[1980, 1982][..]));
        assert_eq!(t.index.years("Celtics"), Some(&[1981][..]));
        assert_eq!(t.index.teams().collect::<Vec<_>>(), vec!["Celtics", "Lakers"]);
        assert_eq!(t.span().unwrap(), YearSpan::new(1980, 1982).unwrap());
    }

    #[test]
    fn trims_cells_and_ignores_extra_columns() {
        let t = parse("Year , Team,Logo,Coach\n 1999 , Spurs , spurs.png ,Pop\n").unwrap();
        assert_eq!(t.index.years("Spurs"), Some(&[1999][..]));
        assert_eq!(t.logos.get("Spurs"), Some(Path::new("data/spurs.png")));
    }

    #[test]
    fn missing_column_is_a_data_error_naming_it() {
        let err = parse("Team,Year\nLakers,1980\n").unwrap_err();
        assert!(matches!(err, RaceError::Data(_)));
        assert!(err.to_string().contains("'Logo'"));
    }

    #[test]
    fn malformed_year_reports_line() {
        let err = parse("Team,Year,Logo\nLakers,1980,a.png\nCeltics,nineteen,b.png\n").unwrap_err();
        assert!(matches!(err, RaceError::Data(_)));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = parse("Team,Year,Logo\n").unwrap_err();
        assert!(matches!(err, RaceError::Data(_)));
    }

    #[test]
    fn last_non_empty_logo_wins_and_absolute_paths_are_kept() {
        let t = parse(
            "Team,Year,Logo\n\
             Bulls,1991,old.png\n\
             Bulls,1992,new.png\n\
             Bulls,1993,\n\
             Heat,2006,/srv/logos/heat.png\n\
             Jazz,1900,\n",
        )
        .unwrap();

        assert_eq!(t.logos.get("Bulls"), Some(Path::new("data/new.png")));
        assert_eq!(t.logos.get("Heat"), Some(Path::new("/srv/logos/heat.png")));
        assert_eq!(t.logos.get("Jazz"), None);
        assert_eq!(t.logos.len(), 2);
    }

    #[test]
    fn duplicate_rows_are_kept() {
        let t = parse("Team,Year,Logo\nKings,1951,k.png\nKings,1951,k.png\n").unwrap();
        assert_eq!(t.index.years("Kings"), Some(&[1951, 1951][..]));
    }

    #[test]
    fn absurd_year_span_is_rejected() {
        let t = parse("Team,Year,Logo\nA,-2000000000,\nB,2000000000,\n").unwrap();
        let err = t.span().unwrap_err();
        assert!(matches!(err, RaceError::Data(_)), "{err:?}");

        let ok = parse("Team,Year,Logo\nA,1900,\nB,2024,\n").unwrap();
        assert_eq!(ok.span().unwrap().len_years(), 125);
    }
}
