//! CSSE (Johns Hopkins) COVID-19 time-series ingest.
//!
//! The upstream data is a wide CSV: one row per US county, geography columns
//! first, then one cumulative-count column per calendar day. We aggregate all
//! rows into a single national series and keep only summary metadata (region
//! count, total population) for reporting.
//!
//! Row-level problems (unparseable cells, short rows) are collected as
//! diagnostics and the row's bad cells contribute zero; only a structurally
//! unusable file (no date columns, no state column) is fatal.

use std::collections::HashSet;
use std::io::Read;

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::domain::DataKind;
use crate::error::AppError;

const DEATHS_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_US.csv";
const CONFIRMED_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_US.csv";

const STATE_COLUMN: &str = "Province_State";
const POPULATION_COLUMN: &str = "Population";

/// A row-level problem encountered during aggregation.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based data-row index (excluding the header).
    pub line: usize,
    pub region: Option<String>,
    pub message: String,
}

/// Aggregated national series plus summary metadata.
#[derive(Debug, Clone)]
pub struct CsseSnapshot {
    pub kind: DataKind,
    /// Calendar date per column, in file order.
    pub dates: Vec<NaiveDate>,
    /// National cumulative counts (sum over all rows), parallel to `dates`.
    pub combined: Vec<f64>,
    /// Number of distinct states/territories seen.
    pub n_regions: usize,
    /// Total population, 0 when the file has no population column.
    pub population: u64,
    pub row_errors: Vec<RowError>,
}

/// Blocking HTTP client for the CSSE repository.
pub struct CsseClient {
    client: Client,
    url_override: Option<String>,
}

impl CsseClient {
    /// Build a client, honoring a `COVID_SURGE_DATA_URL` override from the
    /// environment (`.env` supported).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            client: Client::new(),
            url_override: std::env::var("COVID_SURGE_DATA_URL").ok(),
        }
    }

    fn url_for(&self, kind: DataKind) -> String {
        if let Some(url) = &self.url_override {
            return url.clone();
        }
        match kind {
            DataKind::Deaths => DEATHS_URL.to_string(),
            DataKind::Confirmed => CONFIRMED_URL.to_string(),
        }
    }

    /// Fetch and aggregate the series for `kind`.
    pub fn fetch(&self, kind: DataKind) -> Result<CsseSnapshot, AppError> {
        let url = self.url_for(kind);
        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::input(format!("Failed to fetch CSSE data from {url}: {e}")))?
            .text()
            .map_err(|e| AppError::input(format!("Failed to read CSSE response body: {e}")))?;
        parse_csse_csv(kind, body.as_bytes())
    }
}

/// Parse and aggregate a CSSE wide CSV.
pub fn parse_csse_csv(kind: DataKind, data: impl Read) -> Result<CsseSnapshot, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSSE headers: {e}")))?
        .clone();

    let state_col = headers
        .iter()
        .position(|h| h == STATE_COLUMN)
        .ok_or_else(|| AppError::input(format!("CSSE file has no '{STATE_COLUMN}' column.")))?;
    let pop_col = headers.iter().position(|h| h == POPULATION_COLUMN);

    // Date columns are the ones whose header parses as m/d/yy.
    let date_cols: Vec<(usize, NaiveDate)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            NaiveDate::parse_from_str(h, "%m/%d/%y")
                .ok()
                .map(|d| (i, d))
        })
        .collect();
    if date_cols.is_empty() {
        return Err(AppError::input("CSSE file has no date columns."));
    }

    let mut combined = vec![0.0f64; date_cols.len()];
    let mut regions: HashSet<String> = HashSet::new();
    let mut population = 0u64;
    let mut row_errors = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        let line = row_idx + 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    region: None,
                    message: format!("Unreadable row: {e}"),
                });
                continue;
            }
        };

        let region = record.get(state_col).map(str::to_string);
        match &region {
            Some(name) if !name.is_empty() => {
                regions.insert(name.clone());
            }
            _ => {
                row_errors.push(RowError {
                    line,
                    region: None,
                    message: "Missing state/province name.".to_string(),
                });
            }
        }

        if let Some(pc) = pop_col {
            match record.get(pc).and_then(|v| v.parse::<f64>().ok()) {
                Some(pop) if pop.is_finite() && pop >= 0.0 => population += pop as u64,
                _ => row_errors.push(RowError {
                    line,
                    region: region.clone(),
                    message: "Unparseable population value.".to_string(),
                }),
            }
        }

        let mut bad_cells = 0usize;
        for (j, &(col, _)) in date_cols.iter().enumerate() {
            match record.get(col).and_then(|v| v.parse::<f64>().ok()) {
                Some(v) if v.is_finite() => combined[j] += v,
                _ => bad_cells += 1,
            }
        }
        if bad_cells > 0 {
            row_errors.push(RowError {
                line,
                region,
                message: format!("{bad_cells} unparseable count cells (treated as 0)."),
            });
        }
    }

    if regions.is_empty() {
        return Err(AppError::no_data("CSSE file contains no data rows."));
    }

    Ok(CsseSnapshot {
        kind,
        dates: date_cols.into_iter().map(|(_, d)| d).collect(),
        combined,
        n_regions: regions.len(),
        population,
        row_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEATHS_FIXTURE: &str = "\
UID,iso2,iso3,code3,FIPS,Admin2,Province_State,Country_Region,Lat,Long_,Combined_Key,Population,1/22/20,1/23/20,1/24/20
84001001,US,USA,840,1001.0,Autauga,Alabama,US,32.53,-86.64,\"Autauga, Alabama, US\",55869,0,1,2
84001003,US,USA,840,1003.0,Baldwin,Alabama,US,30.72,-87.72,\"Baldwin, Alabama, US\",223234,0,0,3
84090053,US,USA,840,90053.0,Unassigned,Washington,US,0.0,0.0,\"Unassigned, Washington, US\",0,5,6,7
";

    #[test]
    fn aggregates_rows_into_a_national_series() {
        let snap = parse_csse_csv(DataKind::Deaths, DEATHS_FIXTURE.as_bytes()).unwrap();

        assert_eq!(snap.dates.len(), 3);
        assert_eq!(
            snap.dates[0],
            NaiveDate::from_ymd_opt(2020, 1, 22).unwrap()
        );
        assert_eq!(snap.combined, vec![5.0, 7.0, 12.0]);
        assert_eq!(snap.n_regions, 2); // Alabama, Washington
        assert_eq!(snap.population, 55869 + 223234);
        assert!(snap.row_errors.is_empty());
    }

    #[test]
    fn confirmed_file_without_population_column_is_accepted() {
        let fixture = "\
UID,iso2,Admin2,Province_State,Country_Region,1/22/20,1/23/20
1,US,King,Washington,US,1,4
2,US,Kings,New York,US,2,8
";
        let snap = parse_csse_csv(DataKind::Confirmed, fixture.as_bytes()).unwrap();
        assert_eq!(snap.population, 0);
        assert_eq!(snap.combined, vec![3.0, 12.0]);
        assert_eq!(snap.n_regions, 2);
    }

    #[test]
    fn bad_cells_become_row_errors_not_failures() {
        let fixture = "\
Province_State,Population,1/22/20,1/23/20
Alabama,100,1,notanumber
Alaska,200,2,3
";
        let snap = parse_csse_csv(DataKind::Deaths, fixture.as_bytes()).unwrap();
        assert_eq!(snap.combined, vec![3.0, 3.0]);
        assert_eq!(snap.row_errors.len(), 1);
        assert_eq!(snap.row_errors[0].line, 1);
    }

    #[test]
    fn structurally_broken_files_are_fatal() {
        let no_states = "Admin2,1/22/20\nAutauga,1\n";
        assert!(parse_csse_csv(DataKind::Deaths, no_states.as_bytes()).is_err());

        let no_dates = "Province_State,Population\nAlabama,100\n";
        assert!(parse_csse_csv(DataKind::Deaths, no_dates.as_bytes()).is_err());
    }
}
