//! Conversion of E(B-V) to per-filter reddening via published
//! survey coefficient tables (Schlafly & Finkbeiner 2011, Table 6).

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{DustError, DustResult};

const PACKAGED_TABLE: &str = include_str!("../data/ebv_to_filter.json");

/// Survey -> filter -> multiplicative coefficient on E(B-V).
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ConversionTable {
    surveys: HashMap<String, HashMap<String, f64>>,
}

impl ConversionTable {
    /// Parses the table bundled with the crate.
    pub fn packaged() -> DustResult<Self> {
        Ok(serde_json::from_str(PACKAGED_TABLE)?)
    }

    pub fn from_json(json: &str) -> DustResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn surveys(&self) -> impl Iterator<Item = &str> {
        self.surveys.keys().map(String::as_str)
    }

    pub fn coefficient(&self, survey: &str, filter: &str) -> DustResult<f64> {
        let filters = self
            .surveys
            .get(survey)
            .ok_or_else(|| DustError::unknown_survey(survey))?;
        filters
            .get(filter)
            .copied()
            .ok_or_else(|| DustError::unknown_filter(survey, filter))
    }

    /// Resolves every requested filter up front so a bad name fails the
    /// whole query instead of producing a partial matrix.
    pub fn coefficients(&self, survey: &str, filters: &[&str]) -> DustResult<Vec<f64>> {
        filters
            .iter()
            .map(|f| self.coefficient(survey, f))
            .collect()
    }
}

/// Filter selection for a reddening query, accepted either as a compact
/// string of single-letter filter names ("gri") or as an explicit list.
pub trait FilterArg {
    fn filter_names(&self) -> Vec<String>;
}

impl FilterArg for &str {
    fn filter_names(&self) -> Vec<String> {
        self.chars().map(|c| c.to_string()).collect()
    }
}

impl FilterArg for String {
    fn filter_names(&self) -> Vec<String> {
        self.as_str().filter_names()
    }
}

impl FilterArg for &[&str] {
    fn filter_names(&self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> FilterArg for [&str; N] {
    fn filter_names(&self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl FilterArg for &[String] {
    fn filter_names(&self) -> Vec<String> {
        self.to_vec()
    }
}

impl FilterArg for Vec<String> {
    fn filter_names(&self) -> Vec<String> {
        self.clone()
    }
}

/// Per-filter reddening for a batch of coordinates, stored row-major with
/// one row per coordinate and one column per filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ReddeningMatrix {
    filters: Vec<String>,
    n_coords: usize,
    values: Vec<f64>,
}

impl ReddeningMatrix {
    pub fn from_ebv(ebv: &[f64], filters: Vec<String>, coefficients: &[f64]) -> Self {
        let mut values = Vec::with_capacity(ebv.len() * coefficients.len());
        for &e in ebv {
            for &c in coefficients {
                values.push(c * e);
            }
        }
        Self {
            filters,
            n_coords: ebv.len(),
            values,
        }
    }

    /// (rows, columns) = (coordinates, filters).
    pub fn shape(&self) -> (usize, usize) {
        (self.n_coords, self.filters.len())
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn get(&self, coord: usize, filter: usize) -> Option<f64> {
        if coord >= self.n_coords || filter >= self.filters.len() {
            return None;
        }
        Some(self.values[coord * self.filters.len() + filter])
    }

    pub fn row(&self, coord: usize) -> Option<&[f64]> {
        if coord >= self.n_coords {
            return None;
        }
        let m = self.filters.len();
        Some(&self.values[coord * m..(coord + 1) * m])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packaged_table_parses() {
        let table = ConversionTable::packaged().unwrap();
        let mut surveys: Vec<&str> = table.surveys().collect();
        surveys.sort_unstable();
        assert_eq!(surveys, ["Landolt", "PS1", "SDSS", "UKIRT"]);
    }

    #[test]
    fn test_known_coefficients() {
        let table = ConversionTable::packaged().unwrap();
        assert!((table.coefficient("SDSS", "r").unwrap() - 2.285).abs() < 1e-12);
        assert!((table.coefficient("PS1", "g").unwrap() - 3.172).abs() < 1e-12);
        assert!((table.coefficient("Landolt", "V").unwrap() - 2.742).abs() < 1e-12);
        assert!((table.coefficient("UKIRT", "K").unwrap() - 0.302).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_survey_and_filter() {
        let table = ConversionTable::packaged().unwrap();
        assert!(matches!(
            table.coefficient("2MASS", "J"),
            Err(DustError::UnknownSurvey { .. })
        ));
        // PS1 has no z coefficient in the published table.
        assert!(matches!(
            table.coefficient("PS1", "z"),
            Err(DustError::UnknownFilter { .. })
        ));
    }

    #[test]
    fn test_filter_arg_forms() {
        assert_eq!("gri".filter_names(), vec!["g", "r", "i"]);
        assert_eq!(["g", "r"].filter_names(), vec!["g", "r"]);
        let owned = vec!["J".to_string(), "K".to_string()];
        assert_eq!(owned.filter_names(), vec!["J", "K"]);
    }

    #[test]
    fn test_matrix_layout() {
        let ebv = [0.1, 0.2, 0.3];
        let coeffs = [2.0, 3.0];
        let m = ReddeningMatrix::from_ebv(
            &ebv,
            vec!["r".into(), "g".into()],
            &coeffs,
        );
        assert_eq!(m.shape(), (3, 2));
        assert!((m.get(1, 0).unwrap() - 0.4).abs() < 1e-12);
        assert!((m.get(2, 1).unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(m.get(3, 0), None);
        assert_eq!(m.row(0).unwrap().len(), 2);
    }
}
