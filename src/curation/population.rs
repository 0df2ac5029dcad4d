use crate::error::Result;

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PopulationRow {
    digraph: String,
    population: String,
}

/// Population per two-letter region code. Loaded once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PopulationReference {
    populations: HashMap<String, i64>,
}

impl PopulationReference {
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reference = Self::from_reader(std::fs::File::open(path)?)?;
        if reference.is_empty() {
            tracing::warn!(
                "{} holds no population rows, every record will be dropped",
                path.display()
            );
        }
        tracing::info!(
            "Loaded population for {} regions from {}",
            reference.len(),
            path.display()
        );
        Ok(reference)
    }

    /// Reads a CSV with at least `digraph` and `population` columns.
    ///
    /// A population that does not parse is kept as 0, so the region's records still join
    /// but every per-capita figure for them comes out 0.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut populations = HashMap::new();

        for row in csv_reader.deserialize::<PopulationRow>() {
            let row = row?;
            let population = row.population.parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!(
                    "Population '{}' for {} is not an integer, using 0",
                    row.population,
                    row.digraph
                );
                0
            });
            populations.insert(row.digraph, population);
        }

        Ok(Self { populations })
    }

    pub fn get(&self, region: &str) -> Option<i64> {
        self.populations.get(region).copied()
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for PopulationReference {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self {
            populations: iter
                .into_iter()
                .map(|(region, population)| (region.into(), population))
                .collect(),
        }
    }
}
