use super::population::PopulationReference;
use crate::ingestion::types::{DATE_FIELD, Record};

use serde_json::Value;

/// Per-capita figures are expressed per this many residents.
pub const PER_CAPITA_SCALE: f64 = 10_000.0;

/// Region code field joined against the population reference.
pub const REGION_FIELD: &str = "state";

pub const DATE_TRACK: &str = "dateTrack";
pub const DEATH_INCREASE: &str = "deathIncrease";
pub const DEATH: &str = "death";
pub const POSITIVE: &str = "positive";
pub const HOSPITALIZED_CUMULATIVE: &str = "hospitalizedCumulative";
pub const ICU_CUMULATIVE: &str = "inIcuCumulative";
pub const DEATH_PER_CAPITA: &str = "deathPerCapita";
pub const HOSPITALIZED_PER_CAPITA: &str = "hospitalizedPerCapita";
pub const ICU_PER_CAPITA: &str = "icuPerCapita";
pub const MORTALITY_RATE: &str = "mortalityRate";
pub const SURVIVAL_RATE: &str = "survivalRate";

/// Joins `batch` with `population` and adds the derived fields to every matched record.
///
/// Records whose region has no population entry are dropped, not passed through
/// unenriched. The survivors keep their input order.
pub fn curate(batch: Vec<Record>, population: &PopulationReference) -> Vec<Record> {
    let total = batch.len();
    let curated: Vec<Record> = batch
        .into_iter()
        .filter_map(|mut record| {
            let region = record.get(REGION_FIELD).and_then(Value::as_str)?;
            let residents = population.get(region)?;
            enrich_record(&mut record, residents);
            Some(record)
        })
        .collect();

    if curated.len() < total {
        tracing::warn!(
            "Dropped {} records with no population match",
            total - curated.len()
        );
    }
    tracing::info!("Curated {} records", curated.len());
    curated
}

/// Adds the derived fields to one record. Every derived figure is numeric; anything
/// missing, non-numeric or divided by zero comes out as 0.
pub fn enrich_record(record: &mut Record, population: i64) {
    if let Some(track) = date_track(record) {
        record.insert(DATE_TRACK, track);
    }

    // Upstream corrections are published as negative daily deltas.
    match record.int_field(DEATH_INCREASE) {
        Some(increase) if increase >= 0 => {}
        _ => record.insert(DEATH_INCREASE, 0),
    }

    let death = record.int_or(DEATH, 0);
    let hospitalized = record.int_or(HOSPITALIZED_CUMULATIVE, 0);
    let icu = record.int_or(ICU_CUMULATIVE, 0);
    let positive = record.int_or(POSITIVE, 0);

    record.insert(DEATH_PER_CAPITA, per_capita(death, population));
    record.insert(HOSPITALIZED_PER_CAPITA, per_capita(hospitalized, population));
    record.insert(ICU_PER_CAPITA, per_capita(icu, population));

    let (mortality, survival) = rates(death, positive);
    record.insert(MORTALITY_RATE, mortality);
    record.insert(SURVIVAL_RATE, survival);
}

/// `YYYYMMDD` -> `YYYY-MM-DDT12:00:00Z`.
fn date_track(record: &Record) -> Option<String> {
    let digits = match record.get(DATE_FIELD)? {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        tracing::warn!("Cannot derive {} from date '{}'", DATE_TRACK, digits);
        return None;
    }
    Some(format!(
        "{}-{}-{}T12:00:00Z",
        &digits[0..4],
        &digits[4..6],
        &digits[6..8]
    ))
}

fn per_capita(count: i64, population: i64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    count as f64 / population as f64 * PER_CAPITA_SCALE
}

/// Mortality and survival, both in percent. Only defined when deaths and positives are
/// both positive; otherwise both are 0.
fn rates(death: i64, positive: i64) -> (f64, f64) {
    if death <= 0 || positive <= 0 {
        return (0.0, 0.0);
    }
    let mortality = round_to(death as f64 / positive as f64, 3) * 100.0;
    let survival = round_to(100.0 - mortality, 3);
    (mortality, survival)
}

/// Rounds to `places` decimals, ties to even.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
