use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::attainment::{classify, RatingScale};
use crate::error::{RatingDecodeError, RatingValueError};
use crate::models::{ItemKey, ItemSummary, ItemTally, RatingDistribution, RawResponse};

pub type RatingMap = Vec<(ItemKey, Value)>;

/// Decodes a stored payload. Arrays are keyed by 1-based position.
pub fn decode_ratings(payload: &str) -> Result<RatingMap, RatingDecodeError> {
    match serde_json::from_str::<Value>(payload)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (ItemKey::parse(&key), value))
            .collect()),
        Value::Array(values) => Ok(values
            .into_iter()
            .enumerate()
            .map(|(position, value)| (ItemKey::Number(position as u32 + 1), value))
            .collect()),
        Value::Null => Err(RatingDecodeError::NotAMap("null")),
        Value::Bool(_) => Err(RatingDecodeError::NotAMap("boolean")),
        Value::Number(_) => Err(RatingDecodeError::NotAMap("number")),
        Value::String(_) => Err(RatingDecodeError::NotAMap("string")),
    }
}

/// Accepts integers, integral floats and numeric strings within the scale.
pub fn rating_value(value: &Value, scale: RatingScale) -> Result<u8, RatingValueError> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
    .ok_or(RatingValueError::NotNumeric)?;

    if number.fract() != 0.0 || number < scale.min() as f64 || number > scale.max() as f64 {
        return Err(RatingValueError::OutOfRange(number, scale.min(), scale.max()));
    }

    Ok(number as u8)
}

fn valid_ratings<'a>(
    responses: &'a [RawResponse],
    field: &'a str,
    scale: RatingScale,
) -> impl Iterator<Item = (ItemKey, u8)> + 'a {
    responses.iter().flat_map(move |response| {
        let decoded = match response.rating_payload(field).map(decode_ratings) {
            Some(Ok(map)) => map,
            Some(Err(err)) => {
                debug!(response = %response.id, field, error = %err, "skipping rating payload");
                Vec::new()
            }
            None => Vec::new(),
        };

        decoded
            .into_iter()
            .filter_map(move |(item, value)| match rating_value(&value, scale) {
                Ok(rating) => Some((item, rating)),
                Err(err) => {
                    debug!(field, item = %item, error = %err, "skipping rating value");
                    None
                }
            })
    })
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn empty_counts(scale: RatingScale) -> BTreeMap<u8, usize> {
    scale.values().map(|value| (value, 0)).collect()
}

fn percentages(counts: &BTreeMap<u8, usize>, total: usize) -> BTreeMap<u8, f64> {
    counts
        .iter()
        .map(|(value, count)| {
            let pct = if total == 0 {
                0.0
            } else {
                round_to(*count as f64 / total as f64 * 100.0, 1)
            };
            (*value, pct)
        })
        .collect()
}

impl RatingDistribution {
    pub fn from_counts(counts: BTreeMap<u8, usize>) -> Self {
        let total = counts.values().sum();
        let percentages = percentages(&counts, total);
        Self {
            counts,
            total,
            percentages,
        }
    }

    pub fn empty(scale: RatingScale) -> Self {
        Self::from_counts(empty_counts(scale))
    }

    pub fn average(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: usize = self
            .counts
            .iter()
            .map(|(value, count)| *value as usize * count)
            .sum();
        round_to(sum as f64 / self.total as f64, 2)
    }
}

impl ItemTally {
    fn new(scale: RatingScale) -> Self {
        Self {
            sum: 0,
            total: 0,
            counts: empty_counts(scale),
        }
    }

    fn add(&mut self, rating: u8) {
        self.sum += rating as u64;
        self.total += 1;
        *self.counts.entry(rating).or_insert(0) += 1;
    }

    pub fn average(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            round_to(self.sum as f64 / self.total as f64, 2)
        }
    }
}

/// Pools every rating of `field` into one distribution, ignoring item keys.
pub fn aggregate_flat(
    responses: &[RawResponse],
    field: &str,
    scale: RatingScale,
) -> RatingDistribution {
    let mut counts = empty_counts(scale);
    for (_, rating) in valid_ratings(responses, field, scale) {
        *counts.entry(rating).or_insert(0) += 1;
    }
    let distribution = RatingDistribution::from_counts(counts);
    debug!(field, total = distribution.total, "flat rating aggregation");
    distribution
}

pub fn aggregate_per_item(
    responses: &[RawResponse],
    field: &str,
    scale: RatingScale,
) -> BTreeMap<ItemKey, ItemTally> {
    let mut tallies: BTreeMap<ItemKey, ItemTally> = BTreeMap::new();
    for (item, rating) in valid_ratings(responses, field, scale) {
        tallies
            .entry(item)
            .or_insert_with(|| ItemTally::new(scale))
            .add(rating);
    }
    debug!(field, items = tallies.len(), "per-item rating aggregation");
    tallies
}

/// Rows already decoded by storage, e.g. `(po_number, rating)`.
pub fn aggregate_item_rows<I>(rows: I, scale: RatingScale) -> BTreeMap<ItemKey, ItemTally>
where
    I: IntoIterator<Item = (ItemKey, f64)>,
{
    let mut tallies: BTreeMap<ItemKey, ItemTally> = BTreeMap::new();
    for (item, value) in rows {
        let Some(number) = serde_json::Number::from_f64(value) else {
            continue;
        };
        match rating_value(&Value::Number(number), scale) {
            Ok(rating) => tallies
                .entry(item)
                .or_insert_with(|| ItemTally::new(scale))
                .add(rating),
            Err(err) => debug!(item = %item, error = %err, "skipping rating row"),
        }
    }
    tallies
}

pub fn summarize_items(
    tallies: &BTreeMap<ItemKey, ItemTally>,
    scale: RatingScale,
) -> Vec<ItemSummary> {
    tallies
        .iter()
        .map(|(item, tally)| {
            let average = tally.average();
            ItemSummary {
                item: item.clone(),
                average,
                level: classify(average, scale),
                percentages: percentages(&tally.counts, tally.total),
                total: tally.total,
            }
        })
        .collect()
}
