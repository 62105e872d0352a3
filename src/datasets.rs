use std::borrow::Cow;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, error};

use crate::explorer::{DatasetConfig, FieldSpec, SortDirection, SortSpec};
use crate::format::CellFormat;
use crate::record::{FieldValue, Record, finite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatasetKind {
    States,
    Counties,
    Programs,
    Recipients,
    CountyRankings,
}

/// A record shape that can be loaded from the data directory and explored.
pub trait Dataset: Record + DeserializeOwned {
    const FILE_NAME: &'static str;

    fn config() -> DatasetConfig;

    /// Fill in derived fields once, before the records are handed over.
    fn prepare(_records: &mut [Self]) {}
}

fn text(value: &Option<String>) -> Option<FieldValue<'_>> {
    value.as_deref().map(|s| FieldValue::Text(Cow::Borrowed(s)))
}

fn number(value: Option<f64>) -> Option<FieldValue<'static>> {
    value.map(FieldValue::Number)
}

/// Numbers may arrive as JSON numbers or numeric strings. Anything else
/// loads as missing.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

/// Text may arrive as a JSON string, number or bool. Anything else loads as
/// missing.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn ratio(amount: Option<f64>, population: Option<f64>) -> f64 {
    match (amount, population) {
        (Some(a), Some(p)) if p > 0.0 => a / p,
        _ => 0.0,
    }
}

fn amount_fields() -> [FieldSpec; 2] {
    [
        FieldSpec::number("amount")
            .with_label("Amount")
            .with_format(CellFormat::Currency),
        FieldSpec::number("payments").with_label("Payments"),
    ]
}

fn state_field() -> FieldSpec {
    FieldSpec::text("state").with_label("State")
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StateRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub payments: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub recipients: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub population: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub per_capita: Option<f64>,
}

impl Record for StateRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "state" => text(&self.state),
            "name" => text(&self.name),
            "amount" => number(self.amount),
            "payments" => number(self.payments),
            "recipients" => number(self.recipients),
            "population" => number(self.population),
            "per_capita" => number(self.per_capita),
            _ => None,
        }
    }
}

impl Dataset for StateRecord {
    const FILE_NAME: &'static str = "states.json";

    fn config() -> DatasetConfig {
        let mut fields = vec![state_field(), FieldSpec::text("name").with_label("Name")];
        fields.extend(amount_fields());
        fields.extend([
            FieldSpec::number("recipients").with_label("Recipients"),
            FieldSpec::number("population").with_label("Population"),
            FieldSpec::number("per_capita")
                .with_label("Per Capita")
                .with_format(CellFormat::PerCapita),
        ]);
        DatasetConfig::new("States", fields)
            .with_search_fields(vec!["name".to_string(), "state".to_string()])
            .with_default_sort(SortSpec::new("amount", SortDirection::Descending))
    }

    fn prepare(records: &mut [Self]) {
        for r in records.iter_mut().filter(|r| r.per_capita.is_none()) {
            r.per_capita = Some(ratio(r.amount, r.population));
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountyRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub fips: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub county: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub payments: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub recipients: Option<f64>,
}

impl Record for CountyRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "fips" => text(&self.fips),
            "county" => text(&self.county),
            "state" => text(&self.state),
            "amount" => number(self.amount),
            "payments" => number(self.payments),
            "recipients" => number(self.recipients),
            _ => None,
        }
    }
}

impl Dataset for CountyRecord {
    const FILE_NAME: &'static str = "counties.json";

    fn config() -> DatasetConfig {
        let mut fields = vec![
            FieldSpec::text("fips").with_label("FIPS").with_sortable(false),
            FieldSpec::text("county")
                .with_label("County")
                .with_format(CellFormat::TitleCase),
            state_field(),
        ];
        fields.extend(amount_fields());
        fields.push(FieldSpec::number("recipients").with_label("Recipients"));
        DatasetConfig::new("Counties", fields)
            .with_search_fields(vec!["county".to_string()])
            .with_category_field("state".to_string())
            .with_default_sort(SortSpec::new("amount", SortDirection::Descending))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProgramRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub program: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub payments: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub recipients: Option<f64>,
}

// First matching rule names the group.
static PROGRAM_GROUPS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (
            r"(?i)conservation|\bCRP\b|\bEQIP\b|\bCSP\b|wetland|grassland",
            "Conservation",
        ),
        (
            r"(?i)\b(ARC|PLC)\b|price loss|risk coverage|loan deficiency|marketing loan|direct payment|counter.?cyclical",
            "Commodity",
        ),
        (
            r"(?i)disaster|emergency|\b(ELAP|LFP|LIP|TAP|NAP)\b|WHIP|drought|hurricane",
            "Disaster",
        ),
        (r"(?i)market facilitation|\bMFP\b|trade|tariff", "Trade"),
        (r"(?i)insurance|premium", "Insurance"),
    ]
    .into_iter()
    .filter_map(|(pattern, group)| match Regex::new(pattern) {
        Ok(re) => Some((re, group)),
        Err(e) => {
            error!("Dropping program rule for {group}: {e}");
            None
        }
    })
    .collect()
});

pub fn program_group(program: &str) -> &'static str {
    PROGRAM_GROUPS
        .iter()
        .find(|(re, _)| re.is_match(program))
        .map(|(_, group)| *group)
        .unwrap_or("Other")
}

impl Record for ProgramRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "program" => text(&self.program),
            "category" => text(&self.category),
            "amount" => number(self.amount),
            "payments" => number(self.payments),
            "recipients" => number(self.recipients),
            _ => None,
        }
    }
}

impl Dataset for ProgramRecord {
    const FILE_NAME: &'static str = "programs.json";

    fn config() -> DatasetConfig {
        let mut fields = vec![
            FieldSpec::text("program").with_label("Program"),
            FieldSpec::text("category").with_label("Category"),
        ];
        fields.extend(amount_fields());
        fields.push(FieldSpec::number("recipients").with_label("Recipients"));
        DatasetConfig::new("Programs", fields)
            .with_search_fields(vec!["program".to_string()])
            .with_category_field("category".to_string())
            .with_default_sort(SortSpec::new("amount", SortDirection::Descending))
    }

    fn prepare(records: &mut [Self]) {
        for r in records
            .iter_mut()
            .filter(|r| r.category.as_deref().is_none_or(str::is_empty))
        {
            let group = program_group(r.program.as_deref().unwrap_or_default());
            r.category = Some(group.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecipientRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub payments: Option<f64>,
}

impl Record for RecipientRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => text(&self.name),
            "city" => text(&self.city),
            "state" => text(&self.state),
            "amount" => number(self.amount),
            "payments" => number(self.payments),
            _ => None,
        }
    }
}

impl Dataset for RecipientRecord {
    const FILE_NAME: &'static str = "recipients.json";

    fn config() -> DatasetConfig {
        let mut fields = vec![
            FieldSpec::text("name")
                .with_label("Recipient")
                .with_format(CellFormat::TitleCase),
            FieldSpec::text("city")
                .with_label("City")
                .with_format(CellFormat::TitleCase),
            state_field(),
        ];
        fields.extend(amount_fields());
        DatasetConfig::new("Recipients", fields)
            .with_search_fields(vec!["name".to_string(), "city".to_string()])
            .with_category_field("state".to_string())
            .with_default_sort(SortSpec::new("amount", SortDirection::Descending))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountyRankingRecord {
    #[serde(deserialize_with = "lenient_number")]
    pub rank: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub county: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub population: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub per_capita: Option<f64>,
}

impl Record for CountyRankingRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "rank" => number(self.rank),
            "county" => text(&self.county),
            "state" => text(&self.state),
            "amount" => number(self.amount),
            "population" => number(self.population),
            "per_capita" => number(self.per_capita),
            _ => None,
        }
    }
}

impl Dataset for CountyRankingRecord {
    const FILE_NAME: &'static str = "county_rankings.json";

    fn config() -> DatasetConfig {
        let fields = vec![
            FieldSpec::number("rank").with_label("Rank"),
            FieldSpec::text("county")
                .with_label("County")
                .with_format(CellFormat::TitleCase),
            state_field(),
            FieldSpec::number("amount")
                .with_label("Amount")
                .with_format(CellFormat::Currency),
            FieldSpec::number("population").with_label("Population"),
            FieldSpec::number("per_capita")
                .with_label("Per Capita")
                .with_format(CellFormat::PerCapita),
        ];
        DatasetConfig::new("County Rankings", fields)
            .with_search_fields(vec!["county".to_string()])
            .with_category_field("state".to_string())
            .with_default_sort(SortSpec::new("rank", SortDirection::Ascending))
    }

    /// Ranks by amount, highest first. Ranks from the file are kept only when
    /// every record carries one; otherwise all records are ranked afresh so
    /// ranks never repeat.
    fn prepare(records: &mut [Self]) {
        for r in records.iter_mut().filter(|r| r.per_capita.is_none()) {
            r.per_capita = Some(ratio(r.amount, r.population));
        }
        if records.iter().all(|r| r.rank.is_some()) {
            return;
        }
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&a, &b| {
            let a = finite(records[a].amount.unwrap_or(0.0));
            let b = finite(records[b].amount.unwrap_or(0.0));
            b.total_cmp(&a)
        });
        for (position, idx) in order.into_iter().enumerate() {
            records[idx].rank = Some((position + 1) as f64);
        }
        debug!("Ranked {} counties by amount", records.len());
    }
}
