use std::cmp::Ordering;
use std::collections::BTreeMap;

use derive_setters::Setters;
use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::format::CellFormat;
use crate::record::{FieldKind, Record, number_of, text_of};

/// Number of rows exposed for display when a dataset does not override it.
pub const DEFAULT_DISPLAY_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Text columns start A→Z, numeric columns start highest-first.
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => SortDirection::Ascending,
            FieldKind::Number => SortDirection::Descending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// Declaration of one record field as the explorer sees it.
#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct FieldSpec {
    #[setters(skip)]
    pub name: String,
    #[setters(into)]
    pub label: String,
    #[setters(skip)]
    pub kind: FieldKind,
    pub format: CellFormat,
    pub sortable: bool,
}

impl FieldSpec {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            kind: FieldKind::Text,
            format: CellFormat::Plain,
            sortable: true,
        }
    }

    pub fn number(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            kind: FieldKind::Number,
            format: CellFormat::Integer,
            sortable: true,
        }
    }
}

/// Per-dataset configuration of the explorer: which fields exist, which of
/// them are searched, which one carries the category and how rows start out
/// ordered.
#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct DatasetConfig {
    #[setters(skip)]
    pub title: String,
    #[setters(skip)]
    pub fields: Vec<FieldSpec>,
    pub search_fields: Vec<String>,
    #[setters(strip_option)]
    pub category_field: Option<String>,
    pub default_sort: SortSpec,
    pub display_limit: usize,
}

impl DatasetConfig {
    /// Defaults to sorting by the first numeric field, highest first.
    pub fn new(title: &str, fields: Vec<FieldSpec>) -> Self {
        let default_sort = fields
            .iter()
            .find(|f| f.kind == FieldKind::Number && f.sortable)
            .or_else(|| fields.first())
            .map(|f| SortSpec::new(f.name.clone(), SortDirection::default_for(f.kind)))
            .unwrap_or_else(|| SortSpec::new("", SortDirection::Ascending));
        Self {
            title: title.to_string(),
            fields,
            search_fields: Vec::new(),
            category_field: None,
            default_sort,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn sortable_field(&self, name: &str) -> Option<&FieldSpec> {
        self.field(name).filter(|f| f.sortable)
    }
}

/// Query, category and sort. Every transition produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerState {
    pub query: String,
    pub category: Option<String>,
    pub sort: SortSpec,
}

impl ExplorerState {
    pub fn initial(config: &DatasetConfig) -> Self {
        Self {
            query: String::new(),
            category: None,
            sort: config.default_sort.clone(),
        }
    }

    pub fn with_query(&self, text: &str) -> Self {
        Self {
            query: text.to_string(),
            ..self.clone()
        }
    }

    pub fn with_category(&self, value: Option<&str>) -> Self {
        Self {
            category: value.filter(|v| !v.is_empty()).map(str::to_string),
            ..self.clone()
        }
    }

    /// An explicit direction wins. Otherwise re-selecting the current key
    /// flips the direction and selecting a new key starts at that key's
    /// default. Keys that are not sortable leave the state as it is.
    pub fn with_sort(
        &self,
        config: &DatasetConfig,
        key: &str,
        direction: Option<SortDirection>,
    ) -> Self {
        let Some(field) = config.sortable_field(key) else {
            debug!("Ignoring sort on undeclared field \"{key}\"");
            return self.clone();
        };
        let direction = match direction {
            Some(d) => d,
            None if self.sort.key == key => self.sort.direction.toggled(),
            None => SortDirection::default_for(field.kind),
        };
        Self {
            sort: SortSpec::new(key, direction),
            ..self.clone()
        }
    }
}

/// Indices into the record array after filtering and sorting. Only the first
/// `limit` of them are exposed for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View {
    rows: Vec<usize>,
    limit: usize,
}

impl View {
    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    pub fn displayed_count(&self) -> usize {
        std::cmp::min(self.rows.len(), self.limit)
    }

    pub fn displayed(&self) -> &[usize] {
        &self.rows[..self.displayed_count()]
    }
}

enum SortKey {
    Number(f64),
    Text {
        base: String,
        lower: String,
        raw: String,
    },
}

/// Lower case with diacritics stripped, so `Élan` files under `e`.
fn base_letters(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

impl SortKey {
    fn read<R: Record>(record: &R, field: &FieldSpec) -> Self {
        match field.kind {
            FieldKind::Number => SortKey::Number(number_of(record, &field.name)),
            FieldKind::Text => {
                let raw = text_of(record, &field.name).into_owned();
                SortKey::Text {
                    base: base_letters(&raw),
                    lower: raw.to_lowercase(),
                    raw,
                }
            }
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            // Base letters first, then accents, then case. On a case tie lower
            // case sorts before upper case, which is the reverse of byte order.
            (
                SortKey::Text {
                    base: ba,
                    lower: la,
                    raw: ra,
                },
                SortKey::Text {
                    base: bb,
                    lower: lb,
                    raw: rb,
                },
            ) => ba
                .cmp(bb)
                .then_with(|| la.cmp(lb))
                .then_with(|| rb.cmp(ra)),
            (SortKey::Number(_), SortKey::Text { .. }) => Ordering::Less,
            (SortKey::Text { .. }, SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

fn matches<R: Record>(
    record: &R,
    config: &DatasetConfig,
    category: Option<&str>,
    needle: &str,
) -> bool {
    if let (Some(field), Some(wanted)) = (config.category_field.as_deref(), category)
        && text_of(record, field) != wanted
    {
        return false;
    }
    needle.is_empty()
        || config
            .search_fields
            .iter()
            .any(|f| text_of(record, f).to_lowercase().contains(needle))
}

/// Filter then stable-sort `records` according to `state`.
pub fn derive_view<R: Record>(
    records: &[R],
    config: &DatasetConfig,
    state: &ExplorerState,
) -> View {
    let needle = state.query.to_lowercase();
    let category = state.category.as_deref();

    let mut rows: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(*r, config, category, &needle))
        .map(|(idx, _)| idx)
        .collect();

    if let Some(field) = config.sortable_field(&state.sort.key) {
        let mut keyed: Vec<(SortKey, usize)> = rows
            .iter()
            .map(|&idx| (SortKey::read(&records[idx], field), idx))
            .collect();
        match state.sort.direction {
            SortDirection::Ascending => keyed.sort_by(|(a, _), (b, _)| a.compare(b)),
            SortDirection::Descending => keyed.sort_by(|(a, _), (b, _)| b.compare(a)),
        }
        rows = keyed.into_iter().map(|(_, idx)| idx).collect();
    }

    View {
        rows,
        limit: config.display_limit,
    }
}

pub struct Explorer<R> {
    records: Vec<R>,
    config: DatasetConfig,
    state: ExplorerState,
    view: View,
}

impl<R: Record> Explorer<R> {
    pub fn new(records: Vec<R>, config: DatasetConfig) -> Self {
        let state = ExplorerState::initial(&config);
        let view = derive_view(&records, &config, &state);
        debug!(
            "Explorer \"{}\" holds {} records, sorted by {:?}",
            config.title,
            records.len(),
            state.sort
        );
        Self {
            records,
            config,
            state,
            view,
        }
    }

    pub fn set_query(&mut self, text: &str) {
        let next = self.state.with_query(text);
        self.apply(next);
    }

    pub fn set_category_filter(&mut self, value: Option<&str>) {
        let next = self.state.with_category(value);
        self.apply(next);
    }

    pub fn set_sort(&mut self, key: &str, direction: Option<SortDirection>) {
        let next = self.state.with_sort(&self.config, key, direction);
        self.apply(next);
    }

    pub fn reset(&mut self) {
        let next = ExplorerState::initial(&self.config);
        self.apply(next);
    }

    fn apply(&mut self, state: ExplorerState) {
        self.view = derive_view(&self.records, &self.config, &state);
        trace!(
            "Applied {:?}: {} of {} records match",
            state,
            self.view.total_count(),
            self.records.len()
        );
        self.state = state;
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn state(&self) -> &ExplorerState {
        &self.state
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn total_count(&self) -> usize {
        self.view.total_count()
    }

    pub fn displayed_count(&self) -> usize {
        self.view.displayed_count()
    }

    pub fn displayed_records(&self) -> impl Iterator<Item = &R> {
        self.view.displayed().iter().map(|&idx| &self.records[idx])
    }

    /// Record at `row` of the displayed view.
    pub fn displayed_record(&self, row: usize) -> Option<&R> {
        self.view
            .displayed()
            .get(row)
            .map(|&idx| &self.records[idx])
    }

    /// Distinct category values among records matching the current query,
    /// most frequent first.
    pub fn category_values(&self) -> Vec<(String, usize)> {
        let Some(field) = self.config.category_field.as_deref() else {
            return Vec::new();
        };
        let needle = self.state.query.to_lowercase();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in self
            .records
            .iter()
            .filter(|r| matches(*r, &self.config, None, &needle))
        {
            let value = text_of(record, field);
            if !value.is_empty() {
                *counts.entry(value.into_owned()).or_insert(0) += 1;
            }
        }
        let mut values: Vec<(String, usize)> = counts.into_iter().collect();
        values.sort_by(|(_, a), (_, b)| b.cmp(a));
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;
    use pretty_assertions::assert_eq;
    use std::borrow::Cow;

    #[derive(Debug, Clone, PartialEq)]
    struct Payment {
        name: &'static str,
        state: &'static str,
        amount: f64,
    }

    impl Record for Payment {
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "name" => Some(FieldValue::Text(Cow::Borrowed(self.name))),
                "state" => Some(FieldValue::Text(Cow::Borrowed(self.state))),
                "amount" => Some(FieldValue::Number(self.amount)),
                _ => None,
            }
        }
    }

    fn payment(name: &'static str, state: &'static str, amount: f64) -> Payment {
        Payment {
            name,
            state,
            amount,
        }
    }

    fn config() -> DatasetConfig {
        DatasetConfig::new(
            "Payments",
            vec![
                FieldSpec::text("name"),
                FieldSpec::text("state"),
                FieldSpec::number("amount").with_format(CellFormat::Currency),
                FieldSpec::number("payments"),
            ],
        )
        .with_search_fields(vec!["name".to_string()])
        .with_category_field("state".to_string())
        .with_default_sort(SortSpec::new("name", SortDirection::Ascending))
    }

    fn records() -> Vec<Payment> {
        vec![
            payment("Acme LLC", "TX", 500000.0),
            payment("Baker Farms", "IA", 200000.0),
            payment("Cedar Co", "TX", 900000.0),
        ]
    }

    fn names<R: Record>(explorer: &Explorer<R>) -> Vec<String> {
        explorer
            .displayed_records()
            .map(|r| text_of(r, "name").into_owned())
            .collect()
    }

    #[test]
    fn sort_on_amount_defaults_to_descending() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_sort("amount", None);
        assert_eq!(explorer.state().sort.direction, SortDirection::Descending);
        assert_eq!(names(&explorer), vec!["Cedar Co", "Acme LLC", "Baker Farms"]);
    }

    #[test]
    fn sort_on_same_key_toggles_direction() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_sort("amount", None);
        explorer.set_sort("amount", None);
        assert_eq!(explorer.state().sort.direction, SortDirection::Ascending);
        assert_eq!(names(&explorer), vec!["Baker Farms", "Acme LLC", "Cedar Co"]);
    }

    #[test]
    fn sort_on_text_defaults_to_ascending() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_sort("amount", None);
        explorer.set_sort("name", None);
        assert_eq!(explorer.state().sort.direction, SortDirection::Ascending);
        assert_eq!(names(&explorer), vec!["Acme LLC", "Baker Farms", "Cedar Co"]);
    }

    #[test]
    fn explicit_direction_is_not_toggled() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_sort("amount", Some(SortDirection::Ascending));
        explorer.set_sort("amount", Some(SortDirection::Ascending));
        assert_eq!(names(&explorer), vec!["Baker Farms", "Acme LLC", "Cedar Co"]);
    }

    #[test]
    fn unknown_sort_key_keeps_state() {
        let mut explorer = Explorer::new(records(), config());
        let before = explorer.state().clone();
        explorer.set_sort("population", None);
        assert_eq!(explorer.state(), &before);
    }

    #[test]
    fn category_filter_restricts_to_exact_value() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_sort("amount", None);
        explorer.set_category_filter(Some("TX"));
        assert_eq!(names(&explorer), vec!["Cedar Co", "Acme LLC"]);
        assert_eq!(explorer.total_count(), 2);

        explorer.set_sort("name", None);
        assert_eq!(names(&explorer), vec!["Acme LLC", "Cedar Co"]);

        explorer.set_category_filter(Some("tx"));
        assert_eq!(explorer.total_count(), 0);

        explorer.set_category_filter(Some(""));
        assert_eq!(explorer.state().category, None);
        assert_eq!(explorer.total_count(), 3);
    }

    #[test]
    fn query_matches_case_insensitive_substring() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_query("bak");
        assert_eq!(names(&explorer), vec!["Baker Farms"]);
        assert_eq!(explorer.total_count(), 1);

        explorer.set_query("FARMS");
        assert_eq!(names(&explorer), vec!["Baker Farms"]);
    }

    #[test]
    fn query_without_matches_yields_empty_view() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_query("zzz-no-match");
        assert_eq!(explorer.total_count(), 0);
        assert_eq!(explorer.displayed_count(), 0);
        assert_eq!(explorer.displayed_records().count(), 0);

        explorer.set_query("");
        assert_eq!(explorer.total_count(), 3);
    }

    #[test]
    fn query_and_category_combine() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_query("co");
        explorer.set_category_filter(Some("TX"));
        assert_eq!(names(&explorer), vec!["Cedar Co"]);
    }

    #[test]
    fn view_is_a_subsequence_of_records() {
        let recs = records();
        let mut explorer = Explorer::new(recs.clone(), config());
        explorer.set_sort("amount", None);
        explorer.set_query("a");
        let mut seen = explorer.view().displayed().to_vec();
        assert!(seen.iter().all(|&idx| idx < recs.len()));
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), explorer.displayed_count());
        assert_eq!(explorer.records(), recs.as_slice());
    }

    #[test]
    fn applying_the_same_state_twice_is_idempotent() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_query("a");
        explorer.set_category_filter(Some("TX"));
        let once = explorer.view().clone();
        explorer.set_query("a");
        explorer.set_category_filter(Some("TX"));
        assert_eq!(explorer.view(), &once);
    }

    #[test]
    fn equal_keys_keep_input_order_in_both_directions() {
        let recs = vec![
            payment("First", "TX", 100.0),
            payment("Second", "IA", 300.0),
            payment("Third", "TX", 100.0),
            payment("Fourth", "NE", 100.0),
        ];
        let mut explorer = Explorer::new(recs, config());
        explorer.set_sort("amount", Some(SortDirection::Ascending));
        assert_eq!(names(&explorer), vec!["First", "Third", "Fourth", "Second"]);
        explorer.set_sort("amount", Some(SortDirection::Descending));
        assert_eq!(names(&explorer), vec!["Second", "First", "Third", "Fourth"]);
    }

    #[test]
    fn text_sort_ignores_case_first() {
        let recs = vec![
            payment("beta", "TX", 0.0),
            payment("Alpha", "TX", 0.0),
            payment("ALPHA", "TX", 0.0),
            payment("alpha", "TX", 0.0),
        ];
        let explorer = Explorer::new(recs, config());
        assert_eq!(names(&explorer), vec!["alpha", "Alpha", "ALPHA", "beta"]);
    }

    #[test]
    fn signed_zero_ties_with_zero() {
        let recs = vec![
            payment("A", "TX", 0.0),
            payment("B", "TX", -0.0),
            payment("C", "TX", 0.0),
        ];
        let mut explorer = Explorer::new(recs, config());
        explorer.set_sort("amount", Some(SortDirection::Ascending));
        assert_eq!(names(&explorer), vec!["A", "B", "C"]);
        explorer.set_sort("amount", Some(SortDirection::Descending));
        assert_eq!(names(&explorer), vec!["A", "B", "C"]);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let recs = vec![
            payment("Zephyr Farms", "TX", 0.0),
            payment("Élan Farms", "TX", 0.0),
            payment("Eagle Farms", "TX", 0.0),
            payment("Fox Farms", "TX", 0.0),
            payment("elan farms", "TX", 0.0),
        ];
        let explorer = Explorer::new(recs, config());
        assert_eq!(
            names(&explorer),
            vec![
                "Eagle Farms",
                "elan farms",
                "Élan Farms",
                "Fox Farms",
                "Zephyr Farms"
            ]
        );
    }

    #[test]
    fn missing_sort_field_sorts_as_zero() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_sort("payments", None);
        assert_eq!(names(&explorer), vec!["Acme LLC", "Baker Farms", "Cedar Co"]);
    }

    #[test]
    fn truncation_does_not_change_total() {
        let recs: Vec<Payment> = (0..450)
            .map(|i| payment("Grower", "IA", i as f64))
            .collect();
        let mut explorer = Explorer::new(recs, config());
        assert_eq!(explorer.total_count(), 450);
        assert_eq!(explorer.displayed_count(), DEFAULT_DISPLAY_LIMIT);
        assert_eq!(explorer.view().displayed().len(), DEFAULT_DISPLAY_LIMIT);

        explorer.set_sort("amount", None);
        let top = explorer.displayed_record(0).map(|r| r.amount);
        assert_eq!(top, Some(449.0));

        let mut small = Explorer::new(records(), config().with_display_limit(2));
        assert_eq!(small.displayed_count(), 2);
        assert_eq!(small.total_count(), 3);
        small.set_query("bak");
        assert_eq!(small.displayed_count(), 1);
        assert_eq!(small.total_count(), 1);
    }

    #[test]
    fn category_values_follow_query_and_ignore_category() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_category_filter(Some("IA"));
        assert_eq!(
            explorer.category_values(),
            vec![("TX".to_string(), 2), ("IA".to_string(), 1)]
        );
        explorer.set_query("bak");
        assert_eq!(explorer.category_values(), vec![("IA".to_string(), 1)]);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut explorer = Explorer::new(records(), config());
        explorer.set_query("bak");
        explorer.set_category_filter(Some("IA"));
        explorer.set_sort("amount", None);
        explorer.reset();
        assert_eq!(explorer.state(), &ExplorerState::initial(explorer.config()));
        assert_eq!(explorer.total_count(), 3);
    }
}
