use std::borrow::Cow;

/// A single field value as read from a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// Uniform field access over a record shape.
///
/// Implementors return `None` for fields they do not carry. Callers never see
/// the `None`: [`text_of`] and [`number_of`] resolve it to the zero value of the
/// requested kind, so a missing field can never fail a filter or a sort.
pub trait Record {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

pub fn text_of<'a, R: Record + ?Sized>(record: &'a R, name: &str) -> Cow<'a, str> {
    match record.field(name) {
        Some(FieldValue::Text(s)) => s,
        Some(FieldValue::Number(n)) => Cow::Owned(finite(n).to_string()),
        None => Cow::Borrowed(""),
    }
}

pub fn number_of<R: Record + ?Sized>(record: &R, name: &str) -> f64 {
    match record.field(name) {
        Some(FieldValue::Number(n)) => finite(n),
        Some(FieldValue::Text(s)) => s.trim().parse::<f64>().map(finite).unwrap_or(0.0),
        None => 0.0,
    }
}

/// Non-finite values read as `0`, and `-0` reads as `0` so it ties with it.
pub fn finite(n: f64) -> f64 {
    if n.is_finite() { n + 0.0 } else { 0.0 }
}
