//! Term store: interning of names and typed literals
//!
//! Every constant the reasoner touches (class names, role names,
//! individuals, literals) is interned to a dense 32-bit [`TermId`]. Named
//! terms and literals share the integer range but live in separate id
//! spaces, distinguished by the high bit. Interning is monotonic: ids are
//! never recycled within a reasoner lifetime, and byte-equal inputs always
//! return the same id.
//!
//! ## Features
//!
//! - **Lock-free interning**: concurrent `intern_*` calls go through
//!   `DashMap`; the id-to-term tables are append-only under an `RwLock`
//! - **Literal canonicalisation**: `"1.0"` and `"1.00"` decimal literals
//!   collapse to the same [`TermId`]; dateTimes canonicalise via RFC 3339
//! - **Typed comparison**: [`TermStore::cmp_literal`] compares parsed
//!   values under their datatype and returns `None` for incomparable pairs
//!   instead of erroring

use crate::constants::{owl, rdf, rdfs, xsd};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

const LITERAL_BIT: u32 = 0x8000_0000;

/// Dense identifier for an interned term
///
/// Named terms and literals share the `u32` range; the high bit marks the
/// literal id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TermId(u32);

impl TermId {
    /// Sentinel used for unbound variable slots in binding tuples; never
    /// returned by interning
    pub(crate) const UNBOUND: TermId = TermId(u32::MAX);

    pub(crate) const fn from_raw(raw: u32) -> Self {
        TermId(raw)
    }

    pub(crate) const fn literal_from_index(index: u32) -> Self {
        TermId(index | LITERAL_BIT)
    }

    /// True when the id belongs to the literal id space
    pub fn is_literal_id(self) -> bool {
        self.0 & LITERAL_BIT != 0
    }

    /// Raw value, mostly useful for debug output
    pub fn raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        (self.0 & !LITERAL_BIT) as usize
    }
}

/// Reserved term ids, pinned by the fixed interning order in
/// [`TermStore::new`]
pub mod reserved {
    use super::TermId;

    /// `rdf:type`
    pub const RDF_TYPE: TermId = TermId::from_raw(0);
    /// `owl:Thing`
    pub const THING: TermId = TermId::from_raw(1);
    /// `owl:Nothing`
    pub const NOTHING: TermId = TermId::from_raw(2);
    /// `owl:sameAs`
    pub const SAME_AS: TermId = TermId::from_raw(3);
    /// `owl:differentFrom`
    pub const DIFFERENT_FROM: TermId = TermId::from_raw(4);
    /// `rdfs:subClassOf`
    pub const SUB_CLASS_OF: TermId = TermId::from_raw(5);
    /// `rdfs:subPropertyOf`
    pub const SUB_PROPERTY_OF: TermId = TermId::from_raw(6);

    /// Number of reserved named terms
    pub const COUNT: u32 = 7;
}

/// Datatype discriminator carried by every literal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DatatypeTag {
    Integer,
    Decimal,
    Double,
    Boolean,
    String,
    DateTime,
    Duration,
    /// Unrecognised datatype IRI; the literal is treated as an opaque string
    Other(Arc<str>),
}

impl DatatypeTag {
    fn from_iri(iri: &str) -> Self {
        match iri {
            xsd::INTEGER | xsd::INT | xsd::LONG => DatatypeTag::Integer,
            xsd::DECIMAL => DatatypeTag::Decimal,
            xsd::DOUBLE | xsd::FLOAT => DatatypeTag::Double,
            xsd::BOOLEAN => DatatypeTag::Boolean,
            xsd::STRING => DatatypeTag::String,
            xsd::DATE_TIME => DatatypeTag::DateTime,
            xsd::DURATION => DatatypeTag::Duration,
            other => DatatypeTag::Other(Arc::from(other)),
        }
    }
}

/// Parsed value of a literal; comparison happens on this, not the lexical form
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    /// Arbitrary-precision decimal as `unscaled * 10^-scale`, trailing zeros
    /// stripped so the representation is canonical
    Decimal { unscaled: i128, scale: u32 },
    Double(f64),
    Boolean(bool),
    Text(Arc<str>),
    DateTime(DateTime<FixedOffset>),
    /// Day-time duration in milliseconds
    Duration(i64),
    /// Malformed or unknown-datatype content kept as its lexical form
    Opaque,
}

/// A typed literal: canonical lexical form, datatype tag, parsed value
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    lexical: Arc<str>,
    datatype: DatatypeTag,
    value: LiteralValue,
}

impl Literal {
    /// Canonical lexical form
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// Datatype tag
    pub fn datatype(&self) -> &DatatypeTag {
        &self.datatype
    }

    /// Parsed value
    pub fn value(&self) -> &LiteralValue {
        &self.value
    }
}

/// An interned term: a named IRI or a typed literal
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Named(Arc<str>),
    Literal(Literal),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Named(iri) => write!(f, "{}", iri),
            Term::Literal(lit) => write!(f, "\"{}\"", lit.lexical()),
        }
    }
}

/// Interning store for names and literals
///
/// Owned by a single reasoner instance; a process may hold many independent
/// stores.
#[derive(Debug)]
pub struct TermStore {
    name_ids: DashMap<Arc<str>, TermId>,
    literal_ids: DashMap<(Arc<str>, DatatypeTag), TermId>,
    names: RwLock<Vec<Arc<str>>>,
    literals: RwLock<Vec<Literal>>,
}

impl Default for TermStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TermStore {
    /// Create a store with the reserved vocabulary pre-interned
    pub fn new() -> Self {
        let store = TermStore {
            name_ids: DashMap::new(),
            literal_ids: DashMap::new(),
            names: RwLock::new(Vec::new()),
            literals: RwLock::new(Vec::new()),
        };
        // Fixed order pins the ids in `reserved`.
        let bootstrap = [
            rdf::TYPE,
            owl::THING,
            owl::NOTHING,
            owl::SAME_AS,
            owl::DIFFERENT_FROM,
            rdfs::SUB_CLASS_OF,
            rdfs::SUB_PROPERTY_OF,
        ];
        for iri in bootstrap {
            store.intern_name(iri);
        }
        debug_assert_eq!(store.names.read().len() as u32, reserved::COUNT);
        store
    }

    /// Intern a named term, returning its stable id
    pub fn intern_name(&self, text: &str) -> TermId {
        if let Some(existing) = self.name_ids.get(text) {
            return *existing;
        }
        let key: Arc<str> = Arc::from(text);
        match self.name_ids.entry(Arc::clone(&key)) {
            dashmap::mapref::entry::Entry::Occupied(entry) => *entry.get(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let mut table = self.names.write();
                let id = TermId::from_raw(table.len() as u32);
                table.push(key);
                *entry.insert(id)
            }
        }
    }

    /// Intern a literal under an optional datatype IRI
    ///
    /// The lexical form is canonicalised first, so `"1.0"^^xsd:decimal` and
    /// `"1.00"^^xsd:decimal` intern to the same id. Unknown datatypes are
    /// kept as opaque strings rather than rejected.
    pub fn intern_literal(&self, lexical: &str, datatype: Option<&str>) -> TermId {
        let tag = datatype
            .map(DatatypeTag::from_iri)
            .unwrap_or(DatatypeTag::String);
        let (canonical, value) = canonicalize(lexical, &tag);
        let key = (canonical, tag.clone());
        if let Some(existing) = self.literal_ids.get(&key) {
            return *existing;
        }
        match self.literal_ids.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => *entry.get(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let mut table = self.literals.write();
                let id = TermId::literal_from_index(table.len() as u32);
                table.push(Literal {
                    lexical: key.0,
                    datatype: tag,
                    value,
                });
                *entry.insert(id)
            }
        }
    }

    /// Look up a named term without interning it
    pub fn peek_name(&self, text: &str) -> Option<TermId> {
        self.name_ids.get(text).map(|r| *r)
    }

    /// Look up a literal without interning it
    pub fn peek_literal(&self, lexical: &str, datatype: Option<&str>) -> Option<TermId> {
        let tag = datatype
            .map(DatatypeTag::from_iri)
            .unwrap_or(DatatypeTag::String);
        let (canonical, _) = canonicalize(lexical, &tag);
        self.literal_ids.get(&(canonical, tag)).map(|r| *r)
    }

    /// Resolve an id back to its term
    pub fn lookup(&self, id: TermId) -> Option<Term> {
        if id.is_literal_id() {
            self.literals
                .read()
                .get(id.index())
                .cloned()
                .map(Term::Literal)
        } else {
            self.names.read().get(id.index()).cloned().map(Term::Named)
        }
    }

    /// True when the id denotes a literal
    pub fn is_literal(&self, id: TermId) -> bool {
        id.is_literal_id()
    }

    /// Number of interned terms (names plus literals)
    pub fn len(&self) -> usize {
        self.names.read().len() + self.literals.read().len()
    }

    /// True when only the reserved vocabulary is interned
    pub fn is_empty(&self) -> bool {
        self.len() == reserved::COUNT as usize
    }

    /// Parsed value of a literal id, if it is one
    pub fn literal_value(&self, id: TermId) -> Option<LiteralValue> {
        if !id.is_literal_id() {
            return None;
        }
        self.literals.read().get(id.index()).map(|l| l.value.clone())
    }

    /// Compare two literals by parsed value under their datatypes
    ///
    /// Returns `None` when the pair is incomparable (mixed value spaces,
    /// opaque content, NaN). Numeric datatypes compare by magnitude across
    /// integer/decimal/double tags.
    pub fn cmp_literal(&self, a: TermId, b: TermId) -> Option<Ordering> {
        let va = self.literal_value(a)?;
        let vb = self.literal_value(b)?;
        cmp_values(&va, &vb)
    }

    /// Total, deterministic order over arbitrary terms for ORDER BY
    ///
    /// Named terms sort before literals; named terms compare by IRI,
    /// literals by value where comparable and by lexical form otherwise.
    pub fn compare_terms(&self, a: TermId, b: TermId) -> Ordering {
        match (a.is_literal_id(), b.is_literal_id()) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, false) => {
                let names = self.names.read();
                let sa = names.get(a.index()).cloned();
                let sb = names.get(b.index()).cloned();
                sa.cmp(&sb)
            }
            (true, true) => match self.cmp_literal(a, b) {
                Some(ord) if ord != Ordering::Equal => ord,
                _ => {
                    let lits = self.literals.read();
                    let la = lits.get(a.index()).map(|l| l.lexical.clone());
                    let lb = lits.get(b.index()).map(|l| l.lexical.clone());
                    la.cmp(&lb)
                }
            },
        }
    }

    /// Human-readable rendering for tables and diagnostics
    pub fn render(&self, id: TermId) -> String {
        match self.lookup(id) {
            Some(term) => term.to_string(),
            None => format!("?unknown:{}", id.raw()),
        }
    }
}

/// Canonicalise a lexical form under a datatype tag
///
/// Malformed content for a known datatype degrades to an opaque literal
/// keyed by its original lexical form; this mirrors SPARQL's treatment of
/// ill-typed literals as plain values that simply fail typed operations.
fn canonicalize(lexical: &str, tag: &DatatypeTag) -> (Arc<str>, LiteralValue) {
    let trimmed = lexical.trim();
    match tag {
        DatatypeTag::Integer => match trimmed.strip_prefix('+').unwrap_or(trimmed).parse::<i64>() {
            Ok(v) => (Arc::from(v.to_string().as_str()), LiteralValue::Integer(v)),
            Err(_) => (Arc::from(lexical), LiteralValue::Opaque),
        },
        DatatypeTag::Decimal => match parse_decimal(trimmed) {
            Some((unscaled, scale)) => (
                Arc::from(format_decimal(unscaled, scale).as_str()),
                LiteralValue::Decimal { unscaled, scale },
            ),
            None => (Arc::from(lexical), LiteralValue::Opaque),
        },
        DatatypeTag::Double => match trimmed.parse::<f64>() {
            Ok(v) => (Arc::from(format!("{}", v).as_str()), LiteralValue::Double(v)),
            Err(_) => (Arc::from(lexical), LiteralValue::Opaque),
        },
        DatatypeTag::Boolean => match trimmed {
            "true" | "1" => (Arc::from("true"), LiteralValue::Boolean(true)),
            "false" | "0" => (Arc::from("false"), LiteralValue::Boolean(false)),
            _ => (Arc::from(lexical), LiteralValue::Opaque),
        },
        DatatypeTag::String => {
            let text: Arc<str> = Arc::from(lexical);
            (Arc::clone(&text), LiteralValue::Text(text))
        }
        DatatypeTag::DateTime => match DateTime::parse_from_rfc3339(trimmed) {
            Ok(dt) => (
                Arc::from(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true).as_str()),
                LiteralValue::DateTime(dt),
            ),
            Err(_) => (Arc::from(lexical), LiteralValue::Opaque),
        },
        DatatypeTag::Duration => match parse_day_time_duration(trimmed) {
            Some(millis) => (
                Arc::from(format_duration(millis).as_str()),
                LiteralValue::Duration(millis),
            ),
            None => (Arc::from(lexical), LiteralValue::Opaque),
        },
        DatatypeTag::Other(_) => (Arc::from(lexical), LiteralValue::Opaque),
    }
}

/// Parse an `xsd:decimal` lexical form into `(unscaled, scale)` with
/// trailing fraction zeros stripped
fn parse_decimal(text: &str) -> Option<(i128, u32)> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let frac_trimmed = frac_part.trim_end_matches('0');
    let mut unscaled: i128 = 0;
    for c in int_part.chars().chain(frac_trimmed.chars()) {
        unscaled = unscaled.checked_mul(10)?;
        unscaled = unscaled.checked_add((c as u8 - b'0') as i128)?;
    }
    if negative {
        unscaled = -unscaled;
    }
    Some((unscaled, frac_trimmed.len() as u32))
}

fn format_decimal(unscaled: i128, scale: u32) -> String {
    if scale == 0 {
        return unscaled.to_string();
    }
    let negative = unscaled < 0;
    let digits = unscaled.unsigned_abs().to_string();
    let scale = scale as usize;
    let (int_part, frac_part) = if digits.len() > scale {
        let split = digits.len() - scale;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = scale))
    };
    if negative {
        format!("-{}.{}", int_part, frac_part)
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Parse the day-time subset of `xsd:duration` (`-PnDTnHnMn.nS`) to
/// milliseconds; forms with year or month components are not totally
/// ordered and come back as `None`
fn parse_day_time_duration(text: &str) -> Option<i64> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let rest = rest.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };
    if date_part.contains('Y') || date_part.contains('M') {
        return None;
    }
    let mut millis: i64 = 0;
    let mut date_rest = date_part;
    if let Some(pos) = date_rest.find('D') {
        let days: i64 = date_rest[..pos].parse().ok()?;
        millis = millis.checked_add(days.checked_mul(86_400_000)?)?;
        date_rest = &date_rest[pos + 1..];
    }
    if !date_rest.is_empty() {
        return None;
    }
    if let Some(mut time_rest) = time_part {
        if let Some(pos) = time_rest.find('H') {
            let hours: i64 = time_rest[..pos].parse().ok()?;
            millis = millis.checked_add(hours.checked_mul(3_600_000)?)?;
            time_rest = &time_rest[pos + 1..];
        }
        if let Some(pos) = time_rest.find('M') {
            let minutes: i64 = time_rest[..pos].parse().ok()?;
            millis = millis.checked_add(minutes.checked_mul(60_000)?)?;
            time_rest = &time_rest[pos + 1..];
        }
        if let Some(pos) = time_rest.find('S') {
            let seconds: f64 = time_rest[..pos].parse().ok()?;
            millis = millis.checked_add((seconds * 1000.0).round() as i64)?;
            time_rest = &time_rest[pos + 1..];
        }
        if !time_rest.is_empty() {
            return None;
        }
    }
    Some(if negative { -millis } else { millis })
}

fn format_duration(millis: i64) -> String {
    let sign = if millis < 0 { "-" } else { "" };
    let abs = millis.unsigned_abs();
    let secs = abs / 1000;
    let frac = abs % 1000;
    if frac == 0 {
        format!("{}PT{}S", sign, secs)
    } else {
        format!("{}PT{}.{:03}S", sign, secs, frac)
    }
}

fn cmp_values(a: &LiteralValue, b: &LiteralValue) -> Option<Ordering> {
    use LiteralValue::*;
    match (a, b) {
        (Integer(x), Integer(y)) => Some(x.cmp(y)),
        (Boolean(x), Boolean(y)) => Some(x.cmp(y)),
        (Text(x), Text(y)) => Some(x.cmp(y)),
        (DateTime(x), DateTime(y)) => Some(x.cmp(y)),
        (Duration(x), Duration(y)) => Some(x.cmp(y)),
        (Decimal { unscaled: ua, scale: sa }, Decimal { unscaled: ub, scale: sb }) => {
            cmp_decimals(*ua, *sa, *ub, *sb)
        }
        _ => {
            let x = numeric_magnitude(a)?;
            let y = numeric_magnitude(b)?;
            x.partial_cmp(&y)
        }
    }
}

/// Compare two decimals exactly where the aligned mantissas fit in `i128`,
/// falling back to floating point otherwise
fn cmp_decimals(ua: i128, sa: u32, ub: i128, sb: u32) -> Option<Ordering> {
    let (lo, hi) = if sa <= sb { (ua, ub) } else { (ub, ua) };
    let shift = sa.abs_diff(sb);
    if let Some(factor) = 10i128.checked_pow(shift) {
        if let Some(scaled) = lo.checked_mul(factor) {
            return Some(if sa <= sb {
                scaled.cmp(&hi)
            } else {
                hi.cmp(&scaled)
            });
        }
    }
    let fa = ua as f64 / 10f64.powi(sa as i32);
    let fb = ub as f64 / 10f64.powi(sb as i32);
    fa.partial_cmp(&fb)
}

fn numeric_magnitude(v: &LiteralValue) -> Option<f64> {
    match v {
        LiteralValue::Integer(x) => Some(*x as f64),
        LiteralValue::Decimal { unscaled, scale } => {
            Some(*unscaled as f64 / 10f64.powi(*scale as i32))
        }
        LiteralValue::Double(x) if !x.is_nan() => Some(*x),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_deterministic() {
        let store = TermStore::new();
        let a = store.intern_name("http://example.org/Person");
        let b = store.intern_name("http://example.org/Person");
        assert_eq!(a, b);
        assert!(!a.is_literal_id());

        let c = store.intern_name("http://example.org/Animal");
        assert_ne!(a, c);
    }

    #[test]
    fn test_reserved_ids_are_stable() {
        let store = TermStore::new();
        assert_eq!(store.intern_name(rdf::TYPE), reserved::RDF_TYPE);
        assert_eq!(store.intern_name(owl::THING), reserved::THING);
        assert_eq!(store.intern_name(owl::NOTHING), reserved::NOTHING);
        assert_eq!(store.intern_name(owl::SAME_AS), reserved::SAME_AS);
        assert_eq!(
            store.intern_name(rdfs::SUB_CLASS_OF),
            reserved::SUB_CLASS_OF
        );
    }

    #[test]
    fn test_decimal_literals_collapse() {
        let store = TermStore::new();
        let a = store.intern_literal("1.0", Some(xsd::DECIMAL));
        let b = store.intern_literal("1.00", Some(xsd::DECIMAL));
        let c = store.intern_literal("1.5", Some(xsd::DECIMAL));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_literal_id());
    }

    #[test]
    fn test_integer_sign_normalisation() {
        let store = TermStore::new();
        let a = store.intern_literal("+5", Some(xsd::INTEGER));
        let b = store.intern_literal("5", Some(xsd::INTEGER));
        assert_eq!(a, b);
    }

    #[test]
    fn test_numeric_comparison_across_datatypes() {
        let store = TermStore::new();
        let int17 = store.intern_literal("17", Some(xsd::INTEGER));
        let int18 = store.intern_literal("18", Some(xsd::INTEGER));
        let dec175 = store.intern_literal("17.5", Some(xsd::DECIMAL));
        let dbl18 = store.intern_literal("18.0", Some(xsd::DOUBLE));

        assert_eq!(store.cmp_literal(int17, int18), Some(Ordering::Less));
        assert_eq!(store.cmp_literal(int17, dec175), Some(Ordering::Less));
        assert_eq!(store.cmp_literal(dec175, int18), Some(Ordering::Less));
        assert_eq!(store.cmp_literal(int18, dbl18), Some(Ordering::Equal));
    }

    #[test]
    fn test_incomparable_pairs_do_not_error() {
        let store = TermStore::new();
        let n = store.intern_literal("17", Some(xsd::INTEGER));
        let s = store.intern_literal("seventeen", None);
        assert_eq!(store.cmp_literal(n, s), None);

        let named = store.intern_name("http://example.org/x");
        assert_eq!(store.cmp_literal(n, named), None);
    }

    #[test]
    fn test_unknown_datatype_is_opaque_string() {
        let store = TermStore::new();
        let a = store.intern_literal("blob", Some("http://example.org/dt#Custom"));
        let b = store.intern_literal("blob", Some("http://example.org/dt#Custom"));
        let c = store.intern_literal("blob", Some("http://example.org/dt#Different"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.cmp_literal(a, c), None);
    }

    #[test]
    fn test_datetime_canonical_form() {
        let store = TermStore::new();
        let a = store.intern_literal("2024-01-01T10:00:00+00:00", Some(xsd::DATE_TIME));
        let b = store.intern_literal("2024-01-01T10:00:00Z", Some(xsd::DATE_TIME));
        assert_eq!(a, b);

        let later = store.intern_literal("2024-06-01T10:00:00Z", Some(xsd::DATE_TIME));
        assert_eq!(store.cmp_literal(a, later), Some(Ordering::Less));
    }

    #[test]
    fn test_duration_parsing_and_order() {
        let store = TermStore::new();
        let short = store.intern_literal("PT90S", Some(xsd::DURATION));
        let same = store.intern_literal("PT1M30S", Some(xsd::DURATION));
        let long = store.intern_literal("P1DT0H", Some(xsd::DURATION));
        assert_eq!(short, same);
        assert_eq!(store.cmp_literal(short, long), Some(Ordering::Less));
    }

    #[test]
    fn test_peek_does_not_intern() {
        let store = TermStore::new();
        assert!(store.peek_name("http://example.org/missing").is_none());
        let len_before = store.len();
        let _ = store.peek_literal("42", Some(xsd::INTEGER));
        assert_eq!(store.len(), len_before);

        let id = store.intern_name("http://example.org/present");
        assert_eq!(store.peek_name("http://example.org/present"), Some(id));
    }

    #[test]
    fn test_lookup_round_trip() {
        let store = TermStore::new();
        let id = store.intern_name("http://example.org/Person");
        match store.lookup(id) {
            Some(Term::Named(iri)) => assert_eq!(&*iri, "http://example.org/Person"),
            other => panic!("unexpected term: {:?}", other),
        }

        let lit = store.intern_literal("42", Some(xsd::INTEGER));
        match store.lookup(lit) {
            Some(Term::Literal(l)) => {
                assert_eq!(l.lexical(), "42");
                assert_eq!(l.value(), &LiteralValue::Integer(42));
            }
            other => panic!("unexpected term: {:?}", other),
        }
    }

    #[test]
    fn test_term_total_order() {
        let store = TermStore::new();
        let name = store.intern_name("http://example.org/a");
        let lit = store.intern_literal("1", Some(xsd::INTEGER));
        assert_eq!(store.compare_terms(name, lit), Ordering::Less);
        assert_eq!(store.compare_terms(name, name), Ordering::Equal);
    }
}
