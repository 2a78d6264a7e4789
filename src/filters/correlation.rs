//! # Correlation filter rules and their evaluation.
//!
//! A [`CorrelationFilter`] is a predicate on one application property:
//! the named property must be present on the message and equal the expected
//! value (exact string equality, no coercion).

use crate::message::Message;

/// One correlation rule of a subscription's filter set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationFilter {
    /// Name of the application property to inspect.
    pub property: String,
    /// Expected property value (exact match).
    pub value: String,
    /// System filters carry broker-internal metadata (e.g. scheduled-enqueue
    /// bookkeeping) and are skipped during evaluation.
    pub system: bool,
}

impl CorrelationFilter {
    /// Creates a user-level correlation filter.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            system: false,
        }
    }

    /// Creates a system filter (inert during evaluation).
    pub fn system(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: true,
            ..Self::new(property, value)
        }
    }

    /// Returns true if the message satisfies this single rule.
    fn accepts(&self, message: &Message) -> bool {
        message.property(&self.property) == Some(self.value.as_str())
    }
}

/// Evaluates a message against a subscription's filter set.
///
/// Returns true when the message must be offered to consumers:
/// - the set is empty, or
/// - every non-system filter matches an application property on the message.
///
/// A missing property counts as a mismatch and rejects the message as a
/// whole (short-circuit, no partial delivery).
///
/// ## Example
/// ```
/// use bytes::Bytes;
/// use subflow::{filters, CorrelationFilter, Message};
///
/// let set = vec![CorrelationFilter::new("region", "eu")];
/// let msg = Message::new(1, Bytes::new()).with_property("region", "eu");
/// assert!(filters::matches(&msg, &set));
/// ```
pub fn matches(message: &Message, filters: &[CorrelationFilter]) -> bool {
    filters
        .iter()
        .filter(|f| !f.system)
        .all(|f| f.accepts(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn msg(props: &[(&str, &str)]) -> Message {
        props
            .iter()
            .fold(Message::new(1, Bytes::new()), |m, (k, v)| {
                m.with_property(*k, *v)
            })
    }

    #[test]
    fn test_empty_set_matches_everything() {
        assert!(matches(&msg(&[]), &[]));
        assert!(matches(&msg(&[("any", "thing")]), &[]));
    }

    #[test]
    fn test_single_filter_match() {
        let set = vec![CorrelationFilter::new("region", "eu")];
        assert!(matches(&msg(&[("region", "eu")]), &set));
    }

    #[test]
    fn test_value_mismatch_rejects() {
        let set = vec![CorrelationFilter::new("region", "eu")];
        assert!(!matches(&msg(&[("region", "us")]), &set));
    }

    #[test]
    fn test_missing_property_rejects() {
        let set = vec![CorrelationFilter::new("region", "eu")];
        assert!(!matches(&msg(&[("tenant", "acme")]), &set));
    }

    #[test]
    fn test_all_filters_must_match() {
        let set = vec![
            CorrelationFilter::new("region", "eu"),
            CorrelationFilter::new("tenant", "acme"),
        ];
        assert!(matches(&msg(&[("region", "eu"), ("tenant", "acme")]), &set));
        assert!(!matches(&msg(&[("region", "eu")]), &set));
        assert!(!matches(
            &msg(&[("region", "eu"), ("tenant", "other")]),
            &set
        ));
    }

    #[test]
    fn test_system_filters_are_inert() {
        // A system filter never blocks, whether its property is absent,
        // mismatched, or matching.
        let set = vec![
            CorrelationFilter::system("x-scheduled-at", "2030-01-01"),
            CorrelationFilter::new("region", "eu"),
        ];
        assert!(matches(&msg(&[("region", "eu")]), &set));
        assert!(matches(
            &msg(&[("region", "eu"), ("x-scheduled-at", "never")]),
            &set
        ));

        let only_system = vec![CorrelationFilter::system("x-internal", "1")];
        assert!(matches(&msg(&[]), &only_system));
    }

    #[test]
    fn test_exact_string_equality_no_coercion() {
        let set = vec![CorrelationFilter::new("count", "10")];
        assert!(!matches(&msg(&[("count", "010")]), &set));
        assert!(!matches(&msg(&[("count", "10 ")]), &set));
    }
}
