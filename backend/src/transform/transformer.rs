//! Row transformer - feed rows + reference rows + rules -> report rows.
//!
//! Feed row `i` is paired with reference row `i`. When the reference
//! sequence is shorter, the remaining feed rows are paired with an empty
//! row, so every `refdata*` variable reads as `0`. Exactly one
//! [`TransformedRow`] is produced per feed row, in feed order.

use crate::config::RuleSet;
use crate::models::{FieldValue, OutputField, Row, RowPair, TransformedRow};

use super::expression::evaluate;

/// Transform every feed row.
pub fn transform(feed_rows: &[Row], reference_rows: &[Row], rules: &RuleSet) -> Vec<TransformedRow> {
    pair_rows(feed_rows, reference_rows)
        .map(|pair| transform_pair(pair, rules))
        .collect()
}

/// Pair each feed row with the reference row at the same position.
pub fn pair_rows<'a>(
    feed_rows: &'a [Row],
    reference_rows: &'a [Row],
) -> impl Iterator<Item = RowPair<'a>> + 'a {
    static EMPTY: Row = Row::EMPTY;

    feed_rows.iter().enumerate().map(move |(i, feed)| {
        let reference = reference_rows.get(i).unwrap_or(&EMPTY);
        RowPair::new(feed, reference)
    })
}

/// Evaluate every output field for one row pair.
///
/// A field without a rule gets the error marker.
pub fn transform_pair(pair: RowPair<'_>, rules: &RuleSet) -> TransformedRow {
    let values = OutputField::ALL.map(|field| match rules.expression(field) {
        Ok(expression) => evaluate(expression, pair.feed, pair.reference),
        Err(_) => FieldValue::Error,
    });
    TransformedRow::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    fn rules(pairs: &[(OutputField, &str)]) -> RuleSet {
        RuleSet::new(pairs.iter().copied())
    }

    #[test]
    fn test_end_to_end_row() {
        let feed = vec![row(&[("field1", "10"), ("field2", "3")])];
        let reference = vec![row(&[("refdata1", "2")])];
        let rules = rules(&[
            (OutputField::Outfield1, "field1+field2"),
            (OutputField::Outfield2, "max(field1, refdata1)"),
        ]);

        let out = transform(&feed, &reference, &rules);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get(OutputField::Outfield1).to_string(), "13.0");
        assert_eq!(out[0].get(OutputField::Outfield2).to_string(), "10.0");
        assert_eq!(out[0].get(OutputField::Outfield3), FieldValue::Error);
    }

    #[test]
    fn test_row_count_matches_feed() {
        let rules = rules(&[(OutputField::Outfield1, "field1")]);
        let feed: Vec<Row> = (0..5).map(|i| row(&[("field1", i.to_string().as_str())])).collect();
        let reference: Vec<Row> = (0..2).map(|_| row(&[("refdata1", "1")])).collect();
        let long_reference: Vec<Row> = (0..9).map(|_| Row::empty()).collect();

        assert_eq!(transform(&feed, &reference, &rules).len(), 5);
        assert_eq!(transform(&feed, &[], &rules).len(), 5);
        assert_eq!(transform(&feed, &long_reference, &rules).len(), 5);
        assert!(transform(&[], &reference, &rules).is_empty());
    }

    #[test]
    fn test_short_reference_falls_back_to_zero() {
        let feed = vec![row(&[("field1", "1")]), row(&[("field1", "2")])];
        let reference = vec![row(&[("refdata1", "100")])];
        let rules = rules(&[(OutputField::Outfield1, "field1+refdata1")]);

        let out = transform(&feed, &reference, &rules);

        assert_eq!(out[0].get(OutputField::Outfield1), FieldValue::Number(101.0));
        assert_eq!(out[1].get(OutputField::Outfield1), FieldValue::Number(2.0));
    }

    #[test]
    fn test_output_follows_feed_order() {
        let feed: Vec<Row> = ["3", "1", "2"].iter().map(|v| row(&[("field1", *v)])).collect();
        let rules = rules(&[(OutputField::Outfield1, "field1*10")]);

        let values: Vec<String> = transform(&feed, &[], &rules)
            .iter()
            .map(|r| r.get(OutputField::Outfield1).to_string())
            .collect();

        assert_eq!(values, vec!["30.0", "10.0", "20.0"]);
    }

    #[test]
    fn test_field_error_does_not_abort_row() {
        let feed = vec![row(&[("field1", "x"), ("field2", "2")])];
        let rules = rules(&[
            (OutputField::Outfield1, "field1+1"),
            (OutputField::Outfield2, "field2+1"),
        ]);

        let out = transform(&feed, &[], &rules);

        assert_eq!(out[0].get(OutputField::Outfield1), FieldValue::Error);
        assert_eq!(out[0].get(OutputField::Outfield2), FieldValue::Number(3.0));
    }

    #[test]
    fn test_successive_rule_sets_do_not_interfere() {
        let feed = vec![row(&[("field1", "4")])];
        let first = rules(&[(OutputField::Outfield1, "field1*2")]);
        let second = rules(&[(OutputField::Outfield2, "field1-1")]);

        let run1 = transform(&feed, &[], &first);
        let run2 = transform(&feed, &[], &second);

        assert_eq!(run1[0].to_record(), ["8.0", "Error", "Error", "Error", "Error"]);
        assert_eq!(run2[0].to_record(), ["Error", "3.0", "Error", "Error", "Error"]);
    }

    #[test]
    fn test_deterministic() {
        let feed = vec![row(&[("field1", "1.5"), ("field3", "2")])];
        let reference = vec![row(&[("refdata2", "0.5")])];
        let rules = rules(&[
            (OutputField::Outfield1, "field1*field3"),
            (OutputField::Outfield4, "refdata2/field3"),
        ]);

        assert_eq!(
            transform(&feed, &reference, &rules),
            transform(&feed, &reference, &rules)
        );
    }
}
