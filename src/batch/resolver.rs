//! Reference-token resolution for batch request bodies.
//!
//! A string leaf in a batch step's body may contain tokens of the form `$N`
//! or `$N.field.path`, where `N` is the zero-based index of an earlier step
//! in the same batch. Each token with a path is replaced by the value found
//! at that path in step `N`'s response body:
//!
//! | token          | step `N` body                       | result          |
//! |----------------|-------------------------------------|-----------------|
//! | `$0.id`        | `{"id": "abc123"}`                  | `abc123`        |
//! | `$0.a.label`   | `{"a": {"label": "Cube_1"}}`        | `Cube_1`        |
//! | `n=$0.count`   | `{"count": 5}`                      | `n=5`           |
//! | `$99.id`       | (no step 99 yet)                    | `$99.id`        |
//! | `$0`           | anything                            | `$0`            |
//!
//! Resolution is best effort and never fails: any token that cannot be
//! resolved to a string or number stays in the text verbatim.
//!
//! Numbers are spliced in C `%g` form, except that integers print every
//! digit (`1234567`, not `1.23457e+06`) so ids and counts survive intact.

use super::orchestrator::BatchStepResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::ops::Range;

#[allow(clippy::expect_used)]
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\d+)(\.[\w.]+)?").expect("reference token pattern is valid"));

/// One reference token found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch<'a> {
    /// Byte range of the whole token in the scanned string
    pub span: Range<usize>,
    /// Step index; `None` when the digits overflow `usize`
    pub index: Option<usize>,
    /// Dotted path without the leading `.`, if present
    pub path: Option<&'a str>,
}

/// Find all non-overlapping reference tokens, left to right.
#[must_use]
pub fn scan_tokens(text: &str) -> Vec<TokenMatch<'_>> {
    TOKEN_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let index = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok());
            let path = caps.get(2).map(|m| &m.as_str()[1..]);
            Some(TokenMatch {
                span: whole.range(),
                index,
                path,
            })
        })
        .collect()
}

/// Walk `root` by a dot-separated path of object keys.
///
/// Empty segments (`a..b`, trailing `.`) are skipped. Returns `None` as soon
/// as a segment is missing or the current value is not an object.
#[must_use]
pub fn extract_path<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    let mut segments = path.split('.').filter(|s| !s.is_empty()).peekable();
    segments.peek()?;
    segments.try_fold(root, |current, segment| current.as_object()?.get(segment))
}

/// Render a JSON number the way it is spliced into a string.
///
/// Integers print exactly. Other values use the C `%g` general format:
/// six significant digits, trailing zeros removed, and exponent notation
/// outside `1e-4 <= |v| < 1e6`. The output never depends on locale.
#[must_use]
pub fn format_number(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    number
        .as_f64()
        .map_or_else(|| number.to_string(), format_general)
}

/// C-style `%g` with the default precision of 6.
#[must_use]
pub fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Round to the target precision first; the exponent of the rounded value
    // decides between fixed and exponent notation.
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        let decimals = (PRECISION - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Resolve every reference token in `text` against `prior`.
///
/// All tokens are resolved against the same snapshot; replacement text is
/// never rescanned.
#[must_use]
pub fn resolve_string(text: &str, prior: &[BatchStepResult]) -> String {
    let tokens = scan_tokens(text);
    if tokens.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for token in tokens {
        out.push_str(&text[cursor..token.span.start]);
        match substitute(&token, prior) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&text[token.span.clone()]),
        }
        cursor = token.span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn substitute(token: &TokenMatch<'_>, prior: &[BatchStepResult]) -> Option<String> {
    let step = prior.get(token.index?)?;
    // A bare `$N` names a whole result object, which has no string form.
    let path = token.path?;
    let data = step.data.as_ref()?;
    match extract_path(data, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format_number(n)),
        _ => None,
    }
}

/// Resolve reference tokens throughout a request body.
///
/// Objects are walked depth-first and every string leaf is resolved. Arrays,
/// and everything inside them, are passed through unchanged.
#[must_use]
pub fn resolve_body(body: &Value, prior: &[BatchStepResult]) -> Value {
    match body {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), resolve_body(value, prior)))
                .collect::<Map<String, Value>>(),
        ),
        Value::String(s) => Value::String(resolve_string(s, prior)),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(index: usize, data: Value) -> BatchStepResult {
        BatchStepResult {
            index,
            method: "GET".to_string(),
            path: format!("/step{index}"),
            status: 200,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[test]
    fn test_scan_finds_all_tokens_in_order() {
        let tokens = scan_tokens("from $0.id to $12.target.name and $3");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].index, Some(0));
        assert_eq!(tokens[0].path, Some("id"));
        assert_eq!(tokens[1].index, Some(12));
        assert_eq!(tokens[1].path, Some("target.name"));
        assert_eq!(tokens[2].index, Some(3));
        assert_eq!(tokens[2].path, None);
        assert_eq!(&"from $0.id to"[tokens[0].span.clone()], "$0.id");
    }

    #[test]
    fn test_scan_ignores_plain_dollars() {
        assert!(scan_tokens("costs $ 5 or $x").is_empty());
    }

    #[test]
    fn test_scan_overflowing_index() {
        let tokens = scan_tokens("$99999999999999999999999.id");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].index, None);
    }

    #[test]
    fn test_extract_nested_path() {
        let root = json!({"actor": {"label": "Cube_1"}});
        assert_eq!(extract_path(&root, "actor.label"), Some(&json!("Cube_1")));
        assert_eq!(extract_path(&root, "actor.missing"), None);
        assert_eq!(extract_path(&root, "actor.label.deeper"), None);
        assert_eq!(extract_path(&root, ""), None);
    }

    #[test]
    fn test_extract_skips_empty_segments() {
        let root = json!({"a": {"b": 1}});
        assert_eq!(extract_path(&root, "a..b."), Some(&json!(1)));
    }

    #[test]
    fn test_resolve_simple_field() {
        let prior = vec![step(0, json!({"id": "abc123"}))];
        assert_eq!(resolve_string("$0.id", &prior), "abc123");
    }

    #[test]
    fn test_resolve_nested_field() {
        let prior = vec![step(0, json!({"actor": {"label": "Cube_1"}}))];
        assert_eq!(resolve_string("$0.actor.label", &prior), "Cube_1");
    }

    #[test]
    fn test_resolve_number_inside_text() {
        let prior = vec![step(0, json!({"count": 5}))];
        assert_eq!(resolve_string("n=$0.count", &prior), "n=5");
    }

    #[test]
    fn test_out_of_range_left_literal() {
        let prior = vec![step(0, json!({"id": "abc"}))];
        assert_eq!(resolve_string("$99.id", &prior), "$99.id");
        assert_eq!(resolve_string("$0.id", &[]), "$0.id");
    }

    #[test]
    fn test_bare_index_left_literal() {
        let prior = vec![step(0, json!({"id": "abc"}))];
        assert_eq!(resolve_string("$0", &prior), "$0");
    }

    #[test]
    fn test_non_scalar_values_left_literal() {
        let prior = vec![step(
            0,
            json!({"obj": {"a": 1}, "arr": [1], "flag": true, "none": null}),
        )];
        for token in ["$0.obj", "$0.arr", "$0.flag", "$0.none", "$0.missing"] {
            assert_eq!(resolve_string(token, &prior), token);
        }
    }

    #[test]
    fn test_multiple_tokens_resolve_independently() {
        let prior = vec![
            step(0, json!({"name": "Cube"})),
            step(1, json!({"x": 1.5})),
        ];
        assert_eq!(
            resolve_string("$0.name at $1.x, $5.y", &prior),
            "Cube at 1.5, $5.y"
        );
    }

    #[test]
    fn test_similar_tokens_do_not_clobber_each_other() {
        let prior = vec![step(0, json!({"id": "A", "idx": "B"}))];
        assert_eq!(resolve_string("$0.id/$0.idx", &prior), "A/B");
    }

    #[test]
    fn test_replacement_text_not_rescanned() {
        let prior = vec![
            step(0, json!({"text": "$1.secret"})),
            step(1, json!({"secret": "leak"})),
        ];
        assert_eq!(resolve_string("$0.text", &prior), "$1.secret");
    }

    #[test]
    fn test_step_without_data_left_literal() {
        let mut failed = step(0, json!({}));
        failed.data = None;
        assert_eq!(resolve_string("$0.id", &[failed]), "$0.id");
    }

    #[test]
    fn test_resolve_body_recurses_objects_not_arrays() {
        let prior = vec![step(0, json!({"id": "abc", "n": 3}))];
        let body = json!({
            "target": "$0.id",
            "nested": {"deeper": {"label": "item-$0.n"}},
            "list": ["$0.id", {"inner": "$0.id"}],
            "count": 7,
            "flag": false,
            "nothing": null,
        });
        let resolved = resolve_body(&body, &prior);
        assert_eq!(
            resolved,
            json!({
                "target": "abc",
                "nested": {"deeper": {"label": "item-3"}},
                "list": ["$0.id", {"inner": "$0.id"}],
                "count": 7,
                "flag": false,
                "nothing": null,
            })
        );
    }

    #[test]
    fn test_format_integers_exact() {
        assert_eq!(format_number(&Number::from(5)), "5");
        assert_eq!(format_number(&Number::from(-42)), "-42");
        assert_eq!(format_number(&Number::from(1_234_567_u64)), "1234567");
    }

    #[test]
    fn test_format_general_fixed_range() {
        assert_eq!(format_general(1.5), "1.5");
        assert_eq!(format_general(100.0), "100");
        assert_eq!(format_general(0.0001), "0.0001");
        assert_eq!(format_general(3.14159265), "3.14159");
        assert_eq!(format_general(-2.25), "-2.25");
        assert_eq!(format_general(123456.0), "123456");
    }

    #[test]
    fn test_format_general_exponent_range() {
        assert_eq!(format_general(1234567.0), "1.23457e+06");
        assert_eq!(format_general(0.00001), "1e-05");
        assert_eq!(format_general(1e20), "1e+20");
        assert_eq!(format_general(999999.5), "1e+06");
    }
}
