//! Concrete metrics, each grounded on one `metric_<tag>` function
//! referenced in §4.5.2.

use crate::error::{Error, Result};
use crate::traits::{GetterValue, Metric, MetricFuture};
use serde_json::Value;

fn coerce_bool(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

pub struct RegistryEqMetric;
impl Metric for RegistryEqMetric {
    fn tag(&self) -> &'static str {
        "registry_eq"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        expected: Option<&'a GetterValue>,
        _options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move {
            let expected = expected.and_then(GetterValue::as_text);
            let result = result.as_text();
            Ok(coerce_bool(result == expected))
        })
    }
}

pub struct ExactMatchMetric;
impl Metric for ExactMatchMetric {
    fn tag(&self) -> &'static str {
        "exact_match"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        expected: Option<&'a GetterValue>,
        _options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move {
            let expected = expected.and_then(GetterValue::as_text);
            let result = result.as_text();
            Ok(coerce_bool(result.is_some() && result == expected))
        })
    }
}

pub struct FuzzyMatchMetric;
impl Metric for FuzzyMatchMetric {
    fn tag(&self) -> &'static str {
        "fuzzy_match"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        expected: Option<&'a GetterValue>,
        _options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move {
            let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
            let result = result.as_text().map(normalize);
            let expected = expected.and_then(GetterValue::as_text).map(normalize);
            Ok(coerce_bool(result.is_some() && result == expected))
        })
    }
}

pub struct JsonPathEqMetric;
impl Metric for JsonPathEqMetric {
    fn tag(&self) -> &'static str {
        "json_path_eq"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        expected: Option<&'a GetterValue>,
        options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move {
            let GetterValue::Json(doc) = result else {
                return Ok(0.0);
            };
            let path = options
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::NonNumericMetric("json_path_eq requires options.path".to_string()))?;

            let mut cursor = doc;
            for segment in path.split('.').filter(|s| !s.is_empty()) {
                match cursor.get(segment) {
                    Some(next) => cursor = next,
                    None => return Ok(0.0),
                }
            }

            let expected_value = expected.and_then(GetterValue::as_text);
            let actual = cursor.as_str();
            Ok(coerce_bool(actual.is_some() && actual == expected_value))
        })
    }
}

pub struct IsInListMetric;
impl Metric for IsInListMetric {
    fn tag(&self) -> &'static str {
        "is_in_list"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        expected: Option<&'a GetterValue>,
        _options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move {
            let needle = result.as_text();
            let haystack = match expected {
                Some(GetterValue::List(items)) => items.as_slice(),
                _ => return Ok(0.0),
            };
            Ok(coerce_bool(needle.is_some_and(|n| haystack.iter().any(|item| item == n))))
        })
    }
}

pub struct WorldClockExistsMetric;
impl Metric for WorldClockExistsMetric {
    fn tag(&self) -> &'static str {
        "world_clock_exists"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        _expected: Option<&'a GetterValue>,
        options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move {
            let label = match result.as_text() {
                Some(label) => label,
                None => return Ok(0.0),
            };
            let city = options.get("city").and_then(Value::as_str).unwrap_or("");
            let country = options.get("country").and_then(Value::as_str).unwrap_or("");
            let pattern = format!(".*{}, {}.*", regex::escape(city), regex::escape(country));
            let re = regex::Regex::new(&pattern)
                .map_err(|e| Error::NonNumericMetric(format!("bad world-clock pattern: {e}")))?;
            Ok(coerce_bool(re.is_match(label)))
        })
    }
}

pub struct A11yNodeExistsMetric;
impl Metric for A11yNodeExistsMetric {
    fn tag(&self) -> &'static str {
        "a11y_node_exists"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        _expected: Option<&'a GetterValue>,
        options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move {
            let tree = match result.as_text() {
                Some(tree) => tree,
                None => return Ok(0.0),
            };
            let name_pattern = options.get("name_regex").and_then(Value::as_str).unwrap_or(".*");
            let re = regex::Regex::new(name_pattern)
                .map_err(|e| Error::NonNumericMetric(format!("bad name_regex: {e}")))?;
            Ok(coerce_bool(re.is_match(tree)))
        })
    }
}

pub struct DirTreeEqMetric;
impl Metric for DirTreeEqMetric {
    fn tag(&self) -> &'static str {
        "dir_tree_eq"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        expected: Option<&'a GetterValue>,
        _options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move {
            let actual = match result {
                GetterValue::List(items) => items,
                _ => return Ok(0.0),
            };
            let expected = match expected {
                Some(GetterValue::List(items)) => items,
                _ => return Ok(0.0),
            };
            let mut actual_sorted = actual.clone();
            let mut expected_sorted = expected.clone();
            actual_sorted.sort();
            expected_sorted.sort();
            Ok(coerce_bool(actual_sorted == expected_sorted))
        })
    }
}

/// Checks a boolean getter's result directly, with no `expected` getter
/// needed -- the fit for `get_file_exists`/`get_folder_exists` style
/// presence checks a conjunction strings together (§8 scenario 3).
pub struct IsTrueMetric;
impl Metric for IsTrueMetric {
    fn tag(&self) -> &'static str {
        "is_true"
    }
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        _expected: Option<&'a GetterValue>,
        _options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move { Ok(coerce_bool(matches!(result, GetterValue::Bool(true)))) })
    }
}

/// §4.4 Rules: when `evaluator.func == "infeasible"` the engine
/// short-circuits before calling any metric, but this is present in the
/// registry so normalization still treats `"infeasible"` uniformly with
/// every other tag (§4.5.2).
pub struct InfeasibleMetric;
impl Metric for InfeasibleMetric {
    fn tag(&self) -> &'static str {
        "infeasible"
    }
    fn evaluate<'a>(
        &'a self,
        _result: &'a GetterValue,
        _expected: Option<&'a GetterValue>,
        _options: &'a Value,
    ) -> MetricFuture<'a> {
        Box::pin(async move { Ok(1.0) })
    }
}

pub fn all() -> Vec<&'static dyn Metric> {
    vec![
        &RegistryEqMetric,
        &ExactMatchMetric,
        &FuzzyMatchMetric,
        &JsonPathEqMetric,
        &IsInListMetric,
        &WorldClockExistsMetric,
        &A11yNodeExistsMetric,
        &DirTreeEqMetric,
        &InfeasibleMetric,
        &IsTrueMetric,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exact_match_requires_equal_text() {
        let metric = ExactMatchMetric;
        let result = GetterValue::Text("hello".to_string());
        let expected = GetterValue::Text("hello".to_string());
        let score = metric.evaluate(&result, Some(&expected), &Value::Null).await.unwrap();
        assert_eq!(score, 1.0);
    }

    #[tokio::test]
    async fn is_true_accepts_only_bool_true() {
        let metric = IsTrueMetric;
        assert_eq!(metric.evaluate(&GetterValue::Bool(true), None, &Value::Null).await.unwrap(), 1.0);
        assert_eq!(metric.evaluate(&GetterValue::Bool(false), None, &Value::Null).await.unwrap(), 0.0);
        assert_eq!(metric.evaluate(&GetterValue::Null, None, &Value::Null).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn fuzzy_match_ignores_whitespace_and_case() {
        let metric = FuzzyMatchMetric;
        let result = GetterValue::Text("  Hello   World  ".to_string());
        let expected = GetterValue::Text("hello world".to_string());
        let score = metric.evaluate(&result, Some(&expected), &Value::Null).await.unwrap();
        assert_eq!(score, 1.0);
    }

    #[tokio::test]
    async fn world_clock_exists_matches_city_country_pattern() {
        let metric = WorldClockExistsMetric;
        let result = GetterValue::Text("Clock: Tokyo, Japan (UTC+9)".to_string());
        let options = serde_json::json!({"city": "Tokyo", "country": "Japan"});
        let score = metric.evaluate(&result, None, &options).await.unwrap();
        assert_eq!(score, 1.0);
    }

    #[tokio::test]
    async fn dir_tree_eq_ignores_ordering() {
        let metric = DirTreeEqMetric;
        let result = GetterValue::List(vec!["b.txt".to_string(), "a.txt".to_string()]);
        let expected = GetterValue::List(vec!["a.txt".to_string(), "b.txt".to_string()]);
        let score = metric.evaluate(&result, Some(&expected), &Value::Null).await.unwrap();
        assert_eq!(score, 1.0);
    }
}
