//! The `Getter`/`Metric` seams every concrete evaluator plugs into.
//! Getters are pure with respect to engine state -- they may perform guest
//! I/O but never mutate agent state (§4.5 invariant).

use crate::error::Result;
use deskarena_guestio::GuestClient;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// A value a getter collected from the guest, normalized to one of a
/// handful of shapes metrics know how to compare.
#[derive(Debug, Clone, PartialEq)]
pub enum GetterValue {
    Null,
    Bool(bool),
    Text(String),
    Json(Value),
    List(Vec<String>),
}

impl GetterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GetterValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub type GetterFuture<'a> = Pin<Box<dyn Future<Output = Result<GetterValue>> + Send + 'a>>;
pub type MetricFuture<'a> = Pin<Box<dyn Future<Output = Result<f64>> + Send + 'a>>;

/// Resolves one `result`/`expected` spec (a `GetterSpec`'s `args` payload)
/// against a live guest connection.
pub trait Getter: Send + Sync {
    fn tag(&self) -> &'static str;
    fn get<'a>(&'a self, client: &'a GuestClient, args: &'a Value) -> GetterFuture<'a>;
}

/// Compares a `result` value (and optional `expected` value) under
/// caller-supplied `options`, producing a score coerced to `{0.0, 1.0}`
/// except where the metric is explicitly proportional.
pub trait Metric: Send + Sync {
    fn tag(&self) -> &'static str;
    fn evaluate<'a>(
        &'a self,
        result: &'a GetterValue,
        expected: Option<&'a GetterValue>,
        options: &'a Value,
    ) -> MetricFuture<'a>;
}
