// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::FanoutError;

/// An item produced by a cold source: either a value or a failure.
///
/// Cold sources report failures in-band so that the producer task can
/// distinguish "upstream failed" from "upstream completed" without a
/// side channel. A failure terminates the producer; it is never replayed
/// to subscribers.
#[derive(Debug, Clone)]
pub enum SourceItem<T> {
    /// A successful value.
    Value(T),
    /// A failure that terminates the source.
    Error(FanoutError),
}

impl<T: PartialEq> PartialEq for SourceItem<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SourceItem::Value(a), SourceItem::Value(b)) => a == b,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> SourceItem<T> {
    /// Returns `true` if this is a `Value`.
    pub const fn is_value(&self) -> bool {
        matches!(self, SourceItem::Value(_))
    }

    /// Returns `true` if this is an `Error`.
    pub const fn is_error(&self) -> bool {
        matches!(self, SourceItem::Error(_))
    }

    /// Converts into `Option<T>`, discarding a failure.
    pub fn ok(self) -> Option<T> {
        match self {
            SourceItem::Value(v) => Some(v),
            SourceItem::Error(_) => None,
        }
    }

    /// Maps the contained value, propagating failures unchanged.
    pub fn map<U, F>(self, f: F) -> SourceItem<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            SourceItem::Value(v) => SourceItem::Value(f(v)),
            SourceItem::Error(e) => SourceItem::Error(e),
        }
    }
}

impl<T> From<Result<T, FanoutError>> for SourceItem<T> {
    fn from(result: Result<T, FanoutError>) -> Self {
        match result {
            Ok(v) => SourceItem::Value(v),
            Err(e) => SourceItem::Error(e),
        }
    }
}

impl<T> From<SourceItem<T>> for Result<T, FanoutError> {
    fn from(item: SourceItem<T>) -> Self {
        match item {
            SourceItem::Value(v) => Ok(v),
            SourceItem::Error(e) => Err(e),
        }
    }
}
