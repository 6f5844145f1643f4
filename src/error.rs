// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by the derivation layer. Divide-by-zero is not one of
/// them: ratios fall back to [`crate::models::Percentage::Undefined`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("inconsistent {field}: computed {value}")]
    InconsistentState { field: &'static str, value: Decimal },
}

impl MetricsError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        MetricsError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, MetricsError::InvalidInput { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every problem found while parsing one form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
