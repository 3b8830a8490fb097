// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared webhook credential check.

use subtle::ConstantTimeEq;

use crate::error::ChipError;

/// Compare an `Authorization` header against a configured webhook secret.
///
/// With no secret configured, verification is skipped. The header may carry
/// the secret bare or with a `Bearer ` prefix. Comparison is constant-time.
pub fn verify_bearer(expected: Option<&str>, header: Option<&str>) -> Result<(), ChipError> {
    let Some(expected) = expected.filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let Some(header) = header else {
        return Err(ChipError::Unauthorized(
            "missing authorization header".into(),
        ));
    };

    let provided = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(ChipError::Unauthorized("invalid webhook credential".into()))
    }
}
