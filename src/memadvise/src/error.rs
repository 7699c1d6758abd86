// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Errors surfaced by the advisory memory hinter.

use std::fmt;
use std::io;

use thiserror::Error;

/// Identifies which required argument was absent in a
/// [`MissingArgument`](HintError::MissingArgument) failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgName {
    /// The memory region descriptor.
    Region,
    /// The advice selector.
    Advice,
}

impl fmt::Display for ArgName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArgName::Region => f.write_str("region"),
            ArgName::Advice => f.write_str("advice"),
        }
    }
}

/// An error returned by [`apply_advice`](crate::apply_advice).
///
/// Every failure is detected locally and returned immediately; none are
/// retried or downgraded to a no-op. Either the advisory call is issued for
/// the full aligned region or no call is issued at all.
#[derive(Error, Debug)]
pub enum HintError {
    /// A required argument was absent; caller programming error.
    #[error("missing required argument: {0}")]
    MissingArgument(ArgName),
    /// The raw advice value lies outside the closed enumeration; caller
    /// programming error. Carries the offending value for diagnostics.
    #[error("invalid memory advice value: {0}")]
    InvalidAdvice(i32),
    /// The region's base could not be resolved to an addressable location.
    #[error("cannot resolve buffer address: {0}")]
    UnresolvableBuffer(String),
    /// The region's length is unusable (zero, or the address range it
    /// implies does not fit in the address space).
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),
    /// The operating system rejected the advisory call. Carries the errno
    /// reported at the time of failure.
    #[error("madvise rejected by the operating system (errno {code}): {source}")]
    AdviceRejected {
        /// The raw OS status code.
        code: i32,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}
