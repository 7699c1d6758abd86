// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The closed advice enumeration and its translation to OS constants.

use crate::error::HintError;

/// A memory access pattern hint, as accepted by
/// [`apply_advice`](crate::apply_advice).
///
/// This is a closed enumeration: exactly these five values are valid, and
/// each maps 1:1 to an OS-level `MADV_*` constant. The raw discriminants
/// (0 through 4) match the values exchanged at the integer boundary; the
/// OS constants are looked up through `libc` rather than assumed equal to
/// the discriminants, since they differ across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Advice {
    /// No special access pattern; the OS default.
    Normal = 0,
    /// Expect page references in random order, so read-ahead is unlikely
    /// to help.
    Random = 1,
    /// Expect page references in sequential order, so pages can be read
    /// ahead aggressively and freed soon after use.
    Sequential = 2,
    /// Expect access in the near future; the OS may prefault pages.
    WillNeed = 3,
    /// Do not expect access in the near future; the OS may reclaim the
    /// pages.
    ///
    /// For file-backed mappings later accesses repopulate from the file.
    /// For private anonymous mappings the OS discards the contents and
    /// later accesses observe zero-filled pages, so callers must not hold
    /// this advice over data they still need.
    DontNeed = 4,
}

/// All values of the enumeration, in raw-value order.
pub(crate) const ALL_ADVICE: [Advice; 5] = [
    Advice::Normal,
    Advice::Random,
    Advice::Sequential,
    Advice::WillNeed,
    Advice::DontNeed,
];

impl Advice {
    /// Converts a raw integer advice value into an [`Advice`].
    ///
    /// Any value outside `0..=4` is a caller error and yields
    /// [`HintError::InvalidAdvice`] carrying the offending value. There is
    /// deliberately no default arm that swallows unknown values.
    pub fn from_raw(raw: i32) -> Result<Advice, HintError> {
        match raw {
            0 => Ok(Advice::Normal),
            1 => Ok(Advice::Random),
            2 => Ok(Advice::Sequential),
            3 => Ok(Advice::WillNeed),
            4 => Ok(Advice::DontNeed),
            other => Err(HintError::InvalidAdvice(other)),
        }
    }

    /// Returns the raw integer value for this advice.
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Returns the OS-level advisory constant for this advice.
    pub(crate) fn as_os(self) -> libc::c_int {
        match self {
            Advice::Normal => libc::MADV_NORMAL,
            Advice::Random => libc::MADV_RANDOM,
            Advice::Sequential => libc::MADV_SEQUENTIAL,
            Advice::WillNeed => libc::MADV_WILLNEED,
            Advice::DontNeed => libc::MADV_DONTNEED,
        }
    }
}
