// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A tiny utility library for issuing page-aligned memory usage advice.
//!
//! [`apply_advice`] forwards a memory access pattern hint for a caller-owned
//! mapped region to the OS via `madvise(2)`. Advisory syscalls operate on
//! whole pages, so the requested range is first expanded to the smallest
//! enclosing page-aligned region; under-covering would silently skip part of
//! the range.
//!
//! The hint is purely advisory: it never changes program-observable memory
//! contents, only performance characteristics (with the caveat documented on
//! [`Advice::DontNeed`]). The hinter holds no state, so calls are safe to
//! issue from any number of threads simultaneously. Calls are synchronous
//! and blocking; callers that need bounded latency must wrap the call in
//! their own timeout.
//!
//! Failures are never retried and never downgraded to a no-op: silently
//! ignoring a requested hint could mask a caller bug such as a stale or
//! unmapped buffer.

#![deny(missing_docs, missing_debug_implementations)]

mod advice;
mod error;
mod region;

pub use crate::advice::Advice;
pub use crate::error::{ArgName, HintError};
pub use crate::region::{page_size, AlignedRegion, MemoryRegion};

use tracing::debug;

/// Issues memory advice for a caller-owned region.
///
/// Both arguments are required; an absent one fails with
/// [`HintError::MissingArgument`] naming it, before any further processing.
/// The region must resolve to a non-null base and a non-zero length, and
/// must name memory that stays mapped for the duration of the call — the
/// region is never retained past it.
///
/// On success exactly one advisory call has been issued, covering the
/// smallest page-aligned region that encloses the requested range. On
/// failure no advisory call has been issued at all, except for
/// [`HintError::AdviceRejected`], which reports the OS's own refusal.
pub fn apply_advice(region: Option<MemoryRegion>, advice: Option<Advice>) -> Result<(), HintError> {
    let region = region.ok_or(HintError::MissingArgument(ArgName::Region))?;
    let advice = advice.ok_or(HintError::MissingArgument(ArgName::Advice))?;
    region.resolve()?;

    let page_size = page_size();
    let aligned = AlignedRegion::enclosing(&region, page_size)?;
    debug!(
        page_size,
        base = region.base(),
        aligned_start = aligned.start(),
        len = region.len(),
        aligned_size = aligned.size(),
        advice = ?advice,
        "issuing memory advice"
    );

    // SAFETY: `madvise` does not dereference the pointer in userspace; the
    // kernel validates the range and reports failures through the return
    // value. The caller guarantees the region stays mapped for the duration
    // of the call (see `MemoryRegion`).
    let rc = unsafe {
        libc::madvise(
            aligned.start() as *mut libc::c_void,
            aligned.size(),
            advice.as_os(),
        )
    };
    if rc != 0 {
        let source = std::io::Error::last_os_error();
        return Err(HintError::AdviceRejected {
            code: source.raw_os_error().unwrap_or(rc),
            source,
        });
    }
    Ok(())
}
