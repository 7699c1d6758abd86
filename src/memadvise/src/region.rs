// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Memory region descriptors and page-alignment arithmetic.

use crate::advice::Advice;
use crate::error::HintError;

/// A caller-owned virtual memory region.
///
/// The descriptor is just an address and a byte count; the hinter never
/// maps, unmaps, allocates, or retains the memory it names. The caller must
/// keep the region mapped for the duration of any call that receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    base: usize,
    len: usize,
}

impl MemoryRegion {
    /// Creates a region descriptor from a raw base address and byte length.
    pub fn new(base: usize, len: usize) -> MemoryRegion {
        MemoryRegion { base, len }
    }

    /// Returns the region's base address.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Returns the region's length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the region is zero-length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Issues memory advice for this region.
    ///
    /// Convenience for [`apply_advice`](crate::apply_advice) with both
    /// arguments present.
    pub fn advise(&self, advice: Advice) -> Result<(), HintError> {
        crate::apply_advice(Some(*self), Some(advice))
    }

    /// Checks that the region resolves to a usable address and length.
    ///
    /// The base is checked before the length, and a failure of either is
    /// reported as its own error kind.
    pub(crate) fn resolve(&self) -> Result<(), HintError> {
        if self.base == 0 {
            return Err(HintError::UnresolvableBuffer(
                "buffer base address is null".into(),
            ));
        }
        if self.len == 0 {
            return Err(HintError::InvalidBuffer("buffer length is zero".into()));
        }
        Ok(())
    }
}

/// The smallest page-aligned region fully covering a [`MemoryRegion`].
///
/// Derived fresh per call and never persisted. `start` is the base rounded
/// down to a page boundary and `size` reaches to the end address rounded up,
/// so the covered range is always at least the requested one. Rounding must
/// always expand: under-covering would silently skip part of the range the
/// caller asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedRegion {
    start: usize,
    size: usize,
}

impl AlignedRegion {
    /// Computes the enclosing page-aligned region for `region`.
    ///
    /// `page_size` must be a power of two. Fails with
    /// [`HintError::InvalidBuffer`] when `base + len` (rounded up to the
    /// next page) does not fit in the address space.
    pub fn enclosing(region: &MemoryRegion, page_size: usize) -> Result<AlignedRegion, HintError> {
        assert!(
            page_size.is_power_of_two(),
            "page size {page_size} is not a power of two"
        );
        let start = page_floor(region.base(), page_size);
        let end = region
            .base()
            .checked_add(region.len())
            .and_then(|end| page_ceil(end, page_size))
            .ok_or_else(|| {
                HintError::InvalidBuffer(format!(
                    "address range {:#x}+{:#x} overflows the address space",
                    region.base(),
                    region.len(),
                ))
            })?;
        Ok(AlignedRegion {
            start,
            size: end - start,
        })
    }

    /// Returns the aligned start address.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the aligned size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Rounds `addr` down to the nearest multiple of `page_size`.
///
/// `page_size` must be a power of two.
fn page_floor(addr: usize, page_size: usize) -> usize {
    addr & !(page_size - 1)
}

/// Rounds `addr` up to the nearest multiple of `page_size`, or `None` when
/// the result does not fit in a `usize`.
///
/// `page_size` must be a power of two.
fn page_ceil(addr: usize, page_size: usize) -> Option<usize> {
    Some(addr.checked_add(page_size - 1)? & !(page_size - 1))
}

/// Returns the platform page size.
///
/// Queried from the OS on every call rather than cached, so the value always
/// reflects the running system.
pub fn page_size() -> usize {
    let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    assert!(
        raw > 0,
        "sysconf(_SC_PAGESIZE) failed: {}",
        std::io::Error::last_os_error()
    );
    let page_size = raw as usize;
    assert!(
        page_size.is_power_of_two(),
        "page size {page_size} is not a power of two"
    );
    page_size
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const PAGE: usize = 4096;

    fn enclosing(base: usize, len: usize) -> AlignedRegion {
        AlignedRegion::enclosing(&MemoryRegion::new(base, len), PAGE).unwrap()
    }

    #[test]
    fn floor_rounds_down_to_page_boundaries() {
        assert_eq!(page_floor(2102, PAGE), 0);
        assert_eq!(page_floor(PAGE, PAGE), PAGE);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn floor_rounds_down_large_addresses() {
        let result = page_floor(4345290809, PAGE);
        assert_eq!(result, 4345290752);
        assert_eq!(result % PAGE, 0);

        let result = page_floor(4517752889, PAGE);
        assert_eq!(result, 4517752832);
        assert_eq!(result % PAGE, 0);
    }

    #[test]
    fn enclosing_size_covers_the_requested_range() {
        assert_eq!(enclosing(0, PAGE).size(), PAGE);
        assert_eq!(enclosing(PAGE - 1, 2).size(), 2 * PAGE);
        assert_eq!(enclosing(100 * PAGE + 12, PAGE - 11).size(), 2 * PAGE);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn enclosing_size_covers_large_addresses() {
        let aligned = enclosing(4517752889, 5087);
        assert_eq!(aligned.start(), 4517752832);
        assert_eq!(aligned.size(), 2 * PAGE);
    }

    #[test]
    fn enclosing_one_byte_past_a_boundary() {
        let aligned = enclosing(0x1000, 1);
        assert_eq!(aligned.start(), 0x1000);
        assert_eq!(aligned.size(), 0x1000);
    }

    #[test]
    fn enclosing_misaligned_base_expands_both_ends() {
        let aligned = enclosing(0x1001, 0x1000);
        assert_eq!(aligned.start(), 0x1000);
        assert_eq!(aligned.size(), 0x2000);
    }

    #[test]
    fn enclosing_rejects_overflowing_ranges() {
        let region = MemoryRegion::new(usize::MAX - 100, 200);
        match AlignedRegion::enclosing(&region, PAGE) {
            Err(HintError::InvalidBuffer(_)) => (),
            other => panic!("expected InvalidBuffer, got {other:?}"),
        }
        // The range itself fits, but rounding its end up to a page does not.
        let region = MemoryRegion::new(page_floor(usize::MAX, PAGE), 1);
        match AlignedRegion::enclosing(&region, PAGE) {
            Err(HintError::InvalidBuffer(_)) => (),
            other => panic!("expected InvalidBuffer, got {other:?}"),
        }
    }

    #[test]
    fn platform_page_size_is_sane() {
        let page_size = page_size();
        assert!(page_size.is_power_of_two());
        assert!(page_size >= 512);
    }

    proptest! {
        #[test]
        fn enclosing_covers_and_aligns(
            base in 0usize..(1 << 30),
            len in 1usize..(1 << 20),
            shift in 12u32..=14,
        ) {
            let page_size = 1usize << shift;
            let region = MemoryRegion::new(base, len);
            let aligned = AlignedRegion::enclosing(&region, page_size).unwrap();
            prop_assert!(aligned.start() <= base);
            prop_assert!(aligned.start() + aligned.size() >= base + len);
            prop_assert_eq!(aligned.start() % page_size, 0);
            prop_assert_eq!(aligned.size() % page_size, 0);
        }
    }
}
