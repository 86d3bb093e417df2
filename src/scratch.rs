//! Per-call scratch memory for packed panels.
//!
//! Small problems pack their B strips into a fixed-capacity, 64-byte-aligned
//! stack buffer. Large problems take a single zero-initialized heap
//! allocation sized for every packed panel the call needs (the strip buffer
//! plus the pre-packed triangular operand); the allocation is released by
//! `Drop` on every exit path. Zero-initialization makes all panel padding a
//! defined value.
//!
//! Capacity is the geometry policy's contract: the stack path is only chosen
//! when the padded stride fits `K_MAX_STACK`, so it is debug-asserted here and
//! not re-validated.

use std::alloc::{self, Layout};
use std::slice;

use crate::error::{allocation_error, layout_error, Result};
use crate::target::{K_MAX_STACK, M_KERNEL};

/// Cache-line / SIMD alignment for all packed-panel storage.
pub(crate) const SCRATCH_ALIGN: usize = 64;

/// Stack strip buffer capacity in elements: one `M_KERNEL`-row strip with the
/// largest stride the stack path admits.
pub(crate) const STACK_BUF_LEN: usize = M_KERNEL * K_MAX_STACK;

/// Fixed-capacity aligned buffer for the small-problem path.
#[repr(C, align(64))]
pub(crate) struct StackScratch {
    pub data: [f64; STACK_BUF_LEN],
}

impl StackScratch {
    #[inline]
    pub fn new() -> Self {
        StackScratch {
            data: [0.0; STACK_BUF_LEN],
        }
    }

    /// The strip region for a padded stride of `sdu` columns.
    #[inline]
    pub fn strip(&mut self, sdu: usize) -> &mut [f64] {
        debug_assert!(sdu <= K_MAX_STACK, "geometry policy routed an oversized problem to the stack path");
        &mut self.data[..M_KERNEL * sdu]
    }
}

/// One heap allocation covering all packed panels of a single call.
pub(crate) struct HeapScratch {
    ptr: *mut f64,
    len: usize,
    layout: Layout,
}

impl HeapScratch {
    /// Allocates `len` zeroed, 64-byte-aligned doubles.
    ///
    /// Allocation failure is fatal for the call and surfaces as an error; the
    /// engine never falls back to another path on exhaustion.
    pub fn acquire(len: usize) -> Result<Self> {
        debug_assert!(len > 0);

        let layout = Layout::array::<f64>(len)
            .and_then(|l| l.align_to(SCRATCH_ALIGN))
            .map_err(|_| {
                layout_error(
                    len.saturating_mul(std::mem::size_of::<f64>()),
                    SCRATCH_ALIGN,
                    "scratch size overflows a valid allocation layout",
                )
            })?;

        let ptr = unsafe { alloc::alloc_zeroed(layout) } as *mut f64;
        if ptr.is_null() {
            return Err(allocation_error(
                layout.size(),
                SCRATCH_ALIGN,
                "packed-panel scratch allocation failed",
            ));
        }

        Ok(HeapScratch { ptr, len, layout })
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        // SAFETY: ptr is a live allocation of exactly `len` zeroed f64s.
        unsafe { slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

impl Drop for HeapScratch {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: allocated in `acquire` with this exact layout.
            unsafe {
                alloc::dealloc(self.ptr as *mut u8, self.layout);
            }
        }
    }
}
