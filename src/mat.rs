//! Dense column-major matrix views.
//!
//! A view is a logical `(rows, cols)` window into caller-owned storage with a
//! leading dimension `ld` (the stride between consecutive columns). Views
//! never own memory. All offset arithmetic into column-major buffers lives
//! here and in the packed-panel accessors, nowhere else.

use crate::error::{validation_error, Result};

/// 1D index of element `(i, j)` in a column-major buffer with leading
/// dimension `ld`.
#[inline(always)]
pub(crate) fn at(i: usize, j: usize, ld: usize) -> usize {
    (j * ld) + i
}

/// Minimum buffer length for a `rows x cols` view with leading dimension `ld`.
#[inline]
fn required_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        (cols - 1) * ld + rows
    }
}

/// Read-only view of a column-major `f64` matrix.
#[derive(Clone, Copy)]
pub struct DMatRef<'a> {
    data: &'a [f64],
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<'a> DMatRef<'a> {
    /// Builds a view over `data`.
    ///
    /// Requires `ld >= rows` (with `ld >= 1`) and `data` long enough to hold
    /// the last element of the window.
    pub fn new(data: &'a [f64], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        if ld < rows.max(1) {
            return Err(validation_error(format!(
                "leading dimension {} is smaller than row count {}",
                ld, rows
            )));
        }
        let needed = required_len(rows, cols, ld);
        if data.len() < needed {
            return Err(validation_error(format!(
                "buffer holds {} elements but a {}x{} view with leading dimension {} needs {}",
                data.len(),
                rows,
                cols,
                ld,
                needed
            )));
        }
        Ok(DMatRef {
            data,
            rows,
            cols,
            ld,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Element `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols);
        self.data[at(i, j, self.ld)]
    }

    #[inline]
    pub(crate) fn raw(&self) -> SrcView {
        SrcView {
            ptr: self.data.as_ptr(),
            ld: self.ld,
        }
    }
}

/// Mutable view of a column-major `f64` matrix.
pub struct DMatMut<'a> {
    data: &'a mut [f64],
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<'a> DMatMut<'a> {
    /// Builds a mutable view over `data`; same contract as [`DMatRef::new`].
    pub fn new(data: &'a mut [f64], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        if ld < rows.max(1) {
            return Err(validation_error(format!(
                "leading dimension {} is smaller than row count {}",
                ld, rows
            )));
        }
        let needed = required_len(rows, cols, ld);
        if data.len() < needed {
            return Err(validation_error(format!(
                "buffer holds {} elements but a {}x{} view with leading dimension {} needs {}",
                data.len(),
                rows,
                cols,
                ld,
                needed
            )));
        }
        Ok(DMatMut {
            data,
            rows,
            cols,
            ld,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Element `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols);
        self.data[at(i, j, self.ld)]
    }

    #[inline]
    pub(crate) fn raw_mut(&mut self) -> DstView {
        DstView {
            ptr: self.data.as_mut_ptr(),
            ld: self.ld,
        }
    }

    /// Source and destination aliases over the same storage, for the in-place
    /// BLAS form where the engine reads B only through packed copies made
    /// before the matching strip of the output is written.
    #[inline]
    pub(crate) fn raw_in_place(&mut self) -> (SrcView, DstView) {
        let ptr = self.data.as_mut_ptr();
        (
            SrcView { ptr, ld: self.ld },
            DstView { ptr, ld: self.ld },
        )
    }
}

/// Raw read-only column-major view used inside the engine.
///
/// Plain pointer + leading dimension so the in-place form (where B and D are
/// the same buffer) stays free of overlapping references.
#[derive(Clone, Copy)]
pub(crate) struct SrcView {
    pub ptr: *const f64,
    pub ld: usize,
}

impl SrcView {
    /// Element `(i, j)`.
    ///
    /// # Safety
    /// `(i, j)` must lie inside the window the view was built from.
    #[inline(always)]
    pub unsafe fn at(self, i: usize, j: usize) -> f64 {
        *self.ptr.add(at(i, j, self.ld))
    }

    /// Pointer to element `(i, j)`.
    ///
    /// # Safety
    /// `(i, j)` must lie inside the window the view was built from.
    #[inline(always)]
    pub unsafe fn el(self, i: usize, j: usize) -> *const f64 {
        self.ptr.add(at(i, j, self.ld))
    }
}

/// Raw mutable column-major view used inside the engine.
#[derive(Clone, Copy)]
pub(crate) struct DstView {
    pub ptr: *mut f64,
    pub ld: usize,
}

impl DstView {
    /// Pointer to element `(i, j)`.
    ///
    /// # Safety
    /// `(i, j)` must lie inside the window the view was built from.
    #[inline(always)]
    pub unsafe fn el(self, i: usize, j: usize) -> *mut f64 {
        self.ptr.add(at(i, j, self.ld))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        // For a 3x2 matrix (m=3, n=2), ld=3
        // 0 3
        // 1 4
        // 2 5
        assert_eq!(at(0, 0, 3), 0);
        assert_eq!(at(1, 0, 3), 1);
        assert_eq!(at(0, 1, 3), 3);
        assert_eq!(at(2, 1, 3), 5);
    }

    #[test]
    fn test_view_construction() {
        let data = vec![0.0; 12];
        assert!(DMatRef::new(&data, 3, 4, 3).is_ok());
        // padded leading dimension
        assert!(DMatRef::new(&data, 2, 4, 3).is_ok());
        // ld smaller than rows
        assert!(DMatRef::new(&data, 4, 3, 3).is_err());
        // buffer too short
        assert!(DMatRef::new(&data, 3, 5, 3).is_err());
        // empty views need no storage
        assert!(DMatRef::new(&[], 0, 5, 1).is_ok());
        assert!(DMatRef::new(&[], 5, 0, 5).is_ok());
    }

    #[test]
    fn test_view_get_strided() {
        // 2x2 window of a buffer with ld=3: columns at offsets 0 and 3.
        let data = vec![1.0, 2.0, -1.0, 3.0, 4.0, -1.0];
        let m = DMatRef::new(&data, 2, 2, 3).unwrap();
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(1, 0), 2.0);
        assert_eq!(m.get(0, 1), 3.0);
        assert_eq!(m.get(1, 1), 4.0);
    }

    #[test]
    fn test_mut_view_raw_in_place_shares_storage() {
        let mut data = vec![0.0; 4];
        let mut m = DMatMut::new(&mut data, 2, 2, 2).unwrap();
        let (src, dst) = m.raw_in_place();
        assert_eq!(src.ptr as usize, dst.ptr as usize);
        assert_eq!(src.ld, 2);
    }
}
