//! TRMM micro-kernels.
//!
//! One tile of the output is `PS x M_KERNEL` for left-side multiplies
//! (4 rows of D across one packed strip of B^T) and `M_KERNEL x PS` for
//! right-side multiplies. Each kernel sweeps the rectangular part of the
//! k-range and then the triangular corner of the tile, in ascending k order
//! for every orientation, so the stack path, the heap path, and a naive
//! ascending-order reference all produce bitwise-identical sums.
//!
//! The triangular operand is read through [`TriRead`], which abstracts over
//! caller column-major memory (straight or swapped) and packed panels
//! (straight or swapped); the drivers pick the reader, the kernels never know
//! which path they are on. Unit-diagonal tiles add the packed B value
//! directly in place of the diagonal multiply; the diagonal element is never
//! loaded.
//!
//! Full kernels assume a full tile and mask nothing; `_vs` kernels take the
//! remainder row/column counts and clip every read and write to them.

use crate::mat::SrcView;
use crate::pack::PanelRef;
use crate::target::{M_KERNEL, PS};
use crate::{Diag, Uplo};

/// Read access to the triangular operand, `(r, c)` in operand coordinates.
pub(crate) trait TriRead: Copy {
    /// # Safety
    /// `(r, c)` must be a stored element of the operand (inside the declared
    /// triangle, or off-triangle inside a zero-filled packed region).
    unsafe fn at(self, r: usize, c: usize) -> f64;
}

/// Column-major operand read as stored.
#[derive(Clone, Copy)]
pub(crate) struct CmStraight(pub SrcView);

/// Column-major operand read transposed.
#[derive(Clone, Copy)]
pub(crate) struct CmSwapped(pub SrcView);

/// Packed operand read as packed.
#[derive(Clone, Copy)]
pub(crate) struct PmStraight<'a>(pub PanelRef<'a>);

/// Packed operand read transposed.
#[derive(Clone, Copy)]
pub(crate) struct PmSwapped<'a>(pub PanelRef<'a>);

impl TriRead for CmStraight {
    #[inline(always)]
    unsafe fn at(self, r: usize, c: usize) -> f64 {
        self.0.at(r, c)
    }
}

impl TriRead for CmSwapped {
    #[inline(always)]
    unsafe fn at(self, r: usize, c: usize) -> f64 {
        self.0.at(c, r)
    }
}

impl TriRead for PmStraight<'_> {
    #[inline(always)]
    unsafe fn at(self, r: usize, c: usize) -> f64 {
        self.0.get(r, c)
    }
}

impl TriRead for PmSwapped<'_> {
    #[inline(always)]
    unsafe fn at(self, r: usize, c: usize) -> f64 {
        self.0.get(c, r)
    }
}

/// Left-side tile: `D[ii..ii+mr, 0..nr] = alpha * op(A)[ii..ii+mr, :] * B`
/// with B supplied as the transposed packed strip `pu` (`pu[j][k] = B[k, j]`).
///
/// `shape` is the triangle of `op(A)`; `kdim` its order; the reader exposes
/// `op(A)` element-wise. `d` points at the tile's top-left element.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
unsafe fn left_tile<R: TriRead>(
    shape: Uplo,
    diag: Diag,
    kdim: usize,
    ii: usize,
    alpha: f64,
    a: R,
    pu: PanelRef,
    d: *mut f64,
    ldd: usize,
    mr: usize,
    nr: usize,
) {
    debug_assert!(mr <= PS && nr <= M_KERNEL && ii + mr <= kdim);

    let mut acc = [[0.0f64; PS]; M_KERNEL];
    let ce = ii + mr;

    match shape {
        Uplo::Lower => {
            // rectangular sweep k < ii, all tile rows active
            for k in 0..ii {
                let mut av = [0.0f64; PS];
                for (i, slot) in av.iter_mut().enumerate().take(mr) {
                    *slot = a.at(ii + i, k);
                }
                for (j, col) in acc.iter_mut().enumerate().take(nr) {
                    let b = pu.get(j, k);
                    for i in 0..mr {
                        col[i] += av[i] * b;
                    }
                }
            }
            // triangular corner: row ii+t starts contributing at k = ii+t
            for k in ii..ce {
                let t = k - ii;
                for (j, col) in acc.iter_mut().enumerate().take(nr) {
                    let b = pu.get(j, k);
                    match diag {
                        Diag::NonUnit => {
                            for i in t..mr {
                                col[i] += a.at(ii + i, k) * b;
                            }
                        }
                        Diag::Unit => {
                            col[t] += b;
                            for i in (t + 1)..mr {
                                col[i] += a.at(ii + i, k) * b;
                            }
                        }
                    }
                }
            }
        }
        Uplo::Upper => {
            // triangular corner first to keep k ascending
            for k in ii..ce {
                let t = k - ii;
                for (j, col) in acc.iter_mut().enumerate().take(nr) {
                    let b = pu.get(j, k);
                    match diag {
                        Diag::NonUnit => {
                            for i in 0..=t {
                                col[i] += a.at(ii + i, k) * b;
                            }
                        }
                        Diag::Unit => {
                            for i in 0..t {
                                col[i] += a.at(ii + i, k) * b;
                            }
                            col[t] += b;
                        }
                    }
                }
            }
            // rectangular sweep k >= ii+mr
            for k in ce..kdim {
                let mut av = [0.0f64; PS];
                for (i, slot) in av.iter_mut().enumerate().take(mr) {
                    *slot = a.at(ii + i, k);
                }
                for (j, col) in acc.iter_mut().enumerate().take(nr) {
                    let b = pu.get(j, k);
                    for i in 0..mr {
                        col[i] += av[i] * b;
                    }
                }
            }
        }
    }

    // beta = 0 overwrite with the alpha scale folded into the store
    for (j, col) in acc.iter().enumerate().take(nr) {
        let out = d.add(j * ldd);
        for (i, &v) in col.iter().enumerate().take(mr) {
            *out.add(i) = alpha * v;
        }
    }
}

/// Right-side tile: `D[0..mr, jj..jj+nr] = alpha * B * op(A)[:, jj..jj+nr]`
/// with B supplied as the straight packed strip `pu` (`pu[i][k] = B[i, k]`).
#[inline(always)]
#[allow(clippy::too_many_arguments)]
unsafe fn right_tile<R: TriRead>(
    shape: Uplo,
    diag: Diag,
    kdim: usize,
    jj: usize,
    alpha: f64,
    a: R,
    pu: PanelRef,
    d: *mut f64,
    ldd: usize,
    mr: usize,
    nr: usize,
) {
    debug_assert!(mr <= M_KERNEL && nr <= PS && jj + nr <= kdim);

    let mut acc = [[0.0f64; M_KERNEL]; PS];
    let ce = jj + nr;

    match shape {
        Uplo::Upper => {
            // rectangular sweep k < jj, all tile columns active
            for k in 0..jj {
                for (j, col) in acc.iter_mut().enumerate().take(nr) {
                    let av = a.at(k, jj + j);
                    for i in 0..mr {
                        col[i] += pu.get(i, k) * av;
                    }
                }
            }
            // triangular corner: column jj+t stops receiving at k = jj+t
            for k in jj..ce {
                let t = k - jj;
                match diag {
                    Diag::NonUnit => {
                        for j in t..nr {
                            let av = a.at(k, jj + j);
                            for i in 0..mr {
                                acc[j][i] += pu.get(i, k) * av;
                            }
                        }
                    }
                    Diag::Unit => {
                        for i in 0..mr {
                            acc[t][i] += pu.get(i, k);
                        }
                        for j in (t + 1)..nr {
                            let av = a.at(k, jj + j);
                            for i in 0..mr {
                                acc[j][i] += pu.get(i, k) * av;
                            }
                        }
                    }
                }
            }
        }
        Uplo::Lower => {
            // triangular corner first to keep k ascending
            for k in jj..ce {
                let t = k - jj;
                match diag {
                    Diag::NonUnit => {
                        for j in 0..=t {
                            let av = a.at(k, jj + j);
                            for i in 0..mr {
                                acc[j][i] += pu.get(i, k) * av;
                            }
                        }
                    }
                    Diag::Unit => {
                        for j in 0..t {
                            let av = a.at(k, jj + j);
                            for i in 0..mr {
                                acc[j][i] += pu.get(i, k) * av;
                            }
                        }
                        for i in 0..mr {
                            acc[t][i] += pu.get(i, k);
                        }
                    }
                }
            }
            // rectangular sweep k >= jj+nr
            for k in ce..kdim {
                for (j, col) in acc.iter_mut().enumerate().take(nr) {
                    let av = a.at(k, jj + j);
                    for i in 0..mr {
                        col[i] += pu.get(i, k) * av;
                    }
                }
            }
        }
    }

    for (j, col) in acc.iter().enumerate().take(nr) {
        let out = d.add(j * ldd);
        for (i, &v) in col.iter().enumerate().take(mr) {
            *out.add(i) = alpha * v;
        }
    }
}

/// Full left-side kernel: a complete `PS x M_KERNEL` tile.
///
/// # Safety
/// Tile and operand bounds per [`left_tile`]; `d` must cover the full tile.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn trmm_left_kernel<R: TriRead>(
    shape: Uplo,
    diag: Diag,
    kdim: usize,
    ii: usize,
    alpha: f64,
    a: R,
    pu: PanelRef,
    d: *mut f64,
    ldd: usize,
) {
    left_tile(shape, diag, kdim, ii, alpha, a, pu, d, ldd, PS, M_KERNEL);
}

/// Remainder left-side kernel: `mr <= PS` rows, `nr <= M_KERNEL` columns.
///
/// # Safety
/// Tile and operand bounds per [`left_tile`]; `d` must cover `mr x nr`.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn trmm_left_kernel_vs<R: TriRead>(
    shape: Uplo,
    diag: Diag,
    kdim: usize,
    ii: usize,
    alpha: f64,
    a: R,
    pu: PanelRef,
    d: *mut f64,
    ldd: usize,
    mr: usize,
    nr: usize,
) {
    left_tile(shape, diag, kdim, ii, alpha, a, pu, d, ldd, mr, nr);
}

/// Full right-side kernel: a complete `M_KERNEL x PS` tile.
///
/// # Safety
/// Tile and operand bounds per [`right_tile`]; `d` must cover the full tile.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn trmm_right_kernel<R: TriRead>(
    shape: Uplo,
    diag: Diag,
    kdim: usize,
    jj: usize,
    alpha: f64,
    a: R,
    pu: PanelRef,
    d: *mut f64,
    ldd: usize,
) {
    right_tile(shape, diag, kdim, jj, alpha, a, pu, d, ldd, M_KERNEL, PS);
}

/// Remainder right-side kernel: `mr <= M_KERNEL` rows, `nr <= PS` columns.
///
/// # Safety
/// Tile and operand bounds per [`right_tile`]; `d` must cover `mr x nr`.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn trmm_right_kernel_vs<R: TriRead>(
    shape: Uplo,
    diag: Diag,
    kdim: usize,
    jj: usize,
    alpha: f64,
    a: R,
    pu: PanelRef,
    d: *mut f64,
    ldd: usize,
    mr: usize,
    nr: usize,
) {
    right_tile(shape, diag, kdim, jj, alpha, a, pu, d, ldd, mr, nr);
}
