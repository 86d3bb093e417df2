//! Blocked TRMM drivers and public entry points.
//!
//! Two parameterized drivers cover all sixteen descriptor combinations: the
//! left driver computes `D = alpha * op(A) * B`, the right driver
//! `D = alpha * B * op(A)`. Each one packs an `M_KERNEL`-wide strip of B
//! (transposed for left, straight for right), then sweeps 4-wide output tiles
//! across the strip with full kernels plus one remainder tile. The strip copy
//! is taken before the matching strip of D is written, which is what makes
//! the in-place BLAS form (D aliasing B) safe in every traversal order.
//!
//! The stack path reads the triangular operand straight out of caller memory;
//! the heap path packs it once into panel scratch and reuses the packed copy
//! for every strip. Both paths run the same loops with the same accumulation
//! order, so their results are bitwise identical.

use crate::error::{validation_error, Result};
use crate::kernels::{
    trmm_left_kernel, trmm_left_kernel_vs, trmm_right_kernel, trmm_right_kernel_vs, CmStraight,
    CmSwapped, PmStraight, PmSwapped, TriRead,
};
use crate::mat::{DstView, SrcView};
use crate::pack::{pack_nn, pack_nn_vs, pack_tn, pack_tn_vs, pack_tri, PanelMut};
use crate::scratch::{HeapScratch, StackScratch};
use crate::target::{choose_plan, Plan, M_KERNEL, PS};
use crate::{DMatMut, DMatRef, Diag, Side, Trans, Uplo};

/// Triangle of `op(A)`.
#[inline]
fn op_shape(uplo: Uplo, trans: Trans) -> Uplo {
    match trans {
        Trans::NoTrans => uplo,
        Trans::Trans => uplo.flip(),
    }
}

// ---------------------------------------------------------------------------
// left side: D = alpha * op(A) * B
// ---------------------------------------------------------------------------

/// Strip/tile loop shared by both left-side paths. `a` reads `op(A)`.
#[allow(clippy::too_many_arguments)]
fn left_strip_loop<R: TriRead>(
    shape: Uplo,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: f64,
    a: R,
    b: SrcView,
    d: DstView,
    pu: &mut PanelMut,
) {
    let mut jj = 0;
    while jj < n {
        let nb = (n - jj).min(M_KERNEL);

        // pack B[0..m, jj..jj+nb] transposed, one panel per 4 columns
        for g in 0..nb.div_ceil(PS) {
            let cols = (nb - g * PS).min(PS);
            // SAFETY: the packed columns lie inside B's window.
            unsafe {
                let src = b.el(0, jj + g * PS);
                if cols == PS {
                    pack_tn(m, src, b.ld, pu.panel_mut(g));
                } else {
                    pack_tn_vs(m, src, b.ld, pu.panel_mut(g), cols);
                }
            }
        }

        let pur = pu.as_ref();
        let mut ii = 0;
        while ii < m {
            let mr = (m - ii).min(PS);
            // SAFETY: the tile lies inside D's window; operand reads stay
            // inside the declared triangle (zero-filled slots for packed).
            unsafe {
                let dt = d.el(ii, jj);
                if mr == PS && nb == M_KERNEL {
                    trmm_left_kernel(shape, diag, m, ii, alpha, a, pur, dt, d.ld);
                } else {
                    trmm_left_kernel_vs(shape, diag, m, ii, alpha, a, pur, dt, d.ld, mr, nb);
                }
            }
            ii += PS;
        }

        jj += M_KERNEL;
    }
}

/// Small-problem path: strip buffer on the stack, operand in caller memory.
#[allow(clippy::too_many_arguments)]
fn trmm_left_stack(
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    plan: Plan,
    m: usize,
    n: usize,
    alpha: f64,
    a: SrcView,
    b: SrcView,
    d: DstView,
) {
    let shape = op_shape(uplo, trans);
    let mut scratch = StackScratch::new();
    let mut pu = PanelMut::new(scratch.strip(plan.sdu), plan.sdu);

    match trans {
        Trans::NoTrans => left_strip_loop(shape, diag, m, n, alpha, CmStraight(a), b, d, &mut pu),
        Trans::Trans => left_strip_loop(shape, diag, m, n, alpha, CmSwapped(a), b, d, &mut pu),
    }
}

/// Large-problem path: one heap allocation holds the strip buffer and the
/// pre-packed `op(A)`, whose packing cost is amortized over all strips.
#[allow(clippy::too_many_arguments)]
fn trmm_left_heap(
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    plan: Plan,
    m: usize,
    n: usize,
    alpha: f64,
    a: SrcView,
    b: SrcView,
    d: DstView,
) -> Result<()> {
    let shape = op_shape(uplo, trans);
    let sdu = m.next_multiple_of(PS);

    let strip_cap = M_KERNEL * plan.heap_dim;
    let tri_cap = plan.heap_dim * plan.heap_dim;
    let mut mem = HeapScratch::acquire(strip_cap + tri_cap)?;
    let (strip_buf, tri_buf) = mem.as_mut_slice().split_at_mut(strip_cap);

    let mut pu = PanelMut::new(&mut strip_buf[..M_KERNEL * sdu], sdu);
    let mut pa = PanelMut::new(&mut tri_buf[..m.div_ceil(PS) * PS * sdu], sdu);

    // SAFETY: A covers an order-m window; pa has sd = sdu >= m.
    unsafe { pack_tri(uplo, trans, diag, m, a, &mut pa) };

    left_strip_loop(shape, diag, m, n, alpha, PmStraight(pa.as_ref()), b, d, &mut pu);
    Ok(())
}

// ---------------------------------------------------------------------------
// right side: D = alpha * B * op(A)
// ---------------------------------------------------------------------------

/// Strip/tile loop shared by both right-side paths. `a` reads `op(A)`.
#[allow(clippy::too_many_arguments)]
fn right_strip_loop<R: TriRead>(
    shape: Uplo,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: f64,
    a: R,
    b: SrcView,
    d: DstView,
    pu: &mut PanelMut,
) {
    let mut ii = 0;
    while ii < m {
        let mb = (m - ii).min(M_KERNEL);

        // pack B[ii..ii+mb, 0..n] straight, one panel per 4 rows
        for g in 0..mb.div_ceil(PS) {
            let rows = (mb - g * PS).min(PS);
            // SAFETY: the packed rows lie inside B's window.
            unsafe {
                let src = b.el(ii + g * PS, 0);
                if rows == PS {
                    pack_nn(n, src, b.ld, pu.panel_mut(g));
                } else {
                    pack_nn_vs(n, src, b.ld, pu.panel_mut(g), rows);
                }
            }
        }

        let pur = pu.as_ref();
        let mut jj = 0;
        while jj < n {
            let nr = (n - jj).min(PS);
            // SAFETY: the tile lies inside D's window; operand reads stay
            // inside the declared triangle (zero-filled slots for packed).
            unsafe {
                let dt = d.el(ii, jj);
                if mb == M_KERNEL && nr == PS {
                    trmm_right_kernel(shape, diag, n, jj, alpha, a, pur, dt, d.ld);
                } else {
                    trmm_right_kernel_vs(shape, diag, n, jj, alpha, a, pur, dt, d.ld, mb, nr);
                }
            }
            jj += PS;
        }

        ii += M_KERNEL;
    }
}

#[allow(clippy::too_many_arguments)]
fn trmm_right_stack(
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    plan: Plan,
    m: usize,
    n: usize,
    alpha: f64,
    a: SrcView,
    b: SrcView,
    d: DstView,
) {
    let shape = op_shape(uplo, trans);
    let mut scratch = StackScratch::new();
    let mut pu = PanelMut::new(scratch.strip(plan.sdu), plan.sdu);

    match trans {
        Trans::NoTrans => right_strip_loop(shape, diag, m, n, alpha, CmStraight(a), b, d, &mut pu),
        Trans::Trans => right_strip_loop(shape, diag, m, n, alpha, CmSwapped(a), b, d, &mut pu),
    }
}

#[allow(clippy::too_many_arguments)]
fn trmm_right_heap(
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    plan: Plan,
    m: usize,
    n: usize,
    alpha: f64,
    a: SrcView,
    b: SrcView,
    d: DstView,
) -> Result<()> {
    let shape = op_shape(uplo, trans);
    let sdu = n.next_multiple_of(PS);

    let strip_cap = M_KERNEL * plan.heap_dim;
    let tri_cap = plan.heap_dim * plan.heap_dim;
    let mut mem = HeapScratch::acquire(strip_cap + tri_cap)?;
    let (strip_buf, tri_buf) = mem.as_mut_slice().split_at_mut(strip_cap);

    let mut pu = PanelMut::new(&mut strip_buf[..M_KERNEL * sdu], sdu);
    let mut pa = PanelMut::new(&mut tri_buf[..n.div_ceil(PS) * PS * sdu], sdu);

    // The kernels read op(A) by columns, so the packed copy holds op(A)^T
    // (flip the transpose) and is read through the swapped panel reader.
    // SAFETY: A covers an order-n window; pa has sd = sdu >= n.
    unsafe { pack_tri(uplo, trans.flip(), diag, n, a, &mut pa) };

    right_strip_loop(shape, diag, m, n, alpha, PmSwapped(pa.as_ref()), b, d, &mut pu);
    Ok(())
}

// ---------------------------------------------------------------------------
// dispatch + entry points
// ---------------------------------------------------------------------------

/// Runs one TRMM call over raw views. Views must already be validated.
#[allow(clippy::too_many_arguments)]
pub(crate) fn trmm_exec(
    side: Side,
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: f64,
    a: SrcView,
    b: SrcView,
    d: DstView,
) -> Result<()> {
    let Some(plan) = choose_plan(m, n, side, uplo, trans) else {
        // degenerate sizes: successful no-op, nothing allocated
        return Ok(());
    };

    match (side, plan.use_heap) {
        (Side::Left, false) => {
            trmm_left_stack(uplo, trans, diag, plan, m, n, alpha, a, b, d);
            Ok(())
        }
        (Side::Left, true) => trmm_left_heap(uplo, trans, diag, plan, m, n, alpha, a, b, d),
        (Side::Right, false) => {
            trmm_right_stack(uplo, trans, diag, plan, m, n, alpha, a, b, d);
            Ok(())
        }
        (Side::Right, true) => trmm_right_heap(uplo, trans, diag, plan, m, n, alpha, a, b, d),
    }
}

/// Entry-point dimension checks; flag validity is enforced by the enums.
fn check_operands(
    side: Side,
    m: usize,
    n: usize,
    a: &DMatRef<'_>,
    b_dims: (usize, usize),
    d_dims: Option<(usize, usize)>,
) -> Result<()> {
    let k0 = match side {
        Side::Left => m,
        Side::Right => n,
    };
    if a.rows() < k0 || a.cols() < k0 {
        return Err(validation_error(format!(
            "triangular operand A is {}x{} but the call needs order {}",
            a.rows(),
            a.cols(),
            k0
        )));
    }
    if b_dims.0 < m || b_dims.1 < n {
        return Err(validation_error(format!(
            "input B is {}x{} but the call needs {}x{}",
            b_dims.0, b_dims.1, m, n
        )));
    }
    if let Some((dr, dc)) = d_dims {
        if dr < m || dc < n {
            return Err(validation_error(format!(
                "output D is {}x{} but the call needs {}x{}",
                dr, dc, m, n
            )));
        }
    }
    Ok(())
}

/// Triangular matrix-matrix multiply, BLAS-style in-place form.
///
/// Overwrites `b` with `alpha * op(A) * B` (`Side::Left`) or
/// `alpha * B * op(A)` (`Side::Right`); `A` is the order-`m` (left) or
/// order-`n` (right) triangle selected by `uplo`, `trans` and `diag`.
/// Sizes `m == 0 || n == 0` are a successful no-op.
#[allow(clippy::too_many_arguments)]
pub fn dtrmm(
    side: Side,
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    m: usize,
    n: usize,
    alpha: f64,
    a: &DMatRef<'_>,
    b: &mut DMatMut<'_>,
) -> Result<()> {
    check_operands(side, m, n, a, (b.rows(), b.cols()), None)?;
    let (bs, bd) = b.raw_in_place();
    trmm_exec(side, uplo, trans, diag, m, n, alpha, a.raw(), bs, bd)
}

macro_rules! dtrmm_variant {
    ($(#[$meta:meta])* $name:ident, $side:expr, $uplo:expr, $trans:expr, $diag:expr) => {
        $(#[$meta])*
        pub fn $name(
            m: usize,
            n: usize,
            alpha: f64,
            a: &DMatRef<'_>,
            b: &DMatRef<'_>,
            d: &mut DMatMut<'_>,
        ) -> Result<()> {
            check_operands($side, m, n, a, (b.rows(), b.cols()), Some((d.rows(), d.cols())))?;
            trmm_exec(
                $side, $uplo, $trans, $diag, m, n, alpha, a.raw(), b.raw(), d.raw_mut(),
            )
        }
    };
}

dtrmm_variant!(
    /// `D = alpha * A * B`, A lower triangular, stored diagonal.
    dtrmm_llnn, Side::Left, Uplo::Lower, Trans::NoTrans, Diag::NonUnit
);
dtrmm_variant!(
    /// `D = alpha * A * B`, A lower triangular, unit diagonal.
    dtrmm_llnu, Side::Left, Uplo::Lower, Trans::NoTrans, Diag::Unit
);
dtrmm_variant!(
    /// `D = alpha * A^T * B`, A lower triangular, stored diagonal.
    dtrmm_lltn, Side::Left, Uplo::Lower, Trans::Trans, Diag::NonUnit
);
dtrmm_variant!(
    /// `D = alpha * A^T * B`, A lower triangular, unit diagonal.
    dtrmm_lltu, Side::Left, Uplo::Lower, Trans::Trans, Diag::Unit
);
dtrmm_variant!(
    /// `D = alpha * A * B`, A upper triangular, stored diagonal.
    dtrmm_lunn, Side::Left, Uplo::Upper, Trans::NoTrans, Diag::NonUnit
);
dtrmm_variant!(
    /// `D = alpha * A * B`, A upper triangular, unit diagonal.
    dtrmm_lunu, Side::Left, Uplo::Upper, Trans::NoTrans, Diag::Unit
);
dtrmm_variant!(
    /// `D = alpha * A^T * B`, A upper triangular, stored diagonal.
    dtrmm_lutn, Side::Left, Uplo::Upper, Trans::Trans, Diag::NonUnit
);
dtrmm_variant!(
    /// `D = alpha * A^T * B`, A upper triangular, unit diagonal.
    dtrmm_lutu, Side::Left, Uplo::Upper, Trans::Trans, Diag::Unit
);
dtrmm_variant!(
    /// `D = alpha * B * A`, A lower triangular, stored diagonal.
    dtrmm_rlnn, Side::Right, Uplo::Lower, Trans::NoTrans, Diag::NonUnit
);
dtrmm_variant!(
    /// `D = alpha * B * A`, A lower triangular, unit diagonal.
    dtrmm_rlnu, Side::Right, Uplo::Lower, Trans::NoTrans, Diag::Unit
);
dtrmm_variant!(
    /// `D = alpha * B * A^T`, A lower triangular, stored diagonal.
    dtrmm_rltn, Side::Right, Uplo::Lower, Trans::Trans, Diag::NonUnit
);
dtrmm_variant!(
    /// `D = alpha * B * A^T`, A lower triangular, unit diagonal.
    dtrmm_rltu, Side::Right, Uplo::Lower, Trans::Trans, Diag::Unit
);
dtrmm_variant!(
    /// `D = alpha * B * A`, A upper triangular, stored diagonal.
    dtrmm_runn, Side::Right, Uplo::Upper, Trans::NoTrans, Diag::NonUnit
);
dtrmm_variant!(
    /// `D = alpha * B * A`, A upper triangular, unit diagonal.
    dtrmm_runu, Side::Right, Uplo::Upper, Trans::NoTrans, Diag::Unit
);
dtrmm_variant!(
    /// `D = alpha * B * A^T`, A upper triangular, stored diagonal.
    dtrmm_rutn, Side::Right, Uplo::Upper, Trans::Trans, Diag::NonUnit
);
dtrmm_variant!(
    /// `D = alpha * B * A^T`, A upper triangular, unit diagonal.
    dtrmm_rutu, Side::Right, Uplo::Upper, Trans::Trans, Diag::Unit
);
