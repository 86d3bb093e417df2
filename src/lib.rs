//! Blocked, cache-aware triangular matrix-matrix multiply (TRMM) over
//! column-major `f64` matrices.
//!
//! The crate computes `D = alpha * op(A) * B` (left side) or
//! `D = alpha * B * op(A)` (right side) where `A` is triangular, `op` is
//! identity or transpose, and the diagonal is stored or implicitly unit.
//! Small problems run directly from caller memory with a stack-resident
//! packing buffer; large problems pre-pack the triangular operand once into a
//! heap panel block that is reused across all output strips. The micro-kernel
//! tile shape and the stack/heap thresholds are fixed per CPU tier at build
//! time (see `build.rs`).
//!
//! The BLAS-style in-place form overwrites `B`:
//!
//! ```
//! use trimly::{dtrmm, DMatMut, DMatRef, Diag, Side, Trans, Uplo};
//!
//! // A = [[1, 0], [2, 3]] (lower), B = 2x2 identity, D = 2 * A * B = 2 * A.
//! let a_data = vec![1.0, 2.0, 0.0, 3.0];
//! let mut b_data = vec![1.0, 0.0, 0.0, 1.0];
//!
//! let a = DMatRef::new(&a_data, 2, 2, 2).unwrap();
//! let mut b = DMatMut::new(&mut b_data, 2, 2, 2).unwrap();
//! dtrmm(Side::Left, Uplo::Lower, Trans::NoTrans, Diag::NonUnit, 2, 2, 2.0, &a, &mut b).unwrap();
//!
//! assert_eq!(b_data, vec![2.0, 4.0, 0.0, 6.0]);
//! ```

pub mod error;
pub mod mat;
pub mod target;
pub mod trmm;

mod kernels;
mod pack;
mod scratch;

pub use error::{Result, TrimlyError};
pub use mat::{DMatMut, DMatRef};
pub use trmm::{
    dtrmm, dtrmm_llnn, dtrmm_llnu, dtrmm_lltn, dtrmm_lltu, dtrmm_lunn, dtrmm_lunu, dtrmm_lutn,
    dtrmm_lutu, dtrmm_rlnn, dtrmm_rlnu, dtrmm_rltn, dtrmm_rltu, dtrmm_runn, dtrmm_runu,
    dtrmm_rutn, dtrmm_rutu,
};

/// Which side the triangular operand multiplies from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// `D = alpha * op(A) * B` with `A` of order `m`.
    Left,
    /// `D = alpha * B * op(A)` with `A` of order `n`.
    Right,
}

/// Which triangular half of `A` is logically significant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Uplo {
    Lower,
    Upper,
}

impl Uplo {
    #[inline]
    pub(crate) fn flip(self) -> Uplo {
        match self {
            Uplo::Lower => Uplo::Upper,
            Uplo::Upper => Uplo::Lower,
        }
    }
}

/// Whether `op(A)` is `A` or its transpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trans {
    NoTrans,
    Trans,
}

impl Trans {
    #[inline]
    pub(crate) fn flip(self) -> Trans {
        match self {
            Trans::NoTrans => Trans::Trans,
            Trans::Trans => Trans::NoTrans,
        }
    }
}

/// Whether the diagonal of `A` is stored or implicitly all ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diag {
    NonUnit,
    /// The diagonal is taken as 1; its storage is never read.
    Unit,
}
