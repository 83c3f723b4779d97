//! Memory layout of caller-owned Jacobian buffers.
//!
//! Blocks are stored row-major, except a block with a single parameter, which is
//! described as column-major. A single column has the same offsets in either order,
//! so both produce identical buffers; nalgebra views accept any strides, so the choice
//! only documents the shape.

use nalgebra::{DMatrix, Dim, Dyn, MatrixView, MatrixViewMut};

/// Strided read-only view over a Jacobian buffer.
pub type JacobianView<'a, R, C> = MatrixView<'a, f64, R, C, Dyn, Dyn>;
/// Strided mutable view over a Jacobian buffer.
pub type JacobianViewMut<'a, R, C> = MatrixViewMut<'a, f64, R, C, Dyn, Dyn>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianLayout {
    RowMajor,
    ColumnMajor,
}

impl JacobianLayout {
    pub fn for_block_size(block_size: usize) -> Self {
        if block_size == 1 {
            JacobianLayout::ColumnMajor
        } else {
            JacobianLayout::RowMajor
        }
    }

    /// (row stride, column stride) of a `nrows x ncols` buffer.
    pub fn strides(self, nrows: usize, ncols: usize) -> (usize, usize) {
        match self {
            JacobianLayout::RowMajor => (ncols, 1),
            JacobianLayout::ColumnMajor => (1, nrows),
        }
    }

    /// Buffer offset of entry `(row, col)`.
    pub fn offset(self, row: usize, col: usize, nrows: usize, ncols: usize) -> usize {
        let (rstride, cstride) = self.strides(nrows, ncols);
        row * rstride + col * cstride
    }

    /// Panics if `buffer` is shorter than `nrows * ncols`.
    pub fn view<R: Dim, C: Dim>(self, buffer: &[f64], nrows: R, ncols: C) -> JacobianView<'_, R, C> {
        let (rstride, cstride) = self.strides(nrows.value(), ncols.value());
        MatrixView::from_slice_with_strides_generic(buffer, nrows, ncols, Dyn(rstride), Dyn(cstride))
    }

    /// Panics if `buffer` is shorter than `nrows * ncols`.
    pub fn view_mut<R: Dim, C: Dim>(
        self,
        buffer: &mut [f64],
        nrows: R,
        ncols: C,
    ) -> JacobianViewMut<'_, R, C> {
        let (rstride, cstride) = self.strides(nrows.value(), ncols.value());
        MatrixViewMut::from_slice_with_strides_generic(
            buffer,
            nrows,
            ncols,
            Dyn(rstride),
            Dyn(cstride),
        )
    }
}

/// Copies a Jacobian block written by the engine into an owned matrix.
pub fn to_matrix(buffer: &[f64], nrows: usize, ncols: usize) -> DMatrix<f64> {
    JacobianLayout::for_block_size(ncols)
        .view(buffer, Dyn(nrows), Dyn(ncols))
        .into_owned()
}
