//! Reference kernels for the operators whose types are inferred in [`ops`].
//!
//! These define the execution-time behavior that inference describes. They
//! validate their arguments with the same inference rules, so a kernel fails
//! exactly when adding the operator to a graph with the same input would.
//!
//! [`ops`]: crate::ops

use std::sync::OnceLock;

use rayon::prelude::*;

use crate::axes::{validate_axes, AxisSet};
use crate::element_type::Element;
use crate::env::env_flag;
use crate::errors::InferError;
use crate::infer::InferTypes;
use crate::ops::{Reduce, ReduceElement, ReductionKind, Reverse, ReverseAxes};
use crate::shape::{Rank, Shape};
use crate::tensor::{contiguous_strides, Tensor};
use crate::threading::thread_pool;

/// Return true if reference kernels should split work across the thread
/// pool. Controlled by `TESSERA_PARALLEL`, which is read once per process.
fn parallel_enabled() -> bool {
    static PARALLEL: OnceLock<bool> = OnceLock::new();
    *PARALLEL.get_or_init(|| env_flag("TESSERA_PARALLEL", true))
}

/// Compute `len` output lanes using `lane`, in the thread pool if `parallel`
/// is set.
fn collect_lanes<T, F>(len: usize, parallel: bool, lane: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    if parallel {
        thread_pool().run(|| (0..len).into_par_iter().map(lane).collect())
    } else {
        (0..len).map(lane).collect()
    }
}

/// Map a flat index within the space spanned by `sizes` to an offset using
/// `strides`.
fn offset_of(mut index: usize, sizes: &[usize], strides: &[usize]) -> usize {
    let mut offset = 0;
    for (&size, &stride) in sizes.iter().zip(strides).rev() {
        offset += (index % size) * stride;
        index /= size;
    }
    offset
}

/// Reduce `input` over `axes` using `kind`.
///
/// Every output element starts as the identity of `kind` and the reduced
/// input elements are combined into it, so reducing over an axis of size
/// zero fills the output with the identity.
pub fn reduce<T: ReduceElement + Element>(
    input: &Tensor<T>,
    axes: &[i64],
    keep_dims: bool,
    kind: ReductionKind,
) -> Result<Tensor<T>, InferError> {
    let op = Reduce::new(kind, axes, keep_dims);
    op.infer_types(&[input.info()])?;
    let axes = validate_axes(Rank::Known(input.ndim()), axes)?;

    let shape = input.shape().dims();
    let strides = contiguous_strides(shape);

    let (kept, reduced): (Vec<usize>, Vec<usize>) =
        (0..input.ndim()).partition(|&axis| !axes.contains(axis));
    let sizes_of = |dims: &[usize]| -> (Vec<usize>, Vec<usize>) {
        dims.iter().map(|&d| (shape[d], strides[d])).unzip()
    };
    let (kept_sizes, kept_strides) = sizes_of(&kept);
    let (reduced_sizes, reduced_strides) = sizes_of(&reduced);

    let n_outputs: usize = kept_sizes.iter().product();
    let n_reduced: usize = reduced_sizes.iter().product();
    let data = input.data();

    let reduce_lane = |out_index: usize| -> T {
        let base = offset_of(out_index, &kept_sizes, &kept_strides);
        (0..n_reduced).fold(T::identity(kind), |acc, i| {
            let offset = base + offset_of(i, &reduced_sizes, &reduced_strides);
            T::combine(kind, acc, data[offset])
        })
    };

    let output = collect_lanes(n_outputs, parallel_enabled(), reduce_lane);

    let out_shape: Shape = (0..input.ndim())
        .filter_map(|axis| {
            if !axes.contains(axis) {
                Some(shape[axis])
            } else if keep_dims {
                Some(1)
            } else {
                None
            }
        })
        .collect();
    Ok(Tensor::from_vec_unchecked(out_shape, output))
}

/// Reverse the order of elements in `input` along `axes`.
pub fn reverse<T: Clone + Element>(
    input: &Tensor<T>,
    axes: &ReverseAxes,
) -> Result<Tensor<T>, InferError> {
    let op = Reverse { axes: axes.clone() };
    op.infer_types(&[input.info()])?;
    let axes: AxisSet = axes.resolve(Rank::Known(input.ndim()))?;

    let shape = input.shape().dims();
    let strides = contiguous_strides(shape);

    // Reversing an axis of size `n` maps index `i` to `n - 1 - i`, which is
    // the same as starting at the end of the axis and stepping backwards.
    let mut start = 0;
    for axis in axes.iter() {
        if shape[axis] > 0 {
            start += (shape[axis] - 1) * strides[axis];
        }
    }

    let data = input.data();
    let output = (0..input.len())
        .map(|i| {
            let mut index = i;
            let mut offset = start;
            for axis in (0..shape.len()).rev() {
                let coord = index % shape[axis];
                index /= shape[axis];
                if axes.contains(axis) {
                    offset -= coord * strides[axis];
                } else {
                    offset += coord * strides[axis];
                }
            }
            data[offset].clone()
        })
        .collect();

    Ok(Tensor::from_vec_unchecked(input.shape().clone(), output))
}
