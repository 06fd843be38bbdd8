//! tessera infers the element types and shapes of values in tensor
//! computation graphs.
//!
//! Each operator's output is described by a [`TensorInfo`]: an
//! [`ElementType`] plus a [`PartialShape`], where either the rank or
//! individual dimensions may be unknown. Inference propagates whatever is
//! known from an operator's inputs to its output and reports inputs that can
//! never be valid, such as out-of-range axes or conflicting element types.
//!
//! # Example
//!
//! ```
//! use tessera::ops::{Reduce, ReductionKind, Reverse};
//! use tessera::{partial_shape, ElementType, Graph, PartialShape};
//!
//! let mut graph = Graph::new();
//! let x = graph.add_parameter("x", ElementType::F32, partial_shape!(?, 3, 4));
//!
//! let max = graph
//!     .add_op("max", Reduce::new(ReductionKind::Max, &[-1], false), &[x])
//!     .unwrap();
//! assert_eq!(graph.output_info(max).unwrap().shape, partial_shape!(?, 3));
//!
//! let err = graph
//!     .add_op("rev", Reverse::with_indices(&[0, 3]), &[max])
//!     .unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "While validating node 'rev' (Reverse): Some of the provided axes (AxisSet{3}) are out of bounds (input rank: 2)."
//! );
//! ```
//!
//! # Reference kernels
//!
//! The [`reference`] module executes reductions and reversals on [`Tensor`]s,
//! defining the runtime behavior that inference describes, including the
//! identity values produced when reducing over empty axes.
//!
//! # Configuration
//!
//! - `TESSERA_DIAGNOSTICS` (`off`, `warn` or `info`) sets the default
//!   diagnostic level of new graphs. Diagnostics are emitted as
//!   [`tracing`](https://docs.rs/tracing) events.
//! - `TESSERA_NUM_THREADS` sets the size of the thread pool used by the
//!   reference kernels.
//! - `TESSERA_PARALLEL=0` makes the reference kernels run on the calling
//!   thread.

mod axes;
mod diagnostics;
mod dimension;
mod element_type;
mod env;
mod errors;
mod graph;
mod infer;
mod operator;
mod shape;
mod tensor;
mod threading;

#[cfg(feature = "serde")]
mod impl_serialize;

pub mod ops;
pub mod reference;

pub use axes::{validate_axes, AxisSet};
pub use diagnostics::DiagnosticLevel;
pub use dimension::Dimension;
pub use element_type::{Element, ElementType, ElementTypeAttrs, ParseElementTypeError};
pub use env::{env_flag, str_as_bool};
pub use errors::{
    AxisOutOfBounds, DimConflict, InferError, InvalidAttributeQuery, MergeConflict, ShapeConflict,
};
pub use graph::{Graph, Node, NodeError, NodeErrorKind, NodeId, OperatorNode, ParameterNode};
pub use infer::{InferTypes, TensorInfo, UnaryOp};
pub use operator::OpKind;
pub use shape::{PartialShape, Rank, Shape};
pub use tensor::{FromDataError, Tensor};
pub use threading::{thread_pool, ThreadPool};
