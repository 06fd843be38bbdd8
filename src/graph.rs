//! Graph of operators whose outputs are typed as nodes are added.

use std::error::Error;
use std::fmt;

use crate::diagnostics::{DiagnosticLevel, Diagnostics};
use crate::element_type::ElementType;
use crate::env;
use crate::errors::InferError;
use crate::infer::{InferTypes, TensorInfo};
use crate::operator::OpKind;
use crate::shape::PartialShape;

mod node_id;

pub use node_id::NodeId;

/// Graph input with a declared element type and shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterNode {
    name: String,
    output: TensorInfo,
}

/// Operator applied to the outputs of other nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorNode {
    name: String,
    op: OpKind,
    inputs: Vec<NodeId>,
    output: TensorInfo,
}

impl OperatorNode {
    pub fn op(&self) -> &OpKind {
        &self.op
    }

    pub fn input_ids(&self) -> &[NodeId] {
        &self.inputs
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Parameter(ParameterNode),
    Operator(OperatorNode),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Parameter(node) => &node.name,
            Node::Operator(node) => &node.name,
        }
    }

    /// Return the inferred element type and shape of the node's output.
    pub fn output(&self) -> &TensorInfo {
        match self {
            Node::Parameter(node) => &node.output,
            Node::Operator(node) => &node.output,
        }
    }

    pub fn as_operator(&self) -> Option<&OperatorNode> {
        match self {
            Node::Operator(node) => Some(node),
            Node::Parameter(_) => None,
        }
    }
}

/// Reasons why an operator node could not be added to a graph.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeErrorKind {
    /// An input ID does not refer to a node in the graph.
    InvalidInput(NodeId),

    /// Type or shape inference failed.
    Infer(InferError),
}

impl fmt::Display for NodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeErrorKind::InvalidInput(id) => write!(f, "input node {} does not exist", id),
            NodeErrorKind::Infer(err) => write!(f, "{}", err),
        }
    }
}

/// Error adding an operator node, with the name and type of the node that
/// failed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeError {
    pub name: String,
    pub op: String,
    pub kind: NodeErrorKind,
}

impl NodeError {
    /// Return the inference error, if this error was caused by inference
    /// failing.
    pub fn infer_error(&self) -> Option<&InferError> {
        match &self.kind {
            NodeErrorKind::Infer(err) => Some(err),
            NodeErrorKind::InvalidInput(_) => None,
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "While validating node '{}' ({}): {}",
            self.name, self.op, self.kind
        )
    }
}

impl Error for NodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            NodeErrorKind::Infer(err) => Some(err),
            NodeErrorKind::InvalidInput(_) => None,
        }
    }
}

/// A graph of parameters and operators.
///
/// Each operator's output type and shape is inferred when the operator is
/// added, from the outputs of its inputs. Nodes can only refer to nodes added
/// before them, so the graph is always acyclic and inference runs in
/// topological order.
#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    diagnostics: Diagnostics,
}

impl Graph {
    /// Create an empty graph.
    ///
    /// The diagnostic level is read from the `TESSERA_DIAGNOSTICS`
    /// environment variable.
    pub fn new() -> Graph {
        Graph {
            nodes: Vec::new(),
            diagnostics: Diagnostics::new(env::diagnostic_level()),
        }
    }

    pub fn set_diagnostic_level(&mut self, level: DiagnosticLevel) {
        self.diagnostics.set_level(level);
    }

    /// Add a graph input and return its ID.
    pub fn add_parameter(
        &mut self,
        name: &str,
        element_type: ElementType,
        shape: impl Into<PartialShape>,
    ) -> NodeId {
        self.push(Node::Parameter(ParameterNode {
            name: name.to_string(),
            output: TensorInfo::new(element_type, shape),
        }))
    }

    /// Add an operator node and infer its output.
    ///
    /// If any input ID is invalid or inference fails, the graph is left
    /// unchanged and an error identifying the node is returned.
    pub fn add_op(
        &mut self,
        name: &str,
        op: impl Into<OpKind>,
        inputs: &[NodeId],
    ) -> Result<NodeId, NodeError> {
        let op = op.into();
        let node_error = |kind: NodeErrorKind| NodeError {
            name: name.to_string(),
            op: op.name().to_string(),
            kind,
        };

        let mut input_info = Vec::with_capacity(inputs.len());
        for &id in inputs {
            let node = self
                .get_node(id)
                .ok_or_else(|| node_error(NodeErrorKind::InvalidInput(id)))?;
            input_info.push(node.output().clone());
        }

        let output = match op.infer_types(&input_info) {
            Ok(output) => output,
            Err(err) => {
                let err = node_error(NodeErrorKind::Infer(err));
                self.diagnostics.warn(name, format_args!("{}", err.kind));
                return Err(err);
            }
        };

        let id = NodeId::from_u32(self.nodes.len() as u32);
        self.diagnostics
            .info(id, name, format_args!("{} -> {}", op, output));
        self.push(Node::Operator(OperatorNode {
            name: name.to_string(),
            op,
            inputs: inputs.to_vec(),
            output,
        }));
        Ok(id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.as_usize())
    }

    /// Return the inferred output of a node.
    pub fn output_info(&self, id: NodeId) -> Option<&TensorInfo> {
        self.get_node(id).map(|node| node.output())
    }

    /// Return the ID of the first node with a given name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name() == name)
            .map(|pos| NodeId::from_u32(pos as u32))
    }

    /// Return the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::from_u32(i as u32), node))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_u32(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
