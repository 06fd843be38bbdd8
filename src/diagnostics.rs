use std::fmt;

use rustc_hash::FxHashSet;

use crate::graph::NodeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Don't show any diagnostics.
    Off,
    /// Report only nodes which failed validation.
    Warn,
    /// Report the inferred output of every node.
    Info,
}

/// Diagnostic reporter for node construction.
///
/// Messages are emitted as `tracing` events.
#[derive(Debug)]
pub struct Diagnostics {
    /// Names of nodes against which warnings have been reported.
    ///
    /// Nodes which fail validation are never added to the graph and so have
    /// no ID. They are identified by name instead.
    warned_nodes: FxHashSet<String>,
    level: DiagnosticLevel,
}

impl Diagnostics {
    pub fn new(level: DiagnosticLevel) -> Self {
        Self {
            warned_nodes: FxHashSet::default(),
            level,
        }
    }

    /// Enable reporting of all messages at or above a given level.
    pub fn set_level(&mut self, level: DiagnosticLevel) {
        self.level = level;
    }

    /// Return true if diagnostic messages are enabled at a given level.
    pub fn enabled(&self, level: DiagnosticLevel) -> bool {
        self.level >= level
    }

    /// Report a message for a node at the [`Info`](DiagnosticLevel::Info) level.
    pub fn info(&self, node: NodeId, name: &str, message: fmt::Arguments<'_>) {
        if !self.enabled(DiagnosticLevel::Info) {
            return;
        }
        tracing::info!(node = node.as_u32(), name, "{}", message);
    }

    /// Report a message for a node at the [`Warn`](DiagnosticLevel::Warn) level.
    ///
    /// Only the first warning for each node name is reported. Returns true if
    /// the message was reported.
    pub fn warn(&mut self, name: &str, message: fmt::Arguments<'_>) -> bool {
        if !self.enabled(DiagnosticLevel::Warn) || self.warned_nodes.contains(name) {
            return false;
        }
        self.warned_nodes.insert(name.to_string());
        tracing::warn!(name, "{}", message);
        true
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DiagnosticLevel::Off)
    }
}
