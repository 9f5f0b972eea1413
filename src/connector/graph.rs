//! Connector storage and linking

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{ForgeError, Result};
use crate::core::types::{ComponentId, IdAllocator, InputId, NodeId, OutputId};

/// Bit set of physics layers a probe is allowed to hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);

    pub fn single(layer: u32) -> Self {
        Self(1 << layer.min(31))
    }

    pub fn contains(&self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

/// The (input, output) pair that triggered a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorPair {
    pub input: InputId,
    pub output: OutputId,
}

impl ConnectorPair {
    pub fn new(input: InputId, output: OutputId) -> Self {
        Self { input, output }
    }
}

/// Passive connector awaiting an output
#[derive(Debug, Clone)]
pub struct ConnectorInput {
    pub id: InputId,
    pub component: ComponentId,
    pub node: NodeId,
    pub layer: u32,
    pub enabled: bool,
    connected_to: Option<OutputId>,
}

impl ConnectorInput {
    pub fn connected(&self) -> bool {
        self.connected_to.is_some()
    }

    pub fn connected_to(&self) -> Option<OutputId> {
        self.connected_to
    }
}

/// Active connector that probes for a free input
#[derive(Debug, Clone)]
pub struct ConnectorOutput {
    pub id: OutputId,
    pub component: ComponentId,
    pub node: NodeId,
    /// How far the probe ray reaches
    pub distance: f32,
    /// Layers the probe ray may hit
    pub mask: LayerMask,
    pub enabled: bool,
    connected_to: Option<InputId>,
}

impl ConnectorOutput {
    pub fn connected(&self) -> bool {
        self.connected_to.is_some()
    }

    pub fn connected_to(&self) -> Option<InputId> {
        self.connected_to
    }
}

/// All connectors in a workshop.
///
/// Connection state only changes through [`ConnectorGraph::link`], which
/// writes both halves together, so an input and its output always agree.
#[derive(Debug, Clone)]
pub struct ConnectorGraph {
    inputs: AHashMap<InputId, ConnectorInput>,
    outputs: AHashMap<OutputId, ConnectorOutput>,
    ids: IdAllocator,
}

impl ConnectorGraph {
    pub fn new() -> Self {
        Self {
            inputs: AHashMap::new(),
            outputs: AHashMap::new(),
            ids: IdAllocator::new(),
        }
    }

    pub fn add_input(&mut self, component: ComponentId, node: NodeId, layer: u32) -> InputId {
        let id = InputId(self.ids.next_raw());
        self.inputs.insert(
            id,
            ConnectorInput {
                id,
                component,
                node,
                layer,
                enabled: true,
                connected_to: None,
            },
        );
        id
    }

    pub fn add_output(
        &mut self,
        component: ComponentId,
        node: NodeId,
        distance: f32,
        mask: LayerMask,
    ) -> OutputId {
        let id = OutputId(self.ids.next_raw());
        self.outputs.insert(
            id,
            ConnectorOutput {
                id,
                component,
                node,
                distance,
                mask,
                enabled: true,
                connected_to: None,
            },
        );
        id
    }

    pub fn input(&self, id: InputId) -> Result<&ConnectorInput> {
        self.inputs.get(&id).ok_or(ForgeError::InputNotFound(id))
    }

    pub fn output(&self, id: OutputId) -> Result<&ConnectorOutput> {
        self.outputs.get(&id).ok_or(ForgeError::OutputNotFound(id))
    }

    pub fn set_input_enabled(&mut self, id: InputId, enabled: bool) -> Result<()> {
        self.inputs
            .get_mut(&id)
            .ok_or(ForgeError::InputNotFound(id))?
            .enabled = enabled;
        Ok(())
    }

    pub fn set_output_enabled(&mut self, id: OutputId, enabled: bool) -> Result<()> {
        self.outputs
            .get_mut(&id)
            .ok_or(ForgeError::OutputNotFound(id))?
            .enabled = enabled;
        Ok(())
    }

    /// Pair an input with an output. Returns `false` (and changes nothing)
    /// when either side is already taken.
    pub fn link(&mut self, input: InputId, output: OutputId) -> Result<bool> {
        if self.input(input)?.connected() || self.output(output)?.connected() {
            return Ok(false);
        }

        if let Some(input) = self.inputs.get_mut(&input) {
            input.connected_to = Some(output);
        }
        if let Some(output) = self.outputs.get_mut(&output) {
            output.connected_to = Some(input);
        }
        Ok(true)
    }

    /// Drop every connector owned by a component. Refused (returns `false`)
    /// while any of them is linked.
    pub fn remove_component(&mut self, component: ComponentId) -> bool {
        let linked = self
            .inputs
            .values()
            .filter(|i| i.component == component)
            .any(|i| i.connected())
            || self
                .outputs
                .values()
                .filter(|o| o.component == component)
                .any(|o| o.connected());
        if linked {
            return false;
        }
        self.inputs.retain(|_, i| i.component != component);
        self.outputs.retain(|_, o| o.component != component);
        true
    }

    /// Enabled outputs that are still looking for a partner, in creation order
    pub fn probing_outputs(&self) -> Vec<OutputId> {
        let mut ids: Vec<OutputId> = self
            .outputs
            .values()
            .filter(|o| o.enabled && !o.connected())
            .map(|o| o.id)
            .collect();
        ids.sort();
        ids
    }

    pub fn inputs(&self) -> impl Iterator<Item = &ConnectorInput> {
        self.inputs.values()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ConnectorOutput> {
        self.outputs.values()
    }
}

impl Default for ConnectorGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> (ConnectorGraph, InputId, OutputId) {
        let mut graph = ConnectorGraph::new();
        let input = graph.add_input(ComponentId(1), NodeId(1), 0);
        let output = graph.add_output(ComponentId(2), NodeId(2), 0.05, LayerMask::ALL);
        (graph, input, output)
    }

    #[test]
    fn test_link_is_symmetric() {
        let (mut graph, input, output) = graph();

        assert!(graph.link(input, output).unwrap());

        let i = graph.input(input).unwrap();
        let o = graph.output(output).unwrap();
        assert!(i.connected() && o.connected());
        assert_eq!(i.connected_to(), Some(output));
        assert_eq!(o.connected_to(), Some(input));
    }

    #[test]
    fn test_connectors_link_at_most_once() {
        let (mut graph, input, output) = graph();
        let other = graph.add_output(ComponentId(3), NodeId(3), 0.05, LayerMask::ALL);

        assert!(graph.link(input, output).unwrap());
        assert!(!graph.link(input, other).unwrap());

        assert!(!graph.output(other).unwrap().connected());
        assert_eq!(graph.input(input).unwrap().connected_to(), Some(output));
    }

    #[test]
    fn test_probing_outputs_skip_connected_and_disabled() {
        let (mut graph, input, output) = graph();
        let spare = graph.add_output(ComponentId(3), NodeId(3), 0.05, LayerMask::ALL);
        let disabled = graph.add_output(ComponentId(4), NodeId(4), 0.05, LayerMask::ALL);
        graph.set_output_enabled(disabled, false).unwrap();

        graph.link(input, output).unwrap();

        assert_eq!(graph.probing_outputs(), vec![spare]);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let (graph, _, _) = graph();
        assert!(matches!(graph.input(InputId(99)), Err(ForgeError::InputNotFound(_))));
    }

    #[test]
    fn test_layer_mask() {
        let mask = LayerMask::single(3);
        assert!(mask.contains(3));
        assert!(!mask.contains(2));
        assert!(LayerMask::ALL.contains(31));
    }
}
