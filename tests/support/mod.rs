//! In-memory markup host used to observe reconciler output.
//!
//! Instances are nodes in a flat arena with monotonically increasing ids, so
//! reference identity across renders is a plain id comparison. The container
//! serializes to markup with a bookkeeping comment marker in front of every
//! instance, mirroring what a real templating host leaves in the document;
//! comparisons strip the markers first.

#![allow(dead_code)]

use list_flow::{ReconcileError, RenderHost};

/// Bookkeeping marker emitted before every instance's markup.
pub const PART_MARKER: &str = "<!--part-->";

/// Identity of one rendered node. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single container of rendered nodes.
#[derive(Default)]
pub struct MarkupDom {
    markup: Vec<String>,
    alive: Vec<bool>,
    children: Vec<usize>,
}

impl MarkupDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized container markup, markers included.
    pub fn inner_html(&self) -> String {
        self.children
            .iter()
            .map(|&id| format!("{}{}", PART_MARKER, &self.markup[id]))
            .collect()
    }

    /// The attached nodes in document order.
    pub fn children(&self) -> Vec<NodeId> {
        self.children.iter().map(|&id| NodeId(id)).collect()
    }

    /// Number of nodes currently attached.
    pub fn live_count(&self) -> usize {
        self.children.len()
    }

    /// Total nodes ever instantiated, removed ones included.
    pub fn total_created(&self) -> usize {
        self.markup.len()
    }

    fn position_of(&self, id: &NodeId) -> usize {
        self.children
            .iter()
            .position(|&child| child == id.0)
            .expect("instance is not attached to the container")
    }
}

impl RenderHost for MarkupDom {
    type Template = String;
    type Instance = NodeId;

    fn create(
        &mut self,
        template: String,
        before: Option<&NodeId>,
    ) -> Result<NodeId, ReconcileError> {
        let id = self.markup.len();
        self.markup.push(template);
        self.alive.push(true);
        let position = before
            .map(|before| self.position_of(before))
            .unwrap_or(self.children.len());
        self.children.insert(position, id);
        Ok(NodeId(id))
    }

    fn update(&mut self, instance: &NodeId, template: String) -> Result<(), ReconcileError> {
        assert!(self.alive[instance.0], "update on a removed instance");
        self.markup[instance.0] = template;
        Ok(())
    }

    fn move_before(&mut self, instance: &NodeId, before: Option<&NodeId>) {
        let from = self.position_of(instance);
        self.children.remove(from);
        let to = before
            .map(|before| self.position_of(before))
            .unwrap_or(self.children.len());
        self.children.insert(to, instance.0);
    }

    fn remove(&mut self, instance: NodeId) {
        let position = self.position_of(&instance);
        self.children.remove(position);
        self.alive[instance.0] = false;
    }
}

/// Strip internal bookkeeping markers before comparing markup.
pub fn strip_markers(markup: &str) -> String {
    markup.replace(PART_MARKER, "")
}

/// The per-item template used throughout the tests.
pub fn li(item: impl std::fmt::Display) -> String {
    format!("<li>item: {}</li>", item)
}

/// Expected container markup for a list of items.
pub fn li_list(items: &[i32]) -> String {
    items.iter().map(li).collect()
}
