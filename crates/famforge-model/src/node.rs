// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry node store
//!
//! Nodes live in an arena ([`GeometryForest`]) and refer to each other by
//! [`NodeId`]. The child list is the only ownership edge: every node is owned
//! either by exactly one parent's child list or by the forest's root list.
//! The parent link is a non-owning lookup kept in sync by [`GeometryForest::attach`]
//! and [`GeometryForest::detach`].

use crate::{
    ElementClass, GeometryKind, GeometryPayload, ModelError, NodeId, ParameterSet, Result,
    TargetGeometry,
};
use rustc_hash::FxHashMap;

/// A node of the geometry hierarchy
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryNode {
    id: NodeId,
    /// Display name
    pub name: String,
    /// Representation kind of `payload`
    pub kind: GeometryKind,
    /// Element classification
    pub class: ElementClass,
    /// Opaque geometry data
    pub payload: Option<GeometryPayload>,
    /// Typed parameters
    pub parameters: ParameterSet,
    /// Target-side geometry, set by a successful conversion
    pub target: Option<TargetGeometry>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl GeometryNode {
    /// Create a detached node
    ///
    /// The node gets its identity when it is added to a [`GeometryForest`].
    pub fn new(name: impl Into<String>, kind: GeometryKind, class: ElementClass) -> Self {
        Self {
            id: NodeId::default(),
            name: name.into(),
            kind,
            class,
            payload: None,
            parameters: ParameterSet::new(),
            target: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the geometry payload
    pub fn with_payload(mut self, payload: GeometryPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the parameter set
    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    /// Node identity (assigned by the forest)
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Owning parent, if any
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Owned children in order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Payload is present and kind is known
    pub fn is_convert_ready(&self) -> bool {
        self.payload.is_some() && self.kind != GeometryKind::Unknown
    }

    /// A node is valid iff it is convert-ready
    pub fn is_valid(&self) -> bool {
        self.is_convert_ready()
    }

    /// Whether a conversion attached target geometry
    pub fn is_converted(&self) -> bool {
        self.target.is_some()
    }
}

/// Arena of geometry nodes forming an ordered forest
#[derive(Clone, Debug, Default)]
pub struct GeometryForest {
    nodes: FxHashMap<NodeId, GeometryNode>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl GeometryForest {
    /// Create an empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes in order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Get a node
    pub fn get(&self, id: NodeId) -> Option<&GeometryNode> {
        self.nodes.get(&id)
    }

    /// Get a node mutably
    ///
    /// Ownership edges are not reachable through this reference.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut GeometryNode> {
        self.nodes.get_mut(&id)
    }

    /// Check if a node exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children of a node (empty if unknown)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Add a node as a new root; returns its fresh identity
    pub fn add(&mut self, node: GeometryNode) -> NodeId {
        let id = self.insert_unowned(node);
        self.roots.push(id);
        id
    }

    /// Add a node as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, node: GeometryNode) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(ModelError::NodeNotFound(parent));
        }
        let id = self.insert_unowned(node);
        self.link(parent, id);
        Ok(id)
    }

    /// Attach `child` as the last child of `parent`
    ///
    /// A root node moves out of the root list. A node that already has a
    /// different parent is only moved when `reparent` is set; otherwise the
    /// call fails with [`ModelError::AlreadyOwned`]. Attaching a node under
    /// its current parent is a no-op.
    pub fn attach(&mut self, parent: NodeId, child: NodeId, reparent: bool) -> Result<()> {
        if !self.contains(parent) {
            return Err(ModelError::NodeNotFound(parent));
        }
        let current = self
            .nodes
            .get(&child)
            .ok_or(ModelError::NodeNotFound(child))?
            .parent;

        if parent == child || self.is_ancestor(child, parent) {
            return Err(ModelError::Cycle { parent, child });
        }

        match current {
            Some(owner) if owner == parent => return Ok(()),
            Some(owner) if !reparent => {
                return Err(ModelError::AlreadyOwned {
                    child,
                    owner,
                })
            }
            Some(owner) => self.unlink(owner, child),
            None => self.roots.retain(|r| *r != child),
        }

        self.link(parent, child);
        Ok(())
    }

    /// Detach a node from its parent; it becomes the last root
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let owner = self
            .nodes
            .get(&child)
            .ok_or(ModelError::NodeNotFound(child))?
            .parent
            .ok_or(ModelError::NotAttached(child))?;

        self.unlink(owner, child);
        self.roots.push(child);
        Ok(())
    }

    /// Remove a node and its whole subtree; returns the number of nodes dropped
    pub fn remove(&mut self, id: NodeId) -> Result<usize> {
        let parent = self.nodes.get(&id).ok_or(ModelError::NodeNotFound(id))?.parent;
        match parent {
            Some(owner) => self.unlink(owner, id),
            None => self.roots.retain(|r| *r != id),
        }

        let doomed = self.descendants(id);
        for node_id in &doomed {
            self.nodes.remove(node_id);
        }
        Ok(doomed.len())
    }

    /// Deep-copy a node and its subtree with fresh identities
    ///
    /// The copy is added as a new root. Target geometry is not copied since
    /// the handle belongs to the document that built it.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let source = self.nodes.get(&id).ok_or(ModelError::NodeNotFound(id))?;
        let copy = Self::detached_copy(source);
        let root = self.add(copy);

        // (source node, parent of its copy)
        let mut stack: Vec<(NodeId, NodeId)> = self
            .children(id)
            .iter()
            .rev()
            .map(|child| (*child, root))
            .collect();
        while let Some((source_id, new_parent)) = stack.pop() {
            let Some(source) = self.nodes.get(&source_id) else {
                continue;
            };
            let copy = Self::detached_copy(source);
            let new_id = self.insert_unowned(copy);
            self.link(new_parent, new_id);
            stack.extend(
                self.children(source_id)
                    .iter()
                    .rev()
                    .map(|child| (*child, new_id)),
            );
        }
        Ok(root)
    }

    /// Merge nodes into a single node
    ///
    /// One input yields its clone. Several inputs yield a new parent (kind and
    /// class of the first input) whose children are clones of each input.
    /// Payloads are not combined here; that is the geometry kernel's job.
    pub fn merge(&mut self, ids: &[NodeId]) -> Result<NodeId> {
        let first = *ids.first().ok_or(ModelError::EmptyMerge)?;
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(ModelError::NodeNotFound(*missing));
        }
        if ids.len() == 1 {
            return self.clone_subtree(first);
        }

        let template = &self.nodes[&first];
        let parent = GeometryNode::new(
            format!("{} (merged)", template.name),
            template.kind,
            template.class,
        );
        let parent_id = self.add(parent);

        for id in ids {
            let copy = self.clone_subtree(*id)?;
            self.roots.retain(|r| *r != copy);
            self.link(parent_id, copy);
        }
        Ok(parent_id)
    }

    /// All node ids in depth-first pre-order (parents before children,
    /// sibling order preserved)
    pub fn iter_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_preorder(*root, &mut out);
        }
        out
    }

    /// Iterate nodes in depth-first pre-order
    pub fn iter(&self) -> impl Iterator<Item = &GeometryNode> + '_ {
        self.iter_ids().into_iter().filter_map(|id| self.nodes.get(&id))
    }

    /// A node and everything below it, pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.contains(id) {
            self.collect_preorder(id, &mut out);
        }
        out
    }

    /// Ancestors from the direct parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Depth of a node (roots are 0)
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// First node with the given name, pre-order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter_ids()
            .into_iter()
            .find(|id| self.nodes.get(id).is_some_and(|n| n.name == name))
    }

    /// Number of convert-ready nodes
    pub fn convert_ready_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_convert_ready()).count()
    }

    /// Number of nodes with target geometry
    pub fn converted_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_converted()).count()
    }

    fn insert_unowned(&mut self, mut node: GeometryNode) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        node.id = id;
        node.parent = None;
        node.children.clear();
        self.nodes.insert(id, node);
        id
    }

    fn detached_copy(source: &GeometryNode) -> GeometryNode {
        GeometryNode {
            id: NodeId::default(),
            name: source.name.clone(),
            kind: source.kind,
            class: source.class,
            payload: source.payload.clone(),
            parameters: source.parameters.clone(),
            target: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Is `ancestor` on the parent chain of `id`
    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
    }

    fn collect_preorder(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParameterValue;

    fn brep(name: &str) -> GeometryNode {
        GeometryNode::new(name, GeometryKind::Brep, ElementClass::Wall)
            .with_payload(GeometryPayload::new(vec![1, 2, 3]))
    }

    #[test]
    fn test_convert_ready() {
        let node = brep("a");
        assert!(node.is_convert_ready());
        assert!(node.is_valid());

        let no_payload = GeometryNode::new("b", GeometryKind::Mesh, ElementClass::Floor);
        assert!(!no_payload.is_convert_ready());

        let unknown = GeometryNode::new("c", GeometryKind::Unknown, ElementClass::Floor)
            .with_payload(GeometryPayload::new(vec![0]));
        assert!(!unknown.is_valid());

        let mut forest = GeometryForest::new();
        let root = forest.add(node);
        forest.add_child(root, no_payload).unwrap();
        forest.add(unknown);
        assert_eq!(forest.convert_ready_count(), 1);
    }

    #[test]
    fn test_attach_updates_both_sides() {
        let mut forest = GeometryForest::new();
        let parent = forest.add(brep("parent"));
        let child = forest.add(brep("child"));

        forest.attach(parent, child, false).unwrap();

        assert_eq!(forest.roots(), &[parent]);
        assert_eq!(forest.children(parent), &[child]);
        assert_eq!(forest.parent(child), Some(parent));
    }

    #[test]
    fn test_attach_owned_child_requires_reparent() {
        let mut forest = GeometryForest::new();
        let a = forest.add(brep("a"));
        let b = forest.add(brep("b"));
        let child = forest.add_child(a, brep("child")).unwrap();

        let err = forest.attach(b, child, false).unwrap_err();
        assert_eq!(err, ModelError::AlreadyOwned { child, owner: a });
        assert_eq!(forest.parent(child), Some(a));

        forest.attach(b, child, true).unwrap();
        assert_eq!(forest.parent(child), Some(b));
        assert!(forest.children(a).is_empty());
        assert_eq!(forest.children(b), &[child]);
    }

    #[test]
    fn test_attach_same_parent_is_noop() {
        let mut forest = GeometryForest::new();
        let a = forest.add(brep("a"));
        let child = forest.add_child(a, brep("child")).unwrap();

        forest.attach(a, child, false).unwrap();
        assert_eq!(forest.children(a), &[child]);
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut forest = GeometryForest::new();
        let a = forest.add(brep("a"));
        let b = forest.add_child(a, brep("b")).unwrap();
        let c = forest.add_child(b, brep("c")).unwrap();

        assert_eq!(
            forest.attach(c, a, true).unwrap_err(),
            ModelError::Cycle { parent: c, child: a }
        );
        assert_eq!(
            forest.attach(a, a, false).unwrap_err(),
            ModelError::Cycle { parent: a, child: a }
        );
    }

    #[test]
    fn test_detach_moves_to_roots() {
        let mut forest = GeometryForest::new();
        let a = forest.add(brep("a"));
        let b = forest.add_child(a, brep("b")).unwrap();

        forest.detach(b).unwrap();
        assert_eq!(forest.roots(), &[a, b]);
        assert!(forest.parent(b).is_none());
        assert_eq!(forest.detach(b).unwrap_err(), ModelError::NotAttached(b));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut forest = GeometryForest::new();
        let a = forest.add(brep("a"));
        let b = forest.add_child(a, brep("b")).unwrap();
        forest.add_child(b, brep("c")).unwrap();
        let d = forest.add(brep("d"));

        assert_eq!(forest.remove(b).unwrap(), 2);
        assert_eq!(forest.len(), 2);
        assert!(forest.children(a).is_empty());
        assert_eq!(forest.roots(), &[a, d]);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut forest = GeometryForest::new();
        let original = forest.add(brep("wall").with_parameters(ParameterSet::new().with("Mark", "W1")));
        let child = forest.add_child(original, brep("part")).unwrap();

        let copy = forest.clone_subtree(original).unwrap();
        assert_ne!(copy, original);
        assert_eq!(forest.children(copy).len(), 1);
        assert_ne!(forest.children(copy)[0], child);

        forest
            .get_mut(copy)
            .unwrap()
            .parameters
            .insert("Mark", "W2");

        assert_eq!(
            forest.get(original).unwrap().parameters.get("Mark"),
            Some(&ParameterValue::Text("W1".into()))
        );
        assert_eq!(forest.roots(), &[original, copy]);
    }

    #[test]
    fn test_clone_keeps_sibling_order() {
        let mut forest = GeometryForest::new();
        let a = forest.add(brep("a"));
        let b = forest.add_child(a, brep("b")).unwrap();
        forest.add_child(b, brep("c")).unwrap();
        forest.add_child(a, brep("d")).unwrap();

        let copy = forest.clone_subtree(a).unwrap();
        let names: Vec<_> = forest
            .descendants(copy)
            .into_iter()
            .map(|id| forest.get(id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        assert_eq!(forest.len(), 8);
    }

    #[test]
    fn test_clone_deep_chain() {
        let mut forest = GeometryForest::new();
        let root = forest.add(brep("n0"));
        let mut last = root;
        for i in 1..200_000 {
            last = forest.add_child(last, brep(&format!("n{}", i))).unwrap();
        }

        let copy = forest.clone_subtree(root).unwrap();
        assert_eq!(forest.len(), 400_000);
        assert_eq!(forest.roots(), &[root, copy]);

        let copied = forest.descendants(copy);
        assert_eq!(copied.len(), 200_000);
        let deepest = *copied.last().unwrap();
        assert_eq!(forest.get(deepest).unwrap().name, "n199999");
        assert_eq!(forest.depth(deepest), 199_999);
        assert_eq!(forest.depth(last), 199_999);
    }

    #[test]
    fn test_merge() {
        let mut forest = GeometryForest::new();
        let a = forest.add(GeometryNode::new("a", GeometryKind::Mesh, ElementClass::Furniture));
        let b = forest.add(brep("b"));

        assert_eq!(forest.merge(&[]).unwrap_err(), ModelError::EmptyMerge);

        let single = forest.merge(&[b]).unwrap();
        assert_ne!(single, b);
        assert_eq!(forest.get(single).unwrap().name, "b");

        let merged = forest.merge(&[a, b]).unwrap();
        let node = forest.get(merged).unwrap();
        assert_eq!(node.kind, GeometryKind::Mesh);
        assert_eq!(node.children().len(), 2);
        assert!(node.payload.is_none());
        assert!(!node.children().contains(&a));
    }

    #[test]
    fn test_preorder_iteration() {
        let mut forest = GeometryForest::new();
        let a = forest.add(brep("a"));
        let b = forest.add_child(a, brep("b")).unwrap();
        let c = forest.add_child(b, brep("c")).unwrap();
        let d = forest.add_child(a, brep("d")).unwrap();
        let e = forest.add(brep("e"));

        assert_eq!(forest.iter_ids(), vec![a, b, c, d, e]);
        assert_eq!(forest.descendants(b), vec![b, c]);
        assert_eq!(forest.ancestors(c), vec![b, a]);
        assert_eq!(forest.depth(c), 2);
        assert_eq!(forest.find_by_name("d"), Some(d));
    }
}
