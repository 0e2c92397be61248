//! # Object-Graph Navigator
//!
//! A lazy tree over the host graph. Nothing below a node is read until the
//! node is expanded, and a node is expanded at most once.
//!
//! ## Node Lifecycle
//!
//! ```text
//! Unexpanded --expand--> Expanding --ok--> Expanded
//!                            |
//!                            +--error/cancel--> Unexpanded (no children)
//! ```
//!
//! An `Unexpanded` node that can have children reports a placeholder child
//! so a presentation layer can draw an expander without reading anything.
//!
//! ## Dispatch
//!
//! | Kind | Children |
//! |------|----------|
//! | database, symbol table | one per named record |
//! | dictionary | one per key (nested dictionaries stay lazy) |
//! | entity container | one per entity, in container order |
//! | entity, record, xrecord | the registry's named collections |
//! | anything else | one informational leaf |

use crate::host::HostScope;
use crate::lazy::LazyCollection;
use crate::primitives::{MAX_EXPAND_DEPTH, PLACEHOLDER_LABEL};
use crate::registry::CollectorRegistry;
use crate::{CadscopeError, NamedRef, ObjectHandle, ObjectKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// CONFIGURATION & CANCELLATION
// =============================================================================

/// Navigator behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Turn a child that repeats an ancestor's handle into a back-reference
    /// leaf instead of an expandable node.
    ///
    /// With this off, a cyclic graph is only bounded by the requested depth:
    /// [`ObjectTree::expand_to_depth`] on a self-referencing dictionary
    /// creates one node per path, which grows exponentially with depth up
    /// to [`MAX_EXPAND_DEPTH`].
    pub detect_cycles: bool,
    /// Stop creating children after this many and add a "more" leaf.
    pub max_children: Option<usize>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            max_children: None,
        }
    }
}

/// Cooperative cancellation flag, checked between child creations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Expansion state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeState {
    Unexpanded,
    Expanding,
    Expanded,
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeTarget {
    /// A host object, referenced by handle.
    Object(ObjectHandle),
    /// A named deferred collection of `owner`.
    Collection {
        owner: ObjectHandle,
        collection: LazyCollection,
    },
    /// A collection item that is a plain value.
    Value,
    /// Informational text (unsupported kinds, truncation, recovered errors).
    Info,
    /// An object already present among the node's ancestors.
    BackReference(ObjectHandle),
}

/// One node of the lazy tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectNode {
    label: String,
    target: NodeTarget,
    state: NodeState,
    children: Vec<ObjectNode>,
}

impl ObjectNode {
    fn new(label: impl Into<String>, target: NodeTarget, state: NodeState) -> Self {
        Self {
            label: label.into(),
            target,
            state,
            children: Vec::new(),
        }
    }

    /// A node for a host object.
    #[must_use]
    pub fn object(label: impl Into<String>, handle: ObjectHandle) -> Self {
        Self::new(label, NodeTarget::Object(handle), NodeState::Unexpanded)
    }

    /// A node for a named deferred collection.
    #[must_use]
    pub fn collection(
        label: impl Into<String>,
        owner: ObjectHandle,
        collection: LazyCollection,
    ) -> Self {
        Self::new(
            label,
            NodeTarget::Collection { owner, collection },
            NodeState::Unexpanded,
        )
    }

    /// A leaf value. Leaves are born expanded.
    #[must_use]
    pub fn value(text: impl Into<String>) -> Self {
        Self::new(text, NodeTarget::Value, NodeState::Expanded)
    }

    /// An informational leaf.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, NodeTarget::Info, NodeState::Expanded)
    }

    fn back_reference(label: &str, handle: ObjectHandle) -> Self {
        Self::new(
            format!("{} -> {} (cycle)", label, handle),
            NodeTarget::BackReference(handle),
            NodeState::Expanded,
        )
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn target(&self) -> &NodeTarget {
        &self.target
    }

    #[must_use]
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Materialized children. Empty until expanded.
    #[must_use]
    pub fn children(&self) -> &[ObjectNode] {
        &self.children
    }

    /// Handle of the object this node stands for, if any.
    #[must_use]
    pub fn handle(&self) -> Option<ObjectHandle> {
        match self.target {
            NodeTarget::Object(handle) | NodeTarget::BackReference(handle) => Some(handle),
            _ => None,
        }
    }

    /// Check if the node can have children.
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        matches!(
            self.target,
            NodeTarget::Object(_) | NodeTarget::Collection { .. }
        )
    }

    /// Check if the node should be drawn with a placeholder child.
    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.is_expandable() && self.state != NodeState::Expanded
    }

    /// Labels to draw beneath the node: the placeholder while unexpanded.
    #[must_use]
    pub fn child_labels(&self) -> Vec<&str> {
        if self.has_placeholder() {
            vec![PLACEHOLDER_LABEL]
        } else {
            self.children.iter().map(|c| c.label.as_str()).collect()
        }
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// A child discovered by enumeration, not yet turned into a node.
enum ChildSpec {
    Object {
        label: Option<String>,
        handle: ObjectHandle,
    },
    Collection {
        label: String,
        owner: ObjectHandle,
        collection: LazyCollection,
    },
    Value(String),
    Info(String),
}

/// Expands nodes against a scope, using the registry for leaf objects.
pub struct Navigator<'a> {
    registry: &'a CollectorRegistry,
    scope: &'a dyn HostScope,
    config: NavigatorConfig,
    cancel: Option<CancelToken>,
}

impl fmt::Debug for Navigator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("registry", self.registry)
            .field("scope_open", &self.scope.is_open())
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<'a> Navigator<'a> {
    /// Create a navigator with the default configuration.
    #[must_use]
    pub fn new(registry: &'a CollectorRegistry, scope: &'a dyn HostScope) -> Self {
        Self {
            registry,
            scope,
            config: NavigatorConfig::default(),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: NavigatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn scope(&self) -> &'a dyn HostScope {
        self.scope
    }

    /// Expand `node` once.
    ///
    /// `ancestors` holds the object handles above the node, used for cycle
    /// detection. Expanding an expanded node or a leaf does nothing. On
    /// failure or cancellation the node is left unexpanded with no children.
    pub fn expand(
        &self,
        node: &mut ObjectNode,
        ancestors: &[ObjectHandle],
    ) -> Result<(), CadscopeError> {
        if node.state != NodeState::Unexpanded || !node.is_expandable() {
            return Ok(());
        }

        node.state = NodeState::Expanding;
        let mut lineage = ancestors.to_vec();
        if let NodeTarget::Object(handle) = node.target {
            lineage.push(handle);
        }

        let built = self
            .enumerate(&mut node.target)
            .and_then(|specs| self.materialize(specs, &lineage));

        match built {
            Ok(children) => {
                tracing::debug!(label = %node.label, children = children.len(), "node expanded");
                node.children = children;
                node.state = NodeState::Expanded;
                Ok(())
            }
            Err(err) => {
                tracing::debug!(label = %node.label, "expansion abandoned: {}", err);
                node.children.clear();
                node.state = NodeState::Unexpanded;
                Err(err)
            }
        }
    }

    fn check_cancelled(&self) -> Result<(), CadscopeError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(CadscopeError::Cancelled),
            _ => Ok(()),
        }
    }

    fn enumerate(&self, target: &mut NodeTarget) -> Result<Vec<ChildSpec>, CadscopeError> {
        self.scope.ensure_open()?;

        match target {
            NodeTarget::Object(handle) => self.enumerate_object(*handle),
            NodeTarget::Collection { collection, .. } => self.enumerate_collection(collection),
            _ => Ok(Vec::new()),
        }
    }

    fn enumerate_object(&self, handle: ObjectHandle) -> Result<Vec<ChildSpec>, CadscopeError> {
        let object = self.scope.resolve(handle)?;
        let named = |refs: Vec<NamedRef>| -> Vec<ChildSpec> {
            refs.into_iter()
                .map(|r| ChildSpec::Object {
                    label: Some(r.name),
                    handle: r.handle,
                })
                .collect()
        };

        match object.kind() {
            ObjectKind::Database | ObjectKind::SymbolTable => {
                Ok(named(self.scope.table_records(handle)?))
            }
            ObjectKind::Dictionary => Ok(named(self.scope.dictionary_entries(handle)?)),
            ObjectKind::EntityContainer => Ok(self
                .scope
                .container_items(handle)?
                .into_iter()
                .map(|handle| ChildSpec::Object {
                    label: None,
                    handle,
                })
                .collect()),
            ObjectKind::Entity | ObjectKind::Record | ObjectKind::Xrecord => Ok(self
                .registry
                .collections(object, self.scope)?
                .into_iter()
                .map(|(label, collection)| ChildSpec::Collection {
                    label,
                    owner: handle,
                    collection,
                })
                .collect()),
            ObjectKind::Other(kind) => Ok(vec![ChildSpec::Info(format!(
                "Unsupported container kind: {}",
                kind
            ))]),
        }
    }

    fn enumerate_collection(
        &self,
        collection: &mut LazyCollection,
    ) -> Result<Vec<ChildSpec>, CadscopeError> {
        let items = match collection.resolve(self.scope, self.registry.options()) {
            Ok(items) => items,
            Err(err) if err.is_host_access() => return Err(err),
            Err(err) => {
                tracing::warn!("collection not resolvable: {}", err);
                return Ok(vec![ChildSpec::Info(format!("[error: {}]", err))]);
            }
        };

        Ok(items
            .iter()
            .map(|item| match item.value.referenced_handle() {
                Some(handle) if self.scope.resolve(handle).is_ok() => ChildSpec::Object {
                    label: Some(format!("{} {}", item.label, item.formatted)),
                    handle,
                },
                _ => ChildSpec::Value(format!("{} = {}", item.label, item.formatted)),
            })
            .collect())
    }

    fn materialize(
        &self,
        specs: Vec<ChildSpec>,
        lineage: &[ObjectHandle],
    ) -> Result<Vec<ObjectNode>, CadscopeError> {
        let total = specs.len();
        let mut children = Vec::with_capacity(total);

        for (index, spec) in specs.into_iter().enumerate() {
            self.check_cancelled()?;

            if self.config.max_children.is_some_and(|limit| index >= limit) {
                children.push(ObjectNode::info(format!("... {} more", total - index)));
                break;
            }

            let node = match spec {
                ChildSpec::Object { label, handle } => {
                    let object = match self.scope.resolve(handle) {
                        Ok(object) => object,
                        Err(err) if err.is_host_access() => return Err(err),
                        Err(err) => {
                            tracing::warn!(%handle, "child not resolvable: {}", err);
                            let text = match label {
                                Some(label) => format!("{} [error: {}]", label, err),
                                None => format!("[error: {}]", err),
                            };
                            children.push(ObjectNode::info(text));
                            continue;
                        }
                    };
                    let label = label.unwrap_or_else(|| object.display_name());
                    if self.config.detect_cycles && lineage.contains(&handle) {
                        ObjectNode::back_reference(&label, handle)
                    } else {
                        ObjectNode::object(label, handle)
                    }
                }
                ChildSpec::Collection {
                    label,
                    owner,
                    collection,
                } => ObjectNode::collection(label, owner, collection),
                ChildSpec::Value(text) => ObjectNode::value(text),
                ChildSpec::Info(text) => ObjectNode::info(text),
            };
            children.push(node);
        }
        Ok(children)
    }
}

// =============================================================================
// TREE
// =============================================================================

/// A lazily expanded tree rooted at one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectTree {
    root: ObjectNode,
}

impl ObjectTree {
    /// Tree rooted at the graph's root object. Nothing is expanded.
    pub fn open(navigator: &Navigator<'_>) -> Result<Self, CadscopeError> {
        let handle = navigator.scope.root()?;
        Self::at(navigator, handle)
    }

    /// Tree rooted at an arbitrary object.
    pub fn at(navigator: &Navigator<'_>, handle: ObjectHandle) -> Result<Self, CadscopeError> {
        let object = navigator.scope.resolve(handle)?;
        Ok(Self {
            root: ObjectNode::object(object.display_name(), handle),
        })
    }

    #[must_use]
    pub fn root(&self) -> &ObjectNode {
        &self.root
    }

    /// Node at a child-index path. The empty path is the root.
    #[must_use]
    pub fn node(&self, path: &[usize]) -> Option<&ObjectNode> {
        path.iter()
            .try_fold(&self.root, |node, &index| node.children.get(index))
    }

    /// Expand the node at `path`.
    pub fn expand(&mut self, navigator: &Navigator<'_>, path: &[usize]) -> Result<(), CadscopeError> {
        let mut ancestors = Vec::new();
        let mut node = &mut self.root;

        for &index in path {
            if let NodeTarget::Object(handle) = node.target {
                ancestors.push(handle);
            }
            node = match node.children.get_mut(index) {
                Some(child) => child,
                None => return Err(CadscopeError::InvalidPath(path.to_vec())),
            };
        }

        navigator.expand(node, &ancestors)
    }

    /// Expand every node down to `depth` levels below the root.
    ///
    /// The depth is capped at [`MAX_EXPAND_DEPTH`].
    pub fn expand_to_depth(
        &mut self,
        navigator: &Navigator<'_>,
        depth: usize,
    ) -> Result<(), CadscopeError> {
        let mut ancestors = Vec::new();
        expand_recursive(navigator, &mut self.root, &mut ancestors, depth.min(MAX_EXPAND_DEPTH))
    }
}

fn expand_recursive(
    navigator: &Navigator<'_>,
    node: &mut ObjectNode,
    ancestors: &mut Vec<ObjectHandle>,
    remaining: usize,
) -> Result<(), CadscopeError> {
    if remaining == 0 {
        return Ok(());
    }

    navigator.expand(node, ancestors)?;

    let pushed = if let NodeTarget::Object(handle) = node.target {
        ancestors.push(handle);
        true
    } else {
        false
    };

    for child in &mut node.children {
        expand_recursive(navigator, child, ancestors, remaining - 1)?;
    }

    if pushed {
        ancestors.pop();
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentObject};
    use crate::format::FormatOptions;

    fn registry() -> CollectorRegistry {
        CollectorRegistry::standard(FormatOptions::default())
    }

    fn labels(node: &ObjectNode) -> Vec<&str> {
        node.children().iter().map(|c| c.label()).collect()
    }

    #[test]
    fn root_starts_with_placeholder() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let tree = ObjectTree::open(&nav).expect("open");
        assert_eq!(tree.root().state(), NodeState::Unexpanded);
        assert!(tree.root().has_placeholder());
        assert_eq!(tree.root().child_labels(), vec![PLACEHOLDER_LABEL]);
    }

    #[test]
    fn table_children_named_by_record() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::at(&nav, ObjectHandle(0x3)).expect("layers");
        tree.expand(&nav, &[]).expect("expand");
        assert_eq!(labels(tree.root()), vec!["0", "Walls", "Doors"]);
        assert!(tree.root().children().iter().all(|c| c.has_placeholder()));
    }

    #[test]
    fn expansion_is_idempotent() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::at(&nav, ObjectHandle(0x3)).expect("layers");
        tree.expand(&nav, &[]).expect("first");
        tree.expand(&nav, &[]).expect("second");
        assert_eq!(tree.root().children().len(), 3);
        assert_eq!(tree.root().state(), NodeState::Expanded);
    }

    #[test]
    fn container_children_use_display_names() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::at(&nav, ObjectHandle(0x10)).expect("model space");
        tree.expand(&nav, &[]).expect("expand");
        assert_eq!(
            labels(tree.root()),
            vec!["Line (50)", "Circle (51)", "Polyline (52)", "Line (53)"]
        );
    }

    #[test]
    fn collections_resolve_on_demand() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::at(&nav, ObjectHandle(0x52)).expect("polyline");
        tree.expand(&nav, &[]).expect("expand");
        assert_eq!(labels(tree.root()), vec!["Vertices"]);

        tree.expand(&nav, &[0]).expect("vertices");
        let vertices = tree.node(&[0]).expect("node");
        assert_eq!(vertices.children().len(), 3);
        assert_eq!(
            vertices.children()[1].label(),
            "[1] = (50.0000, 0.0000, 0.0000)"
        );
        assert!(!vertices.children()[1].is_expandable());
    }

    #[test]
    fn unsupported_kind_yields_info_leaf() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::at(&nav, ObjectHandle(0xF)).expect("proxy");
        tree.expand(&nav, &[]).expect("expand");
        assert_eq!(tree.root().children().len(), 1);
        assert_eq!(tree.root().children()[0].target(), &NodeTarget::Info);
    }

    #[test]
    fn cancellation_leaves_node_unexpanded() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let token = CancelToken::new();
        let nav = Navigator::new(&registry, &scope).with_cancel(token.clone());

        let mut tree = ObjectTree::at(&nav, ObjectHandle(0x3)).expect("layers");
        token.cancel();
        let result = tree.expand(&nav, &[]);

        assert!(matches!(result, Err(CadscopeError::Cancelled)));
        assert_eq!(tree.root().state(), NodeState::Unexpanded);
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn failed_expansion_leaves_node_unexpanded() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::at(&nav, ObjectHandle(0x3)).expect("layers");
        scope.close();
        assert!(tree.expand(&nav, &[]).is_err());
        assert_eq!(tree.root().state(), NodeState::Unexpanded);
    }

    #[test]
    fn child_limit_adds_more_leaf() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let config = NavigatorConfig {
            max_children: Some(2),
            ..NavigatorConfig::default()
        };
        let nav = Navigator::new(&registry, &scope).with_config(config);

        let mut tree = ObjectTree::at(&nav, ObjectHandle(0x10)).expect("model space");
        tree.expand(&nav, &[]).expect("expand");
        assert_eq!(tree.root().children().len(), 3);
        assert_eq!(tree.root().children()[2].label(), "... 2 more");
    }

    #[test]
    fn cycles_become_back_references() {
        let mut doc = Document::new(
            DocumentObject::new(ObjectHandle(1), "Dictionary", ObjectKind::Dictionary)
                .record("self", ObjectHandle(1))
                .record("child", ObjectHandle(2)),
        );
        doc.insert(
            DocumentObject::new(ObjectHandle(2), "Dictionary", ObjectKind::Dictionary)
                .record("parent", ObjectHandle(1)),
        );
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::open(&nav).expect("open");
        tree.expand_to_depth(&nav, MAX_EXPAND_DEPTH + 10).expect("expand");

        let root = tree.root();
        assert!(matches!(root.children()[1].target(), NodeTarget::BackReference(_)));
        let child = &root.children()[0];
        assert_eq!(child.label(), "child");
        assert!(matches!(child.children()[0].target(), NodeTarget::BackReference(_)));
    }

    #[test]
    fn dangling_record_becomes_info_leaf() {
        let mut doc = Document::new(
            DocumentObject::new(ObjectHandle(1), "LayerTable", ObjectKind::SymbolTable)
                .record("Good", ObjectHandle(2))
                .record("Dangling", ObjectHandle(0x99)),
        );
        doc.insert(DocumentObject::new(
            ObjectHandle(2),
            "LayerTableRecord",
            ObjectKind::Record,
        ));
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::open(&nav).expect("open");
        tree.expand_to_depth(&nav, 3).expect("expand");

        let children = tree.root().children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].label(), "Good");
        assert_eq!(children[0].state(), NodeState::Expanded);
        assert_eq!(children[1].target(), &NodeTarget::Info);
        assert!(children[1].label().starts_with("Dangling [error: "));
    }

    #[test]
    fn depth_bounds_expansion_without_cycle_detection() {
        let doc = Document::new(
            DocumentObject::new(ObjectHandle(1), "Dictionary", ObjectKind::Dictionary)
                .record("self", ObjectHandle(1)),
        );
        let scope = doc.open_scope();
        let registry = registry();
        let config = NavigatorConfig {
            detect_cycles: false,
            ..NavigatorConfig::default()
        };
        let nav = Navigator::new(&registry, &scope).with_config(config);

        let mut tree = ObjectTree::open(&nav).expect("open");
        tree.expand_to_depth(&nav, 3).expect("expand");

        let deepest = tree.node(&[0, 0, 0]).expect("third level");
        assert!(matches!(deepest.target(), NodeTarget::Object(_)));
        assert!(deepest.has_placeholder());
        assert!(tree.node(&[0, 0, 0, 0]).is_none());
    }

    #[test]
    fn invalid_path_is_reported() {
        let doc = Document::sample();
        let scope = doc.open_scope();
        let registry = registry();
        let nav = Navigator::new(&registry, &scope);

        let mut tree = ObjectTree::open(&nav).expect("open");
        assert!(matches!(
            tree.expand(&nav, &[7]),
            Err(CadscopeError::InvalidPath(_))
        ));
    }
}
