//! Lazy object registry: the object-number -> node cache sitting between `PdfDocument` and the
//! byte-offset lookups in `CrossRefTable`.
//!
//! Owns the in-memory cache, the cycle-detection stack, and the recursion-depth counter that
//! `PdfDocument::load_object` consults before doing any file I/O. The actual parse-from-offset
//! work stays in `document.rs`, which holds the reader; this type only tracks what has already
//! been resolved and what is currently being resolved.
//!
//! Per §3's data model the registry is `map<u32, ObjectNode>`; storage here is an `IndexMap` so
//! that `rebuild_object_numbers` can compact the table to a contiguous `1..=N` range while
//! preserving each node's relative insertion order, per §4.10's `rebuildObjectNumbers`.

use crate::error::{Error, Result};
use crate::object::{Object, ObjectNode, ObjectRef};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Cache entries above this count are dropped in one shot rather than evicted individually,
/// bounding peak memory during multi-PDF merges at the cost of re-parsing on the next access.
pub const DEFAULT_CACHE_CAP: usize = 2048;

/// Maximum recursion depth for object resolution (`/Prev` chains, nested references).
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 100;

/// Guard returned by [`PdfObjectRegistry::enter`]; removes `obj_ref` from the resolving stack and
/// decrements the recursion depth when dropped, including on an early `?` return.
pub struct ResolveGuard<'a> {
    registry: &'a PdfObjectRegistry,
    obj_ref: ObjectRef,
}

impl Drop for ResolveGuard<'_> {
    fn drop(&mut self) {
        *self.registry.recursion_depth.borrow_mut() -= 1;
        self.registry.resolving_stack.borrow_mut().remove(&self.obj_ref);
    }
}

/// Lazy cache of resolved `ObjectNode`s keyed by object number, with cycle detection and a
/// bounded cap.
pub struct PdfObjectRegistry {
    nodes: RefCell<IndexMap<u32, ObjectNode>>,
    resolving_stack: RefCell<HashSet<ObjectRef>>,
    recursion_depth: RefCell<u32>,
    max_recursion_depth: u32,
    cache_cap: usize,
}

impl std::fmt::Debug for PdfObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfObjectRegistry")
            .field("cached_objects", &self.nodes.borrow().len())
            .field("recursion_depth", &self.recursion_depth.borrow())
            .finish_non_exhaustive()
    }
}

impl Default for PdfObjectRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECURSION_DEPTH, DEFAULT_CACHE_CAP)
    }
}

impl PdfObjectRegistry {
    pub fn new(max_recursion_depth: u32, cache_cap: usize) -> Self {
        Self {
            nodes: RefCell::new(IndexMap::new()),
            resolving_stack: RefCell::new(HashSet::new()),
            recursion_depth: RefCell::new(0),
            max_recursion_depth,
            cache_cap,
        }
    }

    /// Return a clone of the cached object, if present under `obj_ref`'s number with a matching
    /// generation.
    pub fn get_cached(&self, obj_ref: ObjectRef) -> Option<Object> {
        self.nodes
            .borrow()
            .get(&obj_ref.id)
            .filter(|node| node.gen == obj_ref.gen)
            .map(|node| node.value.clone())
    }

    /// Insert a freshly lazy-loaded object into the cache, clearing the whole cache first if
    /// doing so would exceed `cache_cap` (§4.10's "bounded in-memory cap with eviction").
    pub fn insert(&self, obj_ref: ObjectRef, obj: Object) {
        if !is_cacheable(&obj) {
            return;
        }
        self.register_capped(ObjectNode::in_memory(obj_ref.id, obj_ref.gen, obj));
    }

    /// Register `node` directly under its own object number, bypassing the cacheability check
    /// `insert` applies to lazily-loaded nodes — §4.10's `register`/`addObject` operation, used
    /// when a caller adds or overwrites an object outright rather than discovering it by lazy
    /// load from a source file.
    pub fn register(&self, node: ObjectNode) {
        let mut nodes = self.nodes.borrow_mut();
        nodes.insert(node.obj, node);
    }

    fn register_capped(&self, node: ObjectNode) {
        let mut nodes = self.nodes.borrow_mut();
        if nodes.len() >= self.cache_cap && !nodes.contains_key(&node.obj) {
            log::debug!(
                "registry cache at cap ({} entries), clearing before insert",
                nodes.len()
            );
            nodes.clear();
        }
        nodes.insert(node.obj, node);
    }

    /// Remove a registered object by number, returning its node if it was present — §4.10's
    /// `remove` operation.
    pub fn remove(&self, obj_num: u32) -> Option<ObjectNode> {
        self.nodes.borrow_mut().shift_remove(&obj_num)
    }

    /// Highest object number currently registered, or 0 if the registry is empty — §4.10's
    /// `getMaxObjectNumber`.
    pub fn get_max_object_number(&self) -> u32 {
        self.nodes.borrow().keys().copied().max().unwrap_or(0)
    }

    /// The next object number not yet in use — §4.10's `getNextObjectNumber`.
    pub fn get_next_object_number(&self) -> u32 {
        self.get_max_object_number() + 1
    }

    /// Compact registered object numbers to a contiguous `1..=N` range, preserving each node's
    /// relative insertion order, and return the old -> new `ObjectRef` translation so callers can
    /// rewrite references elsewhere — §4.10's `rebuildObjectNumbers`.
    pub fn rebuild_object_numbers(&self) -> HashMap<ObjectRef, ObjectRef> {
        let old_nodes: IndexMap<u32, ObjectNode> = self.nodes.replace(IndexMap::new());
        let mut translation = HashMap::with_capacity(old_nodes.len());
        let mut rebuilt = IndexMap::with_capacity(old_nodes.len());
        for (i, (_, mut node)) in old_nodes.into_iter().enumerate() {
            let old_ref = node.object_ref();
            let new_id = (i + 1) as u32;
            node.set_object_number(new_id);
            translation.insert(old_ref, node.object_ref());
            rebuilt.insert(new_id, node);
        }
        *self.nodes.borrow_mut() = rebuilt;
        translation
    }

    /// Number of objects currently cached.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Mark `obj_ref` as entering resolution: checks the recursion-depth bound and the
    /// in-progress resolution stack for cycles, then records `obj_ref` as in-progress. The
    /// returned guard undoes both bookkeeping steps when dropped.
    pub fn enter(&self, obj_ref: ObjectRef) -> Result<ResolveGuard<'_>> {
        let depth = *self.recursion_depth.borrow();
        if depth >= self.max_recursion_depth {
            log::error!(
                "recursion depth limit exceeded ({}) while resolving object {} gen {}",
                self.max_recursion_depth,
                obj_ref.id,
                obj_ref.gen
            );
            return Err(Error::RecursionLimitExceeded(self.max_recursion_depth));
        }
        if self.resolving_stack.borrow().contains(&obj_ref) {
            log::error!(
                "circular reference detected for object {} gen {} (depth: {})",
                obj_ref.id,
                obj_ref.gen,
                depth
            );
            return Err(Error::CircularReference(obj_ref));
        }
        self.resolving_stack.borrow_mut().insert(obj_ref);
        *self.recursion_depth.borrow_mut() += 1;
        Ok(ResolveGuard { registry: self, obj_ref })
    }
}

/// A node is cacheable iff it does not transitively contain a Stream value. References are
/// treated conservatively as non-cacheable since following one may drag in a large stream.
pub fn is_cacheable(obj: &Object) -> bool {
    !matches!(obj, Object::Reference(_)) && !crate::object::value_contains_stream(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Dict;

    #[test]
    fn test_cache_hit_after_insert() {
        let registry = PdfObjectRegistry::default();
        let obj_ref = ObjectRef::new(1, 0);
        registry.insert(obj_ref, Object::Integer(42));
        assert_eq!(registry.get_cached(obj_ref), Some(Object::Integer(42)));
    }

    #[test]
    fn test_cache_miss_for_unknown_ref() {
        let registry = PdfObjectRegistry::default();
        assert_eq!(registry.get_cached(ObjectRef::new(99, 0)), None);
    }

    #[test]
    fn test_cache_clears_when_cap_exceeded() {
        let registry = PdfObjectRegistry::new(DEFAULT_MAX_RECURSION_DEPTH, 2);
        registry.insert(ObjectRef::new(1, 0), Object::Integer(1));
        registry.insert(ObjectRef::new(2, 0), Object::Integer(2));
        registry.insert(ObjectRef::new(3, 0), Object::Integer(3));
        assert_eq!(registry.len(), 1);
        assert!(registry.get_cached(ObjectRef::new(1, 0)).is_none());
        assert!(registry.get_cached(ObjectRef::new(3, 0)).is_some());
    }

    #[test]
    fn test_stream_objects_are_not_cached() {
        let registry = PdfObjectRegistry::default();
        let obj_ref = ObjectRef::new(1, 0);
        let stream = Object::Stream { dict: Dict::new(), data: bytes::Bytes::new() };
        registry.insert(obj_ref, stream);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_dict_containing_stream_is_not_cacheable() {
        let mut dict = Dict::new();
        dict.insert(
            "X".to_string(),
            Object::Stream { dict: Dict::new(), data: bytes::Bytes::new() },
        );
        assert!(!is_cacheable(&Object::Dictionary(dict)));
    }

    #[test]
    fn test_plain_dict_is_cacheable() {
        let mut dict = Dict::new();
        dict.insert("X".to_string(), Object::Integer(1));
        assert!(is_cacheable(&Object::Dictionary(dict)));
    }

    #[test]
    fn test_recursive_reference_is_rejected() {
        let registry = PdfObjectRegistry::default();
        let obj_ref = ObjectRef::new(1, 0);
        let _guard = registry.enter(obj_ref).unwrap();
        let err = registry.enter(obj_ref).unwrap_err();
        assert!(matches!(err, Error::CircularReference(_)));
    }

    #[test]
    fn test_guard_drop_allows_reentry() {
        let registry = PdfObjectRegistry::default();
        let obj_ref = ObjectRef::new(1, 0);
        {
            let _guard = registry.enter(obj_ref).unwrap();
        }
        assert!(registry.enter(obj_ref).is_ok());
    }

    #[test]
    fn test_recursion_depth_limit_enforced() {
        let registry = PdfObjectRegistry::new(2, DEFAULT_CACHE_CAP);
        let _g1 = registry.enter(ObjectRef::new(1, 0)).unwrap();
        let _g2 = registry.enter(ObjectRef::new(2, 0)).unwrap();
        let err = registry.enter(ObjectRef::new(3, 0)).unwrap_err();
        assert!(matches!(err, Error::RecursionLimitExceeded(2)));
    }

    #[test]
    fn test_register_and_remove() {
        let registry = PdfObjectRegistry::default();
        registry.register(ObjectNode::in_memory(5, 0, Object::Integer(7)));
        assert_eq!(registry.get_cached(ObjectRef::new(5, 0)), Some(Object::Integer(7)));
        let removed = registry.remove(5).unwrap();
        assert_eq!(removed.value, Object::Integer(7));
        assert!(registry.get_cached(ObjectRef::new(5, 0)).is_none());
    }

    #[test]
    fn test_register_is_not_subject_to_cacheability_check() {
        let registry = PdfObjectRegistry::default();
        let stream = Object::Stream { dict: Dict::new(), data: bytes::Bytes::new() };
        registry.register(ObjectNode::in_memory(1, 0, stream));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_max_and_next_object_number() {
        let registry = PdfObjectRegistry::default();
        assert_eq!(registry.get_max_object_number(), 0);
        assert_eq!(registry.get_next_object_number(), 1);
        registry.register(ObjectNode::in_memory(3, 0, Object::Null));
        registry.register(ObjectNode::in_memory(7, 0, Object::Null));
        assert_eq!(registry.get_max_object_number(), 7);
        assert_eq!(registry.get_next_object_number(), 8);
    }

    #[test]
    fn test_rebuild_object_numbers_compacts_preserving_order() {
        let registry = PdfObjectRegistry::default();
        registry.register(ObjectNode::in_memory(10, 0, Object::Integer(1)));
        registry.register(ObjectNode::in_memory(25, 0, Object::Integer(2)));
        registry.register(ObjectNode::in_memory(6, 0, Object::Integer(3)));

        let translation = registry.rebuild_object_numbers();
        assert_eq!(translation.get(&ObjectRef::new(10, 0)), Some(&ObjectRef::new(1, 0)));
        assert_eq!(translation.get(&ObjectRef::new(25, 0)), Some(&ObjectRef::new(2, 0)));
        assert_eq!(translation.get(&ObjectRef::new(6, 0)), Some(&ObjectRef::new(3, 0)));

        assert_eq!(registry.get_cached(ObjectRef::new(1, 0)), Some(Object::Integer(1)));
        assert_eq!(registry.get_cached(ObjectRef::new(2, 0)), Some(Object::Integer(2)));
        assert_eq!(registry.get_cached(ObjectRef::new(3, 0)), Some(Object::Integer(3)));
        assert_eq!(registry.get_max_object_number(), 3);
    }
}
