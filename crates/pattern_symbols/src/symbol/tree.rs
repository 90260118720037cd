//! Arena of symbol nodes and the generation protocol over it.
use rand::RngCore;
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::GenerationContext;
use crate::effects::{apply_all, parse_effects, Effect};
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Geometry, Shape};
use crate::params::{empty_object, TypedSpec};
use crate::placer::{grid, NoiseGrid, Placer, Subdivision};
use crate::symbol::{registry, selector, Node, NodeId, Selector, SymbolKind};

/// Owns every node of a pattern; nodes refer to each other by [`NodeId`].
///
/// Parents own their children. A child's `parent` link is only used to resolve
/// effects and to keep a node's place when its kind is changed.
///
/// Slots freed by structural edits are reused, so an id taken before an edit that
/// removed its node may later name a different node.
#[derive(Clone, Debug)]
pub struct SymbolTree {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
    fallback: Option<Effect>,
}

impl SymbolTree {
    /// Build a tree from a `{type, parameters}` document.
    pub fn from_json(value: &Value, rng: &mut dyn RngCore) -> Result<Self> {
        let spec: TypedSpec = serde_json::from_value(value.clone())?;
        Self::from_spec(&spec, rng)
    }

    pub fn from_spec(spec: &TypedSpec, rng: &mut dyn RngCore) -> Result<Self> {
        let mut tree = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            fallback: None,
        };
        tree.root = tree.build_node(&spec.tag, &spec.parameters, None, rng)?;
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, internal ones included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn checked(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(Error::UnknownNode { index: id.0 })
    }

    pub(crate) fn checked_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id).ok_or(Error::UnknownNode { index: id.0 })
    }

    /// Canonical tag of a node.
    pub fn tag(&self, id: NodeId) -> Option<&'static str> {
        self.node(id).map(|node| node.tag)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn kind(&self, id: NodeId) -> Option<&SymbolKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub(crate) fn placer(&self, id: NodeId) -> Option<&Placer> {
        match self.kind(id)? {
            SymbolKind::Placer(placer) | SymbolKind::Grid(placer) => Some(placer),
            _ => None,
        }
    }

    fn placer_mut(&mut self, id: NodeId) -> Option<&mut Placer> {
        match &mut self.node_mut(id)?.kind {
            SymbolKind::Placer(placer) | SymbolKind::Grid(placer) => Some(placer),
            _ => None,
        }
    }

    fn noise_grid_mut(&mut self, id: NodeId) -> Option<&mut NoiseGrid> {
        match &mut self.node_mut(id)?.kind {
            SymbolKind::NoiseGrid(grid) => Some(grid),
            _ => None,
        }
    }

    fn subdivision_mut(&mut self, id: NodeId) -> Option<&mut Subdivision> {
        match &mut self.node_mut(id)?.kind {
            SymbolKind::Subdivision(subdivision) => Some(subdivision),
            _ => None,
        }
    }

    pub fn selector(&self, id: NodeId) -> Option<&Selector> {
        match self.kind(id)? {
            SymbolKind::Selector(selector) => Some(selector),
            _ => None,
        }
    }

    fn selector_mut(&mut self, id: NodeId) -> Result<&mut Selector> {
        match &mut self.checked_mut(id)?.kind {
            SymbolKind::Selector(selector) => Ok(selector),
            _ => Err(Error::InvalidConfig(format!("node {id} is not a random selection"))),
        }
    }

    /// Every node directly owned by `id`, internal grid levels included.
    fn owned_children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            Some(SymbolKind::Terminal(_)) | None => Vec::new(),
            Some(SymbolKind::Placer(placer) | SymbolKind::Grid(placer)) => vec![placer.child],
            Some(SymbolKind::NoiseGrid(grid)) => vec![grid.child],
            Some(SymbolKind::Subdivision(subdivision)) => vec![subdivision.child],
            Some(SymbolKind::Selector(selector)) => {
                selector.entries().iter().map(|entry| entry.child).collect()
            }
        }
    }

    /// User-visible children; a grid exposes its symbol, not its internal levels.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            Some(SymbolKind::Grid(rows)) => grid::flat_parameters(self, rows)
                .map(|(_, leaf)| vec![leaf])
                .unwrap_or_default(),
            _ => self.owned_children(id),
        }
    }

    // Construction

    pub(crate) fn reserve(&mut self) -> NodeId {
        if let Some(index) = self.free.pop() {
            return NodeId(index);
        }
        self.nodes.push(None);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn install(
        &mut self,
        id: NodeId,
        tag: &'static str,
        parent: Option<NodeId>,
        kind: SymbolKind,
    ) {
        self.install_node(
            id,
            Node {
                tag,
                parent,
                effects: Vec::new(),
                kind,
            },
        );
    }

    fn install_node(&mut self, id: NodeId, node: Node) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = Some(node);
        }
    }

    pub(crate) fn build_child(
        &mut self,
        spec: &TypedSpec,
        parent: NodeId,
        rng: &mut dyn RngCore,
    ) -> Result<NodeId> {
        self.build_node(&spec.tag, &spec.parameters, Some(parent), rng)
    }

    fn build_node(
        &mut self,
        tag: &str,
        params: &Value,
        parent: Option<NodeId>,
        rng: &mut dyn RngCore,
    ) -> Result<NodeId> {
        let entry = registry::lookup(tag)?;
        let effects = node_effects(params, rng)?;
        let id = self.reserve();
        let kind = (entry.build)(self, id, params, rng)?;
        self.install_node(
            id,
            Node {
                tag: entry.tag,
                parent,
                effects,
                kind,
            },
        );
        Ok(id)
    }

    /// Run a structural edit; nodes allocated by a failed edit are dropped again.
    pub(crate) fn transaction<T>(
        &mut self,
        edit: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let mark = self.nodes.len();
        let free = self.free.clone();
        let result = edit(self);
        if result.is_err() {
            for &index in &free {
                if let Some(slot) = self.nodes.get_mut(index) {
                    *slot = None;
                }
            }
            self.nodes.truncate(mark);
            self.free = free;
        }
        result
    }

    /// Replace the kind of `id` in place, keeping its parent and effects.
    pub(crate) fn rebuild(
        &mut self,
        id: NodeId,
        tag: &str,
        params: &Value,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        self.checked(id)?;
        let entry = registry::lookup(tag)?;
        let previous = self.owned_children(id);
        let kind = self.transaction(|tree| (entry.build)(tree, id, params, rng))?;
        for child in previous {
            self.release(child);
        }
        if let Some(node) = self.node_mut(id) {
            node.tag = entry.tag;
            node.kind = kind;
        }
        debug!("Rebuilt node {} as '{}'.", id, entry.tag);
        Ok(())
    }

    /// Free `id` and everything below it.
    fn release(&mut self, id: NodeId) {
        for child in self.owned_children(id) {
            self.release(child);
        }
        if let Some(slot) = self.nodes.get_mut(id.0) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }

    // Effects

    pub fn effects(&self, id: NodeId) -> &[Effect] {
        self.node(id).map_or(&[], |node| node.effects.as_slice())
    }

    /// Effects declared on the closest node of the parent chain.
    fn chain_effects(&self, id: NodeId) -> Option<&[Effect]> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            if !node.effects.is_empty() {
                return Some(&node.effects);
            }
            cursor = node.parent;
        }
        None
    }

    /// Effects applied to shapes emitted by `id`.
    ///
    /// Falls back to the tree-wide default once it was materialized.
    pub fn resolved_effects(&self, id: NodeId) -> &[Effect] {
        self.chain_effects(id)
            .unwrap_or_else(|| self.fallback.as_slice())
    }

    /// Default effect used when no node of a chain declares one.
    pub fn fallback_effect(&self) -> Option<&Effect> {
        self.fallback.as_ref()
    }

    pub fn add_effect(&mut self, id: NodeId, effect: Effect) -> Result<()> {
        self.checked_mut(id)?.effects.push(effect);
        Ok(())
    }

    pub fn remove_effect(&mut self, id: NodeId, index: usize) -> Result<Effect> {
        let effects = &mut self.checked_mut(id)?.effects;
        if index >= effects.len() {
            return Err(Error::InvalidConfig(format!(
                "node {id} has no effect at index {index}"
            )));
        }
        Ok(effects.remove(index))
    }

    /// Whether any node carries an effect of type `tag`.
    pub fn uses_effect(&self, tag: &str) -> bool {
        self.nodes
            .iter()
            .flatten()
            .any(|node| node.effects.iter().any(|effect| effect.tag() == tag))
    }

    pub fn effect_mut(&mut self, id: NodeId, index: usize) -> Option<&mut Effect> {
        self.node_mut(id)?.effects.get_mut(index)
    }

    /// Replace an effect by a fresh one of another type.
    pub fn change_effect(
        &mut self,
        id: NodeId,
        index: usize,
        tag: &str,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let effect = Effect::create(tag, &empty_object(), rng)?;
        let slot = self
            .checked_mut(id)?
            .effects
            .get_mut(index)
            .ok_or_else(|| Error::InvalidConfig(format!("node {id} has no effect at index {index}")))?;
        *slot = effect;
        Ok(())
    }

    // Weighted selection editing

    /// Append an entry built from `spec`; returns the new child.
    pub fn add_entry(
        &mut self,
        id: NodeId,
        weight: f32,
        spec: &TypedSpec,
        rng: &mut dyn RngCore,
    ) -> Result<NodeId> {
        self.selector_mut(id)?;
        self.transaction(|tree| {
            let child = tree.build_child(spec, id, rng)?;
            tree.selector_mut(id)?.push(weight, child)?;
            Ok(child)
        })
    }

    pub fn remove_entry(&mut self, id: NodeId, index: usize) -> Result<()> {
        let entry = self.selector_mut(id)?.remove(index)?;
        self.release(entry.child);
        Ok(())
    }

    pub fn set_weight(&mut self, id: NodeId, index: usize, weight: f32) -> Result<()> {
        self.selector_mut(id)?.set_weight(index, weight)
    }

    pub fn recompute_total_weight(&mut self, id: NodeId) -> Result<()> {
        self.selector_mut(id)?.recompute_total_weight();
        Ok(())
    }

    // Protocol

    /// Produce the next shape of `id` inside `bounds`, or `None` once exhausted.
    ///
    /// Enclosing placers push their progress onto `positions`.
    pub fn next(
        &mut self,
        id: NodeId,
        bounds: &Bounds,
        positions: &mut Vec<f32>,
        ctx: &mut GenerationContext<'_>,
    ) -> Option<Shape> {
        match &mut self.node_mut(id)?.kind {
            SymbolKind::Terminal(terminal) => {
                if terminal.is_finished() {
                    return None;
                }
                terminal.mark_emitted();
                let geometry = terminal.geometry(bounds);
                Some(self.finish_shape(id, geometry, positions, ctx))
            }
            SymbolKind::Placer(_) | SymbolKind::Grid(_) => {
                self.next_placer(id, bounds, positions, ctx)
            }
            SymbolKind::NoiseGrid(_) => self.next_noise_grid(id, bounds, positions, ctx),
            SymbolKind::Subdivision(_) => self.next_subdivision(id, bounds, positions, ctx),
            SymbolKind::Selector(_) => self.next_selector(id, bounds, positions, ctx),
        }
    }

    fn finish_shape(
        &mut self,
        id: NodeId,
        geometry: Geometry,
        positions: &[f32],
        ctx: &mut GenerationContext<'_>,
    ) -> Shape {
        if self.fallback.is_none() && self.chain_effects(id).is_none() {
            self.fallback = Some(Effect::fallback(ctx.rng));
        }
        let mut shape = Shape::new(geometry);
        apply_all(self.resolved_effects(id), &mut shape, positions, ctx);
        shape
    }

    fn next_placer(
        &mut self,
        id: NodeId,
        bounds: &Bounds,
        positions: &mut Vec<f32>,
        ctx: &mut GenerationContext<'_>,
    ) -> Option<Shape> {
        let placer = self.placer_mut(id)?;
        if placer.is_finished() {
            return None;
        }
        placer.ensure_initialized(bounds);
        positions.push(placer.progress());
        let child = placer.child;
        let working = placer.working()?.clone();

        let shape = self.next(child, &working, positions, ctx);
        if self.has_finished(child) {
            let next = self.placer_mut(id).and_then(|placer| {
                placer.advance();
                placer.working().cloned()
            });
            self.reset(child, next.as_ref(), ctx.rng);
        }
        shape
    }

    fn next_noise_grid(
        &mut self,
        id: NodeId,
        bounds: &Bounds,
        positions: &mut Vec<f32>,
        ctx: &mut GenerationContext<'_>,
    ) -> Option<Shape> {
        let grid = self.noise_grid_mut(id)?;
        if grid.is_finished() {
            return None;
        }
        grid.ensure_lattice(bounds, ctx.rng);
        positions.extend(grid.positions());
        let child = grid.child;
        let cell = grid.current_bounds()?;

        let shape = self.next(child, &cell, positions, ctx);
        if self.has_finished(child) {
            let next = self.noise_grid_mut(id).and_then(|grid| {
                grid.advance();
                grid.current_bounds()
            });
            self.reset(child, next.as_ref(), ctx.rng);
        }
        shape
    }

    fn next_subdivision(
        &mut self,
        id: NodeId,
        bounds: &Bounds,
        positions: &mut Vec<f32>,
        ctx: &mut GenerationContext<'_>,
    ) -> Option<Shape> {
        let subdivision = self.subdivision_mut(id)?;
        if subdivision.is_finished() {
            return None;
        }
        subdivision.ensure_started(bounds, ctx.rng);
        positions.extend(subdivision.positions());
        let child = subdivision.child;
        let leaf = subdivision.leaf_bounds()?;

        let shape = self.next(child, &leaf, positions, ctx);
        if self.has_finished(child) {
            let mut next = None;
            if let Some(subdivision) = self.subdivision_mut(id) {
                subdivision.advance(ctx.rng);
                next = subdivision.leaf_bounds();
            }
            self.reset(child, next.as_ref(), ctx.rng);
        }
        shape
    }

    fn next_selector(
        &mut self,
        id: NodeId,
        bounds: &Bounds,
        positions: &mut Vec<f32>,
        ctx: &mut GenerationContext<'_>,
    ) -> Option<Shape> {
        let selector = self.selector_mut(id).ok()?;
        let child = match selector.current_child() {
            Some(child) => child,
            None => {
                let child = selector.check_out(ctx.rng)?;
                self.reset(child, Some(bounds), ctx.rng);
                child
            }
        };

        let shape = self.next(child, bounds, positions, ctx);
        if self.has_finished(child) {
            self.reset(child, Some(bounds), ctx.rng);
            if let Ok(selector) = self.selector_mut(id) {
                selector.release();
            }
        }
        shape
    }

    /// Whether the current pass of `id` is exhausted. Unknown ids are finished.
    pub fn has_finished(&self, id: NodeId) -> bool {
        match self.kind(id) {
            None => true,
            Some(SymbolKind::Terminal(terminal)) => terminal.is_finished(),
            Some(SymbolKind::Placer(placer) | SymbolKind::Grid(placer)) => placer.is_finished(),
            Some(SymbolKind::NoiseGrid(grid)) => grid.is_finished(),
            Some(SymbolKind::Subdivision(subdivision)) => subdivision.is_finished(),
            Some(SymbolKind::Selector(selector)) => selector.is_finished(),
        }
    }

    /// Start a new pass of `id` and its subtree.
    ///
    /// With bounds, placers derive their working bounds right away; without, they
    /// derive them from the bounds of their next call.
    pub fn reset(&mut self, id: NodeId, bounds: Option<&Bounds>, rng: &mut dyn RngCore) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let (child, child_bounds) = match &mut node.kind {
            SymbolKind::Terminal(terminal) => {
                terminal.restart();
                return;
            }
            SymbolKind::Placer(placer) | SymbolKind::Grid(placer) => {
                placer.restart(bounds, rng);
                (placer.child, placer.working().cloned())
            }
            SymbolKind::NoiseGrid(grid) => {
                grid.restart(bounds, rng);
                (grid.child, grid.current_bounds())
            }
            SymbolKind::Subdivision(subdivision) => {
                subdivision.restart(bounds, rng);
                (subdivision.child, subdivision.leaf_bounds())
            }
            SymbolKind::Selector(selector) => {
                let Some(child) = selector.current_child() else {
                    return;
                };
                selector.release();
                (child, bounds.cloned())
            }
        };
        self.reset(child, child_bounds.as_ref(), rng);
    }

    /// `{type, parameters}` of `id`, children and effects included.
    pub fn to_json(&self, id: NodeId) -> Value {
        let Some(node) = self.node(id) else {
            return Value::Null;
        };
        let mut params = match &node.kind {
            SymbolKind::Terminal(terminal) => terminal.parameters(),
            SymbolKind::Placer(placer) => self.with_symbol(placer.parameters(), placer.child),
            SymbolKind::Grid(rows) => match grid::flat_parameters(self, rows) {
                Some((params, leaf)) => self.with_symbol(params, leaf),
                None => Map::new(),
            },
            SymbolKind::NoiseGrid(grid) => self.with_symbol(grid.parameters(), grid.child),
            SymbolKind::Subdivision(subdivision) => {
                self.with_symbol(subdivision.parameters(), subdivision.child)
            }
            SymbolKind::Selector(selector) => selector::parameters(selector, self),
        };
        if !node.effects.is_empty() {
            let effects = node.effects.iter().map(Effect::to_json).collect();
            params.insert("effects".into(), Value::Array(effects));
        }
        TypedSpec::new(node.tag, Value::Object(params)).to_value()
    }

    fn with_symbol(&self, mut params: Map<String, Value>, child: NodeId) -> Map<String, Value> {
        params.insert("symbol".into(), self.to_json(child));
        params
    }

    /// Serialized form of the root.
    pub fn to_root_json(&self) -> Value {
        self.to_json(self.root)
    }
}

/// Effects declared in a node's parameters: `effects`, or the older `colors`.
fn node_effects(params: &Value, rng: &mut dyn RngCore) -> Result<Vec<Effect>> {
    match params.get("effects") {
        Some(effects) if !effects.is_null() => parse_effects(effects, rng),
        _ => parse_effects(params.get("colors").unwrap_or(&Value::Null), rng),
    }
}
