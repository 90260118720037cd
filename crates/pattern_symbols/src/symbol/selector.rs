//! Weighted random choice between child symbols.
use rand::RngCore;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::{Error, Result};
use crate::params::{resolve, TypedSpec};
use crate::random::rand01;
use crate::symbol::{NodeId, SymbolKind, SymbolTree};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectorEntry {
    pub weight: f32,
    pub child: NodeId,
}

/// Picks one child per draw with probability `weight / total_weight`.
///
/// The picked child is checked out and receives every call until it finishes; it
/// is then reset and released so that the next call draws again. From the
/// outside the selector is finished whenever nothing is checked out.
#[derive(Clone, Debug, Default)]
pub struct Selector {
    entries: Vec<SelectorEntry>,
    total_weight: f32,
    current: Option<usize>,
}

impl Selector {
    pub fn entries(&self) -> &[SelectorEntry] {
        &self.entries
    }

    pub fn total_weight(&self) -> f32 {
        self.total_weight
    }

    /// Index of the checked-out entry.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub(crate) fn current_child(&self) -> Option<NodeId> {
        self.current
            .and_then(|index| self.entries.get(index))
            .map(|entry| entry.child)
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    pub(crate) fn push(&mut self, weight: f32, child: NodeId) -> Result<()> {
        check_weight(weight)?;
        self.entries.push(SelectorEntry { weight, child });
        self.total_weight += weight;
        Ok(())
    }

    /// Remove an entry and return its child; a checked-out entry is released.
    pub(crate) fn remove(&mut self, index: usize) -> Result<SelectorEntry> {
        if index >= self.entries.len() {
            return Err(Error::parameter(
                "random-shape",
                format!("no entry at index {index}"),
            ));
        }
        let entry = self.entries.remove(index);
        self.total_weight -= entry.weight;
        self.current = match self.current {
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        if self.entries.is_empty() {
            self.total_weight = 0.0;
        }
        Ok(entry)
    }

    pub(crate) fn set_weight(&mut self, index: usize, weight: f32) -> Result<()> {
        check_weight(weight)?;
        let entry = self.entries.get_mut(index).ok_or_else(|| {
            Error::parameter("random-shape", format!("no entry at index {index}"))
        })?;
        self.total_weight += weight - entry.weight;
        entry.weight = weight;
        Ok(())
    }

    /// Sum the weights again from scratch.
    pub fn recompute_total_weight(&mut self) {
        self.total_weight = self.entries.iter().map(|entry| entry.weight).sum();
    }

    /// Index chosen for a uniform draw `u` in `[0, 1)`.
    ///
    /// Takes the first entry whose cumulative weight exceeds `u * total`, so zero
    /// weights are never chosen. Rounding at the very top of the range falls back
    /// to the last entry with a positive weight.
    pub fn pick(&self, u: f32) -> Option<usize> {
        if self.entries.is_empty() || self.total_weight <= 0.0 {
            return None;
        }
        let target = u * self.total_weight;
        let mut sum = 0.0;
        for (index, entry) in self.entries.iter().enumerate() {
            sum += entry.weight;
            if sum > target {
                return Some(index);
            }
        }
        self.entries.iter().rposition(|entry| entry.weight > 0.0)
    }

    /// Draw and check out an entry.
    pub(crate) fn check_out(&mut self, rng: &mut dyn RngCore) -> Option<NodeId> {
        let index = self.pick(rand01(rng));
        if index.is_none() {
            warn!("Random selection has no entry with a positive weight; nothing is drawn.");
        }
        self.current = index;
        self.current_child()
    }

    pub(crate) fn release(&mut self) {
        self.current = None;
    }
}

fn check_weight(weight: f32) -> Result<()> {
    if weight < 0.0 || !weight.is_finite() {
        return Err(Error::parameter(
            "random-shape",
            format!("weight {weight} must be a non-negative number"),
        ));
    }
    Ok(())
}

#[derive(Deserialize)]
struct EntrySpec {
    weight: f32,
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    parameters: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectorSpec {
    shape_probabilities: Vec<EntrySpec>,
}

pub(crate) fn build_selector(
    tree: &mut SymbolTree,
    id: NodeId,
    params: &Value,
    rng: &mut dyn RngCore,
) -> Result<SymbolKind> {
    let defaults = json!({
        "shapeProbabilities": [
            { "weight": 1, "type": "rectangle", "parameters": {} },
            { "weight": 1, "type": "circle", "parameters": {} },
        ]
    });
    let spec: SelectorSpec = resolve("random-shape", &defaults, params)?;
    let mut selector = Selector::default();
    for entry in spec.shape_probabilities {
        check_weight(entry.weight)?;
        let child = tree.build_child(&TypedSpec::new(entry.tag, entry.parameters), id, rng)?;
        selector.push(entry.weight, child)?;
    }
    Ok(SymbolKind::Selector(selector))
}

/// Parameters of a selector given its serialized children.
pub(crate) fn parameters(selector: &Selector, tree: &SymbolTree) -> Map<String, Value> {
    let entries: Vec<Value> = selector
        .entries
        .iter()
        .map(|entry| {
            let mut child = tree.to_json(entry.child);
            if let Value::Object(map) = &mut child {
                map.insert("weight".into(), crate::params::tidy_floats(json!(entry.weight)));
            }
            child
        })
        .collect();
    let mut map = Map::new();
    map.insert("shapeProbabilities".into(), Value::Array(entries));
    map
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn selector(weights: &[f32]) -> Selector {
        let mut selector = Selector::default();
        for (i, weight) in weights.iter().enumerate() {
            selector.push(*weight, NodeId(i)).unwrap();
        }
        selector
    }

    #[test]
    fn pick_uses_strictly_greater_cumulative_weight() {
        let s = selector(&[1.0, 0.0, 3.0]);
        assert_eq!(s.pick(0.0), Some(0));
        assert_eq!(s.pick(0.24), Some(0));
        assert_eq!(s.pick(0.25), Some(2));
        assert_eq!(s.pick(0.999), Some(2));
    }

    #[test]
    fn zero_weight_entries_are_never_picked() {
        let s = selector(&[0.0, 2.0, 0.0]);
        for i in 0..100 {
            assert_eq!(s.pick(i as f32 / 100.0), Some(1));
        }
    }

    #[test]
    fn empty_or_weightless_tables_pick_nothing() {
        assert_eq!(selector(&[]).pick(0.5), None);
        assert_eq!(selector(&[0.0, 0.0]).pick(0.5), None);
    }

    #[test]
    fn selection_frequencies_follow_weights() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut s = selector(&[1.0, 3.0]);
        let mut counts = [0usize; 2];
        let draws = 20_000;
        for _ in 0..draws {
            let child = s.check_out(&mut rng).unwrap();
            counts[child.index()] += 1;
            s.release();
        }
        let share = counts[1] as f32 / draws as f32;
        assert!((share - 0.75).abs() < 0.02, "share was {share}");
    }

    #[test]
    fn edits_keep_total_weight_in_sync() {
        let mut s = selector(&[1.0, 2.0, 3.0]);
        assert_eq!(s.total_weight(), 6.0);
        s.set_weight(0, 4.0).unwrap();
        assert_eq!(s.total_weight(), 9.0);
        s.remove(1).unwrap();
        assert_eq!(s.total_weight(), 7.0);
        assert!(s.set_weight(0, -1.0).is_err());
        assert!(s.remove(5).is_err());
        s.recompute_total_weight();
        assert_eq!(s.total_weight(), 7.0);
    }

    #[test]
    fn removing_the_checked_out_entry_releases_it() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut s = selector(&[1.0]);
        s.check_out(&mut rng);
        assert!(!s.is_finished());
        s.remove(0).unwrap();
        assert!(s.is_finished());
        assert_eq!(s.total_weight(), 0.0);
    }
}
