//! Editable fields of a node and in-place edits.
//!
//! Every edit rebuilds the node from its own serialized parameters with one value
//! replaced, so the edited node goes through the same validation as a node read
//! from a document. Descendants are rebuilt too and receive new ids; the edited
//! node keeps its id, its parent link and its effects.
use rand::RngCore;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::params::empty_object;
use crate::symbol::{registry, NodeId, SymbolTree};

/// Value type and accepted range of an editable field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind {
    Number { min: f32, max: f32, step: f32 },
    Integer { min: i64, max: i64 },
    Bool,
}

impl FieldKind {
    /// Normalized `value`, or a description of why it does not fit.
    fn check(&self, value: &Value) -> std::result::Result<Value, String> {
        match *self {
            FieldKind::Number { min, max, .. } => {
                let number = value
                    .as_f64()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| format!("expected a number, got {value}"))?;
                if number < f64::from(min) || number > f64::from(max) {
                    return Err(format!("{number} is outside [{min}, {max}]"));
                }
                Ok(json!(number))
            }
            FieldKind::Integer { min, max } => {
                let integer = value
                    .as_i64()
                    .or_else(|| {
                        value
                            .as_f64()
                            .filter(|n| n.fract() == 0.0)
                            .map(|n| n as i64)
                    })
                    .ok_or_else(|| format!("expected an integer, got {value}"))?;
                if !(min..=max).contains(&integer) {
                    return Err(format!("{integer} is outside [{min}, {max}]"));
                }
                Ok(json!(integer))
            }
            FieldKind::Bool => value
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| format!("expected a boolean, got {value}")),
        }
    }
}

/// Schema entry of an editable field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// A field together with the node's current value.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: Value,
}

impl SymbolTree {
    fn own_parameters(&self, id: NodeId) -> Result<Value> {
        self.checked(id)?;
        let mut params = match self.to_json(id) {
            Value::Object(mut map) => map.remove("parameters").unwrap_or_else(empty_object),
            _ => empty_object(),
        };
        if let Value::Object(map) = &mut params {
            map.remove("effects");
        }
        Ok(params)
    }

    /// Editable fields of `id` with their current values.
    pub fn properties(&self, id: NodeId) -> Result<Vec<Property>> {
        let entry = registry::lookup(self.checked(id)?.tag)?;
        let params = self.own_parameters(id)?;
        Ok(entry
            .fields
            .iter()
            .map(|field| Property {
                name: field.name,
                label: field.label,
                kind: field.kind,
                value: params.get(field.name).cloned().unwrap_or(Value::Null),
            })
            .collect())
    }

    /// Validate `value` against the field `name` of `id` and rebuild the node with it.
    ///
    /// On error the tree is left unchanged.
    pub fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: Value,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let tag = self.checked(id)?.tag;
        let entry = registry::lookup(tag)?;
        let field = entry
            .fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| Error::parameter(tag, format!("no editable field '{name}'")))?;
        let value = field
            .kind
            .check(&value)
            .map_err(|message| Error::parameter(tag, format!("{name}: {message}")))?;

        let mut params = self.own_parameters(id)?;
        if let Value::Object(map) = &mut params {
            map.insert(name.to_owned(), value);
        }
        self.rebuild(id, tag, &params, rng)?;
        debug!("Set '{}' of node {} ('{}').", name, id, tag);
        Ok(())
    }

    /// Replace `id` by a default node of type `tag`, keeping its parent and effects.
    pub fn change_type(&mut self, id: NodeId, tag: &str, rng: &mut dyn RngCore) -> Result<()> {
        self.rebuild(id, tag, &empty_object(), rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::context::GenerationContext;
    use crate::geometry::{Bounds, Geometry, Rect};

    fn tree(value: Value, rng: &mut StdRng) -> SymbolTree {
        SymbolTree::from_json(&value, rng).unwrap()
    }

    fn count_shapes(tree: &mut SymbolTree, rng: &mut StdRng) -> usize {
        let container = Bounds::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = tree.root();
        tree.reset(root, None, rng);
        let mut ctx = GenerationContext::new(&container, rng);
        let mut count = 0;
        while !tree.has_finished(root) {
            if tree.next(root, &container, &mut Vec::new(), &mut ctx).is_some() {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn properties_report_current_values() {
        let mut rng = StdRng::seed_from_u64(0);
        let t = tree(json!({ "type": "scaler", "parameters": { "scale": 0.25 } }), &mut rng);
        let props = t.properties(t.root()).unwrap();
        let names: Vec<&str> = props.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["nSymbolsToCreate", "scale", "margin"]);
        assert_eq!(props[0].value, json!(3));
        assert_eq!(props[1].value, json!(0.25));
        assert_eq!(props[2].value, json!(false));
    }

    #[test]
    fn set_property_rebuilds_the_node() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut t = tree(
            json!({
                "type": "line",
                "parameters": { "effects": [{ "type": "three-stripes" }] }
            }),
            &mut rng,
        );
        let root = t.root();
        t.set_property(root, "nSymbolsToCreate", json!(5), &mut rng).unwrap();
        assert_eq!(count_shapes(&mut t, &mut rng), 5);
        assert_eq!(t.effects(root).len(), 1);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn rejected_values_leave_the_tree_unchanged() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut t = tree(json!({ "type": "quadtree" }), &mut rng);
        let root = t.root();
        let before = t.to_root_json();
        for (name, value) in [
            ("probabilityToDivide", json!(1.5)),
            ("maxDepth", json!(2.5)),
            ("maxDepth", json!("deep")),
            ("width", json!(2)),
        ] {
            assert!(t.set_property(root, name, value, &mut rng).is_err());
        }
        assert_eq!(t.to_root_json(), before);
    }

    #[test]
    fn grid_fields_are_flat() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut t = tree(json!({ "type": "grid" }), &mut rng);
        let root = t.root();
        t.set_property(root, "width", json!(5), &mut rng).unwrap();
        t.set_property(root, "height", json!(2), &mut rng).unwrap();
        assert_eq!(count_shapes(&mut t, &mut rng), 10);
        let json = t.to_root_json();
        assert_eq!(json["parameters"]["width"], json!(5));
        assert_eq!(t.len(), 4);
    }

    #[test]
    fn change_type_keeps_parent_and_effects() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut t = tree(
            json!({
                "type": "column",
                "parameters": {
                    "nSymbolsToCreate": 2,
                    "symbol": {
                        "type": "rectangle",
                        "parameters": { "effects": [{ "type": "noise", "parameters": { "amount": 0 } }] }
                    }
                }
            }),
            &mut rng,
        );
        let root = t.root();
        let leaf = t.children(root)[0];
        t.change_type(leaf, "shape-circle", &mut rng).unwrap();
        assert_eq!(t.tag(leaf), Some("circle"));
        assert_eq!(t.parent(leaf), Some(root));
        assert_eq!(t.effects(leaf)[0].tag(), "noise");

        let container = Bounds::new(Rect::new(0.0, 0.0, 10.0, 20.0));
        let mut ctx = GenerationContext::new(&container, &mut rng);
        let shape = t.next(root, &container, &mut Vec::new(), &mut ctx).unwrap();
        assert!(matches!(shape.geometry, Geometry::Polygon { .. }));
    }

    #[test]
    fn change_type_releases_old_children() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut t = tree(json!({ "type": "grid" }), &mut rng);
        let root = t.root();
        t.change_type(root, "rectangle", &mut rng).unwrap();
        assert_eq!(t.len(), 1);
        assert!(t.children(root).is_empty());
        assert!(t.change_type(root, "hexagon", &mut rng).is_err());
        assert_eq!(t.tag(root), Some("rectangle"));
    }
}
