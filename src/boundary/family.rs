//! Parent/child linking of two boundary levels.
//!
//! Children receive a `parent` property holding their parent's code (null when the lookup
//! does not know them); parents with at least one child receive `has_children: 1`.

use ahash::{AHashMap, AHashSet};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::geojson::{collection_features, property_text};

/// Property names used to join the three documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyColumns {
    /// Parent code column in the lookup document.
    pub lookup_parent: String,
    /// Child code column in the lookup document.
    pub lookup_child: String,
    /// Code column in the parent boundaries.
    pub parent_id: String,
    /// Code column in the child boundaries.
    pub child_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FamilyStats {
    pub children_linked: usize,
    pub children_orphaned: usize,
    pub parents_with_children: usize,
}

/// Annotate `children` and `parents` in place from the child -> parent pairs in `lookup`.
pub fn link_families(parents: &mut Value, children: &mut Value, lookup: &Value, columns: &FamilyColumns) -> Result<FamilyStats> {
    // child code -> first parent listing it in the lookup
    let mut parent_of: AHashMap<String, String> = AHashMap::new();
    let mut has_kids: AHashSet<String> = AHashSet::new();
    for (i, feature) in collection_features(lookup)?.iter().enumerate() {
        let props = feature.get("properties").and_then(Value::as_object)
            .ok_or_else(|| anyhow!("[boundary::family] Lookup feature {i} has no properties"))?;
        let (Some(parent), Some(child)) = (property_text(props, &columns.lookup_parent), property_text(props, &columns.lookup_child)) else {
            tracing::debug!("[boundary::family] Lookup feature {i} lacks {} or {}", columns.lookup_parent, columns.lookup_child);
            continue;
        };
        if parent_of.get(&child).is_some_and(|p| *p != parent) {
            tracing::debug!("[boundary::family] Child {child} is listed under several parents; keeping the first");
        }
        has_kids.insert(parent.clone());
        parent_of.entry(child).or_insert(parent);
    }

    let mut stats = FamilyStats::default();

    for (i, feature) in features_mut(children)?.iter_mut().enumerate() {
        let props = properties_mut(feature)
            .ok_or_else(|| anyhow!("[boundary::family] Child feature {i} has no properties"))?;
        let parent = property_text(props, &columns.child_id)
            .and_then(|id| parent_of.get(&id).cloned());
        match parent {
            Some(p) => { stats.children_linked += 1; props.insert("parent".into(), json!(p)); }
            None => { stats.children_orphaned += 1; props.insert("parent".into(), Value::Null); }
        }
    }

    for (i, feature) in features_mut(parents)?.iter_mut().enumerate() {
        let props = properties_mut(feature)
            .ok_or_else(|| anyhow!("[boundary::family] Parent feature {i} has no properties"))?;
        let has_children = property_text(props, &columns.parent_id)
            .is_some_and(|id| has_kids.contains(&id));
        if has_children {
            stats.parents_with_children += 1;
            props.insert("has_children".into(), json!(1));
        }
    }

    tracing::info!("[boundary::family] Linked {} children ({} without parent); {} parents have children",
        stats.children_linked, stats.children_orphaned, stats.parents_with_children);
    Ok(stats)
}

fn features_mut(doc: &mut Value) -> Result<&mut Vec<Value>> {
    collection_features(doc)?;
    doc.get_mut("features")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| anyhow!("[boundary::family] FeatureCollection has no features array"))
}

fn properties_mut(feature: &mut Value) -> Option<&mut serde_json::Map<String, Value>> {
    let obj = feature.as_object_mut()?;
    let props = obj.entry("properties").or_insert_with(|| json!({}));
    if props.is_null() { *props = json!({}) }
    props.as_object_mut()
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{FamilyColumns, link_families};

    fn fc(features: Vec<Value>) -> Value {
        json!({ "type": "FeatureCollection", "features": features })
    }

    fn props(p: Value) -> Value {
        json!({ "type": "Feature", "properties": p, "geometry": null })
    }

    fn columns() -> FamilyColumns {
        FamilyColumns {
            lookup_parent: "RGN16CD".into(),
            lookup_child: "LAD16CD".into(),
            parent_id: "rgn17cd".into(),
            child_id: "lad16cd".into(),
        }
    }

    #[test]
    fn links_children_and_flags_parents() {
        let lookup = fc(vec![
            props(json!({ "RGN16CD": "E12000001", "LAD16CD": "E06000001" })),
            props(json!({ "RGN16CD": "E12000001", "LAD16CD": "E06000002" })),
            props(json!({ "RGN16CD": "E12000009" })),
        ]);
        let mut parents = fc(vec![
            props(json!({ "rgn17cd": "E12000001" })),
            props(json!({ "rgn17cd": "E12000002" })),
        ]);
        let mut children = fc(vec![
            props(json!({ "lad16cd": "E06000001" })),
            props(json!({ "lad16cd": "E06000099" })),
        ]);

        let stats = link_families(&mut parents, &mut children, &lookup, &columns()).unwrap();
        assert_eq!(stats.children_linked, 1);
        assert_eq!(stats.children_orphaned, 1);
        assert_eq!(stats.parents_with_children, 1);

        assert_eq!(children["features"][0]["properties"]["parent"], "E12000001");
        assert!(children["features"][1]["properties"]["parent"].is_null());
        assert_eq!(parents["features"][0]["properties"]["has_children"], 1);
        assert!(parents["features"][1]["properties"].get("has_children").is_none());
    }

    #[test]
    fn first_listed_parent_wins() {
        let lookup = fc(vec![
            props(json!({ "RGN16CD": "P1", "LAD16CD": "X" })),
            props(json!({ "RGN16CD": "P2", "LAD16CD": "X" })),
            props(json!({ "RGN16CD": "P3", "LAD16CD": "X" })),
            props(json!({ "RGN16CD": "P4", "LAD16CD": "X" })),
        ]);
        let mut parents = fc(vec![
            props(json!({ "rgn17cd": "P1" })),
            props(json!({ "rgn17cd": "P4" })),
        ]);
        let mut children = fc(vec![props(json!({ "lad16cd": "X" }))]);

        for _ in 0..32 {
            let stats = link_families(&mut parents, &mut children, &lookup, &columns()).unwrap();
            assert_eq!(stats.children_linked, 1);
            assert_eq!(children["features"][0]["properties"]["parent"], "P1");
        }
        // Every parent that lists the child still counts as having children.
        assert_eq!(parents["features"][1]["properties"]["has_children"], 1);
    }

    #[test]
    fn rejects_non_collections() {
        let mut not_fc = json!({ "type": "Feature" });
        let mut ok = fc(vec![]);
        assert!(link_families(&mut not_fc, &mut ok, &fc(vec![]), &columns()).is_err());
    }
}
