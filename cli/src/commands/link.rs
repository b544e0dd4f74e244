use std::{fs, path::Path};

use anyhow::{Context, Result};
use sdgmap::{FamilyColumns, link_families};
use serde_json::Value;

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

fn write_json(path: &Path, doc: &Value) -> Result<()> {
    fs::write(path, serde_json::to_string(doc)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::LinkArgs) -> Result<()> {
    let out_dir = args.output.clone().unwrap_or(".".into());
    let columns = FamilyColumns {
        lookup_parent: args.lookup_parent.clone(),
        lookup_child: args.lookup_child.clone(),
        parent_id: args.parent_id.clone(),
        child_id: args.child_id.clone(),
    };

    let mut parents = read_json(&args.parents)?;
    let mut children = read_json(&args.children)?;
    let lookup = read_json(&args.lookup)?;

    let stats = link_families(&mut parents, &mut children, &lookup, &columns)?;
    println!("[link] {} children linked, {} without a parent, {} parents with children",
        stats.children_linked, stats.children_orphaned, stats.parents_with_children);

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    write_json(&out_dir.join("parents.geo.json"), &parents)?;
    write_json(&out_dir.join("children.geo.json"), &children)?;
    println!("[link] wrote parents.geo.json and children.geo.json to {}", out_dir.display());
    Ok(())
}
