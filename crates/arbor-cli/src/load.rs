use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arbor_bt::TreeAsset;

pub fn read_asset(path: &Path) -> Result<TreeAsset> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let asset = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => TreeAsset::from_json(&text),
        Some("yaml" | "yml") => TreeAsset::from_yaml(&text),
        _ => bail!("{}: expected a .json, .yaml or .yml asset", path.display()),
    };
    asset.with_context(|| format!("failed to parse {}", path.display()))
}

/// Every asset file directly inside `dir`, sorted by path.
pub fn read_library(dir: &Path) -> Result<Vec<TreeAsset>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        let is_asset = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("json" | "yaml" | "yml")
        );
        if path.is_file() && is_asset {
            paths.push(path);
        }
    }
    paths.sort();

    let mut assets = Vec::with_capacity(paths.len());
    for path in &paths {
        let asset = read_asset(path)?;
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if asset.name != stem {
            tracing::warn!(
                file = %path.display(),
                tree = %asset.name,
                "library asset name differs from its file name; sub-trees refer to it by name"
            );
        }
        assets.push(asset);
    }
    Ok(assets)
}

/// Names of the library trees `asset` runs as sub-trees.
fn sub_tree_refs(asset: &TreeAsset) -> BTreeSet<String> {
    asset
        .nodes
        .iter()
        .filter(|node| node.node_type == "SubTree")
        .filter_map(|node| node.properties.value::<String>("SubTree", "tree").ok().flatten())
        .collect()
}

/// Drain `assets` so that every tree comes after the trees it runs as
/// sub-trees. Trees caught in a reference cycle come last, in file order;
/// their unresolved sub-tree nodes fail when ticked.
pub fn dependency_order(assets: &mut Vec<TreeAsset>) -> Vec<TreeAsset> {
    let known: BTreeSet<String> = assets.iter().map(|a| a.name.clone()).collect();
    let mut built = BTreeSet::new();
    let mut ordered = Vec::with_capacity(assets.len());

    while !assets.is_empty() {
        let ready = assets.iter().position(|asset| {
            sub_tree_refs(asset)
                .iter()
                .all(|name| built.contains(name) || !known.contains(name))
        });
        match ready {
            Some(index) => {
                let asset = assets.remove(index);
                built.insert(asset.name.clone());
                ordered.push(asset);
            }
            None => {
                tracing::warn!(
                    trees = assets.len(),
                    "library sub-trees reference each other in a cycle"
                );
                ordered.append(assets);
            }
        }
    }
    ordered
}
