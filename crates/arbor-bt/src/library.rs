use std::collections::BTreeMap;
use std::sync::Arc;

use arbor_core::SharedBlackboard;

use crate::tree::Tree;

/// Named templates and shared blackboards that trees can refer to by name.
///
/// Templates are immutable once added; sub-tree nodes hold them through `Arc`.
#[derive(Debug, Clone, Default)]
pub struct TreeLibrary {
    templates: BTreeMap<String, Arc<Tree>>,
    shared: BTreeMap<String, SharedBlackboard>,
}

impl TreeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template under its own name, replacing any previous one.
    pub fn insert_template(&mut self, tree: Tree) -> Arc<Tree> {
        let tree = Arc::new(tree);
        self.templates
            .insert(tree.name().to_string(), Arc::clone(&tree));
        tree
    }

    pub fn template(&self, name: &str) -> Option<Arc<Tree>> {
        self.templates.get(name).cloned()
    }

    pub fn remove_template(&mut self, name: &str) -> Option<Arc<Tree>> {
        self.templates.remove(name)
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.templates.keys().map(String::as_str)
    }

    pub fn insert_shared(&mut self, name: impl Into<String>, shared: SharedBlackboard) {
        self.shared.insert(name.into(), shared);
    }

    pub fn shared(&self, name: &str) -> Option<SharedBlackboard> {
        self.shared.get(name).cloned()
    }

    /// The shared blackboard called `name`, created empty if missing.
    pub fn shared_or_default(&mut self, name: &str) -> SharedBlackboard {
        self.shared.entry(name.to_string()).or_default().clone()
    }

    pub fn shared_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.shared.keys().map(String::as_str)
    }
}
