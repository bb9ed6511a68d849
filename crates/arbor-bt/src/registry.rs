use std::collections::BTreeMap;

use arbor_core::{BlackboardType, BlackboardValue, NodeProperty};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::actions::{CompareProperty, Log, SetProperty, SubTree, Wait};
use crate::bt::Behaviour;
use crate::error::{Result, TreeError};
use crate::library::TreeLibrary;
use crate::nodes::{
    Fail, InterruptSelector, Inverter, Parallel, Repeat, RootNode, Selector, Sequencer, Succeed,
    Timeout,
};

/// Builds one node type from its authored properties.
pub type NodeFactory = fn(&NodeArgs<'_>) -> Result<Box<dyn Behaviour>>;

/// Authored property values of one node, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeProperties(BTreeMap<String, NodeProperty<BlackboardValue>>);

impl NodeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        property: impl Into<NodeProperty<BlackboardValue>>,
    ) -> &mut Self {
        self.0.insert(name.into(), property.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&NodeProperty<BlackboardValue>> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A literal `T`, or `None` when the property is absent.
    pub fn value<T: BlackboardType>(&self, node_type: &'static str, name: &str) -> Result<Option<T>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(NodeProperty::Key(key)) => Err(invalid(
                node_type,
                name,
                format!("expected a literal, found key reference '{key}'"),
            )),
            Some(NodeProperty::Value(value)) => T::from_value(value).map(Some).ok_or_else(|| {
                invalid(
                    node_type,
                    name,
                    format!("expected {}, found {}", T::KEY_TYPE, value.key_type()),
                )
            }),
        }
    }

    /// A literal-or-key property of type `T`, or `None` when absent.
    pub fn property<T: BlackboardType>(
        &self,
        node_type: &'static str,
        name: &str,
    ) -> Result<Option<NodeProperty<T>>> {
        let Some(property) = self.0.get(name) else {
            return Ok(None);
        };
        property.typed::<T>().map(Some).ok_or_else(|| {
            invalid(node_type, name, format!("expected a {} literal or a key", T::KEY_TYPE))
        })
    }

    pub fn required<T: BlackboardType>(&self, node_type: &'static str, name: &str) -> Result<T> {
        self.value(node_type, name)?
            .ok_or_else(|| invalid(node_type, name, "missing".to_string()))
    }
}

impl FromIterator<(String, NodeProperty<BlackboardValue>)> for NodeProperties {
    fn from_iter<I: IntoIterator<Item = (String, NodeProperty<BlackboardValue>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn invalid(node_type: &'static str, property: &str, reason: String) -> TreeError {
    TreeError::InvalidProperty {
        node_type,
        property: property.to_string(),
        reason,
    }
}

/// Inputs available to a [`NodeFactory`].
#[derive(Debug, Clone, Copy)]
pub struct NodeArgs<'a> {
    pub properties: &'a NodeProperties,
    pub library: &'a TreeLibrary,
}

impl<'a> NodeArgs<'a> {
    pub fn new(properties: &'a NodeProperties, library: &'a TreeLibrary) -> Self {
        Self {
            properties,
            library,
        }
    }
}

/// Name-to-factory table used to build nodes from assets and editor commands.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    factories: BTreeMap<String, NodeFactory>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in node under its type name.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("Root", |_| Ok(Box::new(RootNode)));
        registry.register("Sequencer", |_| Ok(Box::new(Sequencer::new())));
        registry.register("Selector", |_| Ok(Box::new(Selector::new())));
        registry.register("Parallel", |_| Ok(Box::new(Parallel::new())));
        registry.register("InterruptSelector", |_| Ok(Box::new(InterruptSelector::new())));
        registry.register("Inverter", |_| Ok(Box::new(Inverter)));
        registry.register("Succeed", |_| Ok(Box::new(Succeed)));
        registry.register("Fail", |_| Ok(Box::new(Fail)));
        registry.register("Repeat", build_repeat);
        registry.register("Timeout", build_timeout);
        registry.register("Wait", build_wait);
        registry.register("SubTree", build_sub_tree);
        registry.register("Log", build_log);
        registry.register("SetProperty", build_set_property);
        registry.register("CompareProperty", build_compare_property);
        registry
    }

    /// Register `factory` under `name`, returning the factory it replaces.
    pub fn register(&mut self, name: impl Into<String>, factory: NodeFactory) -> Option<NodeFactory> {
        self.factories.insert(name.into(), factory)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    pub fn create(&self, name: &str, args: &NodeArgs<'_>) -> Result<Box<dyn Behaviour>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| TreeError::UnknownNodeType(name.to_string()))?;
        factory(args)
    }
}

fn build_repeat(args: &NodeArgs<'_>) -> Result<Box<dyn Behaviour>> {
    let props = args.properties;
    let mut repeat = Repeat::new();
    if let Some(flag) = props.value::<bool>("Repeat", "restart_on_success")? {
        repeat.restart_on_success = flag;
    }
    if let Some(flag) = props.value::<bool>("Repeat", "restart_on_failure")? {
        repeat.restart_on_failure = flag;
    }
    if let Some(max) = props.value::<i32>("Repeat", "max_repeats")? {
        repeat.max_repeats = u32::try_from(max)
            .map_err(|_| invalid("Repeat", "max_repeats", format!("must not be negative, got {max}")))?;
    }
    Ok(Box::new(repeat))
}

fn build_timeout(args: &NodeArgs<'_>) -> Result<Box<dyn Behaviour>> {
    Ok(Box::new(match args.properties.property::<f32>("Timeout", "duration")? {
        Some(duration) => Timeout::new(duration),
        None => Timeout::default(),
    }))
}

fn build_wait(args: &NodeArgs<'_>) -> Result<Box<dyn Behaviour>> {
    Ok(Box::new(match args.properties.property::<f32>("Wait", "duration")? {
        Some(duration) => Wait::new(duration),
        None => Wait::default(),
    }))
}

fn build_sub_tree(args: &NodeArgs<'_>) -> Result<Box<dyn Behaviour>> {
    let Some(name) = args.properties.value::<String>("SubTree", "tree")? else {
        tracing::warn!("sub-tree node has no 'tree' property");
        return Ok(Box::new(SubTree::unbound()));
    };
    match args.library.template(&name) {
        Some(template) => Ok(Box::new(SubTree::new(template))),
        None => {
            tracing::warn!(tree = %name, "sub-tree template not found in library");
            Ok(Box::new(SubTree::unbound()))
        }
    }
}

fn build_log(args: &NodeArgs<'_>) -> Result<Box<dyn Behaviour>> {
    let message = args
        .properties
        .value::<String>("Log", "message")?
        .unwrap_or_default();
    Ok(Box::new(Log::new(message)))
}

fn key_and_value(
    node_type: &'static str,
    props: &NodeProperties,
) -> Result<(String, NodeProperty<BlackboardValue>)> {
    let key = props.required::<String>(node_type, "key")?;
    let value = props
        .get("value")
        .cloned()
        .ok_or_else(|| invalid(node_type, "value", "missing".to_string()))?;
    Ok((key, value))
}

fn build_set_property(args: &NodeArgs<'_>) -> Result<Box<dyn Behaviour>> {
    let (key, value) = key_and_value("SetProperty", args.properties)?;
    Ok(Box::new(SetProperty::new(key, value)))
}

fn build_compare_property(args: &NodeArgs<'_>) -> Result<Box<dyn Behaviour>> {
    let (key, value) = key_and_value("CompareProperty", args.properties)?;
    Ok(Box::new(CompareProperty::new(key, value)))
}
