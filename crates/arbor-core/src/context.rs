use arbor_tools::{TraceEvent, TraceSink};

use crate::error::{BlackboardError, Result};
use crate::{Blackboard, BlackboardScope, BlackboardType, BlackboardValue, SharedBlackboard, TickContext};

/// Everything a node may touch during one tick of its tree instance.
///
/// Name lookups resolve against the instance's local blackboard first and fall
/// back to the shared blackboard. A key found locally with the wrong type is a
/// type mismatch; it does not fall through to a shared key of the same name.
pub struct ExecutionContext<'a> {
    pub tick: TickContext,
    blackboard: &'a mut Blackboard,
    shared: Option<&'a SharedBlackboard>,
    trace: Option<&'a mut (dyn TraceSink + 'static)>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(tick: TickContext, blackboard: &'a mut Blackboard) -> Self {
        Self {
            tick,
            blackboard,
            shared: None,
            trace: None,
        }
    }

    pub fn with_shared(mut self, shared: Option<&'a SharedBlackboard>) -> Self {
        self.shared = shared;
        self
    }

    pub fn with_trace(mut self, trace: Option<&'a mut (dyn TraceSink + 'static)>) -> Self {
        self.trace = trace;
        self
    }

    pub fn blackboard(&self) -> &Blackboard {
        &*self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut *self.blackboard
    }

    pub fn shared(&self) -> Option<&'a SharedBlackboard> {
        self.shared
    }

    /// Scope a name resolves to, if any.
    pub fn scope_of(&self, name: &str) -> Option<BlackboardScope> {
        if self.blackboard.contains(name) {
            return Some(BlackboardScope::Local);
        }
        match self.shared {
            Some(shared) if shared.read().contains(name) => Some(BlackboardScope::Shared),
            _ => None,
        }
    }

    pub fn value(&self, name: &str) -> Result<BlackboardValue> {
        match self.scope_of(name) {
            Some(BlackboardScope::Local) => self.blackboard.value(name).cloned(),
            Some(BlackboardScope::Shared) => self.shared_or_err()?.read().value(name).cloned(),
            None => Err(key_not_found(name)),
        }
    }

    pub fn get<T: BlackboardType>(&self, name: &str) -> Result<T> {
        match self.scope_of(name) {
            Some(scope) => self.get_in(scope, name),
            None => Err(key_not_found(name)),
        }
    }

    pub fn set<T: BlackboardType>(&mut self, name: &str, value: T) -> Result<()> {
        self.set_value(name, value.into_value())
    }

    pub fn set_value(&mut self, name: &str, value: BlackboardValue) -> Result<()> {
        match self.scope_of(name) {
            Some(BlackboardScope::Local) => self.blackboard.set_value(name, value),
            Some(BlackboardScope::Shared) => self.shared_or_err()?.write().set_value(name, value),
            None => Err(key_not_found(name)),
        }
    }

    pub fn get_in<T: BlackboardType>(&self, scope: BlackboardScope, name: &str) -> Result<T> {
        match scope {
            BlackboardScope::Local => self.blackboard.get(name),
            BlackboardScope::Shared => self.shared_or_err()?.read().get(name),
        }
    }

    pub fn set_in<T: BlackboardType>(
        &mut self,
        scope: BlackboardScope,
        name: &str,
        value: T,
    ) -> Result<()> {
        match scope {
            BlackboardScope::Local => self.blackboard.set(name, value),
            BlackboardScope::Shared => self.shared_or_err()?.write().set(name, value),
        }
    }

    pub fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    /// The sink this tick reports to, for nodes that run a nested tree.
    pub fn trace_sink(&mut self) -> Option<&mut (dyn TraceSink + 'static)> {
        self.trace.as_deref_mut()
    }

    pub fn emit(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_deref_mut() {
            sink.emit(event);
        }
    }

    fn shared_or_err(&self) -> Result<&'a SharedBlackboard> {
        self.shared.ok_or(BlackboardError::NoSharedBlackboard)
    }
}

fn key_not_found(name: &str) -> BlackboardError {
    BlackboardError::KeyNotFound {
        name: name.to_string(),
    }
}
