//! Current target tracking and method chain invocation.
//!
//! A [`TargetEngine`] belongs to one session. It remembers which host object is
//! selected, changes the selection by path, and runs dotted method chains against
//! it. Host objects can disappear at any time, so liveness is checked on every use.

pub mod chain;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::commands::value::Value;
use crate::host::{Host, InvokeError, ObjectId};

pub use chain::{split_chain, MethodCallStep};

/// Why a target change was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    /// The path was empty.
    #[error("Invalid path.")]
    InvalidPath,
    /// Nothing live was found at the path.
    #[error("Invalid target: no live object at that path.")]
    InvalidTarget,
}

/// Outcome of one method call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MethodStatus {
    Success,
    Failed,
}

/// Notifications sent to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetEvent {
    /// The current target changed.
    TargetChanged(ObjectId),
    /// A target change was rejected; the current target is unchanged.
    TargetChangeFailed(Rejection),
    /// A method in a chain completed or failed.
    MethodCalled {
        method: String,
        result: Value,
        status: MethodStatus,
    },
}

/// Errors that abort a method chain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChainError {
    /// The input held no calls.
    #[error("no method to call")]
    Empty,

    /// A segment is not a valid call.
    #[error("invalid method call '{0}'")]
    Malformed(String),

    /// The receiver is no longer live.
    #[error("cannot call '{method}': the target is no longer valid")]
    InvalidInstance { method: String },

    /// The receiver has no such method.
    #[error("method '{method}' not found on {receiver}")]
    InvalidMethod { method: String, receiver: String },

    /// The host reported a failure from the call itself.
    #[error("'{method}' failed: {source}")]
    Invocation {
        method: String,
        #[source]
        source: InvokeError,
    },
}

/// Result of one successful step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub method: String,
    pub value: Value,
}

type Observer = Box<dyn FnMut(&TargetEvent) + Send>;

/// Tracks the current target of one session.
pub struct TargetEngine {
    current: ObjectId,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for TargetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetEngine")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TargetEngine {
    /// Creates an engine whose current target is `root`.
    pub fn new(root: ObjectId) -> Self {
        Self {
            current: root,
            observers: Vec::new(),
        }
    }

    /// Creates an engine starting at the host's root.
    pub fn for_host(host: &dyn Host) -> Self {
        Self::new(host.root())
    }

    /// The current target handle. It may have died since it was selected.
    pub fn current(&self) -> ObjectId {
        self.current
    }

    /// Registers an observer for target and method events.
    pub fn subscribe(&mut self, observer: impl FnMut(&TargetEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: TargetEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    /// Selects the object at `path`.
    ///
    /// The path is resolved against the current target when it is still live, then
    /// against the root. On failure the current target is left as it was.
    pub fn change_target(&mut self, host: &dyn Host, path: &str) -> Result<ObjectId, Rejection> {
        let path = path.trim();
        if path.is_empty() {
            return Err(self.reject(Rejection::InvalidPath, path));
        }

        let live = |id: &ObjectId| host.is_live(*id);
        let from_current = if host.is_live(self.current) {
            host.resolve(self.current, path).filter(live)
        } else {
            None
        };
        let resolved = from_current.or_else(|| host.resolve(host.root(), path).filter(live));

        let Some(target) = resolved else {
            return Err(self.reject(Rejection::InvalidTarget, path));
        };

        self.current = target;
        info!(object = %host.describe(target), "target changed");
        self.emit(TargetEvent::TargetChanged(target));
        Ok(target)
    }

    fn reject(&mut self, reason: Rejection, path: &str) -> Rejection {
        debug!(path, ?reason, "target change rejected");
        self.emit(TargetEvent::TargetChangeFailed(reason));
        reason
    }

    /// Runs a dotted method chain. See [`TargetEngine::invoke_chain_with`].
    pub fn invoke_chain(
        &mut self,
        host: &mut dyn Host,
        input: &str,
    ) -> Result<Vec<StepResult>, ChainError> {
        self.invoke_chain_with(host, input, |_| {})
    }

    /// Runs a dotted method chain, handing each successful step to `on_step`
    /// before the next one starts.
    ///
    /// The first call runs on the current target. Each later call runs on the
    /// previous result when that result is a live object handle, otherwise on
    /// the current target. The first failing step stops the chain.
    pub fn invoke_chain_with(
        &mut self,
        host: &mut dyn Host,
        input: &str,
        mut on_step: impl FnMut(&StepResult),
    ) -> Result<Vec<StepResult>, ChainError> {
        let steps = split_chain(input)?
            .iter()
            .map(|segment| MethodCallStep::parse(segment))
            .collect::<Result<Vec<_>, _>>()?;

        if steps.is_empty() {
            return Err(ChainError::Empty);
        }

        let mut results: Vec<StepResult> = Vec::with_capacity(steps.len());
        for step in steps {
            let receiver = results
                .last()
                .and_then(|previous| previous.value.as_object())
                .filter(|id| host.is_live(*id))
                .unwrap_or(self.current);

            let value = self.call(host, receiver, &step)?;
            let result = StepResult {
                method: step.method,
                value,
            };
            on_step(&result);
            results.push(result);
        }

        Ok(results)
    }

    fn call(
        &mut self,
        host: &mut dyn Host,
        receiver: ObjectId,
        step: &MethodCallStep,
    ) -> Result<Value, ChainError> {
        let method = step.method.clone();

        if !host.is_live(receiver) {
            self.method_failed(&method);
            return Err(ChainError::InvalidInstance { method });
        }
        if !host.has_method(receiver, &method) {
            self.method_failed(&method);
            return Err(ChainError::InvalidMethod {
                receiver: host.describe(receiver),
                method,
            });
        }

        debug!(method = %method, receiver = %host.describe(receiver), args = step.args.len(), "calling method");
        match host.invoke(receiver, &method, &step.args) {
            Ok(value) => {
                self.emit(TargetEvent::MethodCalled {
                    method,
                    result: value.clone(),
                    status: MethodStatus::Success,
                });
                Ok(value)
            }
            Err(InvokeError::NotFound(_)) => {
                self.method_failed(&method);
                Err(ChainError::InvalidMethod {
                    receiver: host.describe(receiver),
                    method,
                })
            }
            Err(source) => {
                self.method_failed(&method);
                Err(ChainError::Invocation { method, source })
            }
        }
    }

    fn method_failed(&mut self, method: &str) {
        self.emit(TargetEvent::MethodCalled {
            method: method.to_string(),
            result: Value::Null,
            status: MethodStatus::Failed,
        });
    }
}
