//! # Instrumentation Layer
//!
//! Wrappers that add observable side effects to an operation without changing
//! what it returns.
//!
//! ## 🎯 The Pieces
//!
//! - [`Operation`]: anything with an [`OperationIdentity`] that can be called against a store
//! - [`CountCalls`]: increments the call counter before delegating
//! - [`RecordHistory`]: appends the rendered input and output to the history lists
//!
//! Wrappers are operations themselves, so they compose by chaining:
//!
//! ```rust,ignore
//! let op = StoreData::new(identity).recorded().counted();
//! ```
//!
//! ## 🔑 Keys Written
//!
//! | Key | Written by | Content |
//! |-----|------------|---------|
//! | `{identity}` | [`CountCalls`] | call counter |
//! | `{identity}:inputs` | [`RecordHistory`] (paired) | rendered argument tuples |
//! | `{identity}:outputs` | [`RecordHistory`] (paired) | rendered results |
//! | `{identity}:calls` | [`RecordHistory`] (combined) | JSON [`CallRecord`]s |
//!
//! ## 🔄 Composition Order
//!
//! The outer wrapper's pre-step runs first and its post-step runs last. The
//! cache uses counting outermost and history innermost, so one `store` call
//! reaches the store as `INCR`, `RPUSH inputs`, `SET`, `RPUSH outputs`.

pub mod args;
pub mod count;
pub mod history;

use crate::error::RecallResult;
use crate::store::KeyValueStore;
use async_trait::async_trait;
use std::fmt;

pub use args::{ArgLiteral, CallArgs};
pub use count::CountCalls;
pub use history::{CallOutcome, CallRecord, HistoryLayout, RecordHistory};

/// Stable name of an instrumented operation
///
/// Every key the instrumentation writes is rooted at this name, so it must be
/// identical across invocations of one operation and distinct between operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationIdentity(String);

impl OperationIdentity {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the call counter
    pub fn counter_key(&self) -> &str {
        &self.0
    }

    /// Key of the input history list
    pub fn inputs_key(&self) -> String {
        format!("{}:inputs", self.0)
    }

    /// Key of the output history list
    pub fn outputs_key(&self) -> String {
        format!("{}:outputs", self.0)
    }

    /// Key of the combined call record list
    pub fn calls_key(&self) -> String {
        format!("{}:calls", self.0)
    }
}

impl fmt::Display for OperationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OperationIdentity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An operation that can be instrumented
///
/// The store is passed on every call rather than owned, so one operation value
/// can be shared by wrappers and by every caller of the cache.
#[async_trait]
pub trait Operation<S>: Send + Sync
where
    S: KeyValueStore + ?Sized,
{
    /// Positional arguments of one call
    type Input: Send + 'static;
    /// Value returned by one call
    type Output: Send + 'static;

    /// Name under which calls to this operation are counted and recorded
    fn identity(&self) -> &OperationIdentity;

    /// Run the operation
    async fn call(&self, store: &S, input: Self::Input) -> RecallResult<Self::Output>;
}

/// Chaining helpers for wrapping operations
pub trait OperationExt: Sized {
    /// Wrap in a [`CountCalls`]
    fn counted(self) -> CountCalls<Self> {
        CountCalls::new(self)
    }

    /// Wrap in a [`RecordHistory`] using the paired layout
    fn recorded(self) -> RecordHistory<Self> {
        RecordHistory::new(self, HistoryLayout::Paired)
    }

    /// Wrap in a [`RecordHistory`] using the given layout
    fn recorded_with(self, layout: HistoryLayout) -> RecordHistory<Self> {
        RecordHistory::new(self, layout)
    }
}

impl<T: Send + Sync> OperationExt for T {}
