use super::{CallArgs, Operation, OperationIdentity};
use crate::error::RecallResult;
use crate::store::KeyValueStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, warn};

/// How [`RecordHistory`] lays out what it records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryLayout {
    /// Two lists, `{id}:inputs` and `{id}:outputs`, paired by position
    ///
    /// The input is pushed before the inner call and the output after it
    /// succeeds. A failing call leaves its input without an output, and
    /// overlapping callers can interleave the two lists differently, so
    /// positional pairing only holds for one sequential caller.
    #[default]
    Paired,

    /// One list, `{id}:calls`, holding a JSON [`CallRecord`] per call
    ///
    /// Input and outcome travel in a single push, so entries stay coherent
    /// under concurrent callers and failed calls are recorded too.
    Combined,
}

/// How a recorded call ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Returned(String),
    Failed(String),
}

/// One entry of the combined history layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub input: String,
    pub outcome: CallOutcome,
    pub recorded_at: DateTime<Utc>,
}

impl CallRecord {
    pub fn new(input: String, outcome: CallOutcome) -> Self {
        Self {
            input,
            outcome,
            recorded_at: Utc::now(),
        }
    }
}

/// History wrapper
///
/// Records the rendered arguments and result of every call according to its
/// [`HistoryLayout`]. The inner result or error is returned untouched.
#[derive(Debug, Clone)]
pub struct RecordHistory<Op> {
    inner: Op,
    layout: HistoryLayout,
}

impl<Op> RecordHistory<Op> {
    pub fn new(inner: Op, layout: HistoryLayout) -> Self {
        Self { inner, layout }
    }

    pub fn layout(&self) -> HistoryLayout {
        self.layout
    }
}

#[async_trait]
impl<S, Op> Operation<S> for RecordHistory<Op>
where
    S: KeyValueStore + ?Sized,
    Op: Operation<S>,
    Op::Input: CallArgs,
    Op::Output: Display,
{
    type Input = Op::Input;
    type Output = Op::Output;

    fn identity(&self) -> &OperationIdentity {
        self.inner.identity()
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(name = "record_history", skip_all)
    )]
    async fn call(&self, store: &S, input: Self::Input) -> RecallResult<Self::Output> {
        let identity = self.inner.identity();
        let rendered = input.render_args();

        match self.layout {
            HistoryLayout::Paired => {
                store.rpush(&identity.inputs_key(), &rendered).await?;
                let output = self.inner.call(store, input).await?;
                store
                    .rpush(&identity.outputs_key(), &output.to_string())
                    .await?;

                #[cfg(feature = "tracing")]
                debug!(identity = %identity, input = %rendered, "Call recorded");

                Ok(output)
            }
            HistoryLayout::Combined => {
                let result = self.inner.call(store, input).await;
                let outcome = match &result {
                    Ok(output) => CallOutcome::Returned(output.to_string()),
                    Err(error) => {
                        #[cfg(feature = "tracing")]
                        warn!(identity = %identity, error = %error, "Recording failed call");

                        CallOutcome::Failed(error.to_string())
                    }
                };
                let record = serde_json::to_string(&CallRecord::new(rendered, outcome))?;
                store.rpush(&identity.calls_key(), &record).await?;
                result
            }
        }
    }
}
