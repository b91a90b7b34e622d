//! # Replay Engine
//!
//! Rebuilds a readable call trace for an [`OperationIdentity`] from the counter
//! and history the instrumentation wrote. Replay only reads from the store.
//!
//! ## 📜 Output Format
//!
//! ```text
//! Cache.store was called 2 times:
//! Cache.store(*('foo',)) -> 1c2f...
//! Cache.store(*(42,)) -> 9ab0...
//! ```
//!
//! ## ⚠️ Paired Lists
//!
//! With [`HistoryLayout::Paired`] the inputs and outputs are zipped by
//! position. When the lists have different lengths the extra entries of the
//! longer one are dropped. The call count is reported as stored, so it can
//! exceed the number of trace lines.

use crate::error::{RecallError, RecallResult};
use crate::instrument::{CallOutcome, CallRecord, HistoryLayout, OperationIdentity};
use crate::store::KeyValueStore;
use futures::TryFutureExt;
use std::fmt;
use std::io::{self, Write};

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, warn};

/// One replayed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub input: String,
    pub outcome: CallOutcome,
}

/// Replayed call history of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub identity: OperationIdentity,
    pub call_count: i64,
    pub entries: Vec<TraceEntry>,
}

impl Trace {
    /// The rendered trace, header first, one line per entry
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        lines.push(format!(
            "{} was called {} times:",
            self.identity, self.call_count
        ));
        for entry in &self.entries {
            lines.push(match &entry.outcome {
                CallOutcome::Returned(output) => {
                    format!("{}(*{}) -> {}", self.identity, entry.input, output)
                }
                CallOutcome::Failed(error) => {
                    format!("{}(*{}) raised {}", self.identity, entry.input, error)
                }
            });
        }
        lines
    }

    /// Write the trace to `out`, one line at a time
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    /// Print the trace to standard output
    pub fn print(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_to(&mut handle)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Replay the paired input/output history of `identity`
pub async fn replay<S>(store: &S, identity: &OperationIdentity) -> RecallResult<Trace>
where
    S: KeyValueStore + ?Sized,
{
    replay_with_layout(store, identity, HistoryLayout::Paired).await
}

/// Replay the history of `identity` as written with `layout`
#[cfg_attr(
    feature = "tracing",
    instrument(skip(store, identity), fields(identity = %identity))
)]
pub async fn replay_with_layout<S>(
    store: &S,
    identity: &OperationIdentity,
    layout: HistoryLayout,
) -> RecallResult<Trace>
where
    S: KeyValueStore + ?Sized,
{
    let entries;
    let call_count;

    match layout {
        HistoryLayout::Paired => {
            let inputs_key = identity.inputs_key();
            let outputs_key = identity.outputs_key();
            let (count, inputs, outputs) = futures::try_join!(
                read_call_count(store, identity),
                store.lrange(&inputs_key, 0, -1).err_into::<RecallError>(),
                store.lrange(&outputs_key, 0, -1).err_into::<RecallError>(),
            )?;

            #[cfg(feature = "tracing")]
            if inputs.len() != outputs.len() {
                warn!(
                    inputs = inputs.len(),
                    outputs = outputs.len(),
                    "History lists differ in length, extra entries dropped"
                );
            }

            call_count = count;
            entries = inputs
                .into_iter()
                .zip(outputs)
                .map(|(input, output)| TraceEntry {
                    input,
                    outcome: CallOutcome::Returned(output),
                })
                .collect::<Vec<_>>();
        }
        HistoryLayout::Combined => {
            let calls_key = identity.calls_key();
            let (count, raw) = futures::try_join!(
                read_call_count(store, identity),
                store.lrange(&calls_key, 0, -1).err_into::<RecallError>(),
            )?;

            call_count = count;
            entries = raw
                .iter()
                .map(|json| -> RecallResult<TraceEntry> {
                    let record: CallRecord = serde_json::from_str(json)?;
                    Ok(TraceEntry {
                        input: record.input,
                        outcome: record.outcome,
                    })
                })
                .collect::<RecallResult<Vec<_>>>()?;
        }
    }

    #[cfg(feature = "tracing")]
    debug!(call_count, entries = entries.len(), "Replayed call history");

    Ok(Trace {
        identity: identity.clone(),
        call_count,
        entries,
    })
}

/// Read the call counter, treating an absent counter as zero
async fn read_call_count<S>(store: &S, identity: &OperationIdentity) -> RecallResult<i64>
where
    S: KeyValueStore + ?Sized,
{
    match store.get(identity.counter_key()).await? {
        None => Ok(0),
        Some(bytes) => std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or_else(|| {
                RecallError::decode(format!(
                    "call counter '{identity}' is not an integer"
                ))
            }),
    }
}
