use super::{Operation, OperationIdentity};
use crate::error::RecallResult;
use crate::store::KeyValueStore;
use async_trait::async_trait;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

/// Counting wrapper
///
/// Increments the counter at [`OperationIdentity::counter_key`] once per call,
/// before the inner operation runs. The increment happens whatever the inner
/// call later returns; a failure to increment aborts the call.
#[derive(Debug, Clone)]
pub struct CountCalls<Op> {
    inner: Op,
}

impl<Op> CountCalls<Op> {
    pub fn new(inner: Op) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Op {
        &self.inner
    }
}

#[async_trait]
impl<S, Op> Operation<S> for CountCalls<Op>
where
    S: KeyValueStore + ?Sized,
    Op: Operation<S>,
{
    type Input = Op::Input;
    type Output = Op::Output;

    fn identity(&self) -> &OperationIdentity {
        self.inner.identity()
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(name = "count_calls", skip_all)
    )]
    async fn call(&self, store: &S, input: Self::Input) -> RecallResult<Self::Output> {
        let identity = self.inner.identity();
        let _count = store.incr(identity.counter_key()).await?;

        #[cfg(feature = "tracing")]
        debug!(identity = %identity, count = _count, "Call counted");

        self.inner.call(store, input).await
    }
}
