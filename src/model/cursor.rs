//! Lazy query cursors over records.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::future::Future;
use std::marker::PhantomData;

use crate::model::record::{Record, RecordType, RecordValue};

/// A lazy handle over a set of records that are not yet loaded.
pub trait Cursor: Send {
    /// The record type this cursor yields.
    fn record_type(&self) -> RecordType;

    /// Run the query and load every record.
    fn fetch(self: Box<Self>) -> BoxFuture<'static, anyhow::Result<Vec<RecordValue>>>;
}

/// A typed cursor whose records come from a deferred loader.
pub struct QuerySet<T: Record> {
    load: BoxFuture<'static, anyhow::Result<Vec<T>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> QuerySet<T> {
    /// Defer loading to `load`; nothing runs until the cursor is fetched.
    pub fn new<F>(load: F) -> Self
    where
        F: Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
    {
        Self {
            load: load.boxed(),
            _marker: PhantomData,
        }
    }

    /// A cursor over records already in memory.
    pub fn from_records(records: Vec<T>) -> Self {
        Self::new(async move { Ok(records) })
    }
}

impl<T: Record> Cursor for QuerySet<T> {
    fn record_type(&self) -> RecordType {
        RecordType::of::<T>()
    }

    fn fetch(self: Box<Self>) -> BoxFuture<'static, anyhow::Result<Vec<RecordValue>>> {
        let load = self.load;
        async move {
            let records = load.await?;
            Ok(records.iter().map(RecordValue::new).collect())
        }
        .boxed()
    }
}
