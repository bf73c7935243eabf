//! Results that are either available now or after asynchronous loading.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;

use crate::error::Result;

pub type LocalFuture<T> = LocalBoxFuture<'static, Result<T>>;

/// Deferred work registered while compiling, e.g. style imports to inline.
pub type SubTasks = Rc<RefCell<Vec<LocalFuture<()>>>>;

pub fn new_sub_tasks() -> SubTasks {
    Rc::new(RefCell::new(Vec::new()))
}

pub enum SyncOrPending<T> {
    Ready(T),
    Pending(LocalFuture<T>),
}

impl<T: 'static> SyncOrPending<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, SyncOrPending::Pending(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            SyncOrPending::Ready(value) => Some(value),
            SyncOrPending::Pending(_) => None,
        }
    }

    pub fn into_future(self) -> LocalFuture<T> {
        match self {
            SyncOrPending::Ready(value) => future::ready(Ok(value)).boxed_local(),
            SyncOrPending::Pending(fut) => fut,
        }
    }

    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + 'static) -> SyncOrPending<U> {
        match self {
            SyncOrPending::Ready(value) => SyncOrPending::Ready(f(value)),
            SyncOrPending::Pending(fut) => {
                SyncOrPending::Pending(fut.map(|result| result.map(f)).boxed_local())
            }
        }
    }
}

impl<T> fmt::Debug for SyncOrPending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOrPending::Ready(_) => f.write_str("Ready(..)"),
            SyncOrPending::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}
