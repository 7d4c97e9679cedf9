//! # Observer-driving future wrapper.
//!
//! ```text
//! poll() ─► on_resume ─► inner.poll()
//!                          ├─ Pending ─► on_suspend
//!                          └─ Ready(v) ─► on_complete(v.as_outcome())
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;

use super::AsOutcome;
use crate::observers::ObserverSet;

pub(crate) struct Instrumented<T> {
    name: Arc<str>,
    inner: BoxFuture<'static, T>,
    observers: Arc<ObserverSet>,
}

impl<T> Instrumented<T> {
    pub(crate) fn new(
        name: Arc<str>,
        inner: BoxFuture<'static, T>,
        observers: Arc<ObserverSet>,
    ) -> Self {
        Self {
            name,
            inner,
            observers,
        }
    }
}

impl<T: AsOutcome> Future for Instrumented<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = &mut *self;
        this.observers.resumed(&this.name);
        match this.inner.as_mut().poll(cx) {
            Poll::Pending => {
                this.observers.suspended(&this.name);
                Poll::Pending
            }
            Poll::Ready(value) => {
                this.observers.completed(&this.name, &value.as_outcome());
                Poll::Ready(value)
            }
        }
    }
}
