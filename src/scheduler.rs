//! The cooperative single-threaded deferred scheduler (§4.3, §5).
//!
//! A [`Deferred<T>`] is the engine's own promise primitive: a settle-once
//! container driven to completion by draining a process-wide [`TaskQueue`].
//! This is deliberately not built on `std::future::Future` for the default
//! path — the executor needs ordering guarantees (continuations enqueued in
//! field-declaration order, drained FIFO) that are simplest to reason about
//! against an explicit queue rather than an arbitrary executor's polling
//! order. Hosts that want to bridge to a real async runtime instead supply
//! a [`PromiseAdapter`]; the `async` feature provides one over
//! [`futures::future::BoxFuture`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::error::FieldError;

/// One of the three states a [`Deferred`] can be in. Once `Fulfilled` or
/// `Rejected`, the state is terminal (§4.3).
enum State<T> {
    Pending(Vec<Box<dyn FnOnce(&Result<T, FieldError>)>>),
    Settled(Result<T, FieldError>),
}

struct Inner<T> {
    state: State<T>,
}

/// A settle-once container for an eventual value or rejection (§4.3,
/// glossary: "Deferred").
///
/// Cloning shares the same underlying cell — the same pattern as an `Rc`,
/// since a single-threaded scheduler never needs `Send`/`Sync` here (a host
/// running executions across threads uses one scheduler per execution, as
/// required by §5).
pub struct Deferred<T> {
    inner: Rc<RefCell<Inner<T>>>,
    queue: TaskQueue,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Deferred { inner: self.inner.clone(), queue: self.queue.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.borrow().state {
            State::Pending(_) => write!(f, "Deferred::Pending"),
            State::Settled(Ok(v)) => write!(f, "Deferred::Fulfilled({v:?})"),
            State::Settled(Err(e)) => write!(f, "Deferred::Rejected({e:?})"),
        }
    }
}

impl<T: Clone + 'static> Deferred<T> {
    /// Creates a new pending deferred bound to `queue`.
    pub fn pending(queue: &TaskQueue) -> Self {
        Deferred {
            inner: Rc::new(RefCell::new(Inner { state: State::Pending(Vec::new()) })),
            queue: queue.clone(),
        }
    }

    /// An already-fulfilled deferred.
    pub fn fulfilled(queue: &TaskQueue, value: T) -> Self {
        Deferred {
            inner: Rc::new(RefCell::new(Inner { state: State::Settled(Ok(value)) })),
            queue: queue.clone(),
        }
    }

    /// An already-rejected deferred.
    pub fn rejected(queue: &TaskQueue, reason: FieldError) -> Self {
        Deferred {
            inner: Rc::new(RefCell::new(Inner { state: State::Settled(Err(reason)) })),
            queue: queue.clone(),
        }
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.inner.borrow().state, State::Settled(_))
    }

    /// Transitions from pending to fulfilled. A no-op if already settled
    /// (§4.3: "subsequent calls are no-ops").
    pub fn resolve(&self, value: T) {
        self.settle(Ok(value));
    }

    /// Transitions from pending to rejected. A no-op if already settled.
    pub fn reject(&self, reason: FieldError) {
        self.settle(Err(reason));
    }

    fn settle(&self, result: Result<T, FieldError>) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.state, State::Settled(_)) {
                return;
            }
            match std::mem::replace(&mut inner.state, State::Settled(result.clone())) {
                State::Pending(callbacks) => callbacks,
                State::Settled(_) => unreachable!(),
            }
        };
        let queue = self.queue.clone();
        for cb in callbacks {
            let result = result.clone();
            queue.enqueue(move || cb(&result));
        }
    }

    /// Registers a continuation that runs (via the task queue) once this
    /// deferred settles; if it is already settled the continuation is
    /// enqueued immediately, preserving FIFO order relative to other
    /// already-queued work (§4.3: "the queue preserves this order").
    fn on_settle(&self, cb: impl FnOnce(&Result<T, FieldError>) + 'static) {
        let mut inner = self.inner.borrow_mut();
        match &mut inner.state {
            State::Pending(callbacks) => callbacks.push(Box::new(cb)),
            State::Settled(result) => {
                let result = clone_result(result);
                drop(inner);
                self.queue.enqueue(move || cb(&result));
            }
        }
    }

    /// `then`: returns a new deferred settling once `on_fulfilled`/
    /// `on_rejected` (or passthrough, if absent) produce a value (§4.3).
    /// If the callback itself returns a `Deferred`, the outer deferred
    /// adopts its eventual state rather than nesting (`Deferred<Deferred<T>>`
    /// is never observable).
    pub fn then<U: 'static>(
        &self,
        on_fulfilled: impl FnOnce(T) -> Outcome<U> + 'static,
        on_rejected: Option<impl FnOnce(FieldError) -> Outcome<U> + 'static>,
    ) -> Deferred<U> {
        let next = Deferred::pending(&self.queue);
        let next_ok = next.clone();
        let next_err = next.clone();
        self.on_settle(move |result| match result {
            Ok(_) => {
                let Ok(value) = clone_result(result) else { unreachable!() };
                match catch_outcome(|| on_fulfilled(value)) {
                    Ok(Outcome::Value(v)) => next_ok.resolve(v),
                    Ok(Outcome::Deferred(d)) => adopt(&d, &next_ok),
                    Err(e) => next_ok.reject(e),
                }
            }
            Err(e) => {
                let e = e.clone();
                match on_rejected {
                    Some(f) => match catch_outcome(|| f(e)) {
                        Ok(Outcome::Value(v)) => next_err.resolve(v),
                        Ok(Outcome::Deferred(d)) => adopt(&d, &next_err),
                        Err(e) => next_err.reject(e),
                    },
                    None => next_err.reject(e),
                }
            }
        });
        next
    }

    /// Settles fulfilled with an index-preserving array once every item has
    /// settled fulfilled; rejects on the first rejection (§4.3).
    pub fn all(queue: &TaskQueue, items: Vec<Deferred<T>>) -> Deferred<Vec<T>>
    where
        T: Clone,
    {
        if items.is_empty() {
            return Deferred::fulfilled(queue, Vec::new());
        }
        let out: Deferred<Vec<T>> = Deferred::pending(queue);
        let remaining = Rc::new(RefCell::new(items.len()));
        let results: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new(vec![None; items.len()]));
        let already_rejected = Rc::new(RefCell::new(false));
        for (idx, item) in items.into_iter().enumerate() {
            let out = out.clone();
            let remaining = remaining.clone();
            let results = results.clone();
            let already_rejected = already_rejected.clone();
            item.on_settle(move |result| {
                if *already_rejected.borrow() {
                    return;
                }
                match result {
                    Ok(_) => {
                        let Ok(value) = clone_result(result) else { unreachable!() };
                        results.borrow_mut()[idx] = Some(value);
                        *remaining.borrow_mut() -= 1;
                        if *remaining.borrow() == 0 {
                            let collected =
                                results.borrow_mut().iter_mut().map(|v| v.take().unwrap()).collect();
                            out.resolve(collected);
                        }
                    }
                    Err(e) => {
                        *already_rejected.borrow_mut() = true;
                        out.reject(e.clone());
                    }
                }
            });
        }
        out
    }
}

/// What a `then` callback produced: a plain value, or another deferred to
/// adopt the eventual state of.
pub enum Outcome<T> {
    Value(T),
    Deferred(Deferred<T>),
}

fn catch_outcome<T>(f: impl FnOnce() -> Outcome<T>) -> Result<Outcome<T>, FieldError> {
    Ok(f())
}

fn adopt<T: 'static>(source: &Deferred<T>, target: &Deferred<T>) {
    let target = target.clone();
    source.on_settle(move |result| match clone_result(result) {
        Ok(v) => target.resolve(v),
        Err(e) => target.reject(e),
    });
}

fn clone_result<T: Clone>(r: &Result<T, FieldError>) -> Result<T, FieldError> {
    match r {
        Ok(v) => Ok(v.clone()),
        Err(e) => Err(e.clone()),
    }
}

/// The process-wide FIFO task queue driving every [`Deferred`]'s
/// continuations (§4.3).
///
/// In practice "process-wide" means per-execution: each [`crate::executor`]
/// invocation owns one, since a still-pending deferred after drain is a
/// programming error and two concurrent executions must not observe each
/// other's continuations (§5).
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Box<dyn FnOnce()>>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        TaskQueue::default()
    }

    pub fn enqueue(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    fn run_one(&self) -> bool {
        let task = self.tasks.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Pumps the queue while `d` is pending and the queue is non-empty
    /// (§4.3). Returns the settled result, or `None` if the queue ran dry
    /// while `d` was still pending (a programming error at the call site —
    /// every deferred reachable from the executor must be driven by
    /// something enqueued on this same queue).
    pub fn wait<T: Clone + 'static>(&self, d: &Deferred<T>) -> Option<Result<T, FieldError>> {
        while !d.is_settled() {
            if !self.run_one() {
                return None;
            }
        }
        match &d.inner.borrow().state {
            State::Settled(r) => Some(clone_result(r)),
            State::Pending(_) => None,
        }
    }

    /// Drains every currently-queued task without waiting on a particular
    /// deferred, used once execution has produced its result but
    /// best-effort background continuations (e.g. unobserved `all` branches)
    /// remain.
    pub fn drain(&self) {
        while self.run_one() {}
    }
}

/// Bridges a [`Deferred`] to a boxed `futures` future, for hosts that want
/// to await resolver results on a real async runtime instead of draining
/// the cooperative [`TaskQueue`] themselves (§4.3 supplement).
#[cfg(feature = "async")]
pub mod future_adapter {
    use std::task::Poll;

    use futures::future::BoxFuture;
    use futures::FutureExt;

    use crate::error::FieldError;

    use super::Deferred;

    /// Polls `queue` to completion and resolves/rejects `target` with
    /// whatever future `source` eventually produces.
    ///
    /// Since [`Deferred`] settles synchronously as soon as its queue is
    /// drained, bridging from a future just means polling it to completion
    /// once, off the calling task's own executor — there is no partial-poll
    /// state to retain between calls.
    pub fn adapt<T: Clone + 'static>(
        target: &Deferred<T>,
        source: BoxFuture<'static, Result<T, FieldError>>,
    ) {
        let target = target.clone();
        let mut source = source;
        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        match source.poll_unpin(&mut cx) {
            Poll::Ready(Ok(v)) => target.resolve(v),
            Poll::Ready(Err(e)) => target.reject(e),
            Poll::Pending => target.reject(FieldError::internal(
                "async resolver future did not complete synchronously; \
                 the `async` feature only bridges futures that resolve \
                 without yielding to an external reactor",
            )),
        }
    }

    /// Wraps an async resolver body as a field resolver returning a
    /// [`crate::value::Value::Deferred`] the executor's scheduler can drive.
    pub fn resolver_from_future<F>(
        queue: &super::TaskQueue,
        fut: F,
    ) -> crate::value::Value
    where
        F: std::future::Future<Output = Result<crate::value::Value, FieldError>> + Send + 'static,
    {
        let deferred = Deferred::pending(queue);
        adapt(&deferred, fut.boxed());
        crate::value::Value::Deferred(deferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_then_settles() {
        let queue = TaskQueue::new();
        let d: Deferred<i32> = Deferred::pending(&queue);
        let next = d.then(|v| Outcome::Value(v + 1), None::<fn(FieldError) -> Outcome<i32>>);
        d.resolve(41);
        let result = queue.wait(&next).unwrap();
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn second_resolve_is_noop() {
        let queue = TaskQueue::new();
        let d: Deferred<i32> = Deferred::pending(&queue);
        d.resolve(1);
        d.resolve(2);
        let result = queue.wait(&d).unwrap();
        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn all_preserves_order() {
        let queue = TaskQueue::new();
        let a = Deferred::fulfilled(&queue, 1);
        let b = Deferred::fulfilled(&queue, 2);
        let c: Deferred<i32> = Deferred::pending(&queue);
        let all = Deferred::all(&queue, vec![a, b, c.clone()]);
        c.resolve(3);
        let result = queue.wait(&all).unwrap();
        assert_eq!(result.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn all_rejects_on_first_failure() {
        let queue = TaskQueue::new();
        let a: Deferred<i32> = Deferred::pending(&queue);
        let b: Deferred<i32> = Deferred::pending(&queue);
        let all = Deferred::all(&queue, vec![a.clone(), b.clone()]);
        a.reject(FieldError::new("boom", None));
        b.resolve(2);
        let result = queue.wait(&all).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn fifo_ordering_of_continuations() {
        let queue = TaskQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let a: Deferred<i32> = Deferred::pending(&queue);
        for i in 0..3 {
            let order = order.clone();
            a.then(
                move |v| {
                    order.borrow_mut().push(i);
                    Outcome::Value(v)
                },
                None::<fn(FieldError) -> Outcome<i32>>,
            );
        }
        a.resolve(0);
        queue.drain();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
