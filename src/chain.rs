//! Non-destructive attachment to externally owned single-slot callbacks.
//!
//! The host exposes exactly one global handler per event kind, so a plain
//! assignment silently drops whoever was there first. [`CallbackSlot::chain`]
//! captures the installed handler and replaces it with one that runs both.
//! [`HookRegistry`] generalises the pattern: handlers register by hook name
//! and a single dispatcher per name is chained onto the host slot once.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared handler stored in a [`CallbackSlot`].
pub type Callback<T> = Rc<dyn Fn(&T)>;

/// Which handler runs first once two handlers are chained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainOrder {
    /// The previously installed handler, then the new one.
    #[default]
    PriorFirst,
    /// The new handler, then the previously installed one.
    NewFirst,
}

/// Errors raised while wiring handlers onto host hooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// A dispatcher for this hook name is already chained onto a slot.
    #[error("dispatcher for hook {hook:?} is already installed")]
    AlreadyInstalled {
        /// Name of the hook.
        hook: String,
    },
    /// The component already attached itself to the host hooks.
    #[error("{owner} host hooks are already set up")]
    AlreadySetUp {
        /// Component that attempted a second setup.
        owner: &'static str,
    },
}

/// Combines an optional prior handler with `next` in the given order.
///
/// With no prior handler the result is `next` itself.
#[must_use]
pub fn chain<T: 'static>(
    prior: Option<Callback<T>>,
    next: Callback<T>,
    order: ChainOrder,
) -> Callback<T> {
    let Some(prior) = prior else {
        return next;
    };
    match order {
        ChainOrder::PriorFirst => Rc::new(move |payload: &T| {
            prior(payload);
            next(payload);
        }),
        ChainOrder::NewFirst => Rc::new(move |payload: &T| {
            next(payload);
            prior(payload);
        }),
    }
}

/// One externally owned global callback slot.
pub struct CallbackSlot<T> {
    handler: RefCell<Option<Callback<T>>>,
}

impl<T> Default for CallbackSlot<T> {
    fn default() -> Self {
        Self {
            handler: RefCell::new(None),
        }
    }
}

impl<T> fmt::Debug for CallbackSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("occupied", &self.handler.borrow().is_some())
            .finish()
    }
}

impl<T: 'static> CallbackSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently installed handler.
    #[must_use]
    pub fn handler(&self) -> Option<Callback<T>> {
        self.handler.borrow().clone()
    }

    /// Whether a handler is installed.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// Plain assignment, replacing and returning the previous handler.
    ///
    /// This is the host's own semantics; prefer [`CallbackSlot::chain`].
    pub fn set(&self, handler: impl Fn(&T) + 'static) -> Option<Callback<T>> {
        self.handler.replace(Some(Rc::new(handler)))
    }

    /// Installs `next` alongside whatever handler is already present.
    ///
    /// Applying this N times yields a slot that runs all N handlers in
    /// attachment order (for [`ChainOrder::PriorFirst`]).
    pub fn chain(&self, next: impl Fn(&T) + 'static, order: ChainOrder) {
        self.chain_callback(Rc::new(next), order);
    }

    /// Like [`CallbackSlot::chain`] for an already shared handler.
    pub fn chain_callback(&self, next: Callback<T>, order: ChainOrder) {
        let prior = self.handler.borrow_mut().take();
        debug!(
            "chaining handler ({order:?}, prior handler present: {})",
            prior.is_some()
        );
        self.handler.replace(Some(chain(prior, next, order)));
    }

    /// Installs a handler that decides whether and how to forward to the
    /// prior one.
    ///
    /// `wrapper` receives each payload plus a function invoking the prior
    /// handler (a no-op when the slot was empty), so it can translate the
    /// payload, forward it unchanged or swallow it.
    pub fn intercept(&self, wrapper: impl Fn(&T, &dyn Fn(&T)) + 'static) {
        let prior = self.handler.borrow_mut().take();
        let forward = move |payload: &T| {
            if let Some(prior) = &prior {
                prior(payload);
            }
        };
        self.handler
            .replace(Some(Rc::new(move |payload: &T| wrapper(payload, &forward))));
    }

    /// Invokes the installed handler the way the host does.
    ///
    /// Returns `false` when the slot is empty. The handler is cloned out of
    /// the slot first, so it may re-chain the slot while running.
    pub fn fire(&self, payload: &T) -> bool {
        self.handler().map(|handler| handler(payload)).is_some()
    }
}

struct RegistryInner<T> {
    hooks: RefCell<HashMap<String, Vec<Callback<T>>>>,
    installed: RefCell<HashSet<String>>,
}

/// Explicit multicast registry for host hooks carrying payloads of type `T`.
///
/// Keeps an ordered handler list per hook name. [`HookRegistry::install`]
/// chains a single dispatcher for a name onto a host slot; later
/// registrations reach the host through that dispatcher without touching the
/// slot again.
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use rail_frp::chain::{CallbackSlot, ChainOrder, HookRegistry};
///
/// let slot = CallbackSlot::<String>::new();
/// let registry = HookRegistry::new();
/// registry.install("signal", &slot, ChainOrder::PriorFirst).expect("first install");
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// for tag in ["cab", "lamps"] {
///     let seen = Rc::clone(&seen);
///     registry.register("signal", move |msg: &String| {
///         seen.borrow_mut().push(format!("{tag}:{msg}"));
///     });
/// }
/// slot.fire(&"M10".to_owned());
/// assert_eq!(*seen.borrow(), vec!["cab:M10", "lamps:M10"]);
/// ```
pub struct HookRegistry<T> {
    inner: Rc<RegistryInner<T>>,
}

impl<T> Clone for HookRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for HookRegistry<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                hooks: RefCell::new(HashMap::new()),
                installed: RefCell::new(HashSet::new()),
            }),
        }
    }
}

impl<T> fmt::Debug for HookRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.inner.hooks.borrow().len())
            .field("installed", &self.inner.installed.borrow().len())
            .finish()
    }
}

impl<T: 'static> HookRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the list for `hook`, returning its position.
    pub fn register(&self, hook: &str, handler: impl Fn(&T) + 'static) -> usize {
        let mut hooks = self.inner.hooks.borrow_mut();
        let handlers = hooks.entry(hook.to_owned()).or_default();
        handlers.push(Rc::new(handler));
        debug!("hook {hook:?} gained handler #{}", handlers.len());
        handlers.len() - 1
    }

    /// Number of handlers registered for `hook`.
    #[must_use]
    pub fn handler_count(&self, hook: &str) -> usize {
        self.inner.hooks.borrow().get(hook).map_or(0, Vec::len)
    }

    /// Whether a dispatcher for `hook` has been installed.
    #[must_use]
    pub fn is_installed(&self, hook: &str) -> bool {
        self.inner.installed.borrow().contains(hook)
    }

    /// Runs every handler registered for `hook` in registration order.
    ///
    /// Returns how many handlers ran.
    pub fn dispatch(&self, hook: &str, payload: &T) -> usize {
        let handlers: Vec<Callback<T>> = self
            .inner
            .hooks
            .borrow()
            .get(hook)
            .cloned()
            .unwrap_or_default();
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Chains the dispatcher for `hook` onto `slot`, keeping the slot's
    /// existing handler.
    ///
    /// # Errors
    /// Returns [`HookError::AlreadyInstalled`] if this registry already
    /// installed a dispatcher for `hook`.
    pub fn install(
        &self,
        hook: &str,
        slot: &CallbackSlot<T>,
        order: ChainOrder,
    ) -> Result<(), HookError> {
        if !self.inner.installed.borrow_mut().insert(hook.to_owned()) {
            return Err(HookError::AlreadyInstalled { hook: hook.into() });
        }
        let registry = self.clone();
        let name = hook.to_owned();
        slot.chain(
            move |payload: &T| {
                registry.dispatch(&name, payload);
            },
            order,
        );
        debug!("installed dispatcher for hook {hook:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    type Trace = Rc<RefCell<Vec<&'static str>>>;

    fn tracer(trace: &Trace, tag: &'static str) -> impl Fn(&u8) + 'static {
        let trace = Rc::clone(trace);
        move |_: &u8| trace.borrow_mut().push(tag)
    }

    #[rstest]
    #[case::prior_first(ChainOrder::PriorFirst, vec!["h1", "h2", "h3"])]
    #[case::new_first(ChainOrder::NewFirst, vec!["h3", "h2", "h1"])]
    fn chained_handlers_all_run(#[case] order: ChainOrder, #[case] expected: Vec<&'static str>) {
        let trace = Trace::default();
        let slot = CallbackSlot::new();
        let replaced = slot.set(tracer(&trace, "h1"));
        assert!(replaced.is_none());
        slot.chain(tracer(&trace, "h2"), order);
        slot.chain(tracer(&trace, "h3"), order);
        assert!(slot.fire(&0));
        assert_eq!(*trace.borrow(), expected);
    }

    #[rstest]
    fn chain_onto_empty_slot_installs_handler() {
        let trace = Trace::default();
        let slot = CallbackSlot::new();
        assert!(!slot.fire(&0));
        slot.chain(tracer(&trace, "only"), ChainOrder::PriorFirst);
        assert!(slot.is_occupied());
        assert!(slot.fire(&0));
        assert_eq!(*trace.borrow(), vec!["only"]);
    }

    #[rstest]
    fn plain_set_drops_prior_handler() {
        let trace = Trace::default();
        let slot = CallbackSlot::new();
        slot.set(tracer(&trace, "h1"));
        let previous = slot.set(tracer(&trace, "h2"));
        assert!(previous.is_some());
        slot.fire(&0);
        assert_eq!(*trace.borrow(), vec!["h2"]);
    }

    #[rstest]
    fn intercept_can_translate_or_swallow() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let slot = CallbackSlot::<u8>::new();
        {
            let seen = Rc::clone(&seen);
            slot.set(move |v| seen.borrow_mut().push(*v));
        }
        slot.intercept(|v, forward| {
            if *v < 10 {
                forward(&(v * 10));
            }
        });
        slot.fire(&1);
        slot.fire(&42);
        slot.fire(&3);
        assert_eq!(*seen.borrow(), vec![10, 30]);
    }

    #[rstest]
    fn intercept_on_empty_slot_forwards_nowhere() {
        let slot = CallbackSlot::<u8>::new();
        let calls = Rc::new(RefCell::new(0));
        {
            let calls = Rc::clone(&calls);
            slot.intercept(move |v, forward| {
                *calls.borrow_mut() += 1;
                forward(v);
            });
        }
        assert!(slot.fire(&1));
        assert_eq!(*calls.borrow(), 1);
    }

    #[rstest]
    fn registry_installs_once_per_hook() {
        let slot = CallbackSlot::<u8>::new();
        let registry = HookRegistry::new();
        assert!(registry.install("signal", &slot, ChainOrder::PriorFirst).is_ok());
        assert_eq!(
            registry.install("signal", &slot, ChainOrder::PriorFirst),
            Err(HookError::AlreadyInstalled {
                hook: "signal".into()
            })
        );
        assert!(registry.is_installed("signal"));
        assert!(!registry.is_installed("consist"));
    }

    #[rstest]
    fn registry_keeps_prior_slot_handler_and_order() {
        let trace = Trace::default();
        let slot = CallbackSlot::new();
        slot.set(tracer(&trace, "external"));
        let registry = HookRegistry::new();
        registry.register("signal", tracer(&trace, "first"));
        registry
            .install("signal", &slot, ChainOrder::PriorFirst)
            .expect("install dispatcher");
        registry.register("signal", tracer(&trace, "second"));
        registry.register("other", tracer(&trace, "unrelated"));
        slot.fire(&0);
        assert_eq!(*trace.borrow(), vec!["external", "first", "second"]);
        assert_eq!(registry.handler_count("signal"), 2);
        assert_eq!(registry.dispatch("missing", &0), 0);
    }
}
