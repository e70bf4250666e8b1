//! Explicit caller → session table.
//!
//! Sessions live exactly as long as the caller keeps them registered:
//! nothing is removed implicitly. Callers that share a registry across
//! threads wrap it in their own lock.

use indexmap::IndexMap;
use log::debug;

use beatmeter_core::{CallerId, Clock, SystemClock};

use crate::session::Session;

/// Sessions keyed by caller id, in registration order.
#[derive(Debug)]
pub struct SessionRegistry<C: Clock = SystemClock> {
    sessions: IndexMap<CallerId, Session<C>>,
}

impl<C: Clock> SessionRegistry<C> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            sessions: IndexMap::new(),
        }
    }

    /// Register `session` for `caller`, returning the session it replaced.
    pub fn register(&mut self, caller: CallerId, session: Session<C>) -> Option<Session<C>> {
        let replaced = self.sessions.insert(caller, session);
        debug!(
            "caller {caller} registered ({} session(s), replaced: {})",
            self.sessions.len(),
            replaced.is_some()
        );
        replaced
    }

    /// The session of `caller`, created with `make` on first use.
    pub fn get_or_insert_with(
        &mut self,
        caller: CallerId,
        make: impl FnOnce() -> Session<C>,
    ) -> &mut Session<C> {
        self.sessions.entry(caller).or_insert_with(make)
    }

    /// The session of `caller`.
    pub fn get(&self, caller: CallerId) -> Option<&Session<C>> {
        self.sessions.get(&caller)
    }

    /// The session of `caller`, mutably.
    pub fn get_mut(&mut self, caller: CallerId) -> Option<&mut Session<C>> {
        self.sessions.get_mut(&caller)
    }

    /// Unregister `caller` and hand back its session.
    ///
    /// Runs still open in the session are dropped with it.
    pub fn remove(&mut self, caller: CallerId) -> Option<Session<C>> {
        let session = self.sessions.shift_remove(&caller)?;
        if session.is_tracking() {
            debug!(
                "caller {caller} removed with {} open run(s)",
                session.depth()
            );
        }
        Some(session)
    }

    /// Whether `caller` has a session.
    pub fn contains(&self, caller: CallerId) -> bool {
        self.sessions.contains_key(&caller)
    }

    /// Registered callers, in registration order.
    pub fn callers(&self) -> impl Iterator<Item = CallerId> + '_ {
        self.sessions.keys().copied()
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl<C: Clock> Default for SessionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use beatmeter_core::RunId;
    use beatmeter_test_utils::SteppingClock;

    fn session() -> Session<SteppingClock> {
        Session::with_clock(SessionConfig::default(), SteppingClock::new(0, 10)).unwrap()
    }

    #[test]
    fn sessions_are_isolated_per_caller() {
        let mut registry = SessionRegistry::new();
        registry.register(CallerId(1), session());
        registry.register(CallerId(2), session());

        let a = registry.get_mut(CallerId(1)).unwrap();
        a.start();
        a.beat().unwrap();

        assert_eq!(registry.get(CallerId(1)).unwrap().depth(), 1);
        assert!(!registry.get(CallerId(2)).unwrap().is_tracking());
        assert_eq!(
            registry.callers().collect::<Vec<_>>(),
            vec![CallerId(1), CallerId(2)]
        );
    }

    #[test]
    fn removal_is_explicit() {
        let mut registry = SessionRegistry::new();
        registry.register(CallerId(7), session());
        assert!(registry.contains(CallerId(7)));
        let removed = registry.remove(CallerId(7));
        assert!(removed.is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(CallerId(7)).is_none());
    }

    #[test]
    fn register_returns_replaced_session() {
        let mut registry = SessionRegistry::new();
        let mut first = session();
        first.start();
        assert!(registry.register(CallerId(1), first).is_none());
        let replaced = registry.register(CallerId(1), session()).unwrap();
        assert_eq!(replaced.current().unwrap().id(), RunId(0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_or_insert_creates_once() {
        let mut registry = SessionRegistry::new();
        registry.get_or_insert_with(CallerId(3), session).start();
        let again = registry.get_or_insert_with(CallerId(3), || panic!("already registered"));
        assert_eq!(again.depth(), 1);
    }
}
