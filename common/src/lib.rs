//====================================================================

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

//====================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    TurnBegan,
    Died,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BattleEvent<Id> {
    TurnBegan(Id),
    Died(Id),
}

impl<Id> BattleEvent<Id> {
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            BattleEvent::TurnBegan(_) => EventKind::TurnBegan,
            BattleEvent::Died(_) => EventKind::Died,
        }
    }

    #[inline]
    pub fn id(&self) -> &Id {
        match self {
            BattleEvent::TurnBegan(id) | BattleEvent::Died(id) => id,
        }
    }
}

//====================================================================

/// Creates a connected sender/receiver pair. The sender may be cloned and
/// handed to any number of producers; there is exactly one consumer.
pub fn channel<Id>() -> (EventSender<Id>, EventReceiver<Id>) {
    let (tx, rx) = mpsc::channel();
    (EventSender(tx), EventReceiver(rx))
}

#[derive(Debug)]
pub struct EventSender<Id>(Sender<BattleEvent<Id>>);

impl<Id> Clone for EventSender<Id> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<Id> EventSender<Id> {
    /// Never blocks. Returns false if the receiving side has gone away.
    #[inline]
    pub fn dispatch(&self, event: BattleEvent<Id>) -> bool {
        self.0.send(event).is_ok()
    }
}

#[derive(Debug)]
pub struct EventReceiver<Id>(Receiver<BattleEvent<Id>>);

impl<Id> EventReceiver<Id> {
    #[inline]
    pub fn try_recv(&self) -> Option<BattleEvent<Id>> {
        self.0.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<BattleEvent<Id>> {
        match self.0.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    #[inline]
    pub fn drain(&self) -> Vec<BattleEvent<Id>> {
        self.0.try_iter().collect()
    }
}

//====================================================================

/// Per-combatant listener registry. Each event kind keeps its own list of
/// senders, delivered to in registration order.
#[derive(Debug)]
pub struct Listeners<Id> {
    turn_began: Vec<EventSender<Id>>,
    died: Vec<EventSender<Id>>,
}

impl<Id> Default for Listeners<Id> {
    fn default() -> Self {
        Self {
            turn_began: Vec::new(),
            died: Vec::new(),
        }
    }
}

impl<Id: Copy> Listeners<Id> {
    pub fn register(&mut self, kind: EventKind, sender: EventSender<Id>) {
        match kind {
            EventKind::TurnBegan => self.turn_began.push(sender),
            EventKind::Died => self.died.push(sender),
        }
    }

    #[inline]
    pub fn count(&self, kind: EventKind) -> usize {
        self.list(kind).len()
    }

    /// Returns how many listeners the event was delivered to.
    pub fn dispatch(&self, event: BattleEvent<Id>) -> usize {
        self.list(event.kind())
            .iter()
            .filter(|sender| sender.dispatch(event))
            .count()
    }

    #[inline]
    fn list(&self, kind: EventKind) -> &[EventSender<Id>] {
        match kind {
            EventKind::TurnBegan => &self.turn_began,
            EventKind::Died => &self.died,
        }
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_only_matching_kind() {
        let (death_tx, death_rx) = channel::<u32>();
        let (turn_tx, turn_rx) = channel::<u32>();

        let mut listeners = Listeners::default();
        listeners.register(EventKind::Died, death_tx);
        listeners.register(EventKind::TurnBegan, turn_tx);

        assert_eq!(listeners.dispatch(BattleEvent::Died(7)), 1);

        assert_eq!(death_rx.drain(), vec![BattleEvent::Died(7)]);
        assert!(turn_rx.drain().is_empty());
    }

    #[test]
    fn dispatch_follows_registration_order() {
        let (tx, rx) = channel::<&'static str>();
        let (other_tx, other_rx) = channel::<&'static str>();

        let mut listeners = Listeners::default();
        listeners.register(EventKind::TurnBegan, tx.clone());
        listeners.register(EventKind::TurnBegan, other_tx);
        listeners.register(EventKind::TurnBegan, tx);

        assert_eq!(listeners.count(EventKind::TurnBegan), 3);
        assert_eq!(listeners.dispatch(BattleEvent::TurnBegan("a")), 3);

        assert_eq!(rx.drain().len(), 2);
        assert_eq!(other_rx.drain().len(), 1);
    }

    #[test]
    fn dropped_receiver_is_skipped() {
        let (tx, rx) = channel::<u32>();
        let mut listeners = Listeners::default();
        listeners.register(EventKind::Died, tx);
        drop(rx);

        assert_eq!(listeners.dispatch(BattleEvent::Died(1)), 0);
    }
}

//====================================================================
