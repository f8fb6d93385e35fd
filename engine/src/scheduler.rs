//====================================================================

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet, VecDeque},
    fmt::Debug,
    hash::{BuildHasherDefault, Hash},
    sync::Arc,
    thread::JoinHandle,
};

use common::{BattleEvent, EventSender};
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHasher;
use web_time::{Duration, Instant};

//====================================================================

type Hasher = BuildHasherDefault<FxHasher>;

pub trait CombatantKey: Copy + Eq + Hash + Debug + Send + 'static {}
impl<T> CombatantKey for T where T: Copy + Eq + Hash + Debug + Send + 'static {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Queue and turn slot were both empty, the combatant now holds the turn.
    Promoted,
    Queued,
    /// Dead, already queued or already holding the turn.
    Ignored,
}

//====================================================================

#[derive(Clone, Copy, Debug)]
struct TimerHandle {
    generation: u64,
    /// None when the delay is too long to represent. Such a timer never fires.
    deadline: Option<Instant>,
}

#[derive(Debug)]
struct Deadline<Id> {
    at: Instant,
    generation: u64,
    id: Id,
}

impl<Id> PartialEq for Deadline<Id> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.generation == other.generation
    }
}

impl<Id> Eq for Deadline<Id> {}

// Reversed so the binary heap pops the earliest deadline first.
impl<Id> Ord for Deadline<Id> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

impl<Id> PartialOrd for Deadline<Id> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

//====================================================================

#[derive(Debug)]
struct SchedulerState<Id> {
    queue: VecDeque<Id>,
    current: Option<Id>,

    timers: HashMap<Id, TimerHandle, Hasher>,
    deadlines: BinaryHeap<Deadline<Id>>,
    next_generation: u64,

    dead: HashSet<Id, Hasher>,
    shutdown: bool,
}

impl<Id> Default for SchedulerState<Id> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
            timers: HashMap::default(),
            deadlines: BinaryHeap::new(),
            next_generation: 0,
            dead: HashSet::default(),
            shutdown: false,
        }
    }
}

impl<Id: CombatantKey> SchedulerState<Id> {
    fn admit(&mut self, id: Id, events: &EventSender<Id>) -> Admission {
        if self.dead.contains(&id) {
            log::trace!("Ignoring admission of dead combatant {:?}", id);
            return Admission::Ignored;
        }

        if self.current == Some(id) || self.queue.contains(&id) {
            log::trace!("Combatant {:?} is already waiting or acting", id);
            return Admission::Ignored;
        }

        match self.queue.is_empty() && self.current.is_none() {
            true => {
                self.promote(id, events);
                Admission::Promoted
            }
            false => {
                self.queue.push_back(id);
                log::debug!("Combatant {:?} queued at position {}", id, self.queue.len());
                Admission::Queued
            }
        }
    }

    fn promote(&mut self, id: Id, events: &EventSender<Id>) {
        self.current = Some(id);
        log::debug!("Combatant {:?} takes the turn", id);

        if !events.dispatch(BattleEvent::TurnBegan(id)) {
            log::warn!("No receiver for turn start of {:?}", id);
        }
    }

    fn promote_head(&mut self, events: &EventSender<Id>) -> Option<Id> {
        if self.current.is_some() {
            return None;
        }

        let id = self.queue.pop_front()?;
        self.promote(id, events);
        Some(id)
    }

    fn arm(&mut self, id: Id, delay: Duration) -> bool {
        if self.dead.contains(&id) {
            log::trace!("Dropping re-entry timer for dead combatant {:?}", id);
            return false;
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let deadline = Instant::now().checked_add(delay);

        // Replacing the handle cancels any earlier timer; its heap entry goes stale.
        self.timers.insert(
            id,
            TimerHandle {
                generation,
                deadline,
            },
        );

        match deadline {
            Some(at) => self.deadlines.push(Deadline { at, generation, id }),
            None => log::warn!("Re-entry delay for {:?} overflows, timer never fires", id),
        }

        log::debug!("Combatant {:?} re-enters in {:?}", id, delay);
        true
    }

    fn fire_due(&mut self, now: Instant, events: &EventSender<Id>) {
        while let Some(next) = self.deadlines.peek() {
            if next.at > now {
                break;
            }

            let Some(Deadline { generation, id, .. }) = self.deadlines.pop() else {
                break;
            };

            let live = self
                .timers
                .get(&id)
                .is_some_and(|handle| handle.generation == generation);

            if !live {
                continue;
            }

            self.timers.remove(&id);
            self.admit(id, events);
        }
    }
}

//====================================================================

struct Shared<Id> {
    state: Mutex<SchedulerState<Id>>,
    timer_signal: Condvar,
    turn_events: EventSender<Id>,
}

/// Owns the turn queue, the current-turn slot and every pending re-entry
/// timer. All of these live behind one lock, so admission from the timer
/// thread and completion from the game thread can never both promote.
///
/// Promotion reports the start of a turn by dispatching
/// [`BattleEvent::TurnBegan`] through the sender given at construction.
pub struct TurnScheduler<Id: CombatantKey> {
    shared: Arc<Shared<Id>>,
    timer_thread: Option<JoinHandle<()>>,
}

impl<Id: CombatantKey> TurnScheduler<Id> {
    pub fn new(turn_events: EventSender<Id>) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(SchedulerState::default()),
            timer_signal: Condvar::new(),
            turn_events,
        });

        let timer_shared = shared.clone();
        let timer_thread = std::thread::spawn(move || run_timers(timer_shared));

        Self {
            shared,
            timer_thread: Some(timer_thread),
        }
    }

    pub fn admit(&self, id: Id) -> Admission {
        let mut state = self.shared.state.lock();
        state.admit(id, &self.shared.turn_events)
    }

    pub fn promote_head(&self) -> Option<Id> {
        let mut state = self.shared.state.lock();
        state.promote_head(&self.shared.turn_events)
    }

    /// Cancels any pending timer for `id` and arms a new one. Returns false
    /// if the combatant is dead.
    pub fn schedule_reentry(&self, id: Id, delay: Duration) -> bool {
        let mut state = self.shared.state.lock();
        let armed = state.arm(id, delay);

        if armed {
            self.shared.timer_signal.notify_one();
        }
        armed
    }

    pub fn cancel_reentry(&self, id: Id) -> bool {
        self.shared.state.lock().timers.remove(&id).is_some()
    }

    /// Clears the turn slot and sends its holder back through delayed
    /// re-entry. Does not promote the next combatant.
    pub fn complete_current_turn(&self, delay: Duration) -> Option<Id> {
        let mut state = self.shared.state.lock();

        let id = state.current.take()?;
        state.queue.retain(|queued| *queued != id);

        if state.arm(id, delay) {
            self.shared.timer_signal.notify_one();
        }

        log::debug!("Combatant {:?} finished acting", id);
        Some(id)
    }

    pub fn on_death(&self, id: Id) {
        let mut state = self.shared.state.lock();

        state.timers.remove(&id);
        state.queue.retain(|queued| *queued != id);

        if state.current == Some(id) {
            state.current = None;
        }

        state.dead.insert(id);
        log::debug!("Combatant {:?} removed from turn order", id);
    }

    //--------------------------------------------------

    #[inline]
    pub fn current(&self) -> Option<Id> {
        self.shared.state.lock().current
    }

    #[inline]
    pub fn queued(&self) -> Vec<Id> {
        self.shared.state.lock().queue.iter().copied().collect()
    }

    #[inline]
    pub fn is_queued(&self, id: Id) -> bool {
        self.shared.state.lock().queue.contains(&id)
    }

    #[inline]
    pub fn is_dead(&self, id: Id) -> bool {
        self.shared.state.lock().dead.contains(&id)
    }

    #[inline]
    pub fn has_pending_reentry(&self, id: Id) -> bool {
        self.shared.state.lock().timers.contains_key(&id)
    }

    pub fn reentry_deadline(&self, id: Id) -> Option<Instant> {
        self.shared
            .state
            .lock()
            .timers
            .get(&id)
            .and_then(|handle| handle.deadline)
    }
}

impl<Id: CombatantKey> Drop for TurnScheduler<Id> {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.timer_signal.notify_all();

        if let Some(thread) = self.timer_thread.take() {
            if thread.join().is_err() {
                log::error!("Turn timer thread panicked");
            }
        }
    }
}

fn run_timers<Id: CombatantKey>(shared: Arc<Shared<Id>>) {
    log::trace!("Turn timer thread started");

    let mut state = shared.state.lock();

    while !state.shutdown {
        state.fire_due(Instant::now(), &shared.turn_events);

        match state.deadlines.peek().map(|next| next.at) {
            Some(at) => {
                shared.timer_signal.wait_until(&mut state, at);
            }
            None => shared.timer_signal.wait(&mut state),
        }
    }

    log::trace!("Turn timer thread stopped");
}

//====================================================================


//====================================================================
