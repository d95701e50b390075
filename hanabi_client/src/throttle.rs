use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Leading-edge throttle that queues instead of dropping.
///
/// The first item of a burst is released right away and opens a window.
/// Items arriving while the window is open are queued, and released
/// together, in arrival order, once it closes. Releasing a batch opens the
/// next window.
///
/// Time is passed in explicitly so the caller's event loop decides when to
/// look at the clock.
#[derive(Debug)]
pub struct Throttle<T> {
    window: Duration,
    state: State<T>,
}

#[derive(Debug)]
enum State<T> {
    Idle,
    Waiting { until: Instant, queue: VecDeque<T> },
}

impl<T> Throttle<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: State::Idle,
        }
    }

    /// Offers an item. Returns whatever may be applied now, oldest first.
    pub fn submit(&mut self, now: Instant, item: T) -> Vec<T> {
        let mut released = self.poll(now);
        match &mut self.state {
            State::Idle => {
                released.push(item);
                self.state = State::Waiting {
                    until: now + self.window,
                    queue: VecDeque::new(),
                };
            }
            State::Waiting { queue, .. } => queue.push_back(item),
        }
        released
    }

    /// Releases the queue if the window has closed.
    pub fn poll(&mut self, now: Instant) -> Vec<T> {
        let State::Waiting { until, queue } = &mut self.state else {
            return Vec::new();
        };
        if now < *until {
            return Vec::new();
        }
        if queue.is_empty() {
            self.state = State::Idle;
            return Vec::new();
        }
        let released = std::mem::take(queue).into();
        *until = now + self.window;
        released
    }

    /// Releases everything queued, regardless of the window, and goes idle.
    pub fn drain(&mut self) -> Vec<T> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => Vec::new(),
            State::Waiting { queue, .. } => queue.into(),
        }
    }

    /// When the next [`poll()`](Self::poll) can do something, if ever.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            State::Idle => None,
            State::Waiting { until, .. } => Some(*until),
        }
    }

    pub fn queued(&self) -> usize {
        match &self.state {
            State::Idle => 0,
            State::Waiting { queue, .. } => queue.len(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }
}
