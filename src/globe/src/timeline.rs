use web_time::Duration;

/// Generation counter guarding delayed work.
///
/// Anything scheduled captures the epoch current at scheduling time. Bumping
/// the epoch turns every outstanding callback into a no-op when it fires.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub fn bump(&mut self) -> Epoch {
        self.0 = self.0.wrapping_add(1);
        *self
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Scheduled<A> {
    due: Duration,
    order: u64,
    epoch: Epoch,
    action: A,
}

/// An action whose delay has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<A> {
    pub at: Duration,
    pub epoch: Epoch,
    pub action: A,
}

/// Deterministic queue of delayed actions on a caller-driven clock.
#[derive(Debug)]
pub struct Timeline<A> {
    now: Duration,
    next_order: u64,
    pending: Vec<Scheduled<A>>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Timeline<A> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_order: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, epoch: Epoch, action: A) {
        self.schedule_at(self.now + delay, epoch, action);
    }

    /// Schedule at an absolute time. A time already past fires on the next
    /// [`advance`](Self::advance), even one of zero.
    pub fn schedule_at(&mut self, due: Duration, epoch: Epoch, action: A) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.pending.push(Scheduled {
            due,
            order,
            epoch,
            action,
        });
    }

    /// Move the clock forward and hand back everything that came due, ordered
    /// by `(due, insertion_order)`.
    pub fn advance(&mut self, dt: Duration) -> Vec<Fired<A>> {
        self.now += dt;
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|entry| entry.due <= now);
        self.pending = pending;

        due.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.order.cmp(&b.order)));

        due.into_iter()
            .map(|entry| Fired {
                at: entry.due,
                epoch: entry.epoch,
                action: entry.action,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_then_insertion_order() {
        let mut timeline = Timeline::new();
        let epoch = Epoch::default();

        timeline.schedule(Duration::from_millis(200), epoch, "late");
        timeline.schedule(Duration::from_millis(100), epoch, "early");
        timeline.schedule(Duration::from_millis(100), epoch, "early-second");

        assert!(timeline.advance(Duration::from_millis(50)).is_empty());

        let fired: Vec<_> = timeline
            .advance(Duration::from_millis(200))
            .into_iter()
            .map(|fired| fired.action)
            .collect();

        assert_eq!(fired, vec!["early", "early-second", "late"]);
        assert!(timeline.is_idle());
    }

    #[test]
    fn fired_actions_carry_their_epoch() {
        let mut timeline = Timeline::new();
        let mut epoch = Epoch::default();

        timeline.schedule(Duration::from_millis(10), epoch, 1);
        let current = epoch.bump();
        timeline.schedule(Duration::from_millis(10), epoch, 2);

        let fired = timeline.advance(Duration::from_millis(10));
        let live: Vec<_> = fired
            .iter()
            .filter(|fired| fired.epoch == current)
            .map(|fired| fired.action)
            .collect();

        assert_eq!(fired.len(), 2);
        assert_eq!(live, vec![2]);
    }

    #[test]
    fn delay_is_relative_to_current_time() {
        let mut timeline = Timeline::new();
        timeline.advance(Duration::from_secs(1));
        timeline.schedule(Duration::from_millis(500), Epoch::default(), ());

        let fired = timeline.advance(Duration::from_millis(500));

        assert_eq!(fired[0].at, Duration::from_millis(1500));
    }
}
