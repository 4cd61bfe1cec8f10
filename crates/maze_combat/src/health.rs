//! Health record and its notifications

use core::fmt;

/// Notifications emitted by a health record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthEvent {
    /// Damage was applied; carries the amount and the new current health
    Damaged { amount: f32, current: f32 },
    /// Health reached zero. Emitted exactly once.
    Died,
}

/// Handle returned by [`Health::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

type Listener = Box<dyn FnMut(&HealthEvent) + Send>;

/// Current and maximum hit points.
///
/// `current` stays within `[0, max]`. Once it reaches zero the record is
/// dead and every further mutation is a no-op.
pub struct Health {
    current: f32,
    max: f32,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl Health {
    /// Create a full health record. A non-positive `max` yields a dead record.
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Health as a fraction of max (0.0 - 1.0)
    pub fn percent(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max
    }

    /// Register a listener. Listeners run synchronously, in registration
    /// order, before the mutating call returns.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&HealthEvent) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Detach every listener
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Apply damage. Negative amounts count as zero.
    ///
    /// Returns the damage dealt and whether this call killed the owner.
    pub fn take_damage(&mut self, amount: f32) -> (f32, bool) {
        if !self.is_alive() {
            return (0.0, false);
        }

        let amount = amount.max(0.0);
        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        let dealt = before - self.current;

        log::debug!("took {} damage, hp {}/{}", amount, self.current, self.max);
        self.emit(HealthEvent::Damaged {
            amount,
            current: self.current,
        });

        let died = !self.is_alive();
        if died {
            log::debug!("health depleted");
            self.emit(HealthEvent::Died);
        }

        (dealt, died)
    }

    /// Restore health up to max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() {
            return 0.0;
        }

        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }

    fn emit(&mut self, event: HealthEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl fmt::Debug for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Health")
            .field("current", &self.current)
            .field("max", &self.max)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
