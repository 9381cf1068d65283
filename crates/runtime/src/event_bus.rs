/// Poll-based change notifications.
///
/// Producers push events as they mutate; the consuming layer decides when to
/// look at them (per frame, per request) and drains them. Nothing here
/// schedules, debounces, or calls back into the consumer.
#[derive(Debug)]
pub struct EventBus<E> {
    revision: u64,
    events: Vec<E>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            revision: 0,
            events: Vec::new(),
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new revision and returns it. Events emitted for the same
    /// mutation share one revision.
    pub fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn emit(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }
}
