/// A unit of work deferred to the next turn of the event loop.
pub struct Task<C: ?Sized> {
    pub id: &'static str,
    pub run: fn(ctx: &mut C),
}

impl<C: ?Sized> Task<C> {
    pub fn new(id: &'static str, run: fn(ctx: &mut C)) -> Self {
        Self { id, run }
    }
}

/// Deferred tasks, run in insertion order one tick later.
///
/// The host (a `setTimeout(0)` in the browser, a direct call in tests) calls
/// [`TickQueue::run_tick`]; only tasks queued before that call run in it.
pub struct TickQueue<C: ?Sized> {
    tick: u64,
    tasks: Vec<Task<C>>,
}

impl<C: ?Sized> Default for TickQueue<C> {
    fn default() -> Self {
        Self {
            tick: 0,
            tasks: Vec::new(),
        }
    }
}

impl<C: ?Sized> TickQueue<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, task: Task<C>) {
        tracing::debug!(task = task.id, tick = self.tick, "deferred to next tick");
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Runs every task queued so far. Returns how many ran.
    pub fn run_tick(&mut self, ctx: &mut C) -> usize {
        let tasks = std::mem::take(&mut self.tasks);
        self.tick = self.tick.wrapping_add(1);
        for task in &tasks {
            (task.run)(ctx);
        }
        tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TickQueue};
    use pretty_assertions::assert_eq;

    fn push_a(log: &mut Vec<&'static str>) {
        log.push("a");
    }

    fn push_b(log: &mut Vec<&'static str>) {
        log.push("b");
    }

    #[test]
    fn runs_tasks_in_insertion_order() {
        let mut q = TickQueue::new();
        q.defer(Task::new("b", push_b));
        q.defer(Task::new("a", push_a));

        let mut log = Vec::new();
        assert_eq!(q.run_tick(&mut log), 2);
        assert_eq!(log, vec!["b", "a"]);
        assert_eq!(q.tick(), 1);
    }

    #[test]
    fn tasks_run_once() {
        let mut q = TickQueue::new();
        q.defer(Task::new("a", push_a));
        let mut log = Vec::new();
        q.run_tick(&mut log);
        assert!(q.is_empty());
        assert_eq!(q.run_tick(&mut log), 0);
        assert_eq!(log, vec!["a"]);
    }

    trait Counter {
        fn bump(&mut self);
    }

    impl Counter for u32 {
        fn bump(&mut self) {
            *self += 1;
        }
    }

    fn bump(c: &mut (dyn Counter + 'static)) {
        c.bump();
    }

    #[test]
    fn works_with_trait_object_contexts() {
        let mut q: TickQueue<dyn Counter> = TickQueue::new();
        q.defer(Task::new("bump", bump));
        let mut n = 0u32;
        q.run_tick(&mut n);
        assert_eq!(n, 1);
    }
}
