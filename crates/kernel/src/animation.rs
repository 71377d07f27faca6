use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Anything the frame loop can advance with the global clock.
pub trait Animate {
    /// Bring the object to its state at `elapsed` seconds since start.
    fn update(&mut self, elapsed: f64) -> Result<(), AnimateError>;

    /// Short name used in diagnostics.
    fn label(&self) -> &str {
        "animated"
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnimateError {
    #[error("elapsed time {0} is not finite")]
    NonFiniteTime(f64),
    #[error("{label} failed to update: {reason}")]
    Failed { label: String, reason: String },
}

/// Outcome counters of one `animate` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimateReport {
    pub updated: usize,
    pub failed: usize,
    pub pruned: usize,
}

/// Ordered list of animatable objects advanced once per frame.
///
/// The registry holds weak references only: whoever builds the scene owns the
/// objects, and entries whose owner is gone are pruned on the next frame.
#[derive(Default)]
pub struct AnimationRegistry {
    entries: Vec<Weak<RefCell<dyn Animate>>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target`; it is updated after everything registered before it.
    pub fn add<A: Animate + 'static>(&mut self, target: &Rc<RefCell<A>>) {
        let target: Rc<RefCell<dyn Animate>> = target.clone();
        self.entries.push(Rc::downgrade(&target));
    }

    /// Number of registered entries, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Update every live entry in registration order.
    ///
    /// A failing entry is logged and skipped; the remaining entries still run.
    pub fn animate(&mut self, elapsed: f64) -> AnimateReport {
        let mut report = AnimateReport::default();
        self.entries.retain(|entry| {
            let Some(target) = entry.upgrade() else {
                report.pruned += 1;
                return false;
            };
            match target.try_borrow_mut() {
                Ok(mut target) => match target.update(elapsed) {
                    Ok(()) => report.updated += 1,
                    Err(e) => {
                        tracing::warn!(label = target.label(), "skipping animation entry: {e}");
                        report.failed += 1;
                    }
                },
                Err(_) => {
                    tracing::warn!("skipping animation entry that is already borrowed");
                    report.failed += 1;
                }
            }
            true
        });
        if report.pruned > 0 {
            tracing::debug!(pruned = report.pruned, "pruned dropped animation entries");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<(&'static str, f64)>>>,
    }

    impl Animate for Recorder {
        fn update(&mut self, elapsed: f64) -> Result<(), AnimateError> {
            self.log.borrow_mut().push((self.name, elapsed));
            Ok(())
        }
    }

    struct Broken;

    impl Animate for Broken {
        fn update(&mut self, _elapsed: f64) -> Result<(), AnimateError> {
            Err(AnimateError::Failed {
                label: "broken".into(),
                reason: "always fails".into(),
            })
        }

        fn label(&self) -> &str {
            "broken"
        }
    }

    fn recorder(
        name: &'static str,
        log: &Rc<RefCell<Vec<(&'static str, f64)>>>,
    ) -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(Recorder {
            name,
            log: log.clone(),
        }))
    }

    #[test]
    fn updates_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder("a", &log);
        let b = recorder("b", &log);
        let c = recorder("c", &log);

        let mut registry = AnimationRegistry::new();
        registry.add(&b);
        registry.add(&a);
        registry.add(&c);

        let report = registry.animate(1.5);
        assert_eq!(report.updated, 3);
        assert_eq!(*log.borrow(), vec![("b", 1.5), ("a", 1.5), ("c", 1.5)]);
    }

    #[test]
    fn registry_does_not_keep_entries_alive() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder("a", &log);
        let b = recorder("b", &log);

        let mut registry = AnimationRegistry::new();
        registry.add(&a);
        registry.add(&b);
        assert_eq!(Rc::strong_count(&a), 1);

        drop(a);
        let report = registry.animate(0.0);
        assert_eq!(report.pruned, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(*log.borrow(), vec![("b", 0.0)]);
    }

    #[test]
    fn failing_entry_does_not_abort_frame() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let before = recorder("before", &log);
        let broken = Rc::new(RefCell::new(Broken));
        let after = recorder("after", &log);

        let mut registry = AnimationRegistry::new();
        registry.add(&before);
        registry.add(&broken);
        registry.add(&after);

        let report = registry.animate(2.0);
        assert_eq!(
            report,
            AnimateReport {
                updated: 2,
                failed: 1,
                pruned: 0
            }
        );
        assert_eq!(*log.borrow(), vec![("before", 2.0), ("after", 2.0)]);
        // Failing entries stay registered.
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn borrowed_entry_is_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder("a", &log);

        let mut registry = AnimationRegistry::new();
        registry.add(&a);

        let _guard = a.borrow_mut();
        let report = registry.animate(0.0);
        assert_eq!(report.failed, 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn empty_registry_is_a_noop() {
        let mut registry = AnimationRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.animate(1.0), AnimateReport::default());
    }

    #[test]
    fn drives_entity_grid() {
        use crate::grid::{EntityGrid, entity_rotation};

        let grid = Rc::new(RefCell::new(EntityGrid::with_seed(3)));
        let mut registry = AnimationRegistry::new();
        registry.add(&grid);

        registry.animate(4.0);
        let grid = grid.borrow();
        let first = &grid.entities()[0];
        assert_eq!(first.rotation(), entity_rotation(first.position(), 4.0));
    }
}
