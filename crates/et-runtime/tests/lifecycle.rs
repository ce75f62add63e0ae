//! End-to-end runtime runs: phase order, dispatch order and
//! cross-system access.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use et_core::{Transform, Vec3f};
use et_runtime::{
    ComponentSystem, FrameContext, Runtime, RuntimeConfig, RuntimeResult, SteppedClock, System,
};

/// Moves every tracked transform one unit along x per fixed step.
#[derive(Debug, Default)]
struct Mover;

impl System for Mover {
    fn name(&self) -> &str {
        "Mover"
    }

    fn fixed_update(&mut self, ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        if let Some(transforms) = ctx.systems.get::<ComponentSystem<Transform>>() {
            transforms.for_each_mut(ctx.scene, |t| t.translate(Vec3f::unit(0)));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Records the phase order it observes.
#[derive(Debug, Default)]
struct Journal {
    entries: Vec<&'static str>,
}

impl System for Journal {
    fn name(&self) -> &str {
        "Journal"
    }
    fn init(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        self.entries.push("init");
        Ok(())
    }
    fn update(&mut self, _ctx: &mut FrameContext<'_>, _dt: f64) -> RuntimeResult<()> {
        self.entries.push("update");
        Ok(())
    }
    fn fixed_update(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        self.entries.push("fixed");
        Ok(())
    }
    fn render(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        self.entries.push("render");
        Ok(())
    }
    fn shutdown(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        self.entries.push("shutdown");
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Phase log shared between several systems.
type SharedLog = Rc<RefCell<Vec<String>>>;

/// Defines a system that appends `<tag>.<phase>` to a shared log.
macro_rules! tracer {
    ($ty:ident, $tag:literal) => {
        #[derive(Debug)]
        struct $ty(SharedLog);

        impl $ty {
            fn note(&self, phase: &str) {
                self.0.borrow_mut().push(format!("{}.{phase}", $tag));
            }
        }

        impl System for $ty {
            fn name(&self) -> &str {
                $tag
            }
            fn init(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
                self.note("init");
                Ok(())
            }
            fn update(&mut self, _ctx: &mut FrameContext<'_>, _dt: f64) -> RuntimeResult<()> {
                self.note("update");
                Ok(())
            }
            fn fixed_update(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
                self.note("fixed");
                Ok(())
            }
            fn render(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
                self.note("render");
                Ok(())
            }
            fn shutdown(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
                self.note("shutdown");
                Ok(())
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

tracer!(Zeta, "zeta");
tracer!(Alpha, "alpha");

#[test]
fn component_system_syncs_at_init_and_drives_components() {
    let mut runtime = Runtime::new(RuntimeConfig::default().with_max_frames(4)).unwrap();
    let id = runtime.scene_mut().spawn("ship");
    runtime
        .scene_mut()
        .get_mut(id)
        .unwrap()
        .add_component(Transform::new());

    runtime.register(ComponentSystem::<Transform>::new());
    runtime.register(Mover);
    let report = runtime.run_with_clock(&mut SteppedClock::new(0.016)).unwrap();

    let tracked = runtime
        .registry()
        .get::<ComponentSystem<Transform>>()
        .unwrap();
    assert_eq!(tracked.len(), 1);

    let x = runtime
        .scene()
        .get(id)
        .unwrap()
        .get_component::<Transform>()
        .unwrap()
        .position
        .x();
    assert_eq!(x as u64, report.fixed_updates);
}

#[test]
fn phases_run_in_lifecycle_order() {
    let config = RuntimeConfig::default()
        .with_max_frames(2)
        .with_fixed_delta(0.01)
        .with_max_frame_delta(0.5);
    let mut runtime = Runtime::new(config).unwrap();
    runtime.register(Journal::default());
    runtime
        .run_with_clock(&mut SteppedClock::new(0.012))
        .unwrap();

    // 0.012 per frame against a 0.01 step: one fixed step in each frame
    let journal = runtime.registry().get::<Journal>().unwrap();
    assert_eq!(
        journal.entries,
        vec![
            "init", "update", "fixed", "render", "update", "fixed", "render", "shutdown"
        ]
    );
}

#[test]
fn duplicate_names_register_once() {
    let mut runtime = Runtime::new(RuntimeConfig::default()).unwrap();
    assert!(runtime.register(Journal::default()));
    assert!(!runtime.register(Journal::default()));
    assert_eq!(runtime.registry().names(), vec!["Journal"]);
}

#[test]
fn every_phase_dispatches_in_registration_order() {
    let log = SharedLog::default();
    let config = RuntimeConfig::default()
        .with_max_frames(1)
        .with_fixed_delta(0.01)
        .with_max_frame_delta(0.5);
    let mut runtime = Runtime::new(config).unwrap();
    // registered out of name order so the result cannot come from sorting
    runtime.register(Zeta(Rc::clone(&log)));
    runtime.register(Alpha(Rc::clone(&log)));
    runtime
        .run_with_clock(&mut SteppedClock::new(0.012))
        .unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "zeta.init",
            "alpha.init",
            "zeta.update",
            "alpha.update",
            "zeta.fixed",
            "alpha.fixed",
            "zeta.render",
            "alpha.render",
            "zeta.shutdown",
            "alpha.shutdown",
        ]
    );
}
