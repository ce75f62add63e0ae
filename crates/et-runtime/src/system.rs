use std::any::Any;

use log::info;

use crate::context::FrameContext;
use crate::error::RuntimeResult;

/// A process that takes part in the frame lifecycle.
///
/// Systems run in registration order in every phase. Each phase receives a
/// [`FrameContext`] giving access to the scene, the other systems, frame
/// timing and loop control. Every hook has a default, so a system only
/// implements the phases it cares about.
pub trait System: std::fmt::Debug {
    /// Display name. Registration is rejected if another system already
    /// uses it.
    fn name(&self) -> &str;

    /// Called once before the first frame.
    fn init(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        info!("Initializing system: {}", self.name());
        Ok(())
    }

    /// Called once per frame with the clamped frame delta in seconds.
    fn update(&mut self, _ctx: &mut FrameContext<'_>, _dt: f64) -> RuntimeResult<()> {
        Ok(())
    }

    /// Called once per elapsed fixed step.
    fn fixed_update(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }

    /// Called once per frame after all updates.
    fn render(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }

    /// Called once after the last frame.
    fn shutdown(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        info!("Shutting down system: {}", self.name());
        Ok(())
    }

    /// Support downcasting to concrete types for cross-system communication.
    fn as_any(&self) -> &dyn Any;

    /// Support downcasting to concrete types for cross-system communication.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
