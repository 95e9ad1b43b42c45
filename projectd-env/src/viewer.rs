//! Optional viewer driven in lockstep with physics ticks.
use crate::{
    config::ViewerConfig,
    error::{EnvError, SimError},
    sim::{CarId, SimId},
};
use log::{info, warn};
use std::path::Path;

/// The native viewer, seen from the environment.
pub trait ViewerBackend {
    /// Loads the viewer's assets.
    fn init(&mut self, asset_root: &Path) -> Result<(), SimError>;

    /// Sets the render rate; with `owns_loop`, the viewer also drives the simulator.
    fn set_render_hz(&mut self, hz: u32, owns_loop: bool) -> Result<(), SimError>;

    /// Selects the simulator to render.
    fn set_active_simulator(&mut self, sim: SimId, owns_loop: bool) -> Result<(), SimError>;

    /// Selects the car to follow.
    fn set_active_car(
        &mut self,
        car: CarId,
        take_controls: bool,
        enable_sound: bool,
    ) -> Result<(), SimError>;

    /// Renders one frame.
    fn tick(&mut self) -> Result<(), SimError>;

    /// Returns `true` once the user closed the viewer.
    fn is_exited(&self) -> bool;

    /// Shuts the viewer down.
    fn shut(&mut self) -> Result<(), SimError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Unbound,
    Bound,
    Released,
}

/// A viewer bound at most once to a simulator.
///
/// The binding moves `Unbound -> Bound -> Released` and never goes back, so a
/// detached viewer cannot be attached again. The viewer never owns the
/// simulation loop: it renders exactly one frame per [`ViewerAttachment::tick`]
/// and the caller decides when ticks happen.
pub struct ViewerAttachment<V: ViewerBackend> {
    backend: V,
    binding: Binding,
}

impl<V: ViewerBackend> ViewerAttachment<V> {
    /// Wraps a viewer backend without touching it.
    pub fn new(backend: V) -> Self {
        Self {
            backend,
            binding: Binding::Unbound,
        }
    }

    /// Binds the viewer to `sim`, following `car` if the config asks for it.
    ///
    /// Fails with [`EnvError::ViewerAlreadyUsed`] on a second call, even after
    /// [`detach`](Self::detach).
    pub fn attach(
        &mut self,
        asset_root: &Path,
        sim: SimId,
        car: CarId,
        config: &ViewerConfig,
    ) -> Result<(), EnvError> {
        if self.binding != Binding::Unbound {
            return Err(EnvError::ViewerAlreadyUsed);
        }
        // a failed attach still consumes the single binding
        self.binding = Binding::Released;

        self.backend.init(asset_root)?;
        self.binding = Binding::Bound;
        self.backend.set_render_hz(config.render_hz, false)?;
        self.backend.set_active_simulator(sim, false)?;
        if config.follow_car {
            self.backend.set_active_car(car, false, config.enable_sound)?;
        }
        info!("viewer attached to {:?} at {} Hz", sim, config.render_hz);
        Ok(())
    }

    /// Renders one frame.
    ///
    /// Returns `Ok(false)` without rendering when the viewer is not attached.
    /// If the user closed the viewer, it is detached and `Ok(false)` returned.
    pub fn tick(&mut self) -> Result<bool, SimError> {
        if self.binding != Binding::Bound {
            return Ok(false);
        }
        if self.backend.is_exited() {
            info!("viewer exited, detaching");
            self.detach()?;
            return Ok(false);
        }
        self.backend.tick()?;
        Ok(true)
    }

    /// Releases the binding. Calling it again, or before `attach`, is a no-op.
    pub fn detach(&mut self) -> Result<(), SimError> {
        if self.binding == Binding::Bound {
            self.binding = Binding::Released;
            self.backend.shut()?;
            info!("viewer detached");
        }
        Ok(())
    }

    /// Returns `true` while the viewer is bound.
    pub fn is_attached(&self) -> bool {
        self.binding == Binding::Bound
    }

    /// Returns `true` once `attach` was called, whatever happened afterwards.
    pub fn was_attached(&self) -> bool {
        self.binding != Binding::Unbound
    }
}

impl<V: ViewerBackend> Drop for ViewerAttachment<V> {
    fn drop(&mut self) {
        if let Err(e) = self.detach() {
            warn!("failed to shut the viewer down: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockViewer, ViewerCall};

    fn config() -> ViewerConfig {
        ViewerConfig::default().enabled(true)
    }

    #[test]
    fn test_attach_sequence() {
        let viewer = MockViewer::new();
        let log = viewer.log();
        let mut attachment = ViewerAttachment::new(viewer);
        attachment
            .attach(Path::new("/assets"), SimId(3), CarId(0), &config())
            .unwrap();

        assert!(attachment.is_attached());
        assert_eq!(
            log.borrow().calls,
            vec![
                ViewerCall::Init,
                ViewerCall::SetRenderHz(60, false),
                ViewerCall::SetActiveSimulator(SimId(3), false),
            ]
        );
    }

    #[test]
    fn test_follow_car() {
        let viewer = MockViewer::new();
        let log = viewer.log();
        let mut attachment = ViewerAttachment::new(viewer);
        let config = config().follow_car(true).enable_sound(true);
        attachment
            .attach(Path::new("/assets"), SimId(0), CarId(4), &config)
            .unwrap();
        assert!(log
            .borrow()
            .calls
            .contains(&ViewerCall::SetActiveCar(CarId(4), false, true)));
    }

    #[test]
    fn test_one_frame_per_tick() {
        let viewer = MockViewer::new();
        let log = viewer.log();
        let mut attachment = ViewerAttachment::new(viewer);

        assert!(!attachment.tick().unwrap());
        attachment
            .attach(Path::new("/assets"), SimId(0), CarId(0), &config())
            .unwrap();
        for _ in 0..3 {
            assert!(attachment.tick().unwrap());
        }
        assert_eq!(log.borrow().ticks(), 3);
    }

    #[test]
    fn test_detach_is_idempotent_and_final() {
        let viewer = MockViewer::new();
        let log = viewer.log();
        let mut attachment = ViewerAttachment::new(viewer);
        attachment.detach().unwrap();
        attachment
            .attach(Path::new("/assets"), SimId(0), CarId(0), &config())
            .unwrap();

        attachment.detach().unwrap();
        attachment.detach().unwrap();
        assert_eq!(log.borrow().shuts(), 1);
        assert!(!attachment.is_attached());
        assert!(attachment.was_attached());

        let err = attachment
            .attach(Path::new("/assets"), SimId(0), CarId(0), &config())
            .unwrap_err();
        assert_eq!(err, EnvError::ViewerAlreadyUsed);
        assert_eq!(log.borrow().inits(), 1);
    }

    #[test]
    fn test_exited_viewer_detaches() {
        let viewer = MockViewer::new();
        let log = viewer.log();
        let mut attachment = ViewerAttachment::new(viewer);
        attachment
            .attach(Path::new("/assets"), SimId(0), CarId(0), &config())
            .unwrap();
        log.borrow_mut().exited = true;

        assert!(!attachment.tick().unwrap());
        assert!(!attachment.is_attached());
        assert_eq!(log.borrow().ticks(), 0);
        assert_eq!(log.borrow().shuts(), 1);
    }

    #[test]
    fn test_drop_shuts_bound_viewer() {
        let viewer = MockViewer::new();
        let log = viewer.log();
        {
            let mut attachment = ViewerAttachment::new(viewer);
            attachment
                .attach(Path::new("/assets"), SimId(0), CarId(0), &config())
                .unwrap();
        }
        assert_eq!(log.borrow().shuts(), 1);
    }
}
