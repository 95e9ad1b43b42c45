//! In-process stand-ins for the simulator and viewer, used for tests.
//!
//! [`MockSimulator`] and [`MockViewer`] record every call and share their
//! state through `Rc<RefCell<_>>`, so a test can keep a handle to the world,
//! script the [`CarState`] returned by the next tick and inspect the calls the
//! environment made.
use crate::{
    car::{CarControls, CarState},
    error::{AssetKind, SimError},
    sim::{Assists, CarId, SimBackend, SimId, TeleportMode},
    viewer::ViewerBackend,
};
use std::{cell::RefCell, path::Path, rc::Rc};

/// A call received by [`MockSimulator`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Create,
    LoadTrack(String),
    AddCar(String),
    SetTune(String, f32),
    SetScoringVar(String, f32),
    Teleport(TeleportMode, Option<f32>),
    SetAutoTeleport {
        on_hit: bool,
        off_track: bool,
        mode: TeleportMode,
    },
    SetAssists(Assists),
    SetControls {
        smooth: bool,
        controls: CarControls,
    },
    Step(f64),
    GetState,
    Destroy,
}

/// Shared state behind a [`MockSimulator`].
#[derive(Debug)]
pub struct MockWorld {
    /// When `false`, `create` fails as if the asset root were incomplete.
    pub assets_present: bool,

    /// Known track names.
    pub tracks: Vec<String>,

    /// Known car models.
    pub cars: Vec<String>,

    /// State copied out by `get_state`; tests edit it between ticks.
    pub state: CarState,

    /// When `true`, every tick also refreshes `last_track_point_timestamp`,
    /// as if the car kept reaching new track points.
    pub auto_progress: bool,

    /// When `true`, `get_state` fails.
    pub fail_get_state: bool,

    /// Calls in arrival order.
    pub calls: Vec<MockCall>,

    clock: f64,
    next_sim: i32,
    next_car: i32,
    live: Vec<SimId>,
    added_cars: Vec<CarId>,
}

impl Default for MockWorld {
    fn default() -> Self {
        Self {
            assets_present: true,
            tracks: vec!["driftplayground".to_string()],
            cars: vec![
                "ks_toyota_supra_mkiv_drift".to_string(),
                "ks_toyota_ae86_drift".to_string(),
            ],
            state: CarState::default(),
            auto_progress: true,
            fail_get_state: false,
            calls: Vec::new(),
            clock: 0.0,
            next_sim: 0,
            next_car: 0,
            live: Vec::new(),
            added_cars: Vec::new(),
        }
    }
}

impl MockWorld {
    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(*c)).count()
    }

    /// Number of created and not yet destroyed instances.
    pub fn live_instances(&self) -> usize {
        self.live.len()
    }

    /// Simulated time advanced by `step` calls.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// The controls of the most recent `set_controls` call.
    pub fn last_controls(&self) -> Option<CarControls> {
        self.calls.iter().rev().find_map(|c| match c {
            MockCall::SetControls { controls, .. } => Some(*controls),
            _ => None,
        })
    }

    fn check(&self, sim: SimId) -> Result<(), SimError> {
        if self.live.contains(&sim) {
            Ok(())
        } else {
            Err(SimError::InvalidHandle)
        }
    }

    fn check_car(&self, sim: SimId, car: CarId) -> Result<(), SimError> {
        self.check(sim)?;
        if self.added_cars.contains(&car) {
            Ok(())
        } else {
            Err(SimError::InvalidHandle)
        }
    }
}

/// A scripted simulator.
#[derive(Debug, Clone, Default)]
pub struct MockSimulator {
    world: Rc<RefCell<MockWorld>>,
}

impl MockSimulator {
    /// Creates a simulator with a fresh world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the shared world.
    pub fn world(&self) -> Rc<RefCell<MockWorld>> {
        self.world.clone()
    }
}

impl SimBackend for MockSimulator {
    fn create(&mut self, asset_root: &Path) -> Result<SimId, SimError> {
        let mut w = self.world.borrow_mut();
        w.calls.push(MockCall::Create);
        if !w.assets_present {
            return Err(SimError::Initialization(format!(
                "assets missing under {}",
                asset_root.display()
            )));
        }
        let sim = SimId(w.next_sim);
        w.next_sim += 1;
        w.live.push(sim);
        Ok(sim)
    }

    fn load_track(&mut self, sim: SimId, name: &str) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check(sim)?;
        w.calls.push(MockCall::LoadTrack(name.to_string()));
        if w.tracks.iter().any(|t| t == name) {
            Ok(())
        } else {
            Err(SimError::AssetNotFound {
                kind: AssetKind::Track,
                name: name.to_string(),
            })
        }
    }

    fn add_car(&mut self, sim: SimId, model: &str) -> Result<CarId, SimError> {
        let mut w = self.world.borrow_mut();
        w.check(sim)?;
        w.calls.push(MockCall::AddCar(model.to_string()));
        if !w.cars.iter().any(|c| c == model) {
            return Err(SimError::AssetNotFound {
                kind: AssetKind::Car,
                name: model.to_string(),
            });
        }
        let car = CarId(w.next_car);
        w.next_car += 1;
        w.added_cars.push(car);
        Ok(car)
    }

    fn set_tune(
        &mut self,
        sim: SimId,
        car: CarId,
        name: &str,
        value: f32,
    ) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check_car(sim, car)?;
        w.calls.push(MockCall::SetTune(name.to_string(), value));
        Ok(())
    }

    fn set_scoring_var(
        &mut self,
        sim: SimId,
        car: CarId,
        name: &str,
        value: f32,
    ) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check_car(sim, car)?;
        w.calls.push(MockCall::SetScoringVar(name.to_string(), value));
        Ok(())
    }

    fn teleport(
        &mut self,
        sim: SimId,
        car: CarId,
        mode: TeleportMode,
        offset: Option<f32>,
    ) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check_car(sim, car)?;
        w.calls.push(MockCall::Teleport(mode, offset));
        // a teleported car counts as having reached a track point
        let now = w.clock;
        w.state.last_track_point_timestamp = now;
        Ok(())
    }

    fn set_auto_teleport(
        &mut self,
        sim: SimId,
        car: CarId,
        on_hit: bool,
        off_track: bool,
        mode: TeleportMode,
    ) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check_car(sim, car)?;
        w.calls.push(MockCall::SetAutoTeleport {
            on_hit,
            off_track,
            mode,
        });
        Ok(())
    }

    fn set_assists(&mut self, sim: SimId, car: CarId, assists: Assists) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check_car(sim, car)?;
        w.calls.push(MockCall::SetAssists(assists));
        Ok(())
    }

    fn set_controls(
        &mut self,
        sim: SimId,
        car: CarId,
        smooth: bool,
        controls: &CarControls,
    ) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check_car(sim, car)?;
        w.calls.push(MockCall::SetControls {
            smooth,
            controls: *controls,
        });
        Ok(())
    }

    fn step(&mut self, sim: SimId, dt: f64) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check(sim)?;
        w.calls.push(MockCall::Step(dt));
        w.clock += dt;
        let now = w.clock;
        w.state.timestamp = now;
        if w.auto_progress {
            w.state.last_track_point_timestamp = now;
        }
        Ok(())
    }

    fn get_state(&mut self, sim: SimId, car: CarId, out: &mut CarState) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check_car(sim, car)?;
        w.calls.push(MockCall::GetState);
        if w.fail_get_state {
            return Err(SimError::StateRead("scripted failure".to_string()));
        }
        out.clone_from(&w.state);
        Ok(())
    }

    fn destroy(&mut self, sim: SimId) -> Result<(), SimError> {
        let mut w = self.world.borrow_mut();
        w.check(sim)?;
        w.calls.push(MockCall::Destroy);
        w.live.retain(|s| *s != sim);
        Ok(())
    }
}

/// A call received by [`MockViewer`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCall {
    Init,
    SetRenderHz(u32, bool),
    SetActiveSimulator(SimId, bool),
    SetActiveCar(CarId, bool, bool),
    Tick,
    Shut,
}

/// Shared state behind a [`MockViewer`].
#[derive(Debug, Default)]
pub struct ViewerLog {
    /// Calls in arrival order.
    pub calls: Vec<ViewerCall>,

    /// Reported by `is_exited`, as if the window was closed.
    pub exited: bool,
}

impl ViewerLog {
    /// Number of rendered frames.
    pub fn ticks(&self) -> usize {
        self.calls.iter().filter(|c| **c == ViewerCall::Tick).count()
    }

    /// Number of `init` calls.
    pub fn inits(&self) -> usize {
        self.calls.iter().filter(|c| **c == ViewerCall::Init).count()
    }

    /// Number of `shut` calls.
    pub fn shuts(&self) -> usize {
        self.calls.iter().filter(|c| **c == ViewerCall::Shut).count()
    }
}

/// A recording viewer.
#[derive(Debug, Clone, Default)]
pub struct MockViewer {
    log: Rc<RefCell<ViewerLog>>,
}

impl MockViewer {
    /// Creates a viewer with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the shared log.
    pub fn log(&self) -> Rc<RefCell<ViewerLog>> {
        self.log.clone()
    }
}

impl ViewerBackend for MockViewer {
    fn init(&mut self, _asset_root: &Path) -> Result<(), SimError> {
        self.log.borrow_mut().calls.push(ViewerCall::Init);
        Ok(())
    }

    fn set_render_hz(&mut self, hz: u32, owns_loop: bool) -> Result<(), SimError> {
        self.log
            .borrow_mut()
            .calls
            .push(ViewerCall::SetRenderHz(hz, owns_loop));
        Ok(())
    }

    fn set_active_simulator(&mut self, sim: SimId, owns_loop: bool) -> Result<(), SimError> {
        self.log
            .borrow_mut()
            .calls
            .push(ViewerCall::SetActiveSimulator(sim, owns_loop));
        Ok(())
    }

    fn set_active_car(
        &mut self,
        car: CarId,
        take_controls: bool,
        enable_sound: bool,
    ) -> Result<(), SimError> {
        self.log
            .borrow_mut()
            .calls
            .push(ViewerCall::SetActiveCar(car, take_controls, enable_sound));
        Ok(())
    }

    fn tick(&mut self) -> Result<(), SimError> {
        self.log.borrow_mut().calls.push(ViewerCall::Tick);
        Ok(())
    }

    fn is_exited(&self) -> bool {
        self.log.borrow().exited
    }

    fn shut(&mut self) -> Result<(), SimError> {
        self.log.borrow_mut().calls.push(ViewerCall::Shut);
        Ok(())
    }
}
