use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, trace, warn};
use parking_lot::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tokio::time::sleep;

use crate::errors::{Busy, Cancelled, Error, Unknown};
use crate::hardware::{Board, Pin};
use crate::utils::task::{self, TaskHandler, TaskResult};
use crate::utils::{EventHandler, EventManager};

/// Lists all events a [`PulseController`] can emit.
pub enum PulseEvent {
    /// Triggered when the pin has been set HIGH. Payload: the pin name (`String`).
    OnHigh,
    /// Triggered when the pin has been set back LOW at the end of the pulse. Payload: the pin name (`String`).
    OnLow,
    /// Triggered when a pin write failed. Payload: `(String, Error)`, the pin name and the failure.
    OnFailed,
}

/// Convert events to string to facilitate usage with [`EventManager`].
impl From<PulseEvent> for String {
    fn from(value: PulseEvent) -> Self {
        let event = match value {
            PulseEvent::OnHigh => "high",
            PulseEvent::OnLow => "low",
            PulseEvent::OnFailed => "failed",
        };
        event.into()
    }
}

/// The steps of a pulse.
///
/// `Idle → SettingHigh → Holding → SettingLow → Idle`, or `Failed` as soon as a write fails.
#[derive(Clone, Debug, Default)]
pub enum PulseState {
    #[default]
    Idle,
    SettingHigh,
    Holding,
    SettingLow,
    Failed(Error),
}

impl PulseState {
    /// Indicates if a pulse is in flight.
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            PulseState::SettingHigh | PulseState::Holding | PulseState::SettingLow
        )
    }
}

impl Display for PulseState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PulseState::Idle => write!(f, "idle"),
            PulseState::SettingHigh => write!(f, "setting high"),
            PulseState::Holding => write!(f, "holding"),
            PulseState::SettingLow => write!(f, "setting low"),
            PulseState::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Drives a digital pin of a [`Board`] HIGH for a given duration, then LOW.
///
/// One controller runs one pulse at a time: a pulse requested while another one is in flight is
/// rejected with `Busy`. Once a pin has been set HIGH, it is set back LOW whatever happens: normal
/// completion, task cancellation (see [`PulseController::stop`]) or controller teardown.
#[derive(Clone, Debug)]
pub struct PulseController {
    /// The board pins are resolved against. Swappable: see [`PulseController::set_board`].
    board: Arc<RwLock<Box<dyn Board>>>,
    /// The current pulse state.
    state: Arc<RwLock<PulseState>>,
    /// Abort handle of the task running the current background pulse.
    running: Arc<Mutex<Option<AbortHandle>>>,
    /// The event manager for the controller.
    events: EventManager,
}

impl PulseController {
    /// Creates a controller attached to a given board.
    pub fn new(board: Box<dyn Board>) -> Self {
        Self {
            board: Arc::new(RwLock::new(board)),
            state: Arc::new(RwLock::new(PulseState::Idle)),
            running: Arc::new(Mutex::new(None)),
            events: EventManager::default(),
        }
    }

    /// Runs a pulse on `pin` and waits for its completion.
    ///
    /// # Parameters
    /// * `pin`: the name of the board pin to pulse.
    /// * `duration`: how long the pin is held HIGH.
    ///
    /// # Errors
    /// * `PinNotFound`: the pin does not exist on the board; nothing is written.
    /// * `Busy`: another pulse is in flight; nothing is written.
    /// * `IoError`: a write failed. When the HIGH write fails, the LOW write is not attempted.
    pub async fn pulse(&self, pin: &str, duration: Duration) -> Result<(), Error> {
        let session = self.prepare(pin)?;
        session.run(duration).await
    }

    /// Starts a pulse on `pin` as a background task and returns right away.
    ///
    /// The pin resolution and the busy check are made before returning: their errors are returned
    /// here. The outcome of the pulse itself is reported through the returned [`PulseHandle`], the
    /// controller events and [`PulseController::get_state`].
    ///
    /// # Errors
    /// * `PinNotFound`: the pin does not exist on the board.
    /// * `Busy`: another pulse is in flight.
    /// * `RuntimeError`: not called from within a tokio runtime.
    pub fn start(&self, pin: &str, duration: Duration) -> Result<PulseHandle, Error> {
        let session = self.prepare(pin)?;
        let pin = session.pin_name.clone();
        let task = task::run(session.run(duration))?;
        *self.running.lock() = Some(task.abort_handle());
        Ok(PulseHandle { pin, task })
    }

    /// Cancels the background pulse, if any. The pin is set back LOW.
    pub fn stop(&self) {
        if let Some(handle) = self.running.lock().take() {
            if !handle.is_finished() {
                info!("Cancelling the running pulse");
            }
            handle.abort();
        }
    }

    /// Resolves the pin on a snapshot of the board and reserves the controller.
    fn prepare(&self, pin: &str) -> Result<PulseSession, Error> {
        let handle = self.get_board().pin_by_name(pin).map_err(|err| {
            warn!("Pulse rejected: {}", err);
            err
        })?;
        PulseSession::begin(handle, self.state.clone(), self.events.clone())
    }

    // ########################################
    // Setters and Getters.

    /// Attaches the controller to another board.
    ///
    /// A pulse in flight completes on the pin it started with.
    pub fn set_board(&self, board: Box<dyn Board>) {
        *self.board.write() = board;
    }

    /// Retrieves a snapshot of the board the controller is attached to.
    pub fn get_board(&self) -> Box<dyn Board> {
        self.board.read().clone()
    }

    /// Retrieves the current pulse state.
    pub fn get_state(&self) -> PulseState {
        self.state.read().clone()
    }

    /// Indicates the busy status, ie if a pulse is in flight.
    pub fn is_busy(&self) -> bool {
        self.state.read().is_running()
    }

    /// Registers a callback to be executed on a given event.
    ///
    /// Available events for a controller are defined by the enum: [`PulseEvent`]:
    /// - **`OnHigh` | `high`:** Triggered when the pin is set HIGH.
    ///    _The callback must receive the following parameter: `|pin: String| { ... }`_
    /// - **`OnLow` | `low`:** Triggered when the pin is set back LOW.
    ///    _The callback must receive the following parameter: `|pin: String| { ... }`_
    /// - **`OnFailed` | `failed`:** Triggered when a pin write fails.
    ///    _The callback must receive the following parameter: `|(pin, error): (String, Error)| { ... }`_
    pub fn on<S, F, T, Fut>(&self, event: S, callback: F) -> EventHandler
    where
        S: Into<String>,
        T: 'static + Send + Sync + Clone,
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Into<TaskResult>,
    {
        self.events.on(event, callback)
    }
}

impl Display for PulseController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PulseController ({}) [state={}]",
            self.board.read(),
            self.state.read()
        )
    }
}

/// Handle on a pulse started by [`PulseController::start`].
#[derive(Debug)]
pub struct PulseHandle {
    pin: String,
    task: TaskHandler,
}

impl PulseHandle {
    /// Retrieves the name of the pulsed pin.
    pub fn get_pin(&self) -> &str {
        &self.pin
    }

    /// Indicates if the pulse is over (completed, failed or cancelled).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the pulse. The pin is set back LOW.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Waits for the end of the pulse.
    ///
    /// # Errors
    /// * `Cancelled`: the pulse was aborted before its end.
    /// * any error the pulse itself failed with.
    pub async fn wait(self) -> Result<(), Error> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(Cancelled { pin: self.pin }),
            Err(err) => Err(Unknown {
                info: err.to_string(),
            }),
        }
    }
}

/// A controller reservation for one pulse on one pin.
///
/// Dropping a session that has set its pin HIGH but not yet LOW writes LOW: this is how
/// cancellation returns the pin to its safe state.
struct PulseSession {
    pin_name: String,
    pin: Box<dyn Pin>,
    /// The pin has been set HIGH and must be set back LOW.
    armed: bool,
    /// The session reached Idle or Failed by itself.
    finished: bool,
    state: Arc<RwLock<PulseState>>,
    events: EventManager,
}

impl PulseSession {
    fn begin(
        pin: Box<dyn Pin>,
        state: Arc<RwLock<PulseState>>,
        events: EventManager,
    ) -> Result<Self, Error> {
        let pin_name = pin.get_name().to_string();
        {
            let mut lock = state.write();
            if lock.is_running() {
                warn!("Pulse on pin {} rejected: another pulse is in flight", pin_name);
                return Err(Busy { pin: pin_name });
            }
            *lock = PulseState::SettingHigh;
        }
        Ok(Self {
            pin_name,
            pin,
            armed: false,
            finished: false,
            state,
            events,
        })
    }

    async fn run(mut self, duration: Duration) -> Result<(), Error> {
        self.write(true)?;
        self.armed = true;
        info!("Pin {} set HIGH for {:?}", self.pin_name, duration);
        self.events.emit(PulseEvent::OnHigh, self.pin_name.clone());

        self.transition(PulseState::Holding);
        sleep(duration).await;
        self.transition(PulseState::SettingLow);

        self.armed = false;
        self.write(false)?;
        info!("Pin {} set LOW", self.pin_name);
        self.finish(PulseState::Idle);
        self.events.emit(PulseEvent::OnLow, self.pin_name.clone());
        Ok(())
    }

    fn write(&mut self, high: bool) -> Result<(), Error> {
        trace!("Pin {} write {}", self.pin_name, high);
        let result = self.pin.set_state(high);
        result.map_err(|err| self.fail(err))
    }

    fn transition(&self, state: PulseState) {
        trace!("Pulse on pin {}: {}", self.pin_name, state);
        *self.state.write() = state;
    }

    fn finish(&mut self, state: PulseState) {
        self.transition(state);
        self.finished = true;
    }

    fn fail(&mut self, err: Error) -> Error {
        error!("Pulse on pin {} failed: {}", self.pin_name, err);
        self.finish(PulseState::Failed(err.clone()));
        self.events
            .emit(PulseEvent::OnFailed, (self.pin_name.clone(), err.clone()));
        err
    }
}

impl Drop for PulseSession {
    fn drop(&mut self) {
        if self.armed {
            warn!("Pulse on pin {} interrupted: setting it LOW", self.pin_name);
            if let Err(err) = self.pin.set_state(false) {
                error!("Pin {} could not be set LOW: {}", self.pin_name, err);
            }
        }
        if !self.finished {
            *self.state.write() = PulseState::Idle;
        }
    }
}
