//! Defines the event manager system.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::warn;
use parking_lot::Mutex;

use crate::utils::task;
use crate::utils::task::TaskResult;

type SyncedCallbackMap = Mutex<HashMap<String, Vec<CallbackWrapper>>>;
type BoxedCallback =
    Box<dyn FnMut(Arc<dyn Any + Send + Sync>) -> BoxFuture<'static, TaskResult> + Send>;
pub type EventHandler = usize;

#[derive(Clone, Default)]
pub struct EventManager {
    callbacks: Arc<SyncedCallbackMap>,
    next_id: Arc<AtomicUsize>,
}

struct CallbackWrapper {
    id: EventHandler,
    callback: Arc<Mutex<BoxedCallback>>,
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("events", &self.callbacks.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventManager {
    /// Register event handler for a specific event name.
    ///
    /// # Parameters
    /// * `event` - The event name (any type that matches an Into<String>)
    /// * `callback` - An async moved callback that accepts a single parameter as an argument.
    ///                The argument can be anything that might be both `Send + Sync`.
    ///                You can trick multiple parameters by turning them in a single tuple.
    ///                The callback may return `()` or `Result<(), Error>`.
    ///
    /// # Return
    /// Returns an EventHandler that can be used by the `unregister()` method.
    ///
    /// # Errors
    /// If the event handler does not match the expected emitted event exactly it will fail silently.
    /// That means if the tuple gave in the callback parameter does not exactly match the emit one
    /// no handler will be called.
    ///
    /// # Example
    ///
    /// ```
    /// use char_unit::utils::EventManager;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let events: EventManager = Default::default();
    ///
    ///     // Register various handlers for the same event.
    ///     events.on("ready", |name: String| async move { });
    ///     events.on("ready", |(name, age): (&'static str, u8)| async move {
    ///         println!("Event handler with parameters: {} {}.", name, age);
    ///     });
    ///
    ///     // Invoke handlers for "ready" event.
    ///     events.emit("ready", ("foo", 69u8));
    /// }
    /// ```
    pub fn on<S, F, T, Fut>(&self, event: S, mut callback: F) -> EventHandler
    where
        S: Into<String>,
        T: 'static + Send + Sync + Clone,
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Into<TaskResult>,
    {
        let event_name = event.into();
        let callback_event = event_name.clone();
        // Generate a unique ID.
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // Boxes the callback and downcast its parameter.
        let boxed_callback: BoxedCallback = Box::new(move |arg: Arc<dyn Any + Send + Sync>| {
            match arg.downcast::<T>() {
                Ok(arg) => {
                    let future = (callback)((*arg).clone());
                    async move {
                        let result: TaskResult = future.await.into();
                        result
                    }
                    .boxed()
                }
                Err(_) => {
                    warn!(
                        "The callback for event '{}' could not be called because parameter does not match",
                        callback_event
                    );
                    async { TaskResult::Ok }.boxed()
                }
            }
        });

        let wrapper = CallbackWrapper {
            id,
            callback: Arc::new(Mutex::new(boxed_callback)),
        };

        self.callbacks
            .lock()
            .entry(event_name)
            .or_default()
            .push(wrapper);

        id
    }

    /// Invoke all event handlers registered for a specific event name.
    /// Only the callback registered by the `on()` method and whose payload matches the declared
    /// callback type will be called. All others will be silently skipped.
    /// Each callback runs as its own background task: this method does not wait for them.
    ///
    /// # Parameters
    /// * `event`:  The event name (any type that matches an `Into<String>`)
    /// * `payload`: The event payload (must be `'static + Send + Sync`)
    pub fn emit<S, T>(&self, event: S, payload: T)
    where
        S: Into<String>,
        T: 'static + Send + Sync,
    {
        let event_name = event.into();
        let payload_any: Arc<dyn Any + Send + Sync> = Arc::new(payload);
        // Callbacks are called once the registry is released: they may register or unregister handlers.
        let callbacks: Vec<Arc<Mutex<BoxedCallback>>> = match self.callbacks.lock().get(&event_name) {
            Some(wrappers) => wrappers.iter().map(|wrapper| wrapper.callback.clone()).collect(),
            None => return,
        };
        for callback in callbacks {
            let future = (*callback.lock())(payload_any.clone());
            if let Err(err) = task::run(future) {
                warn!("Callback for event '{}' not run: {}", event_name, err);
            }
        }
    }

    /// Unregister a given handler if found.
    pub fn unregister(&self, handler: EventHandler) {
        self.callbacks
            .lock()
            .values_mut()
            .for_each(|v| v.retain(|cb| cb.id != handler));
    }
}
