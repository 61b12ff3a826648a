//! Defines the background task runner.
use std::future::Future;

use log::error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::errors::{Error, RuntimeError};

/// Represents the result of a task.
/// A task may return either () or Result<(), Error> for flexibility: both are converted to
/// a TaskResult by the runner.
pub enum TaskResult {
    Ok,
    Err(Error),
}

/// Represents a handler for a task spawned by [`run`].
pub type TaskHandler = JoinHandle<Result<(), Error>>;

impl From<Result<(), Error>> for TaskResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(_) => TaskResult::Ok,
            Err(e) => TaskResult::Err(e),
        }
    }
}

impl From<()> for TaskResult {
    fn from(_: ()) -> Self {
        TaskResult::Ok
    }
}

/// Runs a given future as a tokio task on the current runtime.
///
/// Nobody may be listening for the outcome of a background task, so a failing task is always
/// logged before its error is handed to the [`TaskHandler`].
///
/// # Parameters
/// * `future`: A future that implements `Future<Output = T>`, `Send`, and has a `'static` lifetime.
///
/// # Errors
/// * `RuntimeError`: the function is not called from within a tokio runtime.
///
/// # Example
/// ```
/// use char_unit::utils::task;
///
/// #[tokio::main]
/// async fn main() {
///     let handler = task::run(async move {
///         // whatever
///     }).unwrap();
///     handler.await.unwrap().unwrap();
/// }
/// ```
pub fn run<F, T>(future: F) -> Result<TaskHandler, Error>
where
    F: Future<Output = T> + Send + 'static,
    T: Into<TaskResult> + Send + 'static,
{
    let runtime = Handle::try_current().map_err(|_| RuntimeError)?;

    let handler = runtime.spawn(async move {
        let result: TaskResult = future.await.into();
        match result {
            TaskResult::Ok => Ok(()),
            TaskResult::Err(err) => {
                error!("Task failed: {}", err);
                Err(err)
            }
        }
    });

    Ok(handler)
}

#[macro_export]
macro_rules! pause {
    ($ms:expr) => {
        $crate::utils::sleep(::std::time::Duration::from_millis($ms as u64)).await
    };
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU8, Ordering};
    use std::sync::Arc;

    use crate::errors::{Error, Unknown};
    use crate::pause;
    use crate::utils::task;

    #[test]
    fn test_task_outside_runtime() {
        let result = task::run(async move {});
        assert!(
            matches!(result, Err(Error::RuntimeError)),
            "No task can run outside of a tokio runtime"
        );
    }

    #[tokio::test]
    async fn test_task_parallel_execution() {
        let start = tokio::time::Instant::now();
        let first = task::run(async move { pause!(300) }).unwrap();
        let second = task::run(async move { pause!(300) }).unwrap();
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let duration = start.elapsed().as_millis();
        assert!(
            duration >= 300,
            "Duration should be greater than 300ms (found: {})",
            duration,
        );
        assert!(
            duration < 600,
            "Duration should be lower than 600ms (found: {})",
            duration,
        );
    }

    #[tokio::test]
    async fn test_task_abort_execution() {
        let flag = Arc::new(AtomicU8::new(0));
        let flag_clone = flag.clone();

        // Increment the flag after 100ms
        task::run(async move {
            pause!(100);
            flag_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("Should not panic");

        // The flag should not have been incremented before the 100ms elapsed.
        pause!(50);
        assert_eq!(
            flag.load(Ordering::SeqCst),
            0,
            "Flag should not be updated by the task before 100ms",
        );

        // The flag should have been incremented after the 100ms elapsed.
        pause!(100);
        assert_eq!(
            flag.load(Ordering::SeqCst),
            1,
            "Flag should be updated by the task after 100ms",
        );

        // ######################
        // Same test but aborting
        let flag_clone = flag.clone();

        let handler = task::run(async move {
            pause!(100);
            flag_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("Should not panic");

        pause!(50);
        handler.abort();

        // The flag should not have been incremented after the 100ms elapsed.
        pause!(100);
        assert_eq!(
            flag.load(Ordering::SeqCst),
            1,
            "Flag should not be updated by an aborted task",
        );
    }

    #[tokio::test]
    async fn test_task_with_result() {
        let task = task::run(async move { Ok::<(), Error>(()) }).unwrap();
        assert!(task.await.unwrap().is_ok(), "An Ok(()) task succeeds");

        let task = task::run(async move {
            Err::<(), Error>(Unknown {
                info: "wow panic!".to_string(),
            })
        })
        .unwrap();
        let result = task.await.unwrap();
        assert!(
            matches!(result, Err(Error::Unknown { .. })),
            "A failing task reports its error through the handler"
        );
    }
}
