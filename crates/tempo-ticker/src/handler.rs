//! Ticker lifecycle handlers.

/// Lifecycle callbacks invoked by a [`Ticker`](crate::Ticker).
///
/// Every method has a no-op default, so a handler only implements the hooks
/// it cares about. Errors returned from `on_before_first_tick`, `on_tick`
/// and `on_stop` are logged by the ticker and never stop it; an error from
/// `on_start` aborts the run and is returned to the caller of `start`.
pub trait TickerHandler: Send {
    /// Called once at the beginning of a run, with the arguments passed to
    /// `start`.
    fn on_start(&mut self, _args: &[String]) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once, right before the first tick of a run.
    fn on_before_first_tick(&mut self, _args: &[String]) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_tick(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called exactly once per run when the ticker is stopped.
    fn on_stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

type TickFn = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

/// Either a full lifecycle handler or a bare tick callback.
pub enum Handler {
    Full(Box<dyn TickerHandler>),
    Callable(TickFn),
}

impl Handler {
    pub fn new(handler: impl TickerHandler + 'static) -> Self {
        Self::Full(Box::new(handler))
    }

    /// Adapt a plain closure: it becomes `on_tick`, every other hook is a
    /// no-op.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        Self::Callable(Box::new(f))
    }
}

impl TickerHandler for Handler {
    fn on_start(&mut self, args: &[String]) -> anyhow::Result<()> {
        match self {
            Self::Full(handler) => handler.on_start(args),
            Self::Callable(_) => Ok(()),
        }
    }

    fn on_before_first_tick(&mut self, args: &[String]) -> anyhow::Result<()> {
        match self {
            Self::Full(handler) => handler.on_before_first_tick(args),
            Self::Callable(_) => Ok(()),
        }
    }

    fn on_tick(&mut self) -> anyhow::Result<()> {
        match self {
            Self::Full(handler) => handler.on_tick(),
            Self::Callable(f) => f(),
        }
    }

    fn on_stop(&mut self) -> anyhow::Result<()> {
        match self {
            Self::Full(handler) => handler.on_stop(),
            Self::Callable(_) => Ok(()),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Handler::Full"),
            Self::Callable(_) => f.write_str("Handler::Callable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callable_only_ticks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut handler = {
            let counter = counter.clone();
            Handler::from_fn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };

        handler.on_start(&[]).unwrap();
        handler.on_before_first_tick(&[]).unwrap();
        handler.on_stop().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        handler.on_tick().unwrap();
        handler.on_tick().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_full_handler_dispatch() {
        struct Recorder {
            calls: Arc<parking_lot::Mutex<Vec<String>>>,
        }

        impl TickerHandler for Recorder {
            fn on_start(&mut self, args: &[String]) -> anyhow::Result<()> {
                self.calls.lock().push(format!("start:{}", args.join(",")));
                Ok(())
            }

            fn on_tick(&mut self) -> anyhow::Result<()> {
                anyhow::bail!("boom")
            }
        }

        let calls = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut handler = Handler::new(Recorder {
            calls: calls.clone(),
        });
        handler.on_start(&["a".to_string(), "b".to_string()]).unwrap();
        assert!(handler.on_tick().is_err());
        // Hooks the recorder does not override fall back to no-ops.
        assert!(handler.on_stop().is_ok());
        assert_eq!(*calls.lock(), vec!["start:a,b".to_string()]);
    }
}
