/// Timing wrapper for sync and async callbacks
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::{Duration, Instant};
use crate::config::TimerConfig;
use crate::error::TimerError;

/// Something the timer can invoke with a receiver and one argument value.
/// Several arguments travel as a tuple.
pub trait Callback<C, A, R> {
    fn invoke(&self, receiver: &C, args: A) -> R;
}

/// A callback that ignores the receiver
#[derive(Debug, Clone, Copy)]
pub struct Plain<F>(pub F);

impl<C, A, R, F> Callback<C, A, R> for Plain<F>
where
    F: Fn(A) -> R,
{
    fn invoke(&self, _receiver: &C, args: A) -> R {
        (self.0)(args)
    }
}

/// A callback that borrows the receiver as its first parameter
#[derive(Debug, Clone, Copy)]
pub struct Method<F>(pub F);

impl<C, A, R, F> Callback<C, A, R> for Method<F>
where
    F: Fn(&C, A) -> R,
{
    fn invoke(&self, receiver: &C, args: A) -> R {
        (self.0)(receiver, args)
    }
}

/// Placeholder kind for a builder that has not been given a callback yet
#[derive(Debug, Clone, Copy)]
pub struct NoCallback;

/// Builder that pairs a [`TimerConfig`] and a receiver with a callback.
/// `build` is the one place where a missing callback is rejected.
pub struct CallbackTimer<K = NoCallback, C = ()> {
    config: TimerConfig,
    context: C,
    callback: Option<K>,
}

impl CallbackTimer {
    pub fn new() -> Self {
        Self::from_config(TimerConfig::default())
    }

    pub fn from_config(config: TimerConfig) -> Self {
        CallbackTimer {
            config,
            context: (),
            callback: None,
        }
    }
}

impl Default for CallbackTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> CallbackTimer<K, C> {
    /// Adjust the config in place
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(TimerConfig) -> TimerConfig,
    {
        self.config = f(self.config);
        self
    }

    /// Receiver handed to callbacks registered with [`CallbackTimer::method`]
    pub fn context<C2>(self, context: C2) -> CallbackTimer<K, C2> {
        CallbackTimer {
            config: self.config,
            context,
            callback: self.callback,
        }
    }

    pub fn callback<F>(self, callback: F) -> CallbackTimer<Plain<F>, C> {
        self.maybe_callback(Some(callback))
    }

    /// Callback that may be absent, e.g. looked up at runtime
    pub fn maybe_callback<F>(self, callback: Option<F>) -> CallbackTimer<Plain<F>, C> {
        CallbackTimer {
            config: self.config,
            context: self.context,
            callback: callback.map(Plain),
        }
    }

    pub fn method<F>(self, callback: F) -> CallbackTimer<Method<F>, C> {
        CallbackTimer {
            config: self.config,
            context: self.context,
            callback: Some(Method(callback)),
        }
    }

    /// Resolve into a timed callback; the clock starts here
    pub fn build(self) -> Result<TimedCallback<K, C>, TimerError> {
        let callback = self.callback.ok_or_else(|| {
            TimerError::invalid_callback("Callback must be a function")
                .with_context(format!("{:?}", self.config))
        })?;
        Ok(TimedCallback::start(self.config, self.context, callback))
    }
}

/// Time `callback` with default settings
pub fn wrap<F>(callback: F) -> TimedCallback<Plain<F>> {
    wrap_with(TimerConfig::default(), callback)
}

/// Time `callback` with the given settings
pub fn wrap_with<F>(config: TimerConfig, callback: F) -> TimedCallback<Plain<F>> {
    TimedCallback::start(config, (), Plain(callback))
}

/// A callback plus the instant it was wrapped.
///
/// Elapsed time is always measured from that instant, not from the start of
/// each call: repeated or concurrent calls all report time since wrapping.
/// Callbacks hand nothing back through the wrapper: `call` forms take
/// callbacks returning `()`, and the `try_*` forms drop the `Ok` value and
/// pass only `Err` back.
#[derive(Clone)]
pub struct TimedCallback<K, C = ()> {
    config: TimerConfig,
    context: C,
    callback: K,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl<K, C> TimedCallback<K, C> {
    fn start(config: TimerConfig, context: C, callback: K) -> Self {
        TimedCallback {
            config,
            context,
            callback,
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Wall-clock time at which the wrapper was built
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Invoke a callback that returns nothing.
    ///
    /// Callbacks returning a `Result` go through [`TimedCallback::try_call`],
    /// callbacks returning a future through the async forms:
    ///
    /// ```compile_fail
    /// let timed = callback_timer::wrap(|_: ()| async {});
    /// timed.call(());
    /// ```
    pub fn call<A>(&self, args: A)
    where
        K: Callback<C, A, ()>,
    {
        self.callback.invoke(&self.context, args);
        self.complete();
    }

    /// Invoke a fallible callback; an `Err` is returned as is and nothing is logged
    pub fn try_call<A, T, E>(&self, args: A) -> Result<(), E>
    where
        K: Callback<C, A, Result<T, E>>,
    {
        self.callback.invoke(&self.context, args)?;
        self.complete();
        Ok(())
    }

    /// Invoke a callback returning a future and wait for it to settle.
    /// Fallible futures go through [`TimedCallback::try_call_async`].
    ///
    /// ```compile_fail
    /// # async fn run() {
    /// let timed = callback_timer::wrap(|_: ()| async { Err::<(), String>("boom".into()) });
    /// timed.call_async(()).await;
    /// # }
    /// ```
    pub async fn call_async<A, Fut>(&self, args: A)
    where
        K: Callback<C, A, Fut>,
        Fut: Future<Output = ()>,
    {
        self.callback.invoke(&self.context, args).await;
        self.complete();
    }

    /// Async counterpart of [`TimedCallback::try_call`]
    pub async fn try_call_async<A, Fut, T, E>(&self, args: A) -> Result<(), E>
    where
        K: Callback<C, A, Fut>,
        Fut: Future<Output = Result<T, E>>,
    {
        self.callback.invoke(&self.context, args).await?;
        self.complete();
        Ok(())
    }

    fn complete(&self) {
        let elapsed = self.started.elapsed();
        let over = exceeds_threshold(elapsed, self.config.max_time_warning);

        tracing::debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            threshold = ?self.config.max_time_warning,
            logged = over,
            "Timed call completed"
        );

        if over {
            let message = self.message(elapsed);
            self.config.logger.warn(&message);
        }
    }

    pub(crate) fn message(&self, elapsed: Duration) -> String {
        let config = &self.config;
        let mut message = String::new();

        if let Some(tag) = config.display_tag() {
            message.push_str(&format!("[{}] ", tag));
        }
        message.push_str("Call ");
        if let Some(name) = config.display_method() {
            message.push_str(&format!("({}) ", name));
        }
        message.push_str("took ");

        if !config.max_time_warning.is_zero() {
            message.push_str(&format!(
                "longer than {} seconds - ",
                config.max_time_warning.as_secs_f64()
            ));
        }

        if config.use_relative_time {
            let delta = chrono::Duration::from_std(elapsed)
                .unwrap_or_else(|_| chrono::Duration::zero());
            let now = self.started_at + delta;
            message.push_str(&config.formatter.relative(self.started_at, now));
        } else {
            message.push_str(&format!("{} seconds", seconds(elapsed)));
        }

        message
    }
}

/// Zero threshold logs everything; otherwise only strictly longer calls
pub(crate) fn exceeds_threshold(elapsed: Duration, threshold: Duration) -> bool {
    threshold.is_zero() || elapsed > threshold
}

/// Elapsed time in whole milliseconds, shown as seconds
fn seconds(elapsed: Duration) -> f64 {
    elapsed.as_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn absolute(config: TimerConfig) -> TimedCallback<Plain<fn(())>> {
        let noop: fn(()) = |_| {};
        wrap_with(config.with_relative_time(false), noop)
    }

    #[test]
    fn test_bare_message() {
        let timed = absolute(TimerConfig::new());
        assert_eq!(timed.message(Duration::from_millis(1234)), "Call took 1.234 seconds");
    }

    #[test]
    fn test_full_message() {
        let timed = absolute(
            TimerConfig::new()
                .with_tag(["svc", "prod"])
                .with_method_name("fetchUser")
                .with_max_time_warning_ms(50),
        );
        assert_eq!(
            timed.message(Duration::from_millis(75)),
            "[svc prod] Call (fetchUser) took longer than 0.05 seconds - 0.075 seconds"
        );
    }

    #[test]
    fn test_whole_second_threshold() {
        let timed = absolute(TimerConfig::new().with_max_time_warning_ms(2000));
        assert_eq!(
            timed.message(Duration::from_millis(2500)),
            "Call took longer than 2 seconds - 2.5 seconds"
        );
    }

    #[test]
    fn test_relative_message_uses_formatter() {
        let timed = wrap_with(TimerConfig::new().with_tag("jobs"), |_: ()| {});
        assert_eq!(timed.message(Duration::from_secs(120)), "[jobs] Call took 2 minutes");
    }

    #[test]
    fn test_missing_callback_is_rejected() {
        let result = CallbackTimer::new().build();
        let err = result.err().expect("builder without callback must fail");
        assert!(err.is_invalid_callback());
    }

    #[test]
    fn test_configure_and_context() {
        let logger = MemoryLogger::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let timed = CallbackTimer::new()
            .configure(|c| c.with_logger(logger.clone()).with_method_name("scale"))
            .context(3u32)
            .method(move |factor: &u32, x: u32| sink.lock().push(x * factor))
            .build()
            .unwrap();
        timed.call(4);
        assert_eq!(*timed.context(), 3);
        assert_eq!(*seen.lock(), vec![12]);
        assert!(logger.lines()[0].starts_with("Call (scale) took "));
    }

    #[test]
    fn test_call_logs_once() {
        let logger = MemoryLogger::new();
        let timed = wrap_with(TimerConfig::new().with_logger(logger.clone()), |_: u32| {});
        timed.call(21);
        assert_eq!(logger.len(), 1);
        assert!(logger.lines()[0].starts_with("Call took "));
    }

    #[test]
    fn test_zero_threshold_always_exceeded() {
        assert!(exceeds_threshold(Duration::ZERO, Duration::ZERO));
        assert!(exceeds_threshold(Duration::from_secs(3), Duration::ZERO));
    }

    #[test]
    fn test_threshold_is_strict() {
        let threshold = Duration::from_millis(50);
        assert!(!exceeds_threshold(Duration::from_millis(49), threshold));
        assert!(!exceeds_threshold(Duration::from_millis(50), threshold));
        assert!(exceeds_threshold(Duration::from_micros(50_001), threshold));
    }

    #[test]
    fn test_sub_millisecond_threshold() {
        let threshold = Duration::from_micros(500);
        assert!(!exceeds_threshold(Duration::from_micros(200), threshold));
        assert!(!exceeds_threshold(Duration::from_micros(500), threshold));
        assert!(exceeds_threshold(Duration::from_micros(600), threshold));

        let timed = absolute(TimerConfig::new().with_max_time_warning(threshold));
        assert_eq!(
            timed.message(Duration::from_millis(1)),
            "Call took longer than 0.0005 seconds - 0.001 seconds"
        );
    }

    #[test]
    fn test_threshold_applies_to_real_calls() {
        let logger = MemoryLogger::new();
        let timed = wrap_with(
            TimerConfig::new()
                .with_logger(logger.clone())
                .with_max_time_warning(Duration::from_secs(3600)),
            |_: ()| {},
        );
        timed.call(());
        assert!(logger.is_empty());

        let logger = MemoryLogger::new();
        let timed = wrap_with(
            TimerConfig::new()
                .with_logger(logger.clone())
                .with_max_time_warning(Duration::from_micros(500)),
            |_: ()| std::thread::sleep(Duration::from_millis(2)),
        );
        timed.call(());
        assert_eq!(logger.len(), 1);
        assert!(logger.lines()[0].contains("longer than 0.0005 seconds - "));
    }

    #[test]
    fn test_huge_threshold_does_not_wrap() {
        let threshold = Duration::from_secs(u64::MAX);
        assert!(!exceeds_threshold(Duration::from_secs(10), threshold));
    }

    #[tokio::test]
    async fn test_async_callback_is_not_skipped() {
        let logger = MemoryLogger::new();
        let ran = Arc::new(Mutex::new(false));
        let flag = ran.clone();
        let timed = wrap_with(TimerConfig::new().with_logger(logger.clone()), move |_: ()| {
            let flag = flag.clone();
            async move {
                *flag.lock() = true;
            }
        });

        timed.call_async(()).await;

        assert!(*ran.lock());
        assert_eq!(logger.len(), 1);
    }
}
