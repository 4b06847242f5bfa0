//! Backend detection and the process-wide registry
//!
//! The registry walks an ordered candidate list exactly once, picks the first
//! backend whose probe succeeds and publishes it for every later caller. When
//! nothing is detected the console backend is used.

use crate::backend::{Backend, ConsoleBackend, ConsoleStream, NoOpBackend};
use crate::config::FacadeConfig;
use crate::error::{Error, Result};
use crate::{Logger, LoggerExt};
use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Name of the logger the registry reports its own decisions through
pub const REGISTRY_LOGGER: &str = "proven_log_facade::registry";

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide registry used by [`crate::LoggerFactory`]
#[must_use]
pub fn global() -> &'static Registry {
    &GLOBAL
}

thread_local! {
    /// Registries currently resolving on this thread
    static RESOLVING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a registry as resolving on the current thread until dropped
struct ResolvingGuard(usize);

impl ResolvingGuard {
    fn enter(id: usize) -> Self {
        RESOLVING.with(|active| active.borrow_mut().push(id));
        Self(id)
    }

    fn is_active(id: usize) -> bool {
        RESOLVING.with(|active| active.borrow().contains(&id))
    }
}

impl Drop for ResolvingGuard {
    fn drop(&mut self) {
        RESOLVING.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|id| *id == self.0) {
                active.remove(pos);
            }
        });
    }
}

type Probe = Arc<dyn Fn() -> bool + Send + Sync>;
type Build = Arc<dyn Fn(&FacadeConfig) -> Arc<dyn Backend> + Send + Sync>;

/// A backend the registry may select: a cheap availability probe plus a
/// constructor that only runs when the probe succeeds.
#[derive(Clone)]
pub struct Candidate {
    name: Cow<'static, str>,
    probe: Probe,
    build: Build,
}

impl Candidate {
    /// Create a candidate
    pub fn new<P, B>(name: impl Into<Cow<'static, str>>, probe: P, build: B) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
        B: Fn(&FacadeConfig) -> Arc<dyn Backend> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            probe: Arc::new(probe),
            build: Arc::new(build),
        }
    }

    /// Candidate name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Probe, then construct. Panics in either step become errors.
    fn select(&self, config: &FacadeConfig) -> Result<Option<Arc<dyn Backend>>> {
        let available = panic::catch_unwind(AssertUnwindSafe(|| (self.probe)())).map_err(
            |payload| Error::ProbePanicked {
                backend: self.name.to_string(),
                reason: panic_reason(payload.as_ref()),
            },
        )?;
        if !available {
            return Ok(None);
        }

        panic::catch_unwind(AssertUnwindSafe(|| (self.build)(config)))
            .map(Some)
            .map_err(|payload| Error::ConstructionPanicked {
                backend: self.name.to_string(),
                reason: panic_reason(payload.as_ref()),
            })
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|reason| (*reason).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Built-in candidates, highest priority first
fn builtin_candidates() -> Vec<Candidate> {
    #[allow(unused_mut)]
    let mut candidates = Vec::new();

    #[cfg(feature = "tracing-backend")]
    candidates.push(Candidate::new(
        crate::backend::TracingBackend::NAME,
        crate::backend::TracingBackend::is_available,
        |config: &FacadeConfig| -> Arc<dyn Backend> {
            Arc::new(crate::backend::TracingBackend::new(config.level))
        },
    ));

    #[cfg(feature = "log-backend")]
    candidates.push(Candidate::new(
        crate::backend::LogBackend::NAME,
        crate::backend::LogBackend::is_available,
        |config: &FacadeConfig| -> Arc<dyn Backend> {
            Arc::new(crate::backend::LogBackend::new(config.level))
        },
    ));

    candidates
}

/// What happened to one candidate during detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Probe succeeded and the backend was constructed
    Selected,
    /// Probe reported the backend as unavailable
    Unavailable,
    /// Probe or constructor panicked
    Failed(Error),
}

/// Per-candidate entry of a [`Resolution`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Candidate name
    pub backend: String,
    /// Outcome
    pub outcome: ProbeOutcome,
}

/// The published result of backend detection
pub struct Resolution {
    backend: Arc<dyn Backend>,
    config: FacadeConfig,
    fallback: bool,
    provisional: bool,
    reports: Vec<ProbeReport>,
    config_error: Option<Error>,
}

impl Resolution {
    fn new(backend: Arc<dyn Backend>, config: FacadeConfig, reports: Vec<ProbeReport>) -> Self {
        Self {
            backend,
            config,
            fallback: false,
            provisional: false,
            reports,
            config_error: None,
        }
    }

    fn fallback(config: FacadeConfig, reports: Vec<ProbeReport>) -> Self {
        Self {
            backend: Arc::new(ConsoleBackend::from_config(&config)),
            config,
            fallback: true,
            provisional: false,
            reports,
            config_error: None,
        }
    }

    /// Handed to re-entrant callers while the real resolution is in progress
    fn provisional() -> Self {
        let config = FacadeConfig::builder().stream(ConsoleStream::Stderr).build();
        Self {
            backend: Arc::new(ConsoleBackend::from_config(&config)),
            config,
            fallback: true,
            provisional: true,
            reports: Vec::new(),
            config_error: None,
        }
    }

    /// The selected backend
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Name of the selected backend
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// The configuration the backend was built with
    #[must_use]
    pub const fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Whether no candidate succeeded and the console fallback was used
    #[must_use]
    pub const fn used_fallback(&self) -> bool {
        self.fallback
    }

    /// Whether this is a temporary stand-in returned during resolution
    #[must_use]
    pub const fn is_provisional(&self) -> bool {
        self.provisional
    }

    /// Candidates in the order they were tried
    #[must_use]
    pub fn reports(&self) -> &[ProbeReport] {
        &self.reports
    }

    /// Why the environment configuration was rejected in favour of defaults
    #[must_use]
    pub const fn config_error(&self) -> Option<&Error> {
        self.config_error.as_ref()
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("backend", &self.backend_name())
            .field("config", &self.config)
            .field("fallback", &self.fallback)
            .field("provisional", &self.provisional)
            .field("reports", &self.reports)
            .field("config_error", &self.config_error)
            .finish()
    }
}

/// Lifecycle of a [`Registry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RegistryState {
    /// Nothing selected yet; configuration and registration are accepted
    Uninitialized = 0,
    /// Detection is running
    Resolving = 1,
    /// A backend has been published
    Resolved = 2,
}

impl RegistryState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Resolving,
            _ => Self::Resolved,
        }
    }
}

/// Selects one backend per lifecycle and hands out named loggers bound to it.
pub struct Registry {
    state: AtomicU8,
    resolution: ArcSwapOption<Resolution>,
    init_lock: Mutex<()>,
    config: Mutex<Option<FacadeConfig>>,
    candidates: Mutex<Vec<Candidate>>,
    builtins: Vec<Candidate>,
    loggers: DashMap<String, Arc<dyn Logger>>,
    env: fn() -> Result<FacadeConfig>,
}

impl Registry {
    /// Registry with the built-in `tracing` and `log` candidates enabled by
    /// cargo features
    #[must_use]
    pub fn new() -> Self {
        Self::with_builtins(builtin_candidates())
    }

    /// Registry that only considers explicitly registered candidates before
    /// falling back to the console
    #[must_use]
    pub fn without_builtins() -> Self {
        Self::with_builtins(Vec::new())
    }

    fn with_builtins(builtins: Vec<Candidate>) -> Self {
        Self {
            state: AtomicU8::new(RegistryState::Uninitialized as u8),
            resolution: ArcSwapOption::empty(),
            init_lock: Mutex::new(()),
            config: Mutex::new(None),
            candidates: Mutex::new(Vec::new()),
            builtins,
            loggers: DashMap::new(),
            env: FacadeConfig::from_env,
        }
    }

    /// Replace the environment source consulted when no configuration was
    /// installed
    #[cfg(test)]
    fn with_env(mut self, env: fn() -> Result<FacadeConfig>) -> Self {
        self.env = env;
        self
    }

    fn id(&self) -> usize {
        std::ptr::from_ref(self).addr()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> RegistryState {
        RegistryState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Install the configuration used by detection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyResolved`] once detection has started.
    pub fn configure(&self, config: FacadeConfig) -> Result<()> {
        let mut slot = self.config.lock();
        if self.state() != RegistryState::Uninitialized {
            return Err(Error::AlreadyResolved);
        }
        *slot = Some(config);
        Ok(())
    }

    /// Add a candidate ahead of the built-ins. Registered candidates are
    /// tried in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyResolved`] once detection has started and
    /// [`Error::DuplicateCandidate`] if the name is taken.
    pub fn register(&self, candidate: Candidate) -> Result<()> {
        let mut candidates = self.candidates.lock();
        if self.state() != RegistryState::Uninitialized {
            return Err(Error::AlreadyResolved);
        }

        let taken = matches!(candidate.name(), ConsoleBackend::NAME | NoOpBackend::NAME)
            || candidates
                .iter()
                .chain(&self.builtins)
                .any(|existing| existing.name == candidate.name);
        if taken {
            return Err(Error::DuplicateCandidate(candidate.name.into_owned()));
        }

        candidates.push(candidate);
        Ok(())
    }

    /// The published resolution, if detection has completed
    #[must_use]
    pub fn resolution(&self) -> Option<Arc<Resolution>> {
        self.resolution.load_full()
    }

    /// Run detection if it has not run yet and return its result.
    ///
    /// Concurrent first callers block until the winner publishes. A call made
    /// from inside a probe or constructor of this registry gets a provisional
    /// stderr console resolution instead of deadlocking.
    pub fn resolve(&self) -> Arc<Resolution> {
        if let Some(resolution) = self.resolution.load_full() {
            return resolution;
        }

        let id = self.id();
        if ResolvingGuard::is_active(id) {
            return Arc::new(Resolution::provisional());
        }

        let resolution = {
            let _init = self.init_lock.lock();
            if let Some(resolution) = self.resolution.load_full() {
                return resolution;
            }
            let _resolving = ResolvingGuard::enter(id);

            let (installed, registered) = {
                let config = self.config.lock();
                let candidates = self.candidates.lock();
                self.state
                    .store(RegistryState::Resolving as u8, Ordering::Release);
                (config.clone(), candidates.clone())
            };
            let (config, config_error) = match installed {
                Some(config) => (config, None),
                None => match (self.env)() {
                    Ok(config) => (config, None),
                    Err(error) => (FacadeConfig::default(), Some(error)),
                },
            };

            let mut resolution = self.detect(config, registered);
            resolution.config_error = config_error;
            let resolution = Arc::new(resolution);
            self.resolution.store(Some(resolution.clone()));
            self.state
                .store(RegistryState::Resolved as u8, Ordering::Release);
            resolution
        };

        report(&resolution);
        resolution
    }

    fn detect(&self, config: FacadeConfig, registered: Vec<Candidate>) -> Resolution {
        match config.backend.as_deref() {
            Some(NoOpBackend::NAME) => {
                return Resolution::new(Arc::new(NoOpBackend), config, Vec::new());
            }
            Some(ConsoleBackend::NAME) => {
                let backend = Arc::new(ConsoleBackend::from_config(&config));
                return Resolution::new(backend, config, Vec::new());
            }
            _ => {}
        }

        let mut reports = Vec::new();
        let forced = config.backend.as_deref();
        let candidates = registered
            .iter()
            .chain(&self.builtins)
            .filter(|candidate| forced.is_none_or(|name| candidate.name() == name));

        for candidate in candidates {
            let outcome = match candidate.select(&config) {
                Ok(Some(backend)) => {
                    reports.push(ProbeReport {
                        backend: candidate.name().to_string(),
                        outcome: ProbeOutcome::Selected,
                    });
                    return Resolution::new(backend, config, reports);
                }
                Ok(None) => ProbeOutcome::Unavailable,
                Err(error) => ProbeOutcome::Failed(error),
            };
            reports.push(ProbeReport {
                backend: candidate.name().to_string(),
                outcome,
            });
        }

        Resolution::fallback(config, reports)
    }

    /// A logger bound to the resolved backend, cached per name.
    pub fn logger(&self, name: &str) -> Arc<dyn Logger> {
        if let Some(logger) = self.loggers.get(name) {
            return logger.value().clone();
        }

        let resolution = self.resolve();
        let logger = construct(&resolution, name);
        if resolution.is_provisional() {
            return logger;
        }

        self.loggers
            .entry(name.to_string())
            .or_insert(logger)
            .value()
            .clone()
    }

    /// Flush the selected backend, if any
    pub fn flush(&self) {
        if let Some(resolution) = self.resolution.load_full() {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| resolution.backend().flush()));
        }
    }

    /// Forget the selected backend, cached loggers, registered candidates and
    /// configuration. Test teardown only.
    #[cfg(any(test, feature = "test-support"))]
    pub fn reset(&self) {
        let _init = self.init_lock.lock();
        self.flush();
        self.resolution.store(None);
        self.loggers.clear();
        self.candidates.lock().clear();
        *self.config.lock() = None;
        self.state
            .store(RegistryState::Uninitialized as u8, Ordering::Release);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("state", &self.state())
            .field("resolution", &self.resolution())
            .field("loggers", &self.loggers.len())
            .finish_non_exhaustive()
    }
}

/// Ask the backend for a named logger. A panicking backend yields a console
/// logger built from the same configuration.
fn construct(resolution: &Resolution, name: &str) -> Arc<dyn Logger> {
    panic::catch_unwind(AssertUnwindSafe(|| resolution.backend().logger(name)))
        .unwrap_or_else(|_| ConsoleBackend::from_config(resolution.config()).logger(name))
}

/// Log the outcome through the backend that was just selected
fn report(resolution: &Resolution) {
    let logger = construct(resolution, REGISTRY_LOGGER);

    if let Some(error) = resolution.config_error() {
        logger.warn_err(
            "ignoring invalid PROVEN_LOG_* environment, using defaults",
            error,
        );
    }

    for probe in resolution.reports() {
        if let ProbeOutcome::Failed(error) = &probe.outcome {
            logger.warn_err("skipping logging backend candidate", error);
        }
    }

    if resolution.used_fallback() {
        logger.debug_fmt1(
            "no logging backend detected, using {}",
            &resolution.backend_name(),
        );
    } else {
        logger.debug_fmt1("selected logging backend {}", &resolution.backend_name());
    }
}
