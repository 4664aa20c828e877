//! The refresh loop: collect, render and emit one unit per interval.

use log::{debug, info};
use std::io::Write;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::block::ModuleOutput;
use crate::config::Config;
use crate::emitter::Emitter;
use crate::error::{BarlineError, Result};
use crate::modules::Module;
use crate::output::ProtocolState;
use crate::render::Renderer;
use crate::system::SystemMetricsProvider;

/// Wakes the refresh loop early when the process is asked to stop.
pub struct Shutdown {
    rx: Receiver<()>,
}

impl Shutdown {
    /// Route SIGINT and SIGTERM into a shutdown request.
    pub fn install() -> Result<Self> {
        let (tx, shutdown) = Self::channel();
        ctrlc::set_handler(move || {
            let _ = tx.send(());
        })
        .map_err(|e| BarlineError::other(format!("Cannot install signal handler: {}", e)))?;
        Ok(shutdown)
    }

    /// A shutdown triggered by sending on (or dropping) the returned sender.
    pub fn channel() -> (Sender<()>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    /// Sleep for at most `timeout`. Returns `true` if shutdown was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}

/// Time from `now` (since the epoch) to the next multiple of `interval`
/// seconds, so refreshes land on `:00` when the interval divides a minute.
pub fn until_next_tick(now: Duration, interval: u64) -> Duration {
    let interval_ms = u128::from(interval.max(1)) * 1000;
    let now_ms = now.as_millis();
    let next = (now_ms / interval_ms + 1) * interval_ms;
    Duration::from_millis(u64::try_from(next - now_ms).unwrap_or(u64::MAX))
}

/// Configured modules bound to a protocol state and a system.
pub struct StatusLine {
    modules: Vec<Module>,
    state: ProtocolState,
    system: Box<dyn SystemMetricsProvider>,
    interval: u64,
}

impl StatusLine {
    pub fn new(
        config: &Config,
        state: ProtocolState,
        system: Box<dyn SystemMetricsProvider>,
    ) -> Result<Self> {
        let modules = Module::from_config(config)?;
        debug!(
            "{} modules, {} output, every {}s",
            modules.len(),
            state.format,
            config.general.interval
        );
        Ok(Self {
            modules,
            state,
            system,
            interval: config.general.interval,
        })
    }

    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Collect and render every module once, in configured order.
    pub fn cycle(&self) -> Vec<ModuleOutput> {
        let renderer = Renderer::new(&self.state);
        let percent = self.state.percent_sign();
        self.modules
            .iter()
            .map(|module| {
                let sample = module.collect(self.system.as_ref(), percent);
                renderer.render(module, &sample)
            })
            .collect()
    }

    /// Emit the header, then one unit per interval until `shutdown` fires
    /// (or after the first unit when `once` is set).
    ///
    /// Output errors end the loop and are returned; the caller decides the
    /// exit status.
    pub fn run(
        &self,
        out: &mut dyn Write,
        emitter: &mut dyn Emitter,
        shutdown: &Shutdown,
        once: bool,
    ) -> Result<()> {
        emitter.begin(out)?;
        loop {
            let outputs = self.cycle();
            emitter.emit(out, &outputs)?;
            if once {
                break;
            }
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            if shutdown.wait(until_next_tick(now, self.interval)) {
                info!("Shutdown requested, exiting");
                break;
            }
        }
        emitter.end(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_until_next_tick_aligns_to_interval() {
        let now = Duration::from_millis(61_250);
        assert_eq!(until_next_tick(now, 5), Duration::from_millis(3_750));
        assert_eq!(until_next_tick(now, 60), Duration::from_millis(58_750));
        assert_eq!(until_next_tick(Duration::from_secs(60), 5), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_interval_treated_as_one_second() {
        assert_eq!(
            until_next_tick(Duration::from_millis(500), 0),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_shutdown_wait() {
        let (tx, shutdown) = Shutdown::channel();
        assert!(!shutdown.wait(Duration::from_millis(1)));
        tx.send(()).unwrap();
        assert!(shutdown.wait(Duration::from_secs(5)));
        drop(tx);
        assert!(shutdown.wait(Duration::from_secs(5)));
    }
}
