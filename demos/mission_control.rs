//! Simulated mission control session.
//!
//! The simulated service refuses the first two connects (as if the game were
//! still loading), then serves status polls with growing counters.
//! Press Ctrl-C to be asked for confirmation; press it twice to force.
//!
//! ```text
//! cargo run --example mission_control [config.toml]
//! RUST_LOG=missionvisor=trace cargo run --example mission_control
//! ```

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use missionvisor::{
    BackoffPolicy, Config, ConnectError, Connection, ConnectionTarget, Connector, CrashObserver,
    JitterPolicy, LongBlockObserver, ServerStatus, ShutdownBridge, StdinPrompt, SupervisorBuilder,
    TraceObserver,
};

/// Refuses `refusals` connects, then hands out simulated sessions.
struct SimulatedService {
    refusals: AtomicU32,
    started: Instant,
    rpcs: Arc<AtomicU64>,
}

struct SimulatedSession {
    name: String,
    started: Instant,
    rpcs: Arc<AtomicU64>,
}

impl Connector for SimulatedService {
    fn connect(&self, target: &ConnectionTarget) -> Result<Box<dyn Connection>, ConnectError> {
        std::thread::sleep(Duration::from_millis(200));
        let left = self.refusals.load(Ordering::SeqCst);
        if left > 0 {
            self.refusals.store(left - 1, Ordering::SeqCst);
            return Err(ConnectError::Refused {
                address: target.address.clone(),
                port: target.rpc_port,
            });
        }
        println!("[service] client {} connected", target.name);
        Ok(Box::new(SimulatedSession {
            name: target.name.clone(),
            started: self.started,
            rpcs: Arc::clone(&self.rpcs),
        }))
    }
}

impl Connection for SimulatedSession {
    fn status(&mut self) -> Result<ServerStatus, ConnectError> {
        let rpcs = self.rpcs.fetch_add(17, Ordering::Relaxed) + 17;
        let uptime = self.started.elapsed().as_secs_f64().max(1.0);
        Ok(ServerStatus {
            version: "0.5.4".to_string(),
            rpcs_executed: rpcs,
            rpc_rate: rpcs as f64 / uptime,
            bytes_read: rpcs * 48,
            bytes_written: rpcs * 160,
            bytes_read_rate: rpcs as f64 * 48.0 / uptime,
            bytes_written_rate: rpcs as f64 * 160.0 / uptime,
            time_per_rpc_update: 0.0012,
            ..ServerStatus::default()
        })
    }

    fn close(self: Box<Self>) {
        println!("[service] client {} disconnected", self.name);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "missionvisor=debug,mission_control=info".into()),
        )
        .init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config {
            connect_backoff: BackoffPolicy {
                first: Duration::from_millis(500),
                max: Duration::from_secs(4),
                factor: 2.0,
                jitter: JitterPolicy::Equal,
            },
            heartbeat_interval: Duration::from_secs(2),
            ..Config::default()
        },
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let service = SimulatedService {
            refusals: AtomicU32::new(2),
            started: Instant::now(),
            rpcs: Arc::new(AtomicU64::new(0)),
        };

        let sup = SupervisorBuilder::new(cfg)
            .connector(Arc::new(service))
            .bridge(ShutdownBridge::install_os_handler()?)
            .prompt(Arc::new(StdinPrompt))
            .observer(Arc::new(TraceObserver::new()))
            .observer(Arc::new(LongBlockObserver::default()))
            .observer(Arc::new(CrashObserver))
            .build()?;

        let report = sup.start().await?;
        println!("session ended: {}", report.outcome);
        for task in &report.tasks {
            println!("  {:<16} {}", task.name, task.outcome);
        }
        anyhow::Ok(())
    });

    // An unanswered stdin prompt keeps a blocking thread alive; don't wait for it.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}
