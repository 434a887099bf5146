use bridge_host::console::{self, Command};
use bridge_host::demo_scene::demo_scene;
use bridge_host::error::HostError;
use bridge_host::host_loop::{DEFAULT_FRAME_INTERVAL, HostLoop};
use bridge_host::logger::initialize as LoggerInitialize;
use bridge_host::paths;

use bridge_core::HOST_VERSION;
use bridge_core::config::BridgeConfig;
use bridge_core::exec::{ExecutionEngine, ScriptExecutor};
use bridge_core::handlers::HandlerRegistry;
use bridge_core::ipc::Supervisor;
use bridge_core::task_queue::TaskQueue;

use std::env;
use std::fs::create_dir_all;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::sync::mpsc;

use log::{error, info};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("bridge-host: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), HostError> {
    // Before anything reads the environment
    let dotenv_path = paths::load_dotenv();

    let config_dir = paths::config_dir(env::args_os().nth(1).map(PathBuf::from))?;
    let log_dir = paths::log_dir(&config_dir);
    create_dir_all(&log_dir)
        .map_err(|e| HostError::host(format!("Failed to create log directory: {e}")))?;

    LoggerInitialize(&log_dir)?;

    info!("Bridge host {} starting", HOST_VERSION);
    info!("Config directory: {}", config_dir.display());
    if let Some(path) = dotenv_path {
        info!("Environment loaded from {}", path.display());
    }

    let mut config = BridgeConfig::load(&config_dir)?;
    config.apply_env_overrides(|key| env::var(key).ok())?;

    // The host loop drains on every frame, so no drain hook is needed.
    let queue = Arc::new(TaskQueue::new());
    let supervisor = Supervisor::new(
        Arc::clone(&queue),
        HandlerRegistry::with_scene_handlers(),
        ExecutionEngine::new(ScriptExecutor),
    );

    if config.server.auto_start {
        console::apply(Command::Start, &supervisor, &config);
    } else {
        info!("Auto-start is off; type 'start' to start the server");
    }

    let (command_tx, command_rx) = mpsc::channel();
    console::spawn_stdin_watcher(command_tx)
        .map_err(|e| HostError::host(format!("Failed to start console: {e}")))?;

    let mut host_loop = HostLoop::new(demo_scene(), queue, DEFAULT_FRAME_INTERVAL);
    host_loop.run(|_scene, stop| {
        while let Ok(command) = command_rx.try_recv() {
            if !console::apply(command, &supervisor, &config) {
                stop.store(true, Ordering::SeqCst);
            }
        }
    });

    supervisor.stop();
    info!("Bridge host exiting");
    Ok(())
}
