use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use dashboard_core::{update, AppState, Effect, Msg};
use dashboard_engine::{EngineEvent, EngineHandle, RecvTimeoutError};
use engine_logging::{engine_debug, engine_info, engine_warn};

use super::cli::{Cli, Command, ConfigCommand};
use super::config::{self, DashboardConfig, CONFIG_FILENAME};
use super::effects::{self, Routed};
use super::ui::Presenter;

/// How long to block on the engine before checking for idleness again.
const EVENT_WAIT: Duration = Duration::from_millis(250);

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    if let Command::Config(ConfigCommand::Init { force }) = cli.command {
        return init_config(&config_path, force);
    }

    let loaded = config::load(&config_path);
    let mut config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => DashboardConfig::default(),
    };
    cli.apply_overrides(&mut config);
    engine_logging::initialize(config.log_destination.into(), cli.log_level());

    match loaded {
        Ok(Some(_)) => engine_info!("Loaded config from {}", config_path.display()),
        Ok(None) => engine_debug!("No config at {}, using defaults", config_path.display()),
        Err(err) => engine_warn!("{:#}; using defaults", err),
    }

    let engine = EngineHandle::new(config.engine_settings())
        .with_context(|| format!("cannot use backend {}", config.base_url))?;
    let presenter = Presenter::new(io::stdout(), config.output_dir.clone());
    let mut session = Session {
        state: AppState::new(),
        engine,
        presenter,
        output_dir: config.output_dir,
        failed_requests: 0,
    };

    for msg in cli.command.into_messages() {
        session.dispatch(msg)?;
    }
    session.run_until_idle()?;
    session.engine.shutdown();

    if session.presenter.error_count() + session.failed_requests > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<ExitCode> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    let written = config::save(path, &DashboardConfig::default())?;
    println!("wrote default configuration to {}", written.display());
    Ok(ExitCode::SUCCESS)
}

struct Session<W: Write> {
    state: AppState,
    engine: EngineHandle,
    presenter: Presenter<W>,
    output_dir: PathBuf,
    /// Failures that are logged rather than shown as notices.
    failed_requests: usize,
}

impl<W: Write> Session<W> {
    /// Feeds engine events back through `update` until no job or request is outstanding.
    fn run_until_idle(&mut self) -> anyhow::Result<()> {
        while !self.state.is_idle() {
            match self.engine.recv_timeout(EVENT_WAIT) {
                Ok(event) => {
                    if matches!(event, EngineEvent::FilesListed(Err(_))) {
                        self.failed_requests += 1;
                    }
                    self.dispatch(effects::map_event(event))?;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => bail!("engine stopped unexpectedly"),
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (state, pending) = update(state, msg);
        self.state = state;

        if self.state.consume_dirty() {
            self.presenter.progress(&self.state.view())?;
        }
        for effect in pending {
            if let Routed::Present(effect) =
                effects::run_engine_effect(&self.engine, effect, &self.output_dir)
            {
                self.present(effect)?;
            }
        }
        Ok(())
    }

    fn present(&mut self, effect: Effect) -> io::Result<()> {
        match effect {
            Effect::Notify(notice) => self.presenter.notice(&notice),
            Effect::PresentAnalysis(results) => self.presenter.analysis(&results),
            Effect::PresentWordclouds(result) => {
                let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
                self.presenter.wordclouds(&result, &timestamp)
            }
            Effect::PresentFiles => self.presenter.files(self.state.view().files.as_ref()),
            other => {
                engine_debug!("Ignoring effect {:?}", other);
                Ok(())
            }
        }
    }
}

