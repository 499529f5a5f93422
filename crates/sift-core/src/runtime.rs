use crate::command::{Action, Command, CommandInner};
use crate::model::Model;
use crate::subscription::SubscriptionManager;
use crossterm::{
    cursor,
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

/// Errors that can occur while initializing or running a [`Program`].
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// An I/O error from terminal setup, rendering, or teardown.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The log file sink could not be installed.
    #[error("failed to install logger: {0}")]
    Logging(String),
}

/// Configuration options for a [`Program`].
///
/// Override only what you need with struct update syntax:
///
/// ```rust,ignore
/// let opts = ProgramOptions {
///     mouse_capture: true,
///     log_file: Some("sift.log".into()),
///     ..ProgramOptions::default()
/// };
/// ```
pub struct ProgramOptions {
    /// Target frames per second (default: 60, max: 120).
    pub fps: u32,
    /// Start in alternate screen (default: true).
    pub alt_screen: bool,
    /// Capture mouse clicks (default: true; dropdowns need clicks to detect
    /// outside presses).
    pub mouse_capture: bool,
    /// Enable bracketed paste (default: true).
    pub bracketed_paste: bool,
    /// Set terminal title.
    pub title: Option<String>,
    /// Whether to restore the terminal when a panic unwinds (default: true).
    pub catch_panics: bool,
    /// Whether Ctrl-C from the OS ends the program (default: true).
    pub handle_signals: bool,
    /// Send `tracing` output to this file. Filtered by `RUST_LOG`.
    pub log_file: Option<PathBuf>,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            alt_screen: true,
            mouse_capture: true,
            bracketed_paste: true,
            title: None,
            catch_panics: true,
            handle_signals: true,
            log_file: None,
        }
    }
}

/// The program runtime: terminal setup, the event loop, and the full
/// [`Model`] lifecycle.
///
/// ```rust,ignore
/// #[tokio::main]
/// async fn main() -> Result<(), sift_core::ProgramError> {
///     let model = Program::<App>::new(flags)?.run().await?;
///     println!("picked: {:?}", model.picked());
///     Ok(())
/// }
/// ```
pub struct Program<M: Model> {
    model: M,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    msg_tx: mpsc::UnboundedSender<M::Message>,
    msg_rx: mpsc::UnboundedReceiver<M::Message>,
    subscription_manager: SubscriptionManager<M::Message>,
    options: ProgramOptions,
    dirty: bool,
    should_quit: bool,
}

impl<M: Model> Program<M> {
    /// Create a new program with default options.
    pub fn new(flags: M::Flags) -> Result<Self, ProgramError> {
        Self::with_options(flags, ProgramOptions::default())
    }

    /// Create a new program with custom options.
    pub fn with_options(flags: M::Flags, options: ProgramOptions) -> Result<Self, ProgramError> {
        if let Some(ref path) = options.log_file {
            log_to_file(path)?;
        }

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (model, init_cmd) = M::init(flags);
        let terminal = init_terminal(&options)?;
        let subscription_manager = SubscriptionManager::new(msg_tx.clone());

        let mut program = Self {
            model,
            terminal,
            msg_tx,
            msg_rx,
            subscription_manager,
            options,
            dirty: true,
            should_quit: false,
        };

        tracing::debug!("program initialized");
        program.settle(init_cmd);

        Ok(program)
    }

    /// Run until the model quits. Returns the final model.
    pub async fn run(mut self) -> Result<M, ProgramError> {
        let outcome = self.event_loop().await;

        tracing::debug!("shutting down");
        self.subscription_manager.shutdown();
        reset_terminal(self.options.alt_screen)?;
        outcome?;

        Ok(self.model)
    }

    async fn event_loop(&mut self) -> Result<(), ProgramError> {
        self.render()?;

        let fps = self.options.fps.clamp(1, 120);
        let mut frame_interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let handle_signals = self.options.handle_signals;

        loop {
            tokio::select! {
                biased;

                _ = tokio::signal::ctrl_c(), if handle_signals => {
                    tracing::debug!("received ctrl+c signal");
                    return Ok(());
                }

                Some(msg) = self.msg_rx.recv() => {
                    self.process_message(msg);
                    self.drain_queued();

                    if self.should_quit {
                        return Ok(());
                    }
                }

                _ = frame_interval.tick() => {
                    if self.dirty {
                        self.render()?;
                        self.dirty = false;
                    }
                }
            }
        }
    }

    fn process_message(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.settle(cmd);
        self.dirty = true;
    }

    /// Carry out a command, then bring subscriptions in line with the model.
    fn settle(&mut self, cmd: Command<M::Message>) {
        for leaf in cmd.into_leaves() {
            match leaf {
                CommandInner::Action(Action::Message(msg)) => {
                    let _ = self.msg_tx.send(msg);
                }
                CommandInner::Action(Action::Quit) => self.should_quit = true,
                CommandInner::Future(fut) => {
                    let tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let _ = tx.send(fut.await);
                    });
                }
                CommandInner::None | CommandInner::Batch(_) => {}
            }
        }
        let subs = self.model.subscriptions();
        self.subscription_manager.reconcile(subs);
    }

    /// Apply whatever else is already queued, bounded so a flood of
    /// messages cannot starve rendering.
    fn drain_queued(&mut self) {
        let deadline = Instant::now() + Duration::from_micros(100);
        for _ in 0..100 {
            if Instant::now() >= deadline {
                break;
            }
            let Ok(msg) = self.msg_rx.try_recv() else {
                break;
            };
            self.process_message(msg);
        }
    }

    fn render(&mut self) -> Result<(), ProgramError> {
        self.terminal.draw(|frame| {
            self.model.view(frame);
        })?;
        Ok(())
    }
}

fn init_terminal(options: &ProgramOptions) -> Result<Terminal<CrosstermBackend<Stdout>>, ProgramError> {
    // Install the restoring panic hook once; stacking hooks would restore repeatedly.
    if options.catch_panics {
        use std::sync::Once;
        static HOOK_INSTALLED: Once = Once::new();
        let alt_screen = options.alt_screen;
        HOOK_INSTALLED.call_once(|| {
            let original_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = reset_terminal(alt_screen);
                original_hook(info);
            }));
        });
    }

    enable_raw_mode()?;
    let mut writer = stdout();

    if options.alt_screen {
        execute!(writer, EnterAlternateScreen)?;
    }
    if options.bracketed_paste {
        execute!(writer, EnableBracketedPaste)?;
    }
    if options.mouse_capture {
        execute!(writer, EnableMouseCapture)?;
    }
    if let Some(ref title) = options.title {
        execute!(writer, SetTitle(title))?;
    }
    execute!(writer, cursor::Hide)?;

    let backend = CrosstermBackend::new(writer);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Best effort: every step runs even if an earlier one fails.
fn reset_terminal(alt_screen: bool) -> std::io::Result<()> {
    let raw = disable_raw_mode();
    let mut writer = stdout();
    execute!(writer, DisableBracketedPaste).ok();
    execute!(writer, DisableMouseCapture).ok();
    execute!(writer, cursor::Show).ok();
    if alt_screen {
        execute!(writer, LeaveAlternateScreen).ok();
    }
    raw
}

/// Route `tracing` output to a file.
///
/// A TUI owns the terminal, so logs have to go elsewhere. The file is opened
/// in append mode; verbosity follows `RUST_LOG` and defaults to `info`.
///
/// ```no_run
/// sift_core::runtime::log_to_file("sift.log").unwrap();
/// tracing::info!("ready");
/// ```
pub fn log_to_file(path: impl AsRef<Path>) -> Result<(), ProgramError> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| ProgramError::Logging(err.to_string()))
}
