use crate::command::{Action, Command, CommandInner};
use crate::model::Model;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;

/// A headless test harness that drives a [`Model`] without a real terminal.
///
/// Immediate messages returned from `update` are queued and flushed with
/// [`drain_messages`](TestProgram::drain_messages); async work is ignored.
/// For components with async behaviour, feed commands through [`resolve`].
///
/// ```rust,ignore
/// let mut prog = TestProgram::<App>::new(flags);
/// prog.send(AppMsg::Key(enter));
/// prog.drain_messages();
/// assert!(prog.render_string(40, 10).contains("Banana"));
/// ```
pub struct TestProgram<M: Model> {
    model: M,
    pending_messages: Vec<M::Message>,
}

impl<M: Model> TestProgram<M> {
    /// Create a test program by calling [`Model::init`] with the given flags.
    pub fn new(flags: M::Flags) -> Self {
        let (model, init_cmd) = M::init(flags);
        let mut program = Self {
            model,
            pending_messages: Vec::new(),
        };
        program.collect_sync_messages(init_cmd);
        program
    }

    /// Send a message, triggering a single update cycle.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.collect_sync_messages(cmd);
    }

    /// Process pending immediate messages until none are produced.
    pub fn drain_messages(&mut self) {
        while !self.pending_messages.is_empty() {
            let messages: Vec<_> = self.pending_messages.drain(..).collect();
            for msg in messages {
                let cmd = self.model.update(msg);
                self.collect_sync_messages(cmd);
            }
        }
    }

    /// Get a shared reference to the model for assertions.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model for direct test setup.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Render the model to a ratatui [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                self.model.view(frame);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    /// Render the model and return the visible content, one line per row.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        buffer_to_string(&self.render(width, height))
    }

    fn collect_sync_messages(&mut self, cmd: Command<M::Message>) {
        // Futures need a runtime; use `resolve` for those.
        for leaf in cmd.into_leaves() {
            if let CommandInner::Action(Action::Message(msg)) = leaf {
                self.pending_messages.push(msg);
            }
        }
    }
}

/// Flatten a rendered buffer into a string, rows separated by newlines.
pub fn buffer_to_string(buf: &Buffer) -> String {
    let area: Rect = buf.area;
    let mut output = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            output.push_str(buf[(x, y)].symbol());
        }
        if y + 1 < area.bottom() {
            output.push('\n');
        }
    }
    output
}

/// Execute a command to completion and collect the messages it produces.
///
/// Immediate messages and futures (including timers) are resolved one after
/// another in batch order, so the result is deterministic. `quit` produces
/// nothing. Must run inside a tokio runtime.
///
/// ```rust,ignore
/// let cmd = dropdown.update(Message::Key(key('a')));
/// for msg in resolve(cmd).await {
///     dropdown.update(msg);
/// }
/// ```
pub async fn resolve<Msg: Send + 'static>(cmd: Command<Msg>) -> Vec<Msg> {
    let mut messages = Vec::new();
    for leaf in cmd.into_leaves() {
        match leaf {
            CommandInner::Action(Action::Message(msg)) => messages.push(msg),
            CommandInner::Future(fut) => messages.push(fut.await),
            _ => {}
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;
    use std::time::Duration;

    struct Counter {
        count: i64,
    }

    #[derive(Debug)]
    enum CounterMsg {
        Increment,
        Decrement,
        IncrementTwice,
    }

    impl Model for Counter {
        type Message = CounterMsg;
        type Flags = i64;

        fn init(initial: i64) -> (Self, Command<CounterMsg>) {
            (Counter { count: initial }, Command::none())
        }

        fn update(&mut self, msg: CounterMsg) -> Command<CounterMsg> {
            match msg {
                CounterMsg::Increment => self.count += 1,
                CounterMsg::Decrement => self.count -= 1,
                CounterMsg::IncrementTwice => {
                    return Command::batch([
                        Command::message(CounterMsg::Increment),
                        Command::message(CounterMsg::Increment),
                    ]);
                }
            }
            Command::none()
        }

        fn view(&self, frame: &mut ratatui::Frame) {
            frame.render_widget(Paragraph::new(format!("Count: {}", self.count)), frame.area());
        }
    }

    #[test]
    fn send_updates_model() {
        let mut prog = TestProgram::<Counter>::new(10);
        prog.send(CounterMsg::Increment);
        prog.send(CounterMsg::Decrement);
        prog.send(CounterMsg::Decrement);
        assert_eq!(prog.model().count, 9);
    }

    #[test]
    fn drain_follows_batched_messages() {
        let mut prog = TestProgram::<Counter>::new(0);
        prog.send(CounterMsg::IncrementTwice);
        assert_eq!(prog.model().count, 0);
        prog.drain_messages();
        assert_eq!(prog.model().count, 2);
    }

    #[test]
    fn render_string_shows_view() {
        let mut prog = TestProgram::<Counter>::new(0);
        prog.send(CounterMsg::Decrement);
        assert!(prog.render_string(20, 1).contains("Count: -1"));
    }

    #[tokio::test]
    async fn resolve_keeps_batch_order() {
        let cmd = Command::batch([
            Command::tick(Duration::from_millis(5), |_| "slow"),
            Command::message("now"),
            Command::perform(async { 3 }, |n: i32| if n == 3 { "three" } else { "other" }),
        ]);
        assert_eq!(resolve(cmd).await, vec!["slow", "now", "three"]);
    }

    #[tokio::test]
    async fn resolve_quit_is_empty() {
        let cmd: Command<()> = Command::quit();
        assert!(resolve(cmd).await.is_empty());
    }
}
