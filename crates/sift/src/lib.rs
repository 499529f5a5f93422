//! **sift** -- searchable terminal dropdowns for [`ratatui`].
//!
//! This is the umbrella crate that re-exports everything you need from a
//! single dependency:
//!
//! ```toml
//! [dependencies]
//! sift = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`sift_core`] are available at the crate root
//!   ([`Model`], [`Component`], [`Command`], [`Subscription`], [`Program`],
//!   [`run`], [`run_with`], etc.).
//! * The [`widgets`] module re-exports everything from [`sift_widgets`]:
//!   the dropdown, its configuration, and the host [`Form`](widgets::Form).
//! * [`ratatui`], [`crossterm`], and [`tokio`] are re-exported so downstream
//!   crates do not need to depend on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use sift::widgets::{DropdownConfig, DropdownGroup, Field, Form, Item};
//! use sift::widgets::dropdown::GroupMessage;
//! use sift::{terminal_events, Command, Component, Model, Subscription};
//! use sift::ratatui::Frame;
//!
//! struct App {
//!     form: Form,
//!     fruit: DropdownGroup,
//! }
//!
//! impl Model for App {
//!     type Message = GroupMessage;
//!     type Flags = ();
//!
//!     fn init(_: ()) -> (Self, Command<GroupMessage>) {
//!         let form = Form::new();
//!         form.add_field(Field::new().with_id("fruit").with_name("fruit"));
//!         let config = DropdownConfig::builder()
//!             .with_selector("#fruit")
//!             .with_data(vec![Item::new().with("id", 1).with("name", "Apple")])
//!             .build()
//!             .unwrap();
//!         let fruit = DropdownGroup::attach(&form, config);
//!         (App { form, fruit }, Command::none())
//!     }
//!     fn update(&mut self, msg: GroupMessage) -> Command<GroupMessage> {
//!         self.fruit.update(msg)
//!     }
//!     fn view(&self, frame: &mut Frame) {
//!         self.fruit.view(frame, frame.area());
//!     }
//!     fn subscriptions(&self) -> Vec<Subscription<GroupMessage>> {
//!         let mut subs = vec![terminal_events(|ev| GroupMessage::from_terminal(&ev))];
//!         subs.extend(self.fruit.subscriptions());
//!         subs
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     sift::run::<App>(()).await.unwrap();
//! }
//! ```

pub use sift_core::*;
pub mod widgets {
    pub use sift_widgets::*;
}

// Re-export dependencies for use in demos and downstream crates
pub use crossterm;
pub use ratatui;
pub use tokio;

#[cfg(test)]
mod tests {
    use super::testing::TestProgram;
    use super::widgets::dropdown::{GroupMessage, Phase};
    use super::widgets::{DropdownConfig, DropdownGroup, Field, Form, Item};
    use super::{Command, Component, Model};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Frame;

    struct App {
        form: Form,
        fruit: DropdownGroup,
        last_event: Option<String>,
    }

    impl Model for App {
        type Message = GroupMessage;
        type Flags = Vec<Item>;

        fn init(items: Vec<Item>) -> (Self, Command<GroupMessage>) {
            let form = Form::new();
            form.add_field(Field::new().with_id("fruit").with_name("fruit"));
            let config = DropdownConfig::builder()
                .with_selector("#fruit")
                .with_data(items)
                .build()
                .unwrap();
            let fruit = DropdownGroup::attach(&form, config);
            let app = App {
                form,
                fruit,
                last_event: None,
            };
            (app, Command::none())
        }

        fn update(&mut self, msg: GroupMessage) -> Command<GroupMessage> {
            if let Some((_, event)) = msg.event() {
                self.last_event = Some(format!("{event:?}"));
            }
            self.fruit.update(msg)
        }

        fn view(&self, frame: &mut Frame) {
            self.fruit.view(frame, frame.area());
        }
    }

    fn fruits() -> Vec<Item> {
        vec![
            Item::new().with("id", 1).with("name", "Apple"),
            Item::new().with("id", 2).with("name", "Banana"),
        ]
    }

    fn press(code: KeyCode) -> GroupMessage {
        GroupMessage::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn enter_opens_the_panel() {
        let mut prog = TestProgram::<App>::new(fruits());
        prog.send(press(KeyCode::Enter));
        prog.drain_messages();

        let dropdown = prog.model().fruit.get(0).unwrap();
        assert_eq!(dropdown.phase(), Phase::Opening);
        assert_eq!(prog.model().last_event.as_deref(), Some("Opened"));

        let screen = prog.render_string(30, 10);
        assert!(screen.contains("Apple"));
        assert!(screen.contains("Banana"));
    }

    #[test]
    fn selection_reaches_the_form() {
        let mut prog = TestProgram::<App>::new(fruits());
        let banana = fruits().pop();
        let cmd = prog.model_mut().fruit.select_item(banana);
        assert!(!cmd.is_none());

        assert_eq!(prog.model().fruit.value(), Some(&serde_json::json!(2)));
        assert_eq!(prog.model().form.mirror_value("fruit").as_deref(), Some("2"));
        assert!(prog.render_string(30, 3).contains("Banana"));
    }
}
