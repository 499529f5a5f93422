use crate::command::Command;
use crate::subscription::Subscription;
use ratatui::{layout::Rect, Frame};

/// A reusable sub-model that renders into a given [`Rect`] area.
///
/// `Component` mirrors [`Model`](crate::Model) except that
/// [`view`](Component::view) receives the `area` chosen by the parent. A
/// parent embeds a component by wrapping the component's message type in one
/// of its own variants and lifting returned commands with [`Command::map`]:
///
/// ```rust,ignore
/// use sift_core::{Command, Component, Model};
/// use sift_widgets::dropdown::{self, Dropdown, DropdownConfig};
///
/// struct App { fruit: Dropdown }
///
/// enum AppMsg { Fruit(dropdown::Message) }
///
/// impl Model for App {
///     type Message = AppMsg;
///     type Flags = DropdownConfig;
///
///     fn init(config: DropdownConfig) -> (Self, Command<AppMsg>) {
///         (App { fruit: Dropdown::new(config) }, Command::none())
///     }
///
///     fn update(&mut self, msg: AppMsg) -> Command<AppMsg> {
///         match msg {
///             AppMsg::Fruit(m) => self.fruit.update(m).map(AppMsg::Fruit),
///         }
///     }
///
///     fn view(&self, frame: &mut ratatui::Frame) {
///         self.fruit.view(frame, frame.area());
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    /// The component's internal message type.
    type Message: Send + 'static;

    /// Process a message, mutate state, and return a [`Command`] for side effects.
    ///
    /// The returned command speaks the component's own `Message` type; the
    /// parent lifts it with [`.map()`](Command::map).
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into `area` of the [`Frame`].
    ///
    /// Overlays (such as an open dropdown panel) may draw below `area`; all
    /// other drawing stays inside it.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Declare active subscriptions for this component.
    ///
    /// The parent collects these and returns them from its own
    /// [`Model::subscriptions`](crate::Model::subscriptions), mapped into the
    /// parent message type. Returning an empty list releases everything the
    /// component had registered on the next reconciliation.
    fn subscriptions(&self) -> Vec<Subscription<Self::Message>> {
        vec![]
    }

    /// Whether this component currently wants keyboard input.
    fn focused(&self) -> bool {
        false
    }
}
