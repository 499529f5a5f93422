use super::{Dropdown, DropdownConfig, Fetch, Item, Message};
use crate::form::{Form, HostBinding};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::Frame;
use serde_json::Value;
use sift_core::{Command, Component, Subscription, TerminalEvent};
use std::sync::Arc;

const SLOT_HEIGHT: u16 = 3;
const SLOT_GAP: u16 = 1;

/// Messages for a [`DropdownGroup`].
#[derive(Debug, Clone)]
pub enum GroupMessage {
    /// Goes to the focused instance.
    Key(KeyEvent),
    /// Goes to every instance.
    Click { column: u16, row: u16 },
    /// Goes to the focused instance.
    Paste(String),
    FocusNext,
    FocusPrev,
    /// A message for, or from, instance `index`.
    Instance { index: usize, message: Message },
}

impl GroupMessage {
    /// The group's view of a terminal event: key presses, left clicks, and
    /// pastes. Anything else is `None`.
    pub fn from_terminal(event: &TerminalEvent) -> Option<Self> {
        if let Some(key) = event.key_press() {
            return Some(GroupMessage::Key(key));
        }
        if let Some((column, row)) = event.left_click() {
            return Some(GroupMessage::Click { column, row });
        }
        match event {
            TerminalEvent::Paste(text) => Some(GroupMessage::Paste(text.clone())),
            _ => None,
        }
    }

    /// The output event and the instance it came from, if this is one.
    pub fn event(&self) -> Option<(usize, &Message)> {
        match self {
            GroupMessage::Instance { index, message } if message.is_event() => Some((*index, message)),
            _ => None,
        }
    }
}

/// Every dropdown created from one configuration, one per matching host
/// field. Public operations fan out to all instances; value reads answer
/// from the first.
#[derive(Default)]
pub struct DropdownGroup {
    instances: Vec<Dropdown>,
    focused: usize,
}

impl DropdownGroup {
    /// Bind a dropdown to each field matching the configured selector.
    ///
    /// A missing or malformed selector, or one that matches nothing, is logged
    /// and yields an empty group.
    pub fn attach(form: &Form, config: DropdownConfig) -> Self {
        let config = Arc::new(config);
        let Some(selector) = config.selector() else {
            tracing::warn!("dropdown has no selector; nothing to attach to");
            return Self::default();
        };
        let fields = match form.select(selector) {
            Ok(fields) => fields,
            Err(err) => {
                tracing::warn!(selector, error = %err, "cannot attach dropdown");
                return Self::default();
            }
        };
        if fields.is_empty() {
            tracing::warn!(selector, "no host element matches selector");
        }
        let instances: Vec<Dropdown> = fields
            .into_iter()
            .filter_map(|field| HostBinding::attach(form, field))
            .map(|host| Dropdown::from_shared(Arc::clone(&config), Some(host)))
            .collect();
        tracing::debug!(selector, count = instances.len(), "dropdowns attached");
        Self {
            instances,
            focused: 0,
        }
    }

    /// Use `fetcher` for every instance's remote requests.
    pub fn with_fetcher(mut self, fetcher: impl Fetch) -> Self {
        let shared: Arc<dyn Fetch> = Arc::new(fetcher);
        self.instances = self
            .instances
            .into_iter()
            .map(|dropdown| dropdown.with_shared_fetcher(Arc::clone(&shared)))
            .collect();
        self
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[Dropdown] {
        &self.instances
    }

    pub fn get(&self, index: usize) -> Option<&Dropdown> {
        self.instances.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Dropdown> {
        self.instances.get_mut(index)
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn value(&self) -> Option<&Value> {
        self.instances.first().and_then(Dropdown::value)
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.instances.first().and_then(Dropdown::selected_item)
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> Command<GroupMessage> {
        let value = value.into();
        self.fan_out(|dropdown| dropdown.set_value(value.clone()))
    }

    pub fn set_data(&mut self, items: Vec<Item>) {
        for dropdown in &mut self.instances {
            dropdown.set_data(items.clone());
        }
    }

    pub fn add_item(&mut self, item: Item, select: bool) -> Command<GroupMessage> {
        self.fan_out(|dropdown| dropdown.add_item(item.clone(), select))
    }

    pub fn clear(&mut self) {
        for dropdown in &mut self.instances {
            dropdown.clear();
        }
    }

    pub fn refresh(&mut self) -> Command<GroupMessage> {
        self.fan_out(Dropdown::refresh)
    }

    pub fn destroy(&mut self) {
        for dropdown in &mut self.instances {
            dropdown.destroy();
        }
    }

    pub fn open_dropdown(&mut self) -> Command<GroupMessage> {
        self.fan_out(Dropdown::open_dropdown)
    }

    pub fn close_dropdown(&mut self) -> Command<GroupMessage> {
        self.fan_out(Dropdown::close_dropdown)
    }

    pub fn select_item(&mut self, item: Option<Item>) -> Command<GroupMessage> {
        self.fan_out(|dropdown| dropdown.select_item(item.clone()))
    }

    /// The instance a click at this cell belongs to: an open panel first,
    /// since it is painted over the triggers below it, then a trigger.
    pub fn click_owner(&self, column: u16, row: u16) -> Option<usize> {
        let live = || self.instances.iter().enumerate().filter(|(_, d)| !d.is_destroyed());
        live()
            .find(|(_, d)| d.hit_panel(column, row))
            .or_else(|| live().find(|(_, d)| d.hit_trigger(column, row)))
            .map(|(index, _)| index)
    }

    fn fan_out(&mut self, mut op: impl FnMut(&mut Dropdown) -> Command<Message>) -> Command<GroupMessage> {
        Command::batch(
            self.instances
                .iter_mut()
                .enumerate()
                .map(|(index, dropdown)| lift(index, op(dropdown)))
                .collect::<Vec<_>>(),
        )
    }

    fn route(&mut self, index: usize, message: Message) -> Command<GroupMessage> {
        match self.instances.get_mut(index) {
            Some(dropdown) => lift(index, dropdown.update(message)),
            None => Command::none(),
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let live: Vec<usize> = (0..self.instances.len())
            .filter(|&i| !self.instances[i].is_destroyed())
            .collect();
        if live.is_empty() {
            return;
        }
        let position = live.iter().position(|&i| i == self.focused).unwrap_or(0);
        let next = if forward {
            (position + 1) % live.len()
        } else {
            (position + live.len() - 1) % live.len()
        };
        self.focused = live[next];
    }
}

fn lift(index: usize, command: Command<Message>) -> Command<GroupMessage> {
    command.map(move |message| GroupMessage::Instance { index, message })
}

impl Component for DropdownGroup {
    type Message = GroupMessage;

    fn update(&mut self, msg: GroupMessage) -> Command<GroupMessage> {
        match msg {
            GroupMessage::Key(key) => {
                let panel_closed = self
                    .instances
                    .get(self.focused)
                    .is_none_or(|dropdown| !dropdown.phase().is_visible());
                match key.code {
                    KeyCode::Tab if panel_closed => {
                        self.cycle_focus(true);
                        Command::none()
                    }
                    KeyCode::BackTab if panel_closed => {
                        self.cycle_focus(false);
                        Command::none()
                    }
                    _ => self.route(self.focused, Message::Key(key)),
                }
            }
            GroupMessage::Click { column, row } => {
                let owner = self.click_owner(column, row);
                if let Some(index) = owner {
                    self.focused = index;
                }
                let commands: Vec<_> = self
                    .instances
                    .iter_mut()
                    .enumerate()
                    .map(|(index, dropdown)| {
                        if owner == Some(index) {
                            lift(index, dropdown.update(Message::Click { column, row }))
                        } else {
                            lift(index, dropdown.close_dropdown())
                        }
                    })
                    .collect();
                Command::batch(commands)
            }
            GroupMessage::Paste(text) => self.route(self.focused, Message::Paste(text)),
            GroupMessage::FocusNext => {
                self.cycle_focus(true);
                Command::none()
            }
            GroupMessage::FocusPrev => {
                self.cycle_focus(false);
                Command::none()
            }
            GroupMessage::Instance { index, message } => self.route(index, message),
        }
    }

    /// Stack the triggers top to bottom; open panels are painted last so they
    /// overlay the triggers below them.
    fn view(&self, frame: &mut Frame, area: Rect) {
        let mut slots = Vec::with_capacity(self.instances.len());
        let mut y = area.y;
        for dropdown in &self.instances {
            if dropdown.is_destroyed() {
                continue;
            }
            if y >= area.bottom() {
                break;
            }
            let height = SLOT_HEIGHT.min(area.bottom() - y);
            slots.push((dropdown, Rect { y, height, ..area }));
            y = y.saturating_add(SLOT_HEIGHT + SLOT_GAP);
        }
        slots.sort_by_key(|(dropdown, _)| dropdown.phase().is_visible());
        for (dropdown, slot) in slots {
            dropdown.view(frame, slot);
        }
    }

    fn subscriptions(&self) -> Vec<Subscription<GroupMessage>> {
        self.instances
            .iter()
            .enumerate()
            .flat_map(|(index, dropdown)| {
                dropdown
                    .subscriptions()
                    .into_iter()
                    .map(move |sub| sub.map(move |message| GroupMessage::Instance { index, message }))
            })
            .collect()
    }

    fn focused(&self) -> bool {
        self.instances.iter().any(Dropdown::focused)
    }
}
