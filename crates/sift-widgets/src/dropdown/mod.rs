//! Searchable dropdown with local or remote data.
//!
//! A [`Dropdown`] is a [`Component`]: the parent routes terminal input to it as
//! [`Message::Key`] and [`Message::Click`], lifts the returned commands with
//! [`Command::map`], and watches for the output variants ([`Message::Selected`],
//! [`Message::Changed`], [`Message::Opened`], ...) coming back through its own
//! update loop. Those replace callback options; handling them in the parent
//! cannot disturb the dropdown.
//!
//! Data comes either from the configured item list, filtered locally on every
//! keystroke, or from a remote endpoint queried through a [`Fetch`]
//! implementation after a debounce delay. Every fetch carries a [`Ticket`];
//! a response is only applied if it answers the most recently issued request.
//!
//! Opening and closing are two-phase so the panel can animate: the panel shows
//! at once and takes focus after `animationDuration`; on close it stops
//! reacting at once and disappears after the same delay.
//!
//! ```rust,ignore
//! let config = DropdownConfig::builder()
//!     .with_data([Item::new().with("id", 1).with("name", "Apple")])
//!     .build()?;
//! let mut fruit = Dropdown::new(config);
//!
//! // in the parent's update:
//! AppMsg::Fruit(dropdown::Message::Selected(item)) => { self.picked = Some(item); Command::none() }
//! AppMsg::Fruit(m) => fruit.update(m).map(AppMsg::Fruit),
//! ```

mod config;
mod group;
mod item;
mod keys;
mod provider;
mod remote;
mod render;
mod rtl;
mod status;
mod store;

pub use config::{ConfigError, DropdownConfig, DropdownConfigBuilder, RemoteMethod, Styles, Template, Theme};
pub use group::{DropdownGroup, GroupMessage};
pub use item::Item;
pub use keys::DropdownKeys;
pub use provider::{filter_local, SearchPlan, Sequence, Ticket};
pub use remote::{extract_items, Endpoint, Fetch, FetchError, HttpFetcher};
pub use render::{AddRow, Badge, DropdownView, ItemList, ItemRow, PanelBody, PanelView, SearchBox, TriggerView};
pub use rtl::{contains_rtl, resolve_direction, Direction, RtlMode};
pub use status::StatusKind;
pub use store::Store;

use crate::form::HostBinding;
use crate::selection::ListCursor;
use crate::text_edit::TextEditState;
use crossterm::event::KeyEvent;
use item::display_text;
use ratatui::layout::{Position, Rect};
use ratatui::Frame;
use serde_json::Value;
use sift_core::{subscribe, Command, Component, Every, Subscription};
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// Where the panel is in its open/close transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    /// Visible; focus moves to the search box when the transition settles.
    Opening,
    Open,
    /// Still visible but no longer hit-tested.
    Closing,
}

impl Phase {
    pub fn is_visible(self) -> bool {
        self != Phase::Closed
    }

    /// Opening or open. A click outside the dropdown only closes it then.
    pub fn is_interactive(self) -> bool {
        matches!(self, Phase::Opening | Phase::Open)
    }
}

/// Which part of the dropdown receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Trigger,
    Search,
    /// The item under the list cursor.
    List,
    AddButton,
}

/// Messages into and out of a [`Dropdown`].
///
/// The first group is input, routed by the parent or produced by the
/// dropdown's own commands. The second group is output: the dropdown emits
/// them as immediate commands and ignores them when they come back.
#[derive(Debug, Clone)]
pub enum Message {
    Key(KeyEvent),
    /// Left click at a terminal cell. Route every click to every dropdown so
    /// each can notice clicks outside itself.
    Click {
        column: u16,
        row: u16,
    },
    Paste(String),
    DebounceElapsed(Ticket),
    TransitionElapsed(Ticket),
    Fetched {
        request: Ticket,
        result: Result<Vec<Item>, FetchError>,
    },
    SpinnerTick,

    /// An item was picked. Always followed by `Changed`.
    Selected(Item),
    Changed {
        value: Value,
        item: Item,
    },
    Opened,
    Closed,
    /// The search text changed.
    Searched(String),
    /// A remote fetch was applied.
    Loaded(Vec<Item>),
    /// A remote fetch failed; the list is now empty.
    Failed(FetchError),
    /// The add-new row was activated with the current search text.
    AddRequested(String),
}

impl Message {
    /// Whether this is an output notification rather than input.
    pub fn is_event(&self) -> bool {
        matches!(
            self,
            Message::Selected(_)
                | Message::Changed { .. }
                | Message::Opened
                | Message::Closed
                | Message::Searched(_)
                | Message::Loaded(_)
                | Message::Failed(_)
                | Message::AddRequested(_)
        )
    }
}

/// Screen areas from the last paint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Geometry {
    trigger: Rect,
    panel: Rect,
    search: Rect,
    list: Rect,
    add: Rect,
    offset: usize,
    interactive: bool,
}

/// A searchable select component. See the [module docs](self).
pub struct Dropdown {
    id: u64,
    config: Arc<DropdownConfig>,
    keys: DropdownKeys,
    store: Store,
    fetcher: Option<Arc<dyn Fetch>>,
    requests: Sequence,
    debounce: Sequence,
    transitions: Sequence,
    phase: Phase,
    focus: Focus,
    cursor: ListCursor,
    search: TextEditState,
    direction: Direction,
    host: Option<HostBinding>,
    last_query: Option<String>,
    spinner_frame: usize,
    destroyed: bool,
    geometry: Cell<Geometry>,
}

impl Dropdown {
    /// A standalone dropdown, not bound to any host field. In remote mode it
    /// fetches over HTTP unless another fetcher is supplied.
    pub fn new(config: DropdownConfig) -> Self {
        Self::from_shared(Arc::new(config), None)
    }

    pub(crate) fn from_shared(config: Arc<DropdownConfig>, host: Option<HostBinding>) -> Self {
        let fetcher = Endpoint::from_config(&config)
            .map(|endpoint| Arc::new(HttpFetcher::new(endpoint)) as Arc<dyn Fetch>);
        let field_direction = host.as_ref().and_then(|h| h.field()).and_then(|f| f.direction);
        let form_direction = host.as_ref().and_then(|h| h.form().direction());
        let direction = resolve_direction(config.rtl, config.direction, field_direction, form_direction);
        let store = Store::new(config.data.clone());
        let cursor = ListCursor::new(store.filtered().len(), config.styles.max_height as usize);

        let mut dropdown = Self {
            id: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            config,
            keys: DropdownKeys::default(),
            store,
            fetcher,
            requests: Sequence::default(),
            debounce: Sequence::default(),
            transitions: Sequence::default(),
            phase: Phase::Closed,
            focus: Focus::Trigger,
            cursor,
            search: TextEditState::new(),
            direction,
            host,
            last_query: None,
            spinner_frame: 0,
            destroyed: false,
            geometry: Cell::new(Geometry::default()),
        };
        dropdown.adopt_host_value();
        tracing::debug!(
            instance = dropdown.id,
            remote = dropdown.config.is_remote(),
            direction = ?dropdown.direction,
            "dropdown created"
        );
        dropdown
    }

    /// Replace the remote transport.
    pub fn with_fetcher(self, fetcher: impl Fetch) -> Self {
        self.with_shared_fetcher(Arc::new(fetcher))
    }

    pub(crate) fn with_shared_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_keys(mut self, keys: DropdownKeys) -> Self {
        self.keys = keys;
        self
    }

    // A host field that already carries a value preselects the matching item.
    fn adopt_host_value(&mut self) {
        let Some(value) = self.host.as_ref().and_then(|h| h.field()).map(|f| f.value) else {
            return;
        };
        if value.is_empty() {
            return;
        }
        if let Some(item) = self.store.find(&self.config.value_key, &Value::String(value)).cloned() {
            self.store.select(item);
        }
    }

    pub fn config(&self) -> &DropdownConfig {
        &self.config
    }

    pub fn keys(&self) -> &DropdownKeys {
        &self.keys
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn query(&self) -> &str {
        self.store.query()
    }

    pub fn data(&self) -> &[Item] {
        self.store.data()
    }

    pub fn filtered(&self) -> &[Item] {
        self.store.filtered()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn host(&self) -> Option<&HostBinding> {
        self.host.as_ref()
    }

    /// The selected item's value.
    pub fn value(&self) -> Option<&Value> {
        self.store.value(&self.config.value_key)
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.store.selected()
    }

    /// Whether the cell is covered by the trigger or the visible panel.
    pub fn hit(&self, column: u16, row: u16) -> bool {
        self.hit_trigger(column, row) || self.hit_panel(column, row)
    }

    pub fn hit_trigger(&self, column: u16, row: u16) -> bool {
        self.geometry.get().trigger.contains(Position::new(column, row))
    }

    /// Whether the cell is on the panel while it still takes clicks. An open
    /// panel overlays whatever is painted beneath it.
    pub fn hit_panel(&self, column: u16, row: u16) -> bool {
        let geometry = self.geometry.get();
        geometry.interactive && geometry.panel.contains(Position::new(column, row))
    }

    /// Select the dataset item whose value matches, with the usual events.
    /// Unknown values are ignored.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Command<Message> {
        let value = value.into();
        match self.store.find(&self.config.value_key, &value).cloned() {
            Some(item) => self.select_item(Some(item)),
            None => {
                tracing::debug!(instance = self.id, value = %value, "set_value: no item with this value");
                Command::none()
            }
        }
    }

    /// Replace the dataset. The filtered view shows all of it.
    pub fn set_data(&mut self, items: Vec<Item>) {
        if self.destroyed {
            return;
        }
        self.store.replace(items);
        self.sync_cursor();
    }

    /// Append an item, optionally selecting it.
    pub fn add_item(&mut self, item: Item, select: bool) -> Command<Message> {
        if self.destroyed {
            return Command::none();
        }
        self.store.push(item.clone());
        self.refilter();
        if select {
            self.select_item(Some(item))
        } else {
            Command::none()
        }
    }

    /// Drop the selection and empty the host value. Emits nothing.
    pub fn clear(&mut self) {
        if self.destroyed {
            return;
        }
        self.store.clear_selection();
        if let Some(host) = &self.host {
            host.write("");
        }
    }

    /// Reload: re-issue the last remote query, or re-run the local filter.
    pub fn refresh(&mut self) -> Command<Message> {
        if self.destroyed {
            return Command::none();
        }
        if self.config.is_remote() {
            let query = self.last_query.clone().unwrap_or_default();
            self.issue_fetch(query)
        } else {
            self.refilter();
            Command::none()
        }
    }

    /// Detach for good: the host field is shown again, its mirror removed,
    /// subscriptions end, and every later message is ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.phase = Phase::Closed;
        self.focus = Focus::Trigger;
        self.store.set_loading(false);
        self.geometry.set(Geometry::default());
        if let Some(host) = self.host.take() {
            host.release();
        }
        tracing::debug!(instance = self.id, "dropdown destroyed");
    }

    pub fn open_dropdown(&mut self) -> Command<Message> {
        if self.destroyed || self.phase.is_interactive() {
            return Command::none();
        }
        self.phase = Phase::Opening;
        let ticket = self.transitions.advance();
        let mut commands = vec![Command::message(Message::Opened), self.transition_timer(ticket)];
        if self.config.is_remote() && self.last_query.is_none() {
            commands.push(self.issue_fetch(String::new()));
        }
        Command::batch(commands)
    }

    pub fn close_dropdown(&mut self) -> Command<Message> {
        if self.destroyed || !self.phase.is_interactive() {
            return Command::none();
        }
        self.phase = Phase::Closing;
        self.focus = Focus::Trigger;
        let ticket = self.transitions.advance();
        Command::batch([Command::message(Message::Closed), self.transition_timer(ticket)])
    }

    /// Make `item` the selection: mirror its value to the host, close the
    /// panel, and emit `Selected` then `Changed`. `None` does nothing.
    pub fn select_item(&mut self, item: Option<Item>) -> Command<Message> {
        let Some(item) = item else {
            return Command::none();
        };
        if self.destroyed {
            return Command::none();
        }
        let value = item.get(&self.config.value_key).cloned().unwrap_or(Value::Null);
        if let Some(host) = &self.host {
            host.write(&display_text(&value).unwrap_or_default());
        }
        self.store.select(item.clone());
        tracing::debug!(instance = self.id, value = %value, "item selected");

        let close = self.close_dropdown();
        self.focus = Focus::Trigger;
        Command::batch([
            Command::message(Message::Selected(item.clone())),
            Command::message(Message::Changed { value, item }),
            close,
        ])
    }

    fn transition_timer(&self, ticket: Ticket) -> Command<Message> {
        Command::tick(self.config.animation_duration(), move |_| Message::TransitionElapsed(ticket))
    }

    fn settle(&mut self, ticket: Ticket) {
        if !self.transitions.is_current(ticket) {
            tracing::trace!(instance = self.id, ticket = ticket.get(), "superseded transition");
            return;
        }
        match self.phase {
            Phase::Opening => {
                self.phase = Phase::Open;
                if self.focus == Focus::Trigger {
                    self.focus = Focus::Search;
                }
            }
            Phase::Closing => {
                self.phase = Phase::Closed;
                self.search.reset();
                self.store.set_query("");
                self.debounce.advance();
                self.store.set_filtered(self.store.data().to_vec());
                self.sync_cursor();
                self.cursor.home();
            }
            Phase::Open | Phase::Closed => {}
        }
    }

    fn refilter(&mut self) {
        let filtered = if self.config.is_remote() {
            self.store.data().to_vec()
        } else {
            filter_local(self.store.data(), self.store.query(), &self.config.search_keys())
        };
        self.store.set_filtered(filtered);
        self.sync_cursor();
    }

    fn sync_cursor(&mut self) {
        self.cursor.set_count(self.store.filtered().len());
        if self.focus == Focus::List && self.store.filtered().is_empty() {
            self.focus = Focus::Search;
        }
    }

    fn issue_fetch(&mut self, query: String) -> Command<Message> {
        let Some(fetcher) = self.fetcher.clone() else {
            tracing::warn!(instance = self.id, "remote mode without a fetcher");
            return Command::none();
        };
        let request = self.requests.advance();
        self.store.set_loading(true);
        self.last_query = Some(query.clone());
        tracing::debug!(instance = self.id, request = request.get(), query = %query, "fetching");
        Command::perform(fetcher.fetch(query), move |result| Message::Fetched { request, result })
    }

    fn apply_fetch(&mut self, request: Ticket, result: Result<Vec<Item>, FetchError>) -> Command<Message> {
        if !self.requests.is_current(request) {
            tracing::debug!(instance = self.id, request = request.get(), "dropping stale response");
            return Command::none();
        }
        self.store.set_loading(false);
        match result {
            Ok(items) => {
                tracing::debug!(instance = self.id, request = request.get(), count = items.len(), "loaded");
                self.store.replace(items.clone());
                self.sync_cursor();
                Command::message(Message::Loaded(items))
            }
            Err(err) => {
                tracing::warn!(instance = self.id, request = request.get(), error = %err, "remote fetch failed");
                self.store.replace(Vec::new());
                self.sync_cursor();
                Command::message(Message::Failed(err))
            }
        }
    }

    fn query_changed(&mut self) -> Command<Message> {
        let query = self.search.value();
        self.store.set_query(query.clone());
        self.cursor.home();
        let load = if self.config.is_remote() {
            match SearchPlan::for_query(&query, self.config.min_search_length) {
                SearchPlan::Immediate => {
                    self.debounce.advance();
                    self.issue_fetch(String::new())
                }
                SearchPlan::Debounced => {
                    let ticket = self.debounce.advance();
                    Command::tick(self.config.debounce_delay(), move |_| Message::DebounceElapsed(ticket))
                }
                SearchPlan::Skip => {
                    self.debounce.advance();
                    Command::none()
                }
            }
        } else {
            self.refilter();
            Command::none()
        };
        Command::batch([Command::message(Message::Searched(query)), load])
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command<Message> {
        match self.focus {
            Focus::Trigger => {
                if self.keys.close.matches(&key) {
                    self.close_dropdown()
                } else if self.keys.open.matches(&key) {
                    self.open_dropdown()
                } else {
                    Command::none()
                }
            }
            Focus::Search => {
                if self.keys.close.matches(&key) {
                    self.close_dropdown()
                } else if self.keys.next.matches(&key) {
                    if !self.store.is_loading() && !self.store.filtered().is_empty() {
                        self.focus = Focus::List;
                        self.cursor.home();
                    }
                    Command::none()
                } else if self.keys.to_add.matches(&key) {
                    if self.config.add_button {
                        self.focus = Focus::AddButton;
                    }
                    Command::none()
                } else if self.search.apply_key(&key) {
                    self.query_changed()
                } else {
                    Command::none()
                }
            }
            Focus::List => {
                if self.keys.close.matches(&key) {
                    self.close_dropdown()
                } else if self.keys.select.matches(&key) {
                    let item = self.store.filtered().get(self.cursor.cursor()).cloned();
                    self.select_item(item)
                } else if self.keys.next.matches(&key) {
                    self.cursor.next();
                    Command::none()
                } else if self.keys.prev.matches(&key) {
                    if !self.cursor.prev() {
                        self.focus = Focus::Search;
                    }
                    Command::none()
                } else if self.keys.to_add.matches(&key) && self.config.add_button {
                    self.focus = Focus::AddButton;
                    Command::none()
                } else {
                    Command::none()
                }
            }
            Focus::AddButton => {
                if self.keys.close.matches(&key) {
                    self.close_dropdown()
                } else if self.keys.select.matches(&key) {
                    Command::message(Message::AddRequested(self.search.value()))
                } else if self.keys.prev.matches(&key) || self.keys.to_add.matches(&key) {
                    self.focus = Focus::Search;
                    Command::none()
                } else {
                    Command::none()
                }
            }
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) -> Command<Message> {
        let geometry = self.geometry.get();
        let position = Position::new(column, row);

        if geometry.trigger.contains(position) {
            self.focus = Focus::Trigger;
            return if self.phase.is_interactive() {
                self.close_dropdown()
            } else {
                self.open_dropdown()
            };
        }
        if self.phase.is_interactive() && geometry.interactive && geometry.panel.contains(position) {
            if geometry.list.contains(position) {
                let index = geometry.offset + usize::from(row - geometry.list.y);
                let item = self.store.filtered().get(index).cloned();
                return self.select_item(item);
            }
            if geometry.add.contains(position) {
                self.focus = Focus::AddButton;
                return Command::message(Message::AddRequested(self.search.value()));
            }
            if geometry.search.contains(position) {
                self.focus = Focus::Search;
            }
            return Command::none();
        }
        if self.phase.is_interactive() {
            return self.close_dropdown();
        }
        Command::none()
    }
}

impl Component for Dropdown {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        if self.destroyed {
            return Command::none();
        }
        match msg {
            Message::Key(key) => self.handle_key(key),
            Message::Click { column, row } => self.handle_click(column, row),
            Message::Paste(text) => {
                if self.focus == Focus::Search && self.phase.is_interactive() && self.search.insert_str(&text) {
                    self.query_changed()
                } else {
                    Command::none()
                }
            }
            Message::DebounceElapsed(ticket) => {
                if self.debounce.is_current(ticket) {
                    let query = self.store.query().to_string();
                    self.issue_fetch(query)
                } else {
                    Command::none()
                }
            }
            Message::TransitionElapsed(ticket) => {
                self.settle(ticket);
                Command::none()
            }
            Message::Fetched { request, result } => self.apply_fetch(request, result),
            Message::SpinnerTick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                Command::none()
            }
            Message::Selected(_)
            | Message::Changed { .. }
            | Message::Opened
            | Message::Closed
            | Message::Searched(_)
            | Message::Loaded(_)
            | Message::Failed(_)
            | Message::AddRequested(_) => Command::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if self.destroyed {
            return;
        }
        render::paint(frame, area, &self.describe(), &self.config.styles, &self.geometry);
    }

    fn subscriptions(&self) -> Vec<Subscription<Message>> {
        if self.destroyed || !self.store.is_loading() {
            return Vec::new();
        }
        vec![subscribe(Every::new(SPINNER_INTERVAL, self.id)).map(|_| Message::SpinnerTick)]
    }

    fn focused(&self) -> bool {
        !self.destroyed && self.phase.is_interactive()
    }
}

#[cfg(test)]
mod tests;
