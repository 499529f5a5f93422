use super::*;
use crate::form::{Field, Form};
use crossterm::event::{KeyCode, KeyModifiers};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::json;
use sift_core::testing::{buffer_to_string, resolve};
use std::sync::atomic::AtomicUsize;

fn fruits() -> Vec<Item> {
    vec![
        Item::new().with("id", 1).with("name", "Apple"),
        Item::new().with("id", 2).with("name", "Banana"),
        Item::new().with("id", 3).with("name", "Pineapple"),
    ]
}

fn local() -> Dropdown {
    Dropdown::new(DropdownConfig::builder().with_data(fruits()).build().unwrap())
}

fn remote(min_search_length: usize) -> DropdownConfigBuilder {
    DropdownConfig::builder()
        .with_remote_url("https://api.test/fruits")
        .with_min_search_length(min_search_length)
}

/// Serves `fruits()` filtered by the query and records every query.
#[derive(Clone, Default)]
struct FruitServer {
    queries: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl Fetch for FruitServer {
    fn fetch(&self, query: String) -> BoxFuture<'static, Result<Vec<Item>, FetchError>> {
        self.queries.lock().push(query.clone());
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                return Err(FetchError::Status(500));
            }
            Ok(filter_local(&fruits(), &query, &["name"]))
        })
    }
}

/// Answers the n-th call with the n-th batch.
struct Scripted {
    calls: AtomicUsize,
    batches: Vec<Vec<Item>>,
}

impl Fetch for Scripted {
    fn fetch(&self, _query: String) -> BoxFuture<'static, Result<Vec<Item>, FetchError>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let batch = self.batches.get(n).cloned().unwrap_or_default();
        Box::pin(async move { Ok(batch) })
    }
}

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Run `cmd` and everything it leads to; returns the output events in order.
async fn drive(dropdown: &mut Dropdown, cmd: Command<Message>) -> Vec<Message> {
    let mut events = Vec::new();
    let mut pending = std::collections::VecDeque::from([cmd]);
    while let Some(cmd) = pending.pop_front() {
        for msg in resolve(cmd).await {
            if msg.is_event() {
                events.push(msg);
            } else {
                pending.push_back(dropdown.update(msg));
            }
        }
    }
    events
}

async fn open(dropdown: &mut Dropdown) -> Vec<Message> {
    let cmd = dropdown.open_dropdown();
    drive(dropdown, cmd).await
}

async fn send(dropdown: &mut Dropdown, msg: Message) -> Vec<Message> {
    let cmd = dropdown.update(msg);
    drive(dropdown, cmd).await
}

async fn type_text(dropdown: &mut Dropdown, text: &str) -> Vec<Message> {
    let mut events = Vec::new();
    for c in text.chars() {
        events.extend(send(dropdown, key(KeyCode::Char(c))).await);
    }
    events
}

fn names(items: &[Item]) -> Vec<String> {
    items.iter().filter_map(|i| i.text("name")).collect()
}

fn render(dropdown: &Dropdown, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| dropdown.view(frame, Rect::new(0, 0, width, 3)))
        .unwrap();
    buffer_to_string(terminal.backend().buffer())
}

#[tokio::test(start_paused = true)]
async fn open_focuses_search_after_transition() {
    let mut dd = local();
    let cmd = dd.open_dropdown();
    assert_eq!(dd.phase(), Phase::Opening);
    assert_eq!(dd.focus(), Focus::Trigger);
    let events = drive(&mut dd, cmd).await;
    assert!(matches!(events.as_slice(), [Message::Opened]));
    assert_eq!(dd.phase(), Phase::Open);
    assert_eq!(dd.focus(), Focus::Search);
}

#[tokio::test(start_paused = true)]
async fn repeated_open_and_close_are_noops() {
    let mut dd = local();
    open(&mut dd).await;
    assert!(dd.open_dropdown().is_none());
    let close = dd.close_dropdown();
    assert!(dd.close_dropdown().is_none());
    drive(&mut dd, close).await;
    assert_eq!(dd.phase(), Phase::Closed);
}

#[tokio::test(start_paused = true)]
async fn superseded_transition_is_ignored() {
    let mut dd = local();
    let opening = dd.open_dropdown();
    let closing = dd.close_dropdown();
    assert_eq!(dd.phase(), Phase::Closing);
    drive(&mut dd, opening).await;
    assert_eq!(dd.phase(), Phase::Closing);
    drive(&mut dd, closing).await;
    assert_eq!(dd.phase(), Phase::Closed);
}

#[tokio::test(start_paused = true)]
async fn apple_banana_scenario() {
    let mut dd = Dropdown::new(
        DropdownConfig::builder()
            .with_data([
                Item::new().with("id", 1).with("name", "Apple"),
                Item::new().with("id", 2).with("name", "Banana"),
            ])
            .build()
            .unwrap(),
    );
    open(&mut dd).await;
    let events = type_text(&mut dd, "ap").await;
    assert!(matches!(events.last(), Some(Message::Searched(q)) if q == "ap"));
    assert_eq!(names(dd.filtered()), ["Apple"]);

    send(&mut dd, key(KeyCode::Down)).await;
    assert_eq!(dd.focus(), Focus::List);
    let events = send(&mut dd, key(KeyCode::Enter)).await;
    match events.as_slice() {
        [Message::Selected(item), Message::Changed { value, .. }, Message::Closed] => {
            assert_eq!(item.text("name").as_deref(), Some("Apple"));
            assert_eq!(value, &json!(1));
        }
        other => panic!("unexpected events: {other:?}"),
    }
    assert_eq!(dd.value(), Some(&json!(1)));
    assert_eq!(dd.phase(), Phase::Closed);
    assert_eq!(dd.query(), "");
    assert_eq!(dd.filtered().len(), 2);
    assert!(render(&dd, 30, 3).contains("Apple"));
}

#[tokio::test(start_paused = true)]
async fn typing_an_leaves_only_banana() {
    let mut dd = Dropdown::new(
        DropdownConfig::builder()
            .with_data([
                Item::new().with("id", 1).with("name", "Apple"),
                Item::new().with("id", 2).with("name", "Banana"),
            ])
            .build()
            .unwrap(),
    );
    open(&mut dd).await;
    type_text(&mut dd, "an").await;
    assert_eq!(names(dd.filtered()), ["Banana"]);

    send(&mut dd, key(KeyCode::Down)).await;
    send(&mut dd, key(KeyCode::Enter)).await;
    assert_eq!(dd.value(), Some(&json!(2)));
}

#[tokio::test(start_paused = true)]
async fn clear_restores_placeholder_silently() {
    let mut dd = local();
    let cmd = dd.set_value(2);
    drive(&mut dd, cmd).await;
    assert_eq!(dd.value(), Some(&json!(2)));
    dd.clear();
    assert_eq!(dd.value(), None);
    let view = dd.describe();
    assert!(view.trigger.is_placeholder);
    assert_eq!(view.trigger.text, "Select an option");
}

#[test]
fn select_none_is_noop() {
    let mut dd = local();
    assert!(dd.select_item(None).is_none());
    assert!(dd.selected_item().is_none());
}

#[test]
fn set_value_unknown_is_ignored() {
    let mut dd = local();
    assert!(dd.set_value("42").is_none());
    assert!(dd.value().is_none());
}

#[tokio::test(start_paused = true)]
async fn set_value_accepts_text_for_numeric_ids() {
    let mut dd = local();
    let cmd = dd.set_value("3");
    let events = drive(&mut dd, cmd).await;
    assert!(matches!(events.as_slice(), [Message::Selected(_), Message::Changed { .. }]));
    assert_eq!(dd.value(), Some(&json!(3)));
}

#[tokio::test(start_paused = true)]
async fn local_filter_runs_on_every_keystroke() {
    let mut dd = local();
    open(&mut dd).await;
    type_text(&mut dd, "apple").await;
    assert_eq!(names(dd.filtered()), ["Apple", "Pineapple"]);
    type_text(&mut dd, "x").await;
    assert!(dd.filtered().is_empty());
    assert_eq!(dd.describe().panel.map(|p| p.body), Some(PanelBody::Empty("No results found".into())));
    send(&mut dd, key(KeyCode::Backspace)).await;
    assert_eq!(dd.filtered().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn set_data_replaces_filtered_view() {
    let mut dd = local();
    open(&mut dd).await;
    type_text(&mut dd, "ban").await;
    dd.set_data(vec![Item::new().with("id", 9).with("name", "Cherry")]);
    assert_eq!(names(dd.filtered()), ["Cherry"]);
}

#[tokio::test(start_paused = true)]
async fn add_item_can_select() {
    let mut dd = local();
    let cmd = dd.add_item(Item::new().with("id", 4).with("name", "Kiwi"), true);
    let events = drive(&mut dd, cmd).await;
    assert_eq!(dd.data().len(), 4);
    assert!(matches!(events.first(), Some(Message::Selected(_))));
    assert_eq!(dd.value(), Some(&json!(4)));
}

#[tokio::test(start_paused = true)]
async fn list_navigation_returns_to_search() {
    let mut dd = local();
    open(&mut dd).await;
    send(&mut dd, key(KeyCode::Down)).await;
    send(&mut dd, key(KeyCode::Down)).await;
    send(&mut dd, key(KeyCode::Down)).await;
    send(&mut dd, key(KeyCode::Down)).await;
    assert_eq!(dd.cursor.cursor(), 2);
    for _ in 0..2 {
        send(&mut dd, key(KeyCode::Up)).await;
    }
    assert_eq!(dd.focus(), Focus::List);
    send(&mut dd, key(KeyCode::Up)).await;
    assert_eq!(dd.focus(), Focus::Search);
}

#[tokio::test(start_paused = true)]
async fn escape_closes_and_refocuses_trigger() {
    let mut dd = local();
    open(&mut dd).await;
    send(&mut dd, key(KeyCode::Down)).await;
    let events = send(&mut dd, key(KeyCode::Esc)).await;
    assert!(matches!(events.as_slice(), [Message::Closed]));
    assert_eq!(dd.focus(), Focus::Trigger);
    assert_eq!(dd.phase(), Phase::Closed);
}

#[tokio::test(start_paused = true)]
async fn add_row_reports_query() {
    let mut dd = Dropdown::new(DropdownConfig::builder().with_add_button(true).build().unwrap());
    open(&mut dd).await;
    type_text(&mut dd, "kiwi").await;
    send(&mut dd, key(KeyCode::Tab)).await;
    assert_eq!(dd.focus(), Focus::AddButton);
    let events = send(&mut dd, key(KeyCode::Enter)).await;
    assert!(matches!(events.as_slice(), [Message::AddRequested(q)] if q == "kiwi"));
}

#[tokio::test(start_paused = true)]
async fn clicks_toggle_select_and_close_outside() {
    let mut dd = local();
    render(&dd, 30, 12);
    let events = send(&mut dd, Message::Click { column: 3, row: 1 }).await;
    assert!(matches!(events.as_slice(), [Message::Opened]));

    // trigger rows 0..3, panel border at 3, search at 4, items from 5
    render(&dd, 30, 12);
    let events = send(&mut dd, Message::Click { column: 5, row: 6 }).await;
    assert!(matches!(events.first(), Some(Message::Selected(item)) if item.text("name").as_deref() == Some("Banana")));

    open(&mut dd).await;
    render(&dd, 30, 12);
    let events = send(&mut dd, Message::Click { column: 29, row: 11 }).await;
    assert!(matches!(events.as_slice(), [Message::Closed]));
}

#[tokio::test(start_paused = true)]
async fn outside_click_while_closing_does_nothing() {
    let mut dd = local();
    open(&mut dd).await;
    render(&dd, 30, 12);
    let _closing = dd.close_dropdown();
    assert!(dd.update(Message::Click { column: 29, row: 11 }).is_none());
}

#[tokio::test(start_paused = true)]
async fn first_open_loads_remote_data() {
    let server = FruitServer::default();
    let mut dd = Dropdown::new(remote(1).build().unwrap()).with_fetcher(server.clone());
    let events = open(&mut dd).await;
    assert!(matches!(events.as_slice(), [Message::Opened, Message::Loaded(items)] if items.len() == 3));
    assert_eq!(*server.queries.lock(), [""]);

    let cmd = dd.close_dropdown();
    drive(&mut dd, cmd).await;
    open(&mut dd).await;
    assert_eq!(server.queries.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn debounce_collapses_to_last_query() {
    let server = FruitServer::default();
    let mut dd = Dropdown::new(remote(1).build().unwrap()).with_fetcher(server.clone());
    open(&mut dd).await;

    let typed: Vec<_> = "app".chars().map(|c| dd.update(key(KeyCode::Char(c)))).collect();
    let mut events = Vec::new();
    for cmd in typed {
        events.extend(drive(&mut dd, cmd).await);
    }
    assert_eq!(*server.queries.lock(), ["", "app"]);
    assert_eq!(names(dd.filtered()), ["Apple", "Pineapple"]);
    let loads = events.iter().filter(|m| matches!(m, Message::Loaded(_))).count();
    assert_eq!(loads, 1);
}

#[tokio::test(start_paused = true)]
async fn short_queries_do_not_fetch() {
    let server = FruitServer::default();
    let mut dd = Dropdown::new(remote(3).build().unwrap()).with_fetcher(server.clone());
    open(&mut dd).await;
    type_text(&mut dd, "ap").await;
    assert_eq!(*server.queries.lock(), [""]);
    type_text(&mut dd, "p").await;
    assert_eq!(*server.queries.lock(), ["", "app"]);
}

#[tokio::test(start_paused = true)]
async fn short_query_cancels_scheduled_fetch() {
    let server = FruitServer::default();
    let mut dd = Dropdown::new(remote(2).build().unwrap()).with_fetcher(server.clone());
    open(&mut dd).await;
    send(&mut dd, key(KeyCode::Char('a'))).await;
    let scheduled = dd.update(key(KeyCode::Char('p')));
    let shortened = dd.update(key(KeyCode::Backspace));
    drive(&mut dd, scheduled).await;
    drive(&mut dd, shortened).await;
    assert_eq!(*server.queries.lock(), [""]);
}

#[tokio::test(start_paused = true)]
async fn cleared_query_fetches_immediately() {
    let server = FruitServer::default();
    let mut dd = Dropdown::new(remote(1).build().unwrap()).with_fetcher(server.clone());
    open(&mut dd).await;
    type_text(&mut dd, "b").await;
    let cmd = dd.update(key(KeyCode::Backspace));
    assert!(dd.is_loading());
    drive(&mut dd, cmd).await;
    assert_eq!(*server.queries.lock(), ["", "b", ""]);
    assert_eq!(dd.filtered().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn failure_empties_list_and_reports() {
    let server = FruitServer {
        fail: true,
        ..FruitServer::default()
    };
    let mut dd = Dropdown::new(remote(1).build().unwrap()).with_fetcher(server);
    dd.set_data(fruits());
    let events = open(&mut dd).await;
    assert!(matches!(events.as_slice(), [Message::Opened, Message::Failed(FetchError::Status(500))]));
    assert!(dd.data().is_empty());
    assert!(dd.filtered().is_empty());
    assert!(!dd.is_loading());
    assert_eq!(dd.phase(), Phase::Open);
    assert!(matches!(dd.describe().panel.map(|p| p.body), Some(PanelBody::Empty(_))));
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_dropped() {
    let scripted = Scripted {
        calls: AtomicUsize::new(0),
        batches: vec![
            vec![Item::new().with("id", 1).with("name", "Old")],
            vec![Item::new().with("id", 2).with("name", "New")],
        ],
    };
    let mut dd = Dropdown::new(remote(1).build().unwrap()).with_fetcher(scripted);
    let first = dd.refresh();
    let second = dd.refresh();

    let events = drive(&mut dd, second).await;
    assert!(matches!(events.as_slice(), [Message::Loaded(_)]));
    let events = drive(&mut dd, first).await;
    assert!(events.is_empty());
    assert_eq!(names(dd.data()), ["New"]);
}

#[tokio::test(start_paused = true)]
async fn loading_state_and_spinner_subscription() {
    let mut dd = Dropdown::new(remote(1).build().unwrap()).with_fetcher(FruitServer::default());
    assert!(dd.subscriptions().is_empty());
    let cmd = dd.open_dropdown();
    assert!(dd.is_loading());
    assert!(matches!(
        dd.describe().panel.map(|p| p.body),
        Some(PanelBody::Loading { ref text, .. }) if text == "Loading..."
    ));
    assert_eq!(dd.subscriptions().len(), 1);
    drive(&mut dd, cmd).await;
    assert!(dd.subscriptions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn destroy_releases_host_and_stops_everything() {
    let form = Form::new();
    let field = form.add_field(Field::new().with_id("fruit").with_name("fruit_id"));
    let host = HostBinding::attach(&form, field).unwrap();
    let config = DropdownConfig::builder()
        .with_remote_url("https://api.test/fruits")
        .build()
        .unwrap();
    let mut dd = Dropdown::from_shared(Arc::new(config), Some(host)).with_fetcher(FruitServer::default());

    let pending = dd.open_dropdown();
    assert!(form.field(field).unwrap().is_hidden());
    assert!(!dd.subscriptions().is_empty());

    dd.destroy();
    assert!(!form.field(field).unwrap().is_hidden());
    assert_eq!(form.mirror_value("fruit_id"), None);
    assert!(dd.subscriptions().is_empty());
    drive(&mut dd, pending).await;
    assert!(dd.data().is_empty());
    assert_eq!(dd.phase(), Phase::Closed);
    assert!(dd.update(key(KeyCode::Enter)).is_none());
    assert!(render(&dd, 20, 5).trim().is_empty());
}

#[tokio::test(start_paused = true)]
async fn selection_is_mirrored_to_host() {
    let form = Form::new();
    let field = form.add_field(Field::new().with_name("fruit"));
    let host = HostBinding::attach(&form, field).unwrap();
    let config = DropdownConfig::builder().with_data(fruits()).build().unwrap();
    let mut dd = Dropdown::from_shared(Arc::new(config), Some(host));

    let cmd = dd.set_value(3);
    drive(&mut dd, cmd).await;
    assert_eq!(form.submission(), vec![("fruit".to_string(), "3".to_string())]);
    dd.clear();
    assert_eq!(form.mirror_value("fruit").as_deref(), Some(""));
}

#[test]
fn direction_comes_from_host_when_auto() {
    let form = Form::new().with_direction(Direction::Rtl);
    let field = form.add_field(Field::new().with_id("x"));
    let host = HostBinding::attach(&form, field).unwrap();
    let dd = Dropdown::from_shared(Arc::new(DropdownConfig::default()), Some(host));
    assert_eq!(dd.direction(), Direction::Rtl);

    let forced = DropdownConfig::builder().with_rtl(RtlMode::Ltr).build().unwrap();
    let host = HostBinding::attach(&form, field).unwrap();
    let dd = Dropdown::from_shared(Arc::new(forced), Some(host));
    assert_eq!(dd.direction(), Direction::Ltr);
}

#[tokio::test(start_paused = true)]
async fn rtl_labels_are_tagged() {
    let mut dd = Dropdown::new(
        DropdownConfig::builder()
            .with_data([
                Item::new().with("id", 1).with("name", "تفاح"),
                Item::new().with("id", 2).with("name", "Apple"),
            ])
            .build()
            .unwrap(),
    );
    let cmd = dd.set_value(1);
    drive(&mut dd, cmd).await;
    open(&mut dd).await;
    let view = dd.describe();
    assert!(view.trigger.rtl);
    let Some(PanelView { body: PanelBody::Items(list), .. }) = view.panel else {
        panic!("expected items");
    };
    assert!(list.rows[0].rtl && list.rows[0].selected);
    assert!(!list.rows[1].rtl && !list.rows[1].selected);
}

#[tokio::test(start_paused = true)]
async fn rich_template_rows() {
    let mut dd = Dropdown::new(
        DropdownConfig::builder()
            .with_template(Template::Rich)
            .with_data([Item::new()
                .with("id", 1)
                .with("name", "alice")
                .with("title", "Alice Smith")
                .with("subtitle", "Engineering")
                .with("status", "Active")
                .with("image", "alice.png")])
            .build()
            .unwrap(),
    );
    open(&mut dd).await;
    type_text(&mut dd, "engin").await;
    let Some(PanelView { body: PanelBody::Items(list), .. }) = dd.describe().panel else {
        panic!("expected items");
    };
    let row = &list.rows[0];
    assert_eq!(row.label, "Alice Smith");
    assert_eq!(row.subtitle.as_deref(), Some("Engineering"));
    assert!(row.has_image);
    assert_eq!(row.badge.as_ref().map(|b| b.kind), Some(StatusKind::Success));
    let screen = render(&dd, 50, 12);
    assert!(screen.contains("Alice Smith"));
    assert!(screen.contains("Active"));
}

#[test]
fn scroll_window_is_capped_by_max_height() {
    let items: Vec<Item> = (0..20).map(|i| Item::new().with("id", i).with("name", format!("Item {i}"))).collect();
    let styles = Styles {
        max_height: 5,
        ..Styles::default()
    };
    let mut dd = Dropdown::new(DropdownConfig::builder().with_data(items).with_styles(styles).build().unwrap());
    dd.update(key(KeyCode::Enter));
    let Some(PanelView { body: PanelBody::Items(list), .. }) = dd.describe().panel else {
        panic!("expected items");
    };
    assert_eq!(list.rows.len(), 5);
    assert_eq!(list.total, 20);
}

#[test]
fn tall_max_height_renders_within_the_screen() {
    let items: Vec<Item> = (0..70_000u32)
        .map(|i| Item::new().with("id", i).with("name", format!("Item {i}")))
        .collect();
    let styles = Styles {
        max_height: u16::MAX,
        ..Styles::default()
    };
    let mut dd = Dropdown::new(DropdownConfig::builder().with_data(items).with_styles(styles).build().unwrap());
    dd.update(key(KeyCode::Enter));

    let screen = render(&dd, 30, 20);
    assert!(screen.contains("Item 0"));
    assert!(!screen.contains("Item 19 "));
}
