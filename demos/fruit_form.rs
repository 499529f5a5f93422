//! # Fruit Form Example
//!
//! Two dropdowns bound to fields of one host form:
//! - A rich-template fruit picker with status badges and an add-new row
//! - A city picker with Arabic labels, laid out right to left
//! - The form submission shown live in the footer
//!
//! Run with: `cargo run --example fruit_form`

use sift::crossterm::event::{KeyCode, KeyModifiers};
use sift::ratatui::layout::{Alignment, Constraint, Layout};
use sift::ratatui::style::{Color, Style};
use sift::ratatui::text::{Line, Span};
use sift::ratatui::widgets::{Block, Borders, Paragraph};
use sift::ratatui::Frame;
use sift::widgets::dropdown::{GroupMessage, Message, Template};
use sift::widgets::{DropdownConfig, DropdownGroup, Field, Form, Item};
use sift::{terminal_events, Command, Component, Model, Subscription, TerminalEvent};

struct FruitForm {
    form: Form,
    fruit: DropdownGroup,
    city: DropdownGroup,
    focus: Slot,
    status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Fruit,
    City,
}

impl Slot {
    fn other(self) -> Slot {
        match self {
            Slot::Fruit => Slot::City,
            Slot::City => Slot::Fruit,
        }
    }

    fn wrap(self) -> fn(GroupMessage) -> Msg {
        match self {
            Slot::Fruit => Msg::Fruit,
            Slot::City => Msg::City,
        }
    }
}

#[derive(Debug)]
enum Msg {
    Terminal(TerminalEvent),
    Fruit(GroupMessage),
    City(GroupMessage),
}

fn fruit(id: u32, title: &str, origin: &str, status: &str) -> Item {
    Item::new()
        .with("id", id)
        .with("name", title)
        .with("title", title)
        .with("subtitle", origin)
        .with("status", status)
}

fn city(id: u32, name: &str) -> Item {
    Item::new().with("id", id).with("name", name)
}

impl FruitForm {
    fn group(&mut self, slot: Slot) -> &mut DropdownGroup {
        match slot {
            Slot::Fruit => &mut self.fruit,
            Slot::City => &mut self.city,
        }
    }

    fn route(&mut self, slot: Slot, msg: GroupMessage) -> Command<Msg> {
        if let Some((_, event)) = msg.event() {
            self.status = describe(event);
        }
        if let (Slot::Fruit, Some((_, Message::AddRequested(text)))) = (slot, msg.event()) {
            let next = self.fruit.instances().first().map_or(0, |d| d.data().len()) as u32 + 1;
            let added = fruit(next, text, "Added by you", "New");
            let cmd = self.fruit.add_item(added, true);
            return cmd.map(Msg::Fruit);
        }
        self.group(slot).update(msg).map(slot.wrap())
    }

    /// The field a click belongs to. An open panel covers the other
    /// field's trigger, so panels are checked before triggers.
    fn click_owner(&self, column: u16, row: u16) -> Option<Slot> {
        let panel = |group: &DropdownGroup| group.instances().iter().any(|d| d.hit_panel(column, row));
        let trigger = |group: &DropdownGroup| group.instances().iter().any(|d| d.hit_trigger(column, row));
        [Slot::Fruit, Slot::City]
            .into_iter()
            .find(|slot| panel(self.group_ref(*slot)))
            .or_else(|| [Slot::Fruit, Slot::City].into_iter().find(|slot| trigger(self.group_ref(*slot))))
    }

    fn group_ref(&self, slot: Slot) -> &DropdownGroup {
        match slot {
            Slot::Fruit => &self.fruit,
            Slot::City => &self.city,
        }
    }

    fn panel_open(&self) -> bool {
        [&self.fruit, &self.city]
            .iter()
            .any(|group| group.instances().iter().any(|d| d.phase().is_visible()))
    }
}

fn describe(event: &Message) -> String {
    match event {
        Message::Changed { value, .. } => format!("changed to {value}"),
        Message::Searched(text) => format!("searching \"{text}\""),
        Message::AddRequested(text) => format!("added \"{text}\""),
        other => format!("{other:?}"),
    }
}

impl Model for FruitForm {
    type Message = Msg;
    type Flags = ();

    fn init(_: ()) -> (Self, Command<Msg>) {
        let form = Form::new();
        form.add_field(Field::new().with_id("fruit").with_name("fruit"));
        form.add_field(Field::new().with_id("city").with_name("city").with_class("rtl"));

        let fruit_config = DropdownConfig::builder()
            .with_selector("#fruit")
            .with_placeholder("Pick a fruit")
            .with_template(Template::Rich)
            .with_add_button(true)
            .with_data([
                fruit(1, "Apple", "Washington", "Active"),
                fruit(2, "Banana", "Ecuador", "Pending"),
                fruit(3, "Cherry", "Michigan", "Inactive"),
                fruit(4, "Durian", "Thailand", "Unknown"),
                fruit(5, "Pineapple", "Costa Rica", "Active"),
            ])
            .build();
        let city_config = DropdownConfig::builder()
            .with_selector(".rtl")
            .with_placeholder("اختر مدينة")
            .with_search_placeholder("بحث...")
            .with_no_results_text("لا توجد نتائج")
            .with_data([
                city(1, "القاهرة"),
                city(2, "دبي"),
                city(3, "الرياض"),
                city(4, "عمّان"),
            ])
            .build();

        let (fruit, city) = match (fruit_config, city_config) {
            (Ok(a), Ok(b)) => (DropdownGroup::attach(&form, a), DropdownGroup::attach(&form, b)),
            (Err(err), _) | (_, Err(err)) => {
                let status = format!("invalid configuration: {err}");
                let app = FruitForm {
                    form,
                    fruit: DropdownGroup::default(),
                    city: DropdownGroup::default(),
                    focus: Slot::Fruit,
                    status,
                };
                return (app, Command::none());
            }
        };

        let app = FruitForm {
            form,
            fruit,
            city,
            focus: Slot::Fruit,
            status: "ready".to_string(),
        };
        (app, Command::none())
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Terminal(event) => {
                if let Some(key) = event.key_press() {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Command::quit();
                    }
                    if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) && !self.panel_open() {
                        self.focus = self.focus.other();
                        return Command::none();
                    }
                }
                let Some(msg) = GroupMessage::from_terminal(&event) else {
                    return Command::none();
                };
                if let GroupMessage::Click { column, row } = msg {
                    let Some(owner) = self.click_owner(column, row) else {
                        let fruit = self.route(Slot::Fruit, msg.clone());
                        let city = self.route(Slot::City, msg);
                        return Command::batch([fruit, city]);
                    };
                    self.focus = owner;
                    let other = owner.other();
                    let closed = self.group(other).close_dropdown().map(other.wrap());
                    return Command::batch([closed, self.route(owner, msg)]);
                }
                self.route(self.focus, msg)
            }
            Msg::Fruit(msg) => self.route(Slot::Fruit, msg),
            Msg::City(msg) => self.route(Slot::City, msg),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(4),
        ])
        .areas(frame.area());

        let title = Paragraph::new("Order form")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
        frame.render_widget(title, header);

        let [fruit_area, _, city_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(body);

        // Whichever panel is open paints last.
        let fruit_open = self.fruit.instances().iter().any(|d| d.phase().is_visible());
        if fruit_open {
            self.city.view(frame, city_area);
            self.fruit.view(frame, fruit_area);
        } else {
            self.fruit.view(frame, fruit_area);
            self.city.view(frame, city_area);
        }

        let submission = self
            .form
            .submission()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        let help = Paragraph::new(vec![
            Line::from(vec![Span::styled("submit ", Style::default().fg(Color::DarkGray)), Span::raw(submission)]),
            Line::from(vec![
                Span::styled("tab", Style::default().fg(Color::Cyan)),
                Span::raw(" switch field  "),
                Span::styled("ctrl+c", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" quit  |  {}", self.status)),
            ]),
        ])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(help, footer);
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = vec![terminal_events(|event| Some(Msg::Terminal(event)))];
        subs.extend(self.fruit.subscriptions().into_iter().map(|sub| sub.map(Msg::Fruit)));
        subs.extend(self.city.subscriptions().into_iter().map(|sub| sub.map(Msg::City)));
        subs
    }
}

#[sift::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    sift::run::<FruitForm>(()).await?;
    Ok(())
}
