//! # Remote Search Example
//!
//! A dropdown whose items come from an HTTP search endpoint:
//! - Debounced queries sent as `?q=...`
//! - Items read from the `products` key of the response
//! - A spinner while a request is in flight, and stale responses dropped
//!
//! Pass another endpoint as the first argument. Logs go to `sift.log`;
//! raise the level with `RUST_LOG=sift_widgets=debug`.
//!
//! Run with: `cargo run --example remote_search`

use sift::crossterm::event::{KeyCode, KeyModifiers};
use sift::ratatui::layout::{Constraint, Layout};
use sift::ratatui::style::{Color, Style};
use sift::ratatui::text::{Line, Span};
use sift::ratatui::widgets::Paragraph;
use sift::ratatui::Frame;
use sift::widgets::dropdown::{Dropdown, DropdownConfig, Message};
use sift::{terminal_events, Command, Component, Model, Subscription, TerminalEvent};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://dummyjson.com/products/search";

struct RemoteSearch {
    dropdown: Option<Dropdown>,
    status: String,
}

#[derive(Debug)]
enum Msg {
    Terminal(TerminalEvent),
    Dropdown(Message),
}

impl Model for RemoteSearch {
    type Message = Msg;
    type Flags = String;

    fn init(endpoint: String) -> (Self, Command<Msg>) {
        let config = DropdownConfig::builder()
            .with_remote_url(endpoint)
            .with_remote_search_param("q")
            .with_remote_data_key("products")
            .with_label_key("title")
            .with_placeholder("Search products")
            .with_min_search_length(2)
            .with_debounce_delay(Duration::from_millis(250))
            .build();
        let app = match config {
            Ok(config) => RemoteSearch {
                dropdown: Some(Dropdown::new(config)),
                status: "type at least two characters".to_string(),
            },
            Err(err) => RemoteSearch {
                dropdown: None,
                status: format!("invalid configuration: {err}"),
            },
        };
        (app, Command::none())
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        let Some(dropdown) = self.dropdown.as_mut() else {
            return Command::quit();
        };
        let msg = match msg {
            Msg::Terminal(event) => {
                if let Some(key) = event.key_press() {
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Command::quit();
                    }
                    Message::Key(key)
                } else if let Some((column, row)) = event.left_click() {
                    Message::Click { column, row }
                } else if let TerminalEvent::Paste(text) = event {
                    Message::Paste(text)
                } else {
                    return Command::none();
                }
            }
            Msg::Dropdown(msg) => msg,
        };
        match &msg {
            Message::Loaded(items) => self.status = format!("{} results", items.len()),
            Message::Failed(err) => self.status = format!("search failed: {err}"),
            Message::Changed { item, .. } => {
                self.status = format!("picked {}", item.text("title").unwrap_or_default());
            }
            _ => {}
        }
        dropdown.update(msg).map(Msg::Dropdown)
    }

    fn view(&self, frame: &mut Frame) {
        let [body, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        if let Some(dropdown) = &self.dropdown {
            dropdown.view(frame, body);
        }
        let mut spans = vec![Span::styled(self.status.as_str(), Style::default().fg(Color::Yellow))];
        if let Some(dropdown) = &self.dropdown {
            let open = dropdown.phase().is_interactive();
            for hint in dropdown.keys().hints(open) {
                spans.push(Span::styled(format!("  {hint}"), Style::default().fg(Color::DarkGray)));
            }
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), footer);
    }

    fn subscriptions(&self) -> Vec<Subscription<Msg>> {
        let mut subs = vec![terminal_events(|event| Some(Msg::Terminal(event)))];
        if let Some(dropdown) = &self.dropdown {
            subs.extend(dropdown.subscriptions().into_iter().map(|sub| sub.map(Msg::Dropdown)));
        }
        subs
    }
}

#[sift::tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    sift::log_to_file("sift.log")?;
    let endpoint = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    sift::run::<RemoteSearch>(endpoint).await?;
    Ok(())
}
