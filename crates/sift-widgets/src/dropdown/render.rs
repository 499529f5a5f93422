//! Turning dropdown state into something on screen, in two steps.
//!
//! [`Dropdown::describe`] is a pure function of state that yields a
//! [`DropdownView`]: what the trigger says, whether the panel is up, and which
//! single body state it shows. [`paint`] lays that description out with
//! ratatui and records where everything landed, for mouse hit-testing.

use super::config::{Styles, Template, Theme};
use super::item::Item;
use super::rtl::{contains_rtl, Direction};
use super::status::StatusKind;
use super::{Dropdown, Focus, Geometry};
use crate::runeutil::{display_width, sanitize, truncate};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use ratatui::Frame;
use std::cell::Cell;

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Everything a frame of the dropdown shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DropdownView {
    /// Resolved panel direction.
    pub direction: Direction,
    pub trigger: TriggerView,
    /// Present while the panel is opening, open, or closing.
    pub panel: Option<PanelView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerView {
    /// Selected label, or the placeholder.
    pub text: String,
    pub is_placeholder: bool,
    /// The text contains right-to-left script.
    pub rtl: bool,
    pub focused: bool,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    /// False while closing: the panel is still drawn but no longer hit-tested.
    pub interactive: bool,
    pub search: SearchBox,
    pub body: PanelBody,
    pub add_row: Option<AddRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBox {
    pub text: String,
    pub placeholder: String,
    /// Cursor as a char index into `text`.
    pub cursor: usize,
    pub focused: bool,
}

/// Exactly one of these is shown below the search box.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    Loading { text: String, frame: usize },
    Empty(String),
    Items(ItemList),
}

/// The scroll window of the filtered items.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemList {
    pub rows: Vec<ItemRow>,
    /// Index of the first row within the filtered items.
    pub offset: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    /// Index within the filtered items.
    pub index: usize,
    /// Label (default template) or title (rich template).
    pub label: String,
    pub subtitle: Option<String>,
    pub has_image: bool,
    pub badge: Option<Badge>,
    pub rtl: bool,
    pub selected: bool,
    pub focused: bool,
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub kind: StatusKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRow {
    pub icon: String,
    pub label: String,
    pub focused: bool,
}

impl Dropdown {
    /// Describe what the dropdown shows right now.
    pub fn describe(&self) -> DropdownView {
        let config = &self.config;
        let label = self
            .store
            .selected()
            .and_then(|item| item.text(&config.label_key).or_else(|| item.text(&config.value_key)));
        let trigger = match label {
            Some(text) => TriggerView {
                rtl: contains_rtl(&text),
                text,
                is_placeholder: false,
                focused: self.focus == Focus::Trigger,
                expanded: self.phase.is_interactive(),
            },
            None => TriggerView {
                rtl: contains_rtl(&config.placeholder),
                text: config.placeholder.clone(),
                is_placeholder: true,
                focused: self.focus == Focus::Trigger,
                expanded: self.phase.is_interactive(),
            },
        };

        let panel = self.phase.is_visible().then(|| PanelView {
            interactive: self.phase.is_interactive(),
            search: SearchBox {
                text: self.search.value(),
                placeholder: config.search_placeholder.clone(),
                cursor: self.search.cursor(),
                focused: self.focus == Focus::Search,
            },
            body: self.describe_body(),
            add_row: config.add_button.then(|| AddRow {
                icon: config.add_button_icon.clone(),
                label: config.add_button_label.clone(),
                focused: self.focus == Focus::AddButton,
            }),
        });

        DropdownView {
            direction: self.direction,
            trigger,
            panel,
        }
    }

    fn describe_body(&self) -> PanelBody {
        if self.store.is_loading() {
            return PanelBody::Loading {
                text: self.config.loading_text.clone(),
                frame: self.spinner_frame,
            };
        }
        let filtered = self.store.filtered();
        if filtered.is_empty() {
            return PanelBody::Empty(self.config.no_results_text.clone());
        }
        let window = self.cursor.window();
        PanelBody::Items(ItemList {
            offset: window.start,
            total: filtered.len(),
            rows: window
                .map(|index| self.describe_row(index, &filtered[index]))
                .collect(),
        })
    }

    fn describe_row(&self, index: usize, item: &Item) -> ItemRow {
        let config = &self.config;
        let label = item.text(&config.label_key).unwrap_or_default();
        let (label, subtitle, badge, has_image) = match config.template {
            Template::Default => (label, None, None, false),
            Template::Rich => (
                item.text(&config.title_key).unwrap_or(label),
                item.text(&config.subtitle_key),
                item.text(&config.status_key).map(|text| Badge {
                    kind: StatusKind::classify(&text),
                    text,
                }),
                item.text(&config.image_key).is_some(),
            ),
        };
        let selected = match (self.value(), item.get(&config.value_key)) {
            (Some(current), Some(own)) => current == own,
            _ => false,
        };
        ItemRow {
            index,
            rtl: contains_rtl(&label) || subtitle.as_deref().is_some_and(contains_rtl),
            label,
            subtitle,
            has_image,
            badge,
            selected,
            focused: self.focus == Focus::List && self.cursor.cursor() == index,
            item: item.clone(),
        }
    }
}

struct Palette {
    border: Color,
    accent: Color,
    text: Style,
    muted: Style,
    highlight: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                border: Color::Gray,
                accent: Color::Blue,
                text: Style::default(),
                muted: Style::default().fg(Color::DarkGray),
                highlight: Style::default().fg(Color::White).bg(Color::Blue),
            },
            Theme::Dark => Self {
                border: Color::DarkGray,
                accent: Color::Cyan,
                text: Style::default().fg(Color::White),
                muted: Style::default().fg(Color::Gray),
                highlight: Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            },
        }
    }
}

fn block(styles: &Styles, border: Color) -> Block<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    if styles.border_radius > 0 {
        block.border_type(BorderType::Rounded)
    } else {
        block
    }
}

fn text_alignment(direction: Direction, rtl_text: bool) -> Alignment {
    if rtl_text {
        Alignment::Right
    } else {
        direction.alignment()
    }
}

/// Paint `view` with the trigger at the top of `area` and the panel as an
/// overlay just below it (above, when there is no room below). The layout is
/// written to `geometry`.
pub(crate) fn paint(
    frame: &mut Frame,
    area: Rect,
    view: &DropdownView,
    styles: &Styles,
    geometry: &Cell<Geometry>,
) {
    let palette = Palette::for_theme(styles.theme);
    let width = styles.width.map_or(area.width, |w| w.min(area.width));
    let x = if view.direction.is_rtl() {
        area.right().saturating_sub(width)
    } else {
        area.x
    };
    let trigger_area = Rect::new(x, area.y, width, area.height.min(3));
    let mut layout = Geometry {
        trigger: trigger_area,
        ..Geometry::default()
    };

    paint_trigger(frame, trigger_area, &view.trigger, view.direction, styles, &palette);

    if let Some(panel) = &view.panel {
        paint_panel(frame, trigger_area, panel, view.direction, styles, &palette, &mut layout);
    }
    geometry.set(layout);
}

fn paint_trigger(
    frame: &mut Frame,
    area: Rect,
    trigger: &TriggerView,
    direction: Direction,
    styles: &Styles,
    palette: &Palette,
) {
    if area.width < 3 || area.height == 0 {
        return;
    }
    let inner = if area.height >= 3 {
        let border = if trigger.focused || trigger.expanded {
            palette.accent
        } else {
            palette.border
        };
        let block = block(styles, border);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        inner
    } else {
        area
    };

    let arrow = if trigger.expanded { "▴" } else { "▾" };
    let text_width = inner.width.saturating_sub(2) as usize;
    let text = truncate(&sanitize(&trigger.text), text_width, "…");
    let style = if trigger.is_placeholder {
        palette.muted
    } else {
        palette.text
    };
    let (text_area, arrow_area) = if direction.is_rtl() {
        (
            Rect { x: inner.x + 2, width: inner.width.saturating_sub(2), ..inner },
            Rect { width: 1.min(inner.width), ..inner },
        )
    } else {
        (
            Rect { width: inner.width.saturating_sub(2), ..inner },
            Rect { x: inner.right().saturating_sub(1), width: 1.min(inner.width), ..inner },
        )
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, style)).alignment(text_alignment(direction, trigger.rtl)),
        text_area,
    );
    frame.render_widget(Paragraph::new(Span::styled(arrow, palette.muted)), arrow_area);
}

fn paint_panel(
    frame: &mut Frame,
    trigger: Rect,
    panel: &PanelView,
    direction: Direction,
    styles: &Styles,
    palette: &Palette,
    layout: &mut Geometry,
) {
    let screen = frame.area();
    // More rows than the screen holds are clipped anyway.
    let body_rows = match &panel.body {
        PanelBody::Items(list) => saturate_u16(list.rows.len().max(1)).min(screen.height),
        _ => 1,
    };
    let add_rows = u16::from(panel.add_row.is_some());
    let wanted = body_rows.saturating_add(3 + add_rows);

    let below = screen.bottom().saturating_sub(trigger.bottom());
    let (y, height) = if wanted <= below {
        (trigger.bottom(), wanted)
    } else if wanted <= trigger.y.saturating_sub(screen.y) {
        (trigger.y - wanted, wanted)
    } else {
        (trigger.bottom(), below)
    };
    let panel_area = Rect::new(trigger.x, y, trigger.width, height);
    if panel_area.height < 4 || panel_area.width < 6 {
        return;
    }

    frame.render_widget(Clear, panel_area);
    let border = if panel.interactive { palette.accent } else { palette.border };
    let mut panel_block = block(styles, border);
    if let PanelBody::Items(list) = &panel.body {
        if list.total > list.rows.len() {
            let position = list
                .rows
                .iter()
                .find(|row| row.focused)
                .map_or(list.offset, |row| row.index)
                + 1;
            panel_block = panel_block.title_bottom(
                Line::from(Span::styled(format!(" {position}/{} ", list.total), palette.muted))
                    .alignment(Alignment::Right),
            );
        }
    }
    let inner = panel_block.inner(panel_area);
    frame.render_widget(panel_block, panel_area);

    let search_area = Rect { height: 1, ..inner };
    let add_area = Rect {
        y: inner.bottom().saturating_sub(add_rows),
        height: add_rows,
        ..inner
    };
    let list_area = Rect {
        y: inner.y + 1,
        height: inner.height.saturating_sub(1 + add_rows),
        ..inner
    };

    paint_search(frame, search_area, &panel.search, direction, palette);
    let pad = styles.item_padding;
    match &panel.body {
        PanelBody::Loading { text, frame: tick } => {
            let spinner = SPINNER[tick % SPINNER.len()];
            let line = Line::from(vec![
                Span::styled(format!("{spinner} "), Style::default().fg(palette.accent)),
                Span::styled(text.clone(), palette.muted),
            ]);
            frame.render_widget(
                Paragraph::new(line).alignment(direction.alignment()),
                padded(list_area, pad, 1),
            );
        }
        PanelBody::Empty(text) => {
            frame.render_widget(
                Paragraph::new(Span::styled(text.clone(), palette.muted)).alignment(direction.alignment()),
                padded(list_area, pad, 1),
            );
        }
        PanelBody::Items(list) => {
            for (i, row) in list.rows.iter().take(list_area.height as usize).enumerate() {
                let row_area = Rect {
                    y: list_area.y + i as u16,
                    height: 1,
                    ..list_area
                };
                paint_row(frame, row_area, row, direction, pad, palette);
            }
            layout.list = Rect {
                height: list_area.height.min(saturate_u16(list.rows.len())),
                ..list_area
            };
            layout.offset = list.offset;
        }
    }

    if let Some(add) = &panel.add_row {
        let style = if add.focused {
            palette.highlight
        } else {
            Style::default().fg(palette.accent)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!("{} {}", add.icon, add.label), style))
                .alignment(direction.alignment()),
            padded(add_area, pad, 1),
        );
        layout.add = add_area;
    }

    layout.panel = panel_area;
    layout.search = search_area;
    layout.interactive = panel.interactive;
}

fn saturate_u16(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn padded(area: Rect, pad: u16, height: u16) -> Rect {
    let pad = pad.min(area.width / 4);
    Rect {
        x: area.x + pad,
        width: area.width.saturating_sub(pad * 2),
        height: height.min(area.height),
        ..area
    }
}

fn paint_search(frame: &mut Frame, area: Rect, search: &SearchBox, direction: Direction, palette: &Palette) {
    let mut spans = vec![Span::styled("⌕ ", palette.muted)];
    if search.text.is_empty() {
        if search.focused {
            spans.push(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
        }
        spans.push(Span::styled(search.placeholder.clone(), palette.muted));
    } else {
        let chars: Vec<char> = search.text.chars().collect();
        let cursor = search.cursor.min(chars.len());
        let before: String = chars[..cursor].iter().collect();
        spans.push(Span::styled(before, palette.text));
        if search.focused {
            let at = chars.get(cursor).map_or(" ".to_string(), char::to_string);
            spans.push(Span::styled(at, palette.text.add_modifier(Modifier::REVERSED)));
            let after: String = chars.iter().skip(cursor + 1).collect();
            spans.push(Span::styled(after, palette.text));
        } else {
            let after: String = chars[cursor..].iter().collect();
            spans.push(Span::styled(after, palette.text));
        }
    }
    let alignment = text_alignment(direction, contains_rtl(&search.text));
    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(alignment), area);
}

fn paint_row(frame: &mut Frame, area: Rect, row: &ItemRow, direction: Direction, pad: u16, palette: &Palette) {
    let base = if row.focused { palette.highlight } else { palette.text };
    frame.render_widget(Paragraph::new("").style(base), area);
    let area = padded(area, pad, 1);

    let badge = row.badge.as_ref().map(|badge| {
        Span::styled(
            format!(" {} ", sanitize(&badge.text)),
            Style::default().fg(Color::Black).bg(badge.kind.color()),
        )
    });
    let badge_width = badge
        .as_ref()
        .map_or(0, |span| saturate_u16(display_width(&span.content)).saturating_add(1))
        .min(area.width);

    let marker = if row.selected { "✓ " } else { "  " };
    let image = if row.has_image { "▣ " } else { "" };
    let budget = area
        .width
        .saturating_sub(badge_width)
        .saturating_sub((display_width(marker) + display_width(image)) as u16) as usize;
    let label = truncate(&sanitize(&row.label), budget, "…");
    let mut spans = vec![Span::styled(marker, base), Span::styled(image, base), Span::styled(label.clone(), base)];
    if let Some(subtitle) = &row.subtitle {
        let room = budget.saturating_sub(display_width(&label) + 3);
        if room > 1 {
            let muted = if row.focused { base } else { palette.muted };
            spans.push(Span::styled(format!(" · {}", truncate(&sanitize(subtitle), room, "…")), muted));
        }
    }

    let rtl_row = row.rtl || direction.is_rtl();
    let (text_area, badge_area) = if rtl_row {
        (
            Rect { x: area.x + badge_width, width: area.width - badge_width, ..area },
            Rect { width: badge_width, ..area },
        )
    } else {
        (
            Rect { width: area.width.saturating_sub(badge_width), ..area },
            Rect { x: area.right() - badge_width, width: badge_width, ..area },
        )
    };
    let alignment = if rtl_row { Alignment::Right } else { Alignment::Left };
    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(alignment), text_area);
    if let Some(badge) = badge {
        frame.render_widget(Paragraph::new(badge).alignment(alignment), badge_area);
    }
}
