use crate::api::TaskApi;
use crate::bindings::{Bindings, CardTarget};
use crate::controller::{Controller, FormField, NoticeKind, TaskForm};
use crate::render::{render_board, CardAction, CardView, ColumnBody, ColumnView};
use crate::task::{Status, TaskId};
use chrono::{DateTime, Utc};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const MAX_DESCRIPTION_LINES: usize = 3;
const HELP: &str = concat!(
    "a add · e edit · d delete · s/c/t/u move · r reload · ",
    "←→↑↓ select · drag cards with the mouse · q quit"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Board,
    Adding,
}

/// A left-button press on a card that may turn into a drag.
#[derive(Debug, Clone, Copy)]
struct Press {
    task_id: TaskId,
    dragged: bool,
}

pub struct App<A> {
    controller: Controller<A>,
    bindings: Bindings,
    mode: Mode,
    press: Option<Press>,
    should_quit: bool,
}

impl<A: TaskApi> App<A> {
    pub fn new(controller: Controller<A>) -> Self {
        Self {
            controller,
            bindings: Bindings::default(),
            mode: Mode::Board,
            press: None,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &Controller<A> {
        &self.controller
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn draw(&mut self, f: &mut Frame, now: DateTime<Utc>, instant: Instant) {
        self.bindings.clear();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        draw_add_form(f, chunks[0], self.controller.add_form(), self.mode == Mode::Adding);

        let view = render_board(self.controller.tasks(), now);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Percentage(33),
                Constraint::Percentage(33),
                Constraint::Percentage(34),
            ])
            .split(chunks[1]);
        for (i, column) in view.columns.iter().enumerate() {
            self.draw_column(f, columns[i], column);
        }

        draw_status_line(f, chunks[2], &self.controller, instant);

        if let Some(edit) = self.controller.edit_form() {
            draw_edit_modal(f, edit.id, &edit.form);
        }
        if self.controller.pending_delete().is_some() {
            draw_confirm(f);
        }
    }

    fn draw_column(&mut self, f: &mut Frame, area: Rect, column: &ColumnView) {
        let board = self.controller.board();
        let is_selected = board.selected_status() == column.status;
        let drag = self.controller.drag();
        let is_drop_target = drag.and_then(|d| d.over) == Some(column.status);

        let border_style = if is_drop_target {
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(
                    format!(" {} ", column.heading),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("({}) ", column.count),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);
        self.bindings.bind_column(column.status, area);

        let cards = match &column.body {
            ColumnBody::Empty(placeholder) => {
                let placeholder = Paragraph::new(*placeholder)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray));
                let row = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1)
                    .intersection(inner);
                f.render_widget(placeholder, row);
                return;
            }
            ColumnBody::Cards(cards) => cards,
        };

        let selected = if is_selected {
            board
                .selected_task_id()
                .and_then(|id| cards.iter().position(|c| c.id == id))
        } else {
            None
        };
        let dragged = drag.map(|d| d.task_id);

        let start = scroll_start(cards, selected, inner.height);
        let mut y = inner.y;
        for (offset, card) in cards[start..].iter().enumerate() {
            let height = card_height(card);
            if y + height > inner.bottom() {
                break;
            }
            let style = if dragged == Some(card.id) {
                Style::default().fg(Color::DarkGray)
            } else if selected == Some(start + offset) {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let card_area = Rect::new(inner.x, y, inner.width, height);
            draw_card(f, card_area, card, style, &mut self.bindings);
            y += height;
        }
    }

    pub async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key).await,
            Event::Mouse(mouse) => self.handle_mouse(mouse).await,
            _ => {}
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if self.controller.pending_delete().is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.controller.confirm_delete().await,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.controller.cancel_delete()
                }
                _ => {}
            }
            return;
        }

        if let Some(edit) = self.controller.edit_form_mut() {
            match key.code {
                KeyCode::Esc => self.controller.close_edit(),
                KeyCode::Enter => self.controller.submit_edit().await,
                KeyCode::Tab | KeyCode::BackTab => edit.form.toggle_focus(),
                KeyCode::Backspace => edit.form.backspace(),
                KeyCode::Char(c) => edit.form.push_char(c),
                _ => {}
            }
            return;
        }

        if self.mode == Mode::Adding {
            let form = self.controller.add_form_mut();
            match key.code {
                KeyCode::Esc => self.mode = Mode::Board,
                KeyCode::Enter => {
                    let before = form.clone();
                    self.controller.submit_new_task().await;
                    // the form is only cleared when the task was created
                    if *self.controller.add_form() != before {
                        self.mode = Mode::Board;
                    }
                }
                KeyCode::Tab | KeyCode::BackTab => form.toggle_focus(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) => form.push_char(c),
                _ => {}
            }
            return;
        }

        let board = self.controller.board_mut();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') => self.mode = Mode::Adding,
            KeyCode::Char('r') => self.controller.load().await,
            KeyCode::Left => board.select_left(),
            KeyCode::Right => board.select_right(),
            KeyCode::Up => board.select_up(),
            KeyCode::Down => board.select_down(),
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = board.selected_task_id() {
                    self.controller.open_edit(id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = board.selected_task_id() {
                    self.controller.request_delete(id);
                }
            }
            KeyCode::Char(c) => {
                let target = board.selected_task().and_then(|task| {
                    crate::render::move_buttons(task.status)
                        .into_iter()
                        .find(|b| b.hotkey == c)
                        .map(|b| (task.id, b.target))
                });
                if let Some((id, status)) = target {
                    self.controller.move_task(id, status).await;
                }
            }
            _ => {}
        }
    }

    async fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.controller.pending_delete().is_some() || self.controller.edit_form().is_some() {
            return;
        }
        let (x, y) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // a release outside the window never reaches us; drop any stale drag
                if self.press.take().is_some() {
                    self.controller.drag_end();
                }
                match self.bindings.task_at(x, y) {
                    Some((id, CardTarget::Action(action))) => self.run_action(id, action).await,
                    Some((id, CardTarget::Title)) => self.controller.open_edit(id),
                    Some((id, CardTarget::Card)) => {
                        self.controller.board_mut().select(id);
                        self.press = Some(Press {
                            task_id: id,
                            dragged: false,
                        });
                    }
                    None => {}
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(press) = self.press.as_mut() {
                    if !press.dragged {
                        press.dragged = true;
                        self.controller.drag_start(press.task_id);
                    }
                    let over = self.bindings.column_at(x, y);
                    self.controller.drag_over(over);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(press) = self.press.take() else {
                    return;
                };
                if !press.dragged {
                    return;
                }
                match self.bindings.column_at(x, y) {
                    Some(column) => self.controller.drop_on(column).await,
                    None => self.controller.drag_end(),
                }
            }
            _ => {}
        }
    }

    async fn run_action(&mut self, id: TaskId, action: CardAction) {
        match action {
            CardAction::Edit => self.controller.open_edit(id),
            CardAction::Delete => self.controller.request_delete(id),
            CardAction::Move(status) => self.controller.move_task(id, status).await,
        }
    }
}

pub async fn run_app<B: Backend, A: TaskApi>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
) -> io::Result<()> {
    app.controller.load().await;
    loop {
        let instant = Instant::now();
        app.controller.expire_notification(instant);
        terminal.draw(|f| app.draw(f, Utc::now(), instant))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(250))? {
            let event = event::read()?;
            app.handle_event(event).await;
        }
    }
}

fn card_height(card: &CardView) -> u16 {
    // borders + title + description + date + buttons
    2 + 1 + card.description.len().min(MAX_DESCRIPTION_LINES) as u16 + 2
}

/// First card to draw so that the selected one stays on screen.
fn scroll_start(cards: &[CardView], selected: Option<usize>, height: u16) -> usize {
    let Some(selected) = selected else {
        return 0;
    };
    let mut start = 0;
    while start < selected {
        let needed: u16 = cards[start..=selected].iter().map(card_height).sum();
        if needed <= height {
            break;
        }
        start += 1;
    }
    start
}

fn draw_card(f: &mut Frame, area: Rect, card: &CardView, border: Style, bindings: &mut Bindings) {
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(area);
    f.render_widget(block, area);
    bindings.bind_task(card.id, area, CardTarget::Card);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let edit = Span::styled("[Edit]", Style::default().fg(Color::Blue));
    let delete = Span::styled("[Del]", Style::default().fg(Color::Red));
    let actions_width = (edit.width() + 1 + delete.width()) as u16;
    let title_width = inner.width.saturating_sub(actions_width + 1);

    let title_area = Rect::new(inner.x, inner.y, title_width, 1);
    f.render_widget(
        Paragraph::new(Span::styled(
            card.title.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        title_area,
    );
    bindings.bind_task(card.id, title_area, CardTarget::Title);

    let mut row = Row::new(inner, inner.y, inner.x + title_width + 1);
    row.button(f, bindings, card.id, edit, CardAction::Edit);
    row.button(f, bindings, card.id, delete, CardAction::Delete);

    let mut y = inner.y + 1;
    for line in card.description.iter().take(MAX_DESCRIPTION_LINES) {
        f.render_widget(
            Paragraph::new(line.as_str()).style(Style::default().fg(Color::Gray)),
            Rect::new(inner.x, y, inner.width, 1).intersection(inner),
        );
        y += 1;
    }

    f.render_widget(
        Paragraph::new(card.created.as_str()).style(Style::default().fg(Color::DarkGray)),
        Rect::new(inner.x, y, inner.width, 1).intersection(inner),
    );

    let mut row = Row::new(inner, y + 1, inner.x);
    for button in &card.moves {
        let style = match button.target {
            Status::Done => Style::default().fg(Color::Green),
            Status::InProgress => Style::default().fg(Color::Blue),
            Status::Todo => Style::default().fg(Color::Gray),
        };
        let span = Span::styled(format!("[{}] {}", button.hotkey, button.label), style);
        row.button(f, bindings, card.id, span, CardAction::Move(button.target));
    }
}

/// Lays buttons out left to right on one line of a card, dropping any that don't fit.
struct Row {
    y: u16,
    x: u16,
    right: u16,
    bottom: u16,
}

impl Row {
    fn new(inner: Rect, y: u16, x: u16) -> Self {
        Self {
            y,
            x,
            right: inner.right(),
            bottom: inner.bottom(),
        }
    }

    fn button(
        &mut self,
        f: &mut Frame,
        bindings: &mut Bindings,
        id: TaskId,
        span: Span<'_>,
        action: CardAction,
    ) {
        let width = span.width() as u16;
        if self.y >= self.bottom || self.x + width > self.right {
            return;
        }
        let area = Rect::new(self.x, self.y, width, 1);
        f.render_widget(Paragraph::new(span), area);
        bindings.bind_task(id, area, CardTarget::Action(action));
        self.x += width + 1;
    }
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let mut spans = vec![
        Span::styled(label, Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn draw_add_form(f: &mut Frame, area: Rect, form: &TaskForm, active: bool) {
    let block = Block::default()
        .title(" Add Task (a) ")
        .borders(Borders::ALL)
        .border_style(if active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });
    let lines = vec![
        field_line("Title: ", &form.title, active && form.focus == FormField::Title),
        field_line(
            "Description: ",
            &form.description,
            active && form.focus == FormField::Description,
        ),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status_line<A: TaskApi>(
    f: &mut Frame,
    area: Rect,
    controller: &Controller<A>,
    now: Instant,
) {
    let line = match controller.notification(now) {
        Some(notice) => {
            let bg = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            Paragraph::new(format!(" {} ", notice.message))
                .style(Style::default().fg(Color::White).bg(bg))
        }
        None => Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(line, area);
}

fn draw_edit_modal(f: &mut Frame, id: TaskId, form: &TaskForm) {
    let area = centered(f.area(), 60, 6);
    let block = Block::default()
        .title(format!(" Edit Task #{id} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let lines = vec![
        field_line("Title: ", &form.title, form.focus == FormField::Title),
        field_line(
            "Description: ",
            &form.description,
            form.focus == FormField::Description,
        ),
        Line::raw(""),
        Line::styled(
            "Enter save · Tab switch field · Esc cancel",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_confirm(f: &mut Frame) {
    let area = centered(f.area(), 50, 4);
    let block = Block::default()
        .title(" Delete Task ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let lines = vec![
        Line::raw("Are you sure you want to delete this task?"),
        Line::styled("[y] Yes   [n] No", Style::default().add_modifier(Modifier::BOLD)),
    ];
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
