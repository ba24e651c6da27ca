// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Interactive shell (ratatui + crossterm) wiring the diagram viewport, the
//! chat panel, and the questionnaire overlay together. Mouse capture is on:
//! drag pans, the wheel zooms at the cursor, a click inspects the node under
//! the pointer.

use std::error::Error;
use std::fs;
use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::chat::{ChatClient, ChatEvent, ChatReply, ConversationController, PendingTurn};
use crate::extract::DocumentBlock;
use crate::model::{ChatRole, FlowchartDocument};
use crate::questionnaire::{ChoiceEffect, QuestionData, Questionnaire, QuestionnairePhase};
use crate::render::{DiagramView, NodeInspection, TextGridRenderer};

/// Delay between submitting the questionnaire and closing its overlay.
pub const SUBMIT_CLOSE_DELAY: Duration = Duration::from_millis(500);

const DEFAULT_DOCUMENT: &str = "A[Describe the device you want to fabricate]";
const SVG_EXPORT_PATH: &str = "flowchart.svg";
const EVENT_POLL: Duration = Duration::from_millis(100);
const WHEEL_DELTA: f64 = 40.0;

/// Resolution of one chat turn, delivered back to the UI thread.
#[derive(Debug)]
enum TurnResult {
    Reply(PendingTurn, ChatReply),
    Failure(PendingTurn, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RenameState {
    node_id: String,
    buffer: String,
}

/// Runs the interactive terminal UI until quit.
pub fn run(
    client: ChatClient,
    data: QuestionData,
    user_id: String,
    handle: tokio::runtime::Handle,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<TurnResult>();
    let mut app = App::new(data, user_id);

    while !app.should_quit {
        while let Ok(result) = rx.try_recv() {
            app.apply_turn_result(result);
        }
        for turn in app.take_outbox() {
            dispatch_turn(&handle, &client, &tx, turn);
        }
        app.tick(Instant::now());

        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(EVENT_POLL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }

    Ok(())
}

fn dispatch_turn(
    handle: &tokio::runtime::Handle,
    client: &ChatClient,
    tx: &tokio::sync::mpsc::UnboundedSender<TurnResult>,
    turn: PendingTurn,
) {
    let client = client.clone();
    let tx = tx.clone();
    handle.spawn(async move {
        let result = client
            .send_message(turn.query(), turn.user_id(), turn.conversation_id())
            .await;
        let message = match result {
            Ok(reply) => TurnResult::Reply(turn, reply),
            Err(err) => TurnResult::Failure(turn, err.to_string()),
        };
        let _ = tx.send(message);
    });
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = disable_raw_mode();
    }
}

struct App {
    view: DiagramView<TextGridRenderer>,
    conversation: ConversationController,
    questionnaire: Questionnaire,
    chat_visible: bool,
    form_visible: bool,
    input: String,
    inspection: Option<NodeInspection>,
    rename: Option<RenameState>,
    pending_document: Option<DocumentBlock>,
    outbox: Vec<PendingTurn>,
    toast: Option<String>,
    close_form_at: Option<Instant>,
    diagram_area: Rect,
    started: Instant,
    should_quit: bool,
}

impl App {
    fn new(data: QuestionData, user_id: impl Into<String>) -> Self {
        Self {
            view: DiagramView::new(
                TextGridRenderer::new(),
                FlowchartDocument::new(DEFAULT_DOCUMENT),
                (80.0, 24.0),
            ),
            conversation: ConversationController::new(user_id),
            questionnaire: Questionnaire::new(data),
            chat_visible: true,
            form_visible: false,
            input: String::new(),
            inspection: None,
            rename: None,
            pending_document: None,
            outbox: Vec::new(),
            toast: None,
            close_form_at: None,
            diagram_area: Rect::new(0, 0, 80, 24),
            started: Instant::now(),
            should_quit: false,
        }
    }

    fn take_outbox(&mut self) -> Vec<PendingTurn> {
        std::mem::take(&mut self.outbox)
    }

    fn set_toast(&mut self, toast: impl Into<String>) {
        self.toast = Some(toast.into());
    }

    /// Deferred work: closing the questionnaire after submission.
    fn tick(&mut self, now: Instant) {
        if self.close_form_at.is_some_and(|deadline| now >= deadline) {
            self.close_form_at = None;
            self.questionnaire.reset();
            self.form_visible = false;
        }
    }

    fn send_text(&mut self, text: &str) {
        let turn = self.conversation.begin_turn(text);
        self.outbox.push(turn);
    }

    fn apply_turn_result(&mut self, result: TurnResult) {
        match result {
            TurnResult::Reply(turn, reply) => {
                let events = self.conversation.apply_reply(&turn, &reply);
                for chat_event in events {
                    self.apply_chat_event(chat_event);
                }
            }
            TurnResult::Failure(turn, message) => {
                self.conversation.apply_failure(&turn, &message);
            }
        }
    }

    fn apply_chat_event(&mut self, chat_event: ChatEvent) {
        match chat_event {
            ChatEvent::ProcessesDetected(processes) => {
                self.questionnaire.set_processes(processes);
                self.form_visible = true;
            }
            ChatEvent::FlowchartDetected(document) => {
                self.view.set_document(document);
            }
            ChatEvent::DocumentDetected(document) => {
                self.set_toast(format!("document ready: {} (press d to save)", document.file_name()));
                self.pending_document = Some(document);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.toast = None;

        if self.rename.is_some() {
            self.handle_rename_key(key.code);
            return;
        }
        if self.inspection.is_some() {
            self.handle_inspection_key(key.code);
            return;
        }
        if self.form_visible && self.handle_form_key(key.code) {
            return;
        }
        // Ctrl-modified keys bypass the chat input so the diagram controls
        // stay reachable while the panel is open.
        if self.chat_visible && !key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_chat_key(key.code);
            return;
        }
        self.handle_global_key(key.code);
    }

    fn handle_rename_key(&mut self, code: KeyCode) {
        let Some(rename) = self.rename.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.rename = None,
            KeyCode::Backspace => {
                rename.buffer.pop();
            }
            KeyCode::Char(ch) => rename.buffer.push(ch),
            KeyCode::Enter => {
                let RenameState { node_id, buffer } = match self.rename.take() {
                    Some(state) => state,
                    None => return,
                };
                let new_label = buffer.trim();
                if new_label.is_empty() {
                    self.set_toast("empty label discarded");
                } else if self.view.rewrite_label(&node_id, new_label) {
                    self.set_toast(format!("renamed {node_id} to '{new_label}'"));
                } else {
                    self.set_toast(format!("no label definition found for {node_id}"));
                }
                self.inspection = None;
            }
            _ => {}
        }
    }

    fn handle_inspection_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('r') => {
                if let Some(inspection) = &self.inspection {
                    self.rename = Some(RenameState {
                        node_id: inspection.node_id().to_owned(),
                        buffer: inspection.label().to_owned(),
                    });
                }
            }
            KeyCode::Esc | KeyCode::Enter => self.inspection = None,
            _ => {}
        }
    }

    /// Returns `true` when the key was consumed by the questionnaire.
    fn handle_form_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(ch) if ch.is_ascii_digit() && ch != '0' => {
                let index = (ch as usize) - ('1' as usize);
                self.choose_option(index);
                true
            }
            KeyCode::Char('b') => {
                if !self.questionnaire.back() {
                    self.set_toast("nothing to step back to");
                }
                true
            }
            KeyCode::Tab => {
                self.switch_to_next_process();
                true
            }
            KeyCode::Enter => {
                match self.questionnaire.request_submit() {
                    ChoiceEffect::Submitted(text) => self.complete_submission(text),
                    ChoiceEffect::None => self.set_toast("answer every process before submitting"),
                }
                true
            }
            KeyCode::Char('f') | KeyCode::Esc => {
                self.form_visible = false;
                true
            }
            _ => false,
        }
    }

    fn handle_chat_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.chat_visible = false,
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let text = self.input.trim().to_owned();
                if !text.is_empty() {
                    self.send_text(&text);
                }
                self.input.clear();
            }
            KeyCode::Char(ch) => self.input.push(ch),
            _ => {}
        }
    }

    fn handle_global_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') => self.chat_visible = true,
            KeyCode::Char('f') => self.form_visible = true,
            KeyCode::Char('n') => self.reset_conversation(),
            KeyCode::Char('s') => self.send_current_chart(),
            KeyCode::Char('r') => self.rerender_latest_flowchart(),
            KeyCode::Char('e') => self.export_svg(),
            KeyCode::Char('d') => self.save_pending_document(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let size = self.inner_size();
                self.view.viewport_mut().zoom_step(true, size);
            }
            KeyCode::Char('-') => {
                let size = self.inner_size();
                self.view.viewport_mut().zoom_step(false, size);
            }
            KeyCode::Char('0') => self.view.reset_view(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(point) = self.diagram_point(mouse.column, mouse.row) else {
            if matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left)) {
                self.view.viewport_mut().end_drag();
            }
            return;
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.view.viewport_mut().begin_drag(point);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.view.viewport_mut().drag_to(point);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let travel = self.view.viewport_mut().end_drag();
                if let Some(inspection) = self.view.inspect(point, travel) {
                    self.inspection = Some(inspection);
                }
            }
            MouseEventKind::ScrollUp => self.wheel(-WHEEL_DELTA, point),
            MouseEventKind::ScrollDown => self.wheel(WHEEL_DELTA, point),
            _ => {}
        }
    }

    fn wheel(&mut self, delta: f64, point: (f64, f64)) {
        let now_ms = self.started.elapsed().as_millis() as u64;
        self.view.viewport_mut().wheel(delta, point, now_ms);
    }

    fn diagram_point(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.diagram_area;
        if column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height
        {
            Some((f64::from(column - area.x), f64::from(row - area.y)))
        } else {
            None
        }
    }

    fn inner_size(&self) -> (f64, f64) {
        (
            f64::from(self.diagram_area.width),
            f64::from(self.diagram_area.height),
        )
    }

    fn choose_option(&mut self, index: usize) {
        let Some(label) = self
            .questionnaire
            .current_question()
            .and_then(|question| question.options().get(index))
            .map(|(label, _)| label.clone())
        else {
            return;
        };
        match self.questionnaire.choose(&label) {
            ChoiceEffect::Submitted(text) => self.complete_submission(text),
            ChoiceEffect::None => {}
        }
    }

    fn complete_submission(&mut self, text: String) {
        self.send_text(&text);
        self.close_form_at = Some(Instant::now() + SUBMIT_CLOSE_DELAY);
        self.set_toast("questionnaire submitted");
    }

    /// Re-renders the flowchart carried by the most recent assistant message,
    /// replacing whatever the viewport currently shows.
    fn rerender_latest_flowchart(&mut self) {
        let flowchart = self
            .conversation
            .messages()
            .iter()
            .rev()
            .find_map(|message| message.raw_flowchart().cloned());
        match flowchart {
            Some(document) => {
                self.view.set_document(document);
                self.set_toast("re-rendered the last chat flowchart");
            }
            None => self.set_toast("no flowchart in the conversation yet"),
        }
    }

    fn switch_to_next_process(&mut self) {
        let processes = self.questionnaire.processes().to_vec();
        if processes.len() < 2 {
            return;
        }
        let current = self
            .questionnaire
            .active_process()
            .and_then(|active| processes.iter().position(|name| name == active))
            .unwrap_or(0);
        let next = processes[(current + 1) % processes.len()].clone();
        self.questionnaire.switch_process(&next);
    }

    fn reset_conversation(&mut self) {
        self.conversation.reset();
        self.view
            .set_document(FlowchartDocument::new(DEFAULT_DOCUMENT));
        self.questionnaire.reset();
        self.form_visible = false;
        self.pending_document = None;
        self.close_form_at = None;
        self.set_toast("conversation reset");
    }

    /// Pushes the currently rendered document into the chat as a fenced
    /// message.
    fn send_current_chart(&mut self) {
        let text = format!("```mermaid\n{}\n```", self.view.document().text().trim_end());
        self.send_text(&text);
        self.chat_visible = true;
    }

    fn export_svg(&mut self) {
        match self.view.export_svg() {
            Ok(svg) => match fs::write(SVG_EXPORT_PATH, svg) {
                Ok(()) => self.set_toast(format!("exported {SVG_EXPORT_PATH}")),
                Err(err) => self.set_toast(format!("export failed: {err}")),
            },
            Err(err) => self.set_toast(format!("export failed: {err}")),
        }
    }

    fn save_pending_document(&mut self) {
        let Some(document) = self.pending_document.take() else {
            self.set_toast("no document to save");
            return;
        };
        match fs::write(document.file_name(), document.content()) {
            Ok(()) => self.set_toast(format!("saved {}", document.file_name())),
            Err(err) => {
                self.set_toast(format!("save failed: {err}"));
                self.pending_document = Some(document);
            }
        }
    }
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.size());
    let main_area = layout[0];
    let status_area = layout[1];

    let (diagram_outer, chat_area) = if app.chat_visible {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_area);
        (panes[0], Some(panes[1]))
    } else {
        (main_area, None)
    };

    let zoom = app.view.viewport().zoom_percent();
    let diagram_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Flowchart · {zoom:.0}% "));
    let inner = diagram_block.inner(diagram_outer);
    app.diagram_area = inner;
    app.view
        .resize((f64::from(inner.width), f64::from(inner.height)));

    let diagram_text = sample_diagram(app, inner);
    frame.render_widget(Paragraph::new(diagram_text).block(diagram_block), diagram_outer);

    if let Some(chat_area) = chat_area {
        draw_chat(frame, app, chat_area);
    }
    if app.form_visible {
        draw_form(frame, app, diagram_outer);
    }
    if let Some(inspection) = app.inspection.clone() {
        draw_inspection(frame, app, &inspection, diagram_outer);
    }

    draw_status(frame, app, status_area);
}

/// Nearest-neighbor sampling of the rendered grid through the inverse
/// transform, one screen cell at a time.
fn sample_diagram(app: &App, inner: Rect) -> Text<'static> {
    let Some(rendered) = app.view.rendered() else {
        return Text::from("(nothing rendered)");
    };
    let grid: Vec<Vec<char>> = rendered
        .lines()
        .iter()
        .map(|line| line.chars().collect())
        .collect();
    let transform = app.view.viewport().transform();

    let mut lines = Vec::with_capacity(inner.height as usize);
    for row in 0..inner.height {
        let mut text_line = String::with_capacity(inner.width as usize);
        for column in 0..inner.width {
            let (cx, cy) = transform.content_point((f64::from(column), f64::from(row)));
            let ch = if cx >= 0.0 && cy >= 0.0 {
                grid.get(cy as usize)
                    .and_then(|grid_row| grid_row.get(cx as usize))
                    .copied()
                    .unwrap_or(' ')
            } else {
                ' '
            };
            text_line.push(ch);
        }
        lines.push(Line::from(text_line));
    }
    Text::from(lines)
}

fn draw_chat(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let mut lines = Vec::new();
    for message in app.conversation.messages() {
        match message.role() {
            ChatRole::User => lines.push(Line::from(format!("you: {}", message.display_text()))),
            ChatRole::Assistant => {
                lines.push(Line::from(format!("assistant: {}", message.display_text())))
            }
            ChatRole::Thinking => lines.push(Line::from("assistant: …".to_owned())),
        }
        lines.push(Line::from(String::new()));
    }
    let scroll = lines.len().saturating_sub(panes[0].height.saturating_sub(2) as usize) as u16;
    let history = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Chat "))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(history, panes[0]);

    let input = Paragraph::new(format!("> {}", app.input))
        .block(Block::default().borders(Borders::ALL).title(" Message "));
    frame.render_widget(input, panes[1]);
}

fn draw_form(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let overlay = centered_rect(area, 70, 60);
    frame.render_widget(Clear, overlay);

    let mut lines = Vec::new();
    if let Some(process) = app.questionnaire.active_process() {
        lines.push(Line::from(format!("process: {process}")));
        lines.push(Line::from(String::new()));
    }
    match app.questionnaire.current_question() {
        Some(question) => {
            lines.push(Line::from(question.question().to_owned()));
            lines.push(Line::from(String::new()));
            for (index, (label, _)) in question.options().iter().enumerate() {
                lines.push(Line::from(format!("  {}. {label}", index + 1)));
            }
        }
        None if app.questionnaire.phase() == QuestionnairePhase::Loading => {
            lines.push(Line::from("waiting for a process list…".to_owned()));
        }
        None => {}
    }
    if let Some(banner) = app.questionnaire.banner() {
        lines.push(Line::from(String::new()));
        lines.push(Line::styled(
            format!("⚠ {banner}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    lines.push(Line::from(String::new()));
    lines.push(Line::styled(
        "1-9 choose · b back · Tab process · Enter submit · Esc close",
        Style::default().fg(Color::DarkGray),
    ));

    let form = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Questionnaire "))
        .wrap(Wrap { trim: false });
    frame.render_widget(form, overlay);
}

fn draw_inspection(frame: &mut Frame<'_>, app: &App, inspection: &NodeInspection, area: Rect) {
    let overlay = centered_rect(area, 60, 30);
    frame.render_widget(Clear, overlay);

    let mut lines = vec![
        Line::from(format!("node: {}", inspection.node_id())),
        Line::from(format!("label: {}", inspection.label())),
        Line::from(format!("path: {}", inspection.path())),
        Line::from(String::new()),
    ];
    match &app.rename {
        Some(rename) => lines.push(Line::from(format!("rename: {}_", rename.buffer))),
        None => lines.push(Line::styled(
            "r rename · Esc close",
            Style::default().fg(Color::DarkGray),
        )),
    }

    let modal = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Node "))
        .wrap(Wrap { trim: false });
    frame.render_widget(modal, overlay);
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let status = match &app.toast {
        Some(toast) => toast.clone(),
        None if app.conversation.is_thinking() => "thinking…".to_owned(),
        None => {
            "q quit · c chat · f form · n reset · s send chart · r re-render · e export · +/-/0 zoom"
                .to_owned()
        }
    };
    frame.render_widget(
        Paragraph::new(Line::styled(status, Style::default().fg(Color::Gray))),
        area,
    );
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
