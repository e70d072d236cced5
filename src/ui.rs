use anyhow::Result;
use contract_collection::{
    CommitReport, Contract, ContractApi, ContractError, ContractField, EditSession, LocalApi, SqliteStore,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::executor::block_on;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Detail,
    Edit,
    Input,
}

pub struct App {
    api: LocalApi<SqliteStore>,
    pub contracts: Vec<Contract>,
    pub state: TableState,
    pub session: Option<EditSession>,
    /// Index into `ContractField::EDITABLE`, always in range
    field_index: usize,
    pub input: String,
    /// A value is being typed into `input`
    pub typing: bool,
    pub status: Option<(String, Color)>,
}

impl App {
    pub fn new(store: SqliteStore) -> Result<Self> {
        let mut app = Self {
            api: LocalApi::new(store),
            contracts: Vec::new(),
            state: TableState::default(),
            session: None,
            field_index: 0,
            input: String::new(),
            typing: false,
            status: None,
        };
        app.reload()?;
        Ok(app)
    }

    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }

    pub fn reload(&mut self) -> Result<()> {
        self.contracts = block_on(self.api.list())?;

        let selected = match self.state.selected() {
            _ if self.contracts.is_empty() => None,
            Some(i) => Some(i.min(self.contracts.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        match &self.session {
            None => Mode::Browse,
            Some(session) if !session.is_editing() => Mode::Detail,
            Some(_) if !self.typing => Mode::Edit,
            Some(_) => Mode::Input,
        }
    }

    pub fn selected_contract(&self) -> Option<&Contract> {
        self.state.selected().and_then(|i| self.contracts.get(i))
    }

    pub fn selected_field(&self) -> ContractField {
        ContractField::EDITABLE[self.field_index]
    }

    /// Contract shown in the detail panel: the working copy while a session is open
    pub fn displayed_contract(&self) -> Option<&Contract> {
        match &self.session {
            Some(session) => Some(session.working_copy()),
            None => self.selected_contract(),
        }
    }

    fn set_status(&mut self, message: impl Into<String>, color: Color) {
        self.status = Some((message.into(), color));
    }

    pub fn open_detail(&mut self) {
        if let Some(contract) = self.selected_contract().cloned() {
            self.session = Some(EditSession::new(contract));
        }
    }

    pub fn close_detail(&mut self) {
        self.session = None;
    }

    pub fn begin_edit(&mut self) {
        if self.session.is_none() {
            self.open_detail();
        }
        let result = match self.session.as_mut() {
            Some(session) => session.enter_edit(),
            None => return,
        };
        match result {
            Ok(()) => {
                self.field_index = 0;
                self.set_status("Editing - Enter to change a field, s to save, Esc to discard", Color::Yellow);
            }
            Err(e) => self.set_status(e.to_string(), Color::Red),
        }
    }

    pub fn next_field(&mut self) {
        self.field_index = (self.field_index + 1) % ContractField::EDITABLE.len();
    }

    pub fn previous_field(&mut self) {
        let len = ContractField::EDITABLE.len();
        self.field_index = (self.field_index + len - 1) % len;
    }

    /// Start typing a new value, prefilled with the current one
    pub fn start_input(&mut self) {
        let field = self.selected_field();
        if let Some(session) = &self.session {
            self.input = session.working_copy().get(field).to_string();
            self.typing = true;
        }
    }

    pub fn cancel_input(&mut self) {
        self.input.clear();
        self.typing = false;
    }

    /// Hand the typed value to the session
    pub fn apply_input(&mut self) {
        let field = self.selected_field();
        let value = std::mem::take(&mut self.input);
        self.typing = false;

        let result = match self.session.as_mut() {
            Some(session) => session.set_field(field.as_str(), value),
            None => return,
        };
        match result {
            Ok(()) => self.status = None,
            Err(e) => self.set_status(e.to_string(), Color::Red),
        }
    }

    pub fn save(&mut self) {
        let result = match self.session.as_mut() {
            Some(session) => block_on(session.commit(&self.api)),
            None => return,
        };

        match result {
            Ok(report) => {
                let (message, color) = describe_commit(&report);
                self.set_status(message, color);
            }
            Err(e) => self.set_status(e.to_string(), Color::Red),
        }

        if let Err(e) = self.reload() {
            self.set_status(format!("Reload failed: {}", e), Color::Red);
            return;
        }

        // Restart the session on what the store now holds
        let id = self.session.as_ref().map(EditSession::id);
        self.session = id
            .and_then(|id| self.contracts.iter().find(|c| c.id == id))
            .cloned()
            .map(EditSession::new);
    }

    /// Jump to an editable field
    pub fn select_field(&mut self, field: ContractField) {
        if let Some(index) = ContractField::EDITABLE.iter().position(|f| *f == field) {
            self.field_index = index;
        }
    }

    pub fn discard(&mut self) {
        self.cancel_input();
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.discard() {
                self.set_status(e.to_string(), Color::Red);
                return;
            }
        }
        self.set_status("Changes discarded", Color::DarkGray);
    }

    pub fn delete_selected(&mut self) {
        let contract = match self.selected_contract() {
            Some(c) => c.clone(),
            None => return,
        };

        match block_on(self.api.delete(contract.id)) {
            Ok(()) => self.set_status(format!("Deleted '{}'", contract.name), Color::Green),
            Err(e) => self.set_status(e.to_string(), Color::Red),
        }
        self.session = None;

        if let Err(e) = self.reload() {
            self.set_status(format!("Reload failed: {}", e), Color::Red);
        }
    }

    pub fn next(&mut self) {
        let len = self.contracts.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.contracts.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Sum of the annualized expenses; contracts with a zero cycle are skipped
    pub fn yearly_total(&self) -> f64 {
        self.contracts.iter().filter_map(|c| c.yearly_expenses().ok()).sum()
    }
}

fn describe_commit(report: &CommitReport) -> (String, Color) {
    if report.is_empty() {
        return ("Nothing to save".to_string(), Color::DarkGray);
    }
    if report.is_success() {
        return (format!("Saved {} field(s)", report.applied.len()), Color::Green);
    }
    let failed: Vec<String> = report.failed.iter().map(|f| f.to_string()).collect();
    (
        format!(
            "{} of {} field(s) not saved: {}",
            report.failed.len(),
            report.failed.len() + report.applied.len(),
            failed.join("; ")
        ),
        Color::Red,
    )
}

fn yearly_label(contract: &Contract) -> String {
    match contract.yearly_expenses() {
        Ok(amount) => format!("{:.2}", amount),
        Err(ContractError::ZeroCycle) => "undefined".to_string(),
        Err(e) => e.to_string(),
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            _ => continue,
        };

        match app.mode() {
            Mode::Browse => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.open_detail(),
                KeyCode::Char('e') => app.begin_edit(),
                KeyCode::Char('x') => app.delete_selected(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home if !app.contracts.is_empty() => app.state.select(Some(0)),
                KeyCode::End if !app.contracts.is_empty() => app.state.select(Some(app.contracts.len() - 1)),
                _ => {}
            },
            Mode::Detail => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Enter | KeyCode::Esc => app.close_detail(),
                KeyCode::Char('e') => app.begin_edit(),
                KeyCode::Char('x') => app.delete_selected(),
                _ => {}
            },
            Mode::Edit => match key.code {
                KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => app.next_field(),
                KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => app.previous_field(),
                KeyCode::Enter => app.start_input(),
                KeyCode::Char('s') => app.save(),
                KeyCode::Esc | KeyCode::Char('d') => app.discard(),
                _ => {}
            },
            Mode::Input => match key.code {
                KeyCode::Enter => app.apply_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Backspace => {
                    app.input.pop();
                }
                KeyCode::Char(c) => app.input.push(c),
                _ => {}
            },
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.session.is_some() {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(55), // Contract list
                Constraint::Percentage(45), // Detail panel
            ])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let spans = vec![
        Span::styled(
            "Contract Collection",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Contracts: {}", app.contracts.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Per year: {:.2}", app.yearly_total()),
            Style::default().fg(Color::Red),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Name", "Category", "Expenses", "Cycle", "Per year"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.contracts.iter().map(|contract| {
        let yearly_color = if contract.cycle == 0 { Color::DarkGray } else { Color::Red };

        let cells = vec![
            Cell::from(truncate(&contract.name, 28)),
            Cell::from(truncate(&contract.category, 16)),
            Cell::from(format!("{:.2}", contract.expenses)),
            Cell::from(format!("{} mo", contract.cycle)),
            Cell::from(yearly_label(contract)).style(Style::default().fg(yearly_color)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Contracts "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let contract = match app.displayed_contract() {
        Some(c) => c,
        None => {
            let no_selection = Paragraph::new("No contract selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Contract Details "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let mode = app.mode();
    let editing = matches!(mode, Mode::Edit | Mode::Input);
    let label_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![Line::from("")];
    for (i, field) in ContractField::EDITABLE.iter().enumerate() {
        let selected = editing && i == app.field_index;
        let marker = if selected { "→ " } else { "  " };

        let value = if selected && mode == Mode::Input {
            Span::styled(format!("{}▏", app.input), Style::default().fg(Color::Yellow))
        } else {
            Span::raw(contract.get(*field).to_string())
        };

        content.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}: ", field.label()), label_style),
            value,
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Start date: ", label_style),
        Span::raw(contract.start_date.to_string()),
    ]));
    content.push(Line::from(vec![
        Span::styled("  Contract / customer nr: ", label_style),
        Span::raw(format!("{} / {}", contract.contract_nr, contract.customer_nr)),
    ]));
    content.push(Line::from(vec![
        Span::styled("  Yearly expenses: ", label_style),
        Span::styled(yearly_label(contract), Style::default().fg(Color::Red)),
    ]));

    if let Some(session) = &app.session {
        let pending = session.pending_changes();
        if !pending.is_empty() {
            content.push(Line::from(""));
            content.push(Line::from(Span::styled(
                format!("  {} unsaved change(s)", pending.len()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )));
        }
    }

    let (title, border) = if editing {
        (" Contract Details - EDITING ", Color::Red)
    } else {
        (" Contract Details ", Color::Yellow)
    };

    let detail_panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );

    f.render_widget(detail_panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.contracts.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some((message, color)) = &app.status {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(message.clone(), Style::default().fg(*color)));
    }

    let hints: &[(&str, &str)] = match app.mode() {
        Mode::Browse => &[("Enter", "Details"), ("e", "Edit"), ("x", "Delete"), ("↑/↓", "Nav"), ("q", "Quit")],
        Mode::Detail => &[("e", "Edit"), ("x", "Delete"), ("Esc", "Close"), ("q", "Quit")],
        Mode::Edit => &[("↑/↓", "Field"), ("Enter", "Change"), ("s", "Save"), ("Esc", "Discard")],
        Mode::Input => &[("Enter", "Apply"), ("Esc", "Cancel")],
    };

    for (key, action) in hints {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
