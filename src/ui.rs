// 🖥️ Terminal dashboard - the same classified view, drawn with ratatui
//
// Pages mirror the browser sections: skills, XP timeline and projects.
// Keys 1/2/3 pick the category on the XP and Projects pages.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use learn_dashboard::format::{format_grade, format_xp};
use learn_dashboard::{Category, DashboardView};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_JUMP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Skills,
    Xp,
    Projects,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Skills => Page::Xp,
            Page::Xp => Page::Projects,
            Page::Projects => Page::Skills,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Skills => Page::Projects,
            Page::Xp => Page::Skills,
            Page::Projects => Page::Xp,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Skills => "Skills",
            Page::Xp => "XP Progress",
            Page::Projects => "Projects",
        }
    }
}

pub struct App {
    pub view: DashboardView,
    pub current_page: Page,
    pub xp_category: Category,
    pub project_category: Category,
    pub state: TableState,
}

impl App {
    pub fn new(view: DashboardView) -> Self {
        let mut app = Self {
            view,
            current_page: Page::Skills,
            xp_category: Category::PiscineGo,
            project_category: Category::Module,
            state: TableState::default(),
        };
        app.reset_selection();
        app
    }

    /// Rows on the current page
    pub fn row_count(&self) -> usize {
        match self.current_page {
            Page::Skills => self.view.skills.latest.len(),
            Page::Xp => self.view.xp.buckets(self.xp_category).len(),
            Page::Projects => self.view.progress.get(self.project_category).len(),
        }
    }

    fn reset_selection(&mut self) {
        self.state.select(if self.row_count() == 0 { None } else { Some(0) });
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.reset_selection();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.reset_selection();
    }

    /// Category keys only apply where the page has tabs
    pub fn select_category(&mut self, category: Category) {
        match self.current_page {
            Page::Xp => self.xp_category = category,
            Page::Projects => self.project_category = category,
            Page::Skills => return,
        }
        self.reset_selection();
    }

    fn move_by(&mut self, delta: isize) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let current = self.state.selected().unwrap_or(0) as isize;
        let target = (current + delta).clamp(0, count as isize - 1);
        self.state.select(Some(target as usize));
    }

    pub fn next(&mut self) {
        self.move_by(1);
    }

    pub fn previous(&mut self) {
        self.move_by(-1);
    }

    pub fn page_down(&mut self) {
        self.move_by(PAGE_JUMP as isize);
    }

    pub fn page_up(&mut self) {
        self.move_by(-(PAGE_JUMP as isize));
    }

    pub fn first(&mut self) {
        self.reset_selection();
    }

    pub fn last(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.state.select(Some(count - 1));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

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

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('1') => app.select_category(Category::PiscineGo),
                KeyCode::Char('2') => app.select_category(Category::PiscineJs),
                KeyCode::Char('3') => app.select_category(Category::Module),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.first(),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Page content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Skills => render_skills(f, chunks[1], app),
        Page::Xp => render_xp(f, chunks[1], app),
        Page::Projects => render_projects(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::Skills, Page::Xp, Page::Projects].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    if let Some(user) = &app.view.user {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(user.login.clone(), Style::default().fg(Color::White)));
    }
    if let Some(ratio) = app.view.audit_ratio() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(format!("Ratio {:.2}", ratio), Style::default().fg(Color::Green)));
    }
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("XP {}", format_xp(app.view.xp.grand_total())),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn page_table<'a>(rows: Vec<Row<'a>>, widths: Vec<Constraint>, header: Row<'a>, title: String) -> Table<'a> {
    Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ")
}

fn render_skills(f: &mut Frame, area: Rect, app: &mut App) {
    let max = app.view.skills.latest.iter().map(|s| s.value).max().unwrap_or(0).max(1);

    let rows: Vec<Row> = app
        .view
        .skills
        .latest
        .iter()
        .map(|skill| {
            let filled = (skill.value.max(0) * 30 / max) as usize;
            let points = app.view.skills.history.get(&skill.id).map_or(0, |h| h.data.len());
            Row::new(vec![
                Cell::from(truncate(&skill.name, 24)),
                Cell::from(format!("{}", skill.value)),
                Cell::from("█".repeat(filled)).style(Style::default().fg(Color::Green)),
                Cell::from(format!("{}", points)),
            ])
        })
        .collect();

    let table = page_table(
        rows,
        vec![Constraint::Length(26), Constraint::Length(8), Constraint::Length(32), Constraint::Length(10)],
        header_row(&["Skill", "Level", "", "Changes"]),
        " Skills ".to_string(),
    );
    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_xp(f: &mut Frame, area: Rect, app: &mut App) {
    let category = app.xp_category;
    let rows: Vec<Row> = app
        .view
        .xp
        .buckets(category)
        .iter()
        .map(|bucket| {
            Row::new(vec![
                Cell::from(bucket.formatted_date.clone()),
                Cell::from(format!("+{}", format_xp(bucket.amount_sum))).style(Style::default().fg(Color::Green)),
                Cell::from(format_xp(bucket.cumulative_after_bucket)),
                Cell::from(format!("{}", bucket.member_transactions.len())),
            ])
        })
        .collect();

    let title = format!(" {} ({}) ", category.label(), format_xp(app.view.xp.total(category)));
    let table = page_table(
        rows,
        vec![Constraint::Length(14), Constraint::Length(14), Constraint::Length(14), Constraint::Length(14)],
        header_row(&["Date", "Gained", "Total", "Transactions"]),
        title,
    );
    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_projects(f: &mut Frame, area: Rect, app: &mut App) {
    let category = app.project_category;
    let rows: Vec<Row> = app
        .view
        .progress
        .get(category)
        .iter()
        .map(|entry| {
            let (status, color) = if entry.is_completed {
                ("Completed", Color::Green)
            } else {
                ("In progress", Color::Yellow)
            };
            let auditors = match entry.auditors.len() {
                0 => "-".to_string(),
                1 => "1 auditor".to_string(),
                n => format!("{} auditors", n),
            };
            Row::new(vec![
                Cell::from(truncate(entry.project_name(), 28)),
                Cell::from(entry.formatted_date.clone()),
                Cell::from(format_grade(entry.grade, "-")),
                Cell::from(status).style(Style::default().fg(color)),
                Cell::from(format!("{}", entry.attempts)),
                Cell::from(entry.captain_login.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(auditors),
            ])
        })
        .collect();

    let table = page_table(
        rows,
        vec![
            Constraint::Length(30),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(13),
            Constraint::Length(9),
            Constraint::Length(16),
            Constraint::Length(12),
        ],
        header_row(&["Project", "Date", "Grade", "Status", "Attempts", "Captain", "Auditors"]),
        format!(" {} projects ", category.label()),
    );
    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.row_count()),
        Style::default().fg(Color::Cyan),
    )];

    if app.current_page != Page::Skills {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("1/2/3", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" Go/JS/Module"));
    }
    spans.push(Span::raw(" | "));
    spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Page | "));
    spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Nav | "));
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
