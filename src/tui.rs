use crate::config::Config;
use crate::days::{self, DayMarker};
use crate::models::{Event, Repeat, TimeOfDay};
use crate::store::EventStore;
use crate::utils::{event_summary, month_title, WEEK_DAYS};
use anyhow::Result;
use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::collections::BTreeMap;
use std::io;
use std::time::Duration as StdDuration;

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Start,
    End,
    Repeat,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Title => Field::Start,
            Field::Start => Field::End,
            Field::End => Field::Repeat,
            Field::Repeat => Field::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Title => Field::Repeat,
            Field::Start => Field::Title,
            Field::End => Field::Start,
            Field::Repeat => Field::End,
        }
    }
}

/// Editing surface state. `existing` is set when editing an event that is
/// already stored; its id and creation timestamp carry over on save.
#[derive(Clone)]
struct Editor {
    day: NaiveDate,
    existing: Option<Event>,
    title: String,
    start: String,
    end: String,
    repeat: Repeat,
    field: Field,
}

struct App {
    cursor: NaiveDate,
    today: NaiveDate,
    editor: Option<Editor>,
    status: Option<String>,
}

pub fn run_tui(store: &mut EventStore, config: &Config, start: NaiveDate) -> Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        cursor: start,
        today: Local::now().date_naive(),
        editor: None,
        status: None,
    };
    let res = run_loop(&mut terminal, store, config, &mut app);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: &mut EventStore,
    config: &Config,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, store, app))?;

        if event::poll(StdDuration::from_millis(250))? {
            if let TermEvent::Key(key) = event::read()? {
                if app.editor.is_some() {
                    handle_editor_key(app, store, key);
                } else if !handle_grid_key(app, store, config, key) {
                    return Ok(());
                }
            }
        }
    }
}

/// Returns false when the user asked to quit.
fn handle_grid_key(app: &mut App, store: &EventStore, config: &Config, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => return false,
        KeyCode::Left | KeyCode::Char('h') => app.cursor -= Duration::days(1),
        KeyCode::Right | KeyCode::Char('l') => app.cursor += Duration::days(1),
        KeyCode::Up | KeyCode::Char('k') => app.cursor -= Duration::days(7),
        KeyCode::Down | KeyCode::Char('j') => app.cursor += Duration::days(7),
        KeyCode::PageDown | KeyCode::Char('n') => {
            app.cursor = app
                .cursor
                .checked_add_months(Months::new(1))
                .unwrap_or(app.cursor);
        }
        KeyCode::PageUp | KeyCode::Char('p') => {
            app.cursor = app
                .cursor
                .checked_sub_months(Months::new(1))
                .unwrap_or(app.cursor);
        }
        KeyCode::Char('t') => app.cursor = app.today,
        KeyCode::Enter => open_editor(app, store, config),
        _ => {}
    }
    true
}

fn open_editor(app: &mut App, store: &EventStore, config: &Config) {
    if app.cursor < app.today {
        app.status = Some("Past days are read-only.".to_string());
        return;
    }

    // Pre-fill with the day's first event if one exists, otherwise start a
    // blank entry with the configured default times.
    let existing = store.events_on(app.cursor).first().map(|e| (*e).clone());
    app.editor = Some(match existing {
        Some(event) => Editor {
            day: app.cursor,
            title: event.title.clone(),
            start: event.start_time.to_string(),
            end: event.end_time.to_string(),
            repeat: event.repeat_option,
            field: Field::Title,
            existing: Some(event),
        },
        None => Editor {
            day: app.cursor,
            existing: None,
            title: String::new(),
            start: config.default_start_time.to_string(),
            end: config.default_end_time.to_string(),
            repeat: Repeat::None,
            field: Field::Title,
        },
    });
    app.status = None;
}

fn handle_editor_key(app: &mut App, store: &mut EventStore, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.editor = None;
            return;
        }
        KeyCode::Enter => {
            commit_editor(app, store);
            return;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            delete_current(app, store);
            return;
        }
        _ => {}
    }

    let Some(editor) = app.editor.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => editor.field = editor.field.next(),
        KeyCode::BackTab | KeyCode::Up => editor.field = editor.field.prev(),
        KeyCode::Left | KeyCode::Right if editor.field == Field::Repeat => {
            editor.repeat = editor.repeat.cycle();
        }
        KeyCode::Backspace => {
            if let Some(text) = active_text_mut(editor) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if editor.field == Field::Repeat {
                if c == ' ' {
                    editor.repeat = editor.repeat.cycle();
                }
            } else if let Some(text) = active_text_mut(editor) {
                text.push(c);
            }
        }
        _ => {}
    }
}

fn active_text_mut(editor: &mut Editor) -> Option<&mut String> {
    match editor.field {
        Field::Title => Some(&mut editor.title),
        Field::Start => Some(&mut editor.start),
        Field::End => Some(&mut editor.end),
        Field::Repeat => None,
    }
}

fn commit_editor(app: &mut App, store: &mut EventStore) {
    let Some(editor) = app.editor.clone() else {
        return;
    };

    let start = match editor.start.parse::<TimeOfDay>() {
        Ok(t) => t,
        Err(err) => {
            app.status = Some(err.to_string());
            return;
        }
    };
    let end = match editor.end.parse::<TimeOfDay>() {
        Ok(t) => t,
        Err(err) => {
            app.status = Some(err.to_string());
            return;
        }
    };

    let event = match editor.existing {
        Some(existing) => Event {
            title: editor.title,
            date: editor.day,
            start_time: start,
            end_time: end,
            repeat_option: editor.repeat,
            ..existing
        },
        None => Event::new(editor.title, editor.day, start, end, editor.repeat),
    };

    match store.save(event) {
        Ok(_) => {
            app.status = Some("Saved.".to_string());
            app.editor = None;
        }
        // Validation and persistence failures stay on screen; the editor
        // keeps its contents so the user can correct and retry.
        Err(err) => app.status = Some(err.to_string()),
    }
}

fn delete_current(app: &mut App, store: &mut EventStore) {
    let existing = app.editor.as_ref().and_then(|e| e.existing.clone());
    match existing {
        Some(event) => match store.delete(&event.id) {
            Ok(_) => {
                app.status = Some(format!("Deleted \"{}\".", event.title));
                app.editor = None;
            }
            Err(err) => app.status = Some(err.to_string()),
        },
        None => app.status = Some("Nothing to delete yet.".to_string()),
    }
}

fn draw(frame: &mut Frame, store: &EventStore, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Weekday labels
            Constraint::Min(12),   // Month grid
            Constraint::Length(6), // Selected day
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);
    draw_week_days(frame, chunks[1]);
    draw_grid(frame, chunks[2], store, app);
    draw_day_pane(frame, chunks[3], store, app);
    draw_footer(frame, chunks[4], app);

    if let Some(editor) = &app.editor {
        draw_editor(frame, editor);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let header_spans = vec![
        Span::styled(
            " Pocketcal ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            month_title(app.cursor),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(app.cursor.format("%a %Y-%m-%d").to_string()),
    ];

    let header = Paragraph::new(Line::from(header_spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_week_days(frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area);

    for (label, column) in WEEK_DAYS.iter().zip(columns.iter()) {
        frame.render_widget(
            Paragraph::new(*label).alignment(Alignment::Center),
            *column,
        );
    }
}

fn draw_grid(frame: &mut Frame, area: Rect, store: &EventStore, app: &App) {
    let slots = days::days_in_month(app.cursor);
    let marks = store.marked_days();
    let weeks: Vec<&[Option<NaiveDate>]> = slots.chunks(7).collect();

    let row_constraints: Vec<Constraint> = weeks
        .iter()
        .map(|_| Constraint::Ratio(1, weeks.len() as u32))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (week, row) in weeks.iter().zip(rows.iter()) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(*row);

        for (slot, cell) in week.iter().zip(columns.iter()) {
            if let Some(date) = slot {
                draw_day_cell(frame, *cell, *date, &marks, app);
            }
        }
    }
}

fn draw_day_cell(
    frame: &mut Frame,
    area: Rect,
    date: NaiveDate,
    marks: &BTreeMap<NaiveDate, DayMarker>,
    app: &App,
) {
    let mut day_style = Style::default();
    if date < app.today {
        day_style = day_style.fg(Color::DarkGray);
    }
    if date == app.today {
        day_style = day_style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
    }

    let marker = if marks.contains_key(&date) { "•" } else { " " };
    let lines = vec![
        Line::from(Span::styled(format!("{:>2}", date.day()), day_style)),
        Line::from(Span::styled(
            marker.to_string(),
            Style::default().fg(Color::Blue),
        )),
    ];

    let mut block = Block::default().borders(Borders::ALL);
    if date == app.cursor {
        block = block.border_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

fn draw_day_pane(frame: &mut Frame, area: Rect, store: &EventStore, app: &App) {
    let mut title = format!(" {} ", app.cursor.format("%A, %B %d"));
    if app.cursor < app.today {
        title.push_str("(read-only) ");
    }

    let events = store.events_on(app.cursor);
    let lines: Vec<Line> = if events.is_empty() {
        vec![Line::raw("  No events.")]
    } else {
        events
            .iter()
            .map(|event| Line::raw(format!("  {}", event_summary(event))))
            .collect()
    };

    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let text = match &app.status {
        Some(status) => status.clone(),
        None => "←↑↓→ move | n/p month | t today | Enter edit | q quit".to_string(),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

fn draw_editor(frame: &mut Frame, editor: &Editor) {
    let area = centered_rect(46, 11, frame.size());
    frame.render_widget(Clear, area);

    let title = if editor.existing.is_some() {
        " Edit Event "
    } else {
        " New Event "
    };

    let lines = vec![
        Line::raw(format!("  {}", editor.day.format("%A, %B %d"))),
        Line::raw(""),
        field_line("Title", &editor.title, editor.field == Field::Title),
        field_line("Start", &editor.start, editor.field == Field::Start),
        field_line("End", &editor.end, editor.field == Field::End),
        field_line(
            "Repeat",
            &format!("< {} >", editor.repeat.label()),
            editor.field == Field::Repeat,
        ),
        Line::raw(""),
        Line::raw(if editor.existing.is_some() {
            "  Enter save | Esc cancel | Ctrl-D delete"
        } else {
            "  Enter save | Esc cancel"
        }),
    ];

    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(label: &str, value: &str, active: bool) -> Line<'static> {
    let value_style = if active {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::raw(format!("  {:<8}", label)),
        Span::styled(value.to_string(), value_style),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
