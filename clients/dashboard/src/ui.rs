//! Rendering for the login screen and the dashboard

use common::models::{Task, TaskPriority, TaskStatus};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::{
    app::{App, AuthMode, FormField, LoginField, Mode, Screen},
    dashboard::TaskStats,
    notifications::Level,
};

const ACCENT: Color = Color::Rgb(157, 78, 221);

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Rgb(255, 77, 109),
        TaskStatus::InProgress => Color::Rgb(157, 78, 221),
        TaskStatus::Completed => Color::Rgb(0, 180, 216),
    }
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::High => Color::Rgb(255, 77, 109),
        TaskPriority::Medium => Color::Rgb(255, 209, 102),
        TaskPriority::Low => Color::Rgb(0, 180, 216),
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen() {
        Screen::Login => draw_login(frame, app),
        Screen::Loading => draw_loading(frame),
        Screen::Dashboard => draw_dashboard(frame, app),
    }

    draw_toasts(frame, app);
}

fn draw_login(frame: &mut Frame, app: &App) {
    let form = &app.login;
    let fields = form.fields();
    let height = fields.len() as u16 * 3 + 4;
    let area = centered_rect(50, height, frame.area());

    let title = match (form.mode, app.session.auth.loading) {
        (_, true) => " Please wait... ",
        (AuthMode::Login, false) => " Sign in ",
        (AuthMode::Register, false) => " Create account ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (row, field) in fields.iter().enumerate() {
        let (label, value) = match field {
            LoginField::Name => ("Name", form.name.clone()),
            LoginField::Email => ("Email", form.email.clone()),
            LoginField::Password => ("Password", "*".repeat(form.password.chars().count())),
        };
        let input = Paragraph::new(value).block(
            Block::default()
                .title(label)
                .borders(Borders::ALL)
                .border_style(focus_style(form.focused() == *field)),
        );
        frame.render_widget(input, rows[row]);
    }

    let switch = match form.mode {
        AuthMode::Login => "Ctrl+R: create an account",
        AuthMode::Register => "Ctrl+R: back to sign in",
    };
    let hint = Paragraph::new(Line::from(vec![
        Span::styled("Enter: submit  Tab: next  ", Style::default().fg(Color::DarkGray)),
        Span::styled(switch, Style::default().fg(Color::DarkGray)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hint, rows[fields.len()]);
}

fn draw_loading(frame: &mut Frame) {
    let area = centered_rect(40, 3, frame.area());
    let loading = Paragraph::new("Loading workspace...")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(loading, area);
}

fn draw_dashboard(frame: &mut Frame, app: &App) {
    let error = app.session.tasks.error.as_deref();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(if error.is_some() { 1 } else { 0 }),
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Hello, {}", app.user_name()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Let's be productive today.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    if let Some(error) = error {
        frame.render_widget(
            Paragraph::new(error).style(Style::default().fg(Color::Red)),
            chunks[1],
        );
    }

    draw_overview(frame, app, chunks[2]);
    draw_form(frame, app, chunks[3]);

    let controls = Paragraph::new(format!(
        "Sort: {}  |  Status: {}  |  Priority: {}",
        app.view.sort_by, app.view.status, app.view.priority
    ))
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(controls, chunks[4]);

    draw_task_list(frame, app, chunks[5]);

    let help = match app.mode {
        Mode::Editing => "Tab: next field  Left/Right: priority  Enter: add  Esc: cancel",
        _ => "j/k: move  Enter: cycle status  a: add  d: delete  s: sort  f/p: filter  r: refresh  o: sign out  q: quit",
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[6],
    );

    if let Mode::ConfirmDelete(_) = app.mode {
        draw_confirm(frame);
    }
}

fn draw_overview(frame: &mut Frame, app: &App, area: Rect) {
    let stats = TaskStats::from_tasks(&app.session.tasks.list);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let bars: Vec<Bar> = TaskStatus::ALL
        .into_iter()
        .map(|status| {
            Bar::default()
                .value(stats.count(status) as u64)
                .label(Line::from(status.as_str()))
                .style(Style::default().fg(status_color(status)))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title("Overview").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(11)
        .bar_gap(2);
    frame.render_widget(chart, columns[0]);

    let figures = Paragraph::new(vec![
        Line::from(format!("Tasks:  {}", stats.total)),
        Line::from(Span::styled(
            format!("Done:   {}", stats.completed),
            Style::default().fg(status_color(TaskStatus::Completed)),
        )),
        Line::from(Span::styled(
            format!("Active: {}", stats.in_progress),
            Style::default().fg(status_color(TaskStatus::InProgress)),
        )),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(figures, columns[1]);
}

fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.mode == Mode::Editing;
    let form = &app.form;
    let label = |field: FormField, text: &'static str| {
        let focused = editing && form.focus == field;
        Span::styled(
            text,
            if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            },
        )
    };

    let lines = vec![
        Line::from(vec![label(FormField::Title, "Title:    "), Span::raw(form.title.as_str())]),
        Line::from(vec![
            label(FormField::DueDate, "Due date: "),
            Span::raw(form.due_date.as_str()),
        ]),
        Line::from(vec![
            label(FormField::Priority, "Priority: "),
            Span::styled(
                form.priority.as_str(),
                Style::default().fg(priority_color(form.priority)),
            ),
        ]),
    ];
    let title = if editing { "New task" } else { "New task (press a)" };
    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(focus_style(editing)),
    );
    frame.render_widget(panel, area);
}

fn task_line(task: &Task) -> Line<'_> {
    let mut title_style = Style::default();
    if task.status == TaskStatus::Completed {
        title_style = title_style
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }

    let due = task
        .due_date
        .map(|date| format!("Due {}", date.format("%Y-%m-%d")))
        .unwrap_or_else(|| "No due date".to_string());

    Line::from(vec![
        Span::styled(
            format!("[{:<11}] ", task.status.as_str()),
            Style::default().fg(status_color(task.status)),
        ),
        Span::styled(task.title.as_str(), title_style),
        Span::raw("  "),
        Span::styled(
            task.priority.as_str(),
            Style::default().fg(priority_color(task.priority)),
        ),
        Span::styled(format!("  {}", due), Style::default().fg(Color::DarkGray)),
    ])
}

fn draw_task_list(frame: &mut Frame, app: &App, area: Rect) {
    let tasks = app.visible_tasks();
    let block = Block::default().title("Tasks").borders(Borders::ALL);

    if tasks.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No tasks found."),
            Line::from(Span::styled(
                "Add a new task to get started!",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = tasks.iter().map(|task| ListItem::new(task_line(task))).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_confirm(frame: &mut Frame) {
    let area = centered_rect(36, 4, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(vec![
        Line::from("Delete this task?"),
        Line::from(Span::styled(
            "y: delete  n: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(popup, area);
}

fn draw_toasts(frame: &mut Frame, app: &App) {
    let screen = frame.area();
    let width = 42.min(screen.width);

    for (index, toast) in app.notifications.active().iter().enumerate() {
        let y = index as u16 * 3;
        if y + 3 > screen.height {
            break;
        }

        let area = Rect::new(screen.x + screen.width - width, screen.y + y, width, 3);
        let color = match toast.level {
            Level::Info => Color::Cyan,
            Level::Success => Color::Green,
            Level::Error => Color::Red,
        };

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(toast.message.as_str()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
            area,
        );
    }
}

/// Rectangle of `width` x `height` centred in `area`, clipped to it
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
