//! Terminal application state and key handling
//!
//! Key presses never talk to the network directly. They return a
//! [`Command`], which the event loop marks as pending, draws, and then runs
//! with [`App::run`].

use chrono::NaiveDate;
use common::models::{DEFAULT_USER_NAME, NewTask, Task, TaskPriority, TaskStatus, UpdateTask};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dashboard::DashboardView,
    error::ClientError,
    notifications::Notifications,
    session::SessionContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Loading,
    Dashboard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Name,
    Email,
    Password,
}

/// Sign-in / sign-up form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub mode: AuthMode,
    pub name: String,
    pub email: String,
    pub password: String,
    focus: usize,
}

impl LoginForm {
    pub fn fields(&self) -> &'static [LoginField] {
        match self.mode {
            AuthMode::Login => &[LoginField::Email, LoginField::Password],
            AuthMode::Register => &[LoginField::Name, LoginField::Email, LoginField::Password],
        }
    }

    pub fn focused(&self) -> LoginField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.focus = 0;
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    fn input(&mut self) -> &mut String {
        match self.focused() {
            LoginField::Name => &mut self.name,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    DueDate,
    Priority,
}

impl FormField {
    const ORDER: [FormField; 3] = [FormField::Title, FormField::DueDate, FormField::Priority];
}

/// New task form
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: String,
    pub due_date: String,
    pub priority: TaskPriority,
    pub focus: FormField,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            due_date: String::new(),
            priority: TaskPriority::default(),
            focus: FormField::Title,
        }
    }
}

impl TaskForm {
    fn step_focus(&mut self, forward: bool) {
        let len = FormField::ORDER.len();
        let index = FormField::ORDER
            .iter()
            .position(|field| *field == self.focus)
            .unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        self.focus = FormField::ORDER[next];
    }

    fn cycle_priority(&mut self) {
        let all = TaskPriority::ALL;
        let index = all.iter().position(|p| *p == self.priority).unwrap_or(0);
        self.priority = all[(index + 1) % all.len()];
    }

    /// Build the payload; `Ok(None)` for a blank title
    fn to_new_task(&self) -> Result<Option<NewTask>, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let due = self.due_date.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(due, "%Y-%m-%d")
                    .map_err(|_| "Due date must be YYYY-MM-DD".to_string())?,
            )
        };

        Ok(Some(NewTask {
            title: title.to_string(),
            status: None,
            due_date,
            priority: Some(self.priority),
        }))
    }
}

/// What the dashboard keys are currently driving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Editing,
    ConfirmDelete(Uuid),
}

/// Work that needs the server
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },
    FetchTasks,
    CreateTask(NewTask),
    CycleStatus {
        id: Uuid,
        next: TaskStatus,
    },
    DeleteTask(Uuid),
}

pub struct App {
    pub session: SessionContext,
    pub view: DashboardView,
    pub login: LoginForm,
    pub form: TaskForm,
    pub mode: Mode,
    pub selected: usize,
    pub notifications: Notifications,
    /// Set once the first task fetch has settled
    pub loaded: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            view: DashboardView::default(),
            login: LoginForm::default(),
            form: TaskForm::default(),
            mode: Mode::Browse,
            selected: 0,
            notifications: Notifications::default(),
            loaded: false,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        if !self.session.is_authenticated() {
            Screen::Login
        } else if !self.loaded {
            Screen::Loading
        } else {
            Screen::Dashboard
        }
    }

    /// Name for the greeting
    pub fn user_name(&self) -> &str {
        self.session
            .user()
            .map(|user| user.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_USER_NAME)
    }

    /// Tasks after filtering and sorting
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.view.visible(&self.session.tasks.list)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.selected).copied()
    }

    /// Initial command for a restored session
    pub fn startup_command(&self) -> Option<Command> {
        self.session.is_authenticated().then_some(Command::FetchTasks)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match self.screen() {
            Screen::Login => self.handle_login_key(key),
            Screen::Loading => None,
            Screen::Dashboard => match self.mode {
                Mode::Browse => self.handle_browse_key(key),
                Mode::Editing => self.handle_form_key(key),
                Mode::ConfirmDelete(id) => self.handle_confirm_key(key, id),
            },
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.login.toggle_mode()
            }
            KeyCode::Tab | KeyCode::Down => self.login.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.login.focus_prev(),
            KeyCode::Backspace => {
                self.login.input().pop();
            }
            KeyCode::Enter => return self.submit_login(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.login.input().push(c)
            }
            _ => {}
        }
        None
    }

    fn submit_login(&mut self) -> Option<Command> {
        let email = self.login.email.trim().to_string();
        if email.is_empty() || self.login.password.is_empty() {
            self.notifications.error("Email and password are required");
            return None;
        }

        let password = self.login.password.clone();
        Some(match self.login.mode {
            AuthMode::Login => Command::Login { email, password },
            AuthMode::Register => Command::Register {
                name: self.login.name.trim().to_string(),
                email,
                password,
            },
        })
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible_tasks().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                return self.selected_task().map(|task| Command::CycleStatus {
                    id: task.id,
                    next: task.status.next(),
                });
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task().map(|task| task.id) {
                    self.mode = Mode::ConfirmDelete(id);
                }
            }
            KeyCode::Char('a') | KeyCode::Tab => {
                self.form = TaskForm::default();
                self.mode = Mode::Editing;
            }
            KeyCode::Char('s') => self.view.sort_by = self.view.sort_by.toggle(),
            KeyCode::Char('f') => {
                self.view.status = self.view.status.next(&TaskStatus::ALL);
                self.clamp_selection();
            }
            KeyCode::Char('p') => {
                self.view.priority = self.view.priority.next(&TaskPriority::ALL);
                self.clamp_selection();
            }
            KeyCode::Char('r') => return Some(Command::FetchTasks),
            KeyCode::Char('o') => self.sign_out(),
            _ => {}
        }
        None
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Tab | KeyCode::Down => self.form.step_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.form.step_focus(false),
            KeyCode::Enter => match self.form.to_new_task() {
                Ok(task) => return task.map(Command::CreateTask),
                Err(message) => self.notifications.error(message),
            },
            _ => match self.form.focus {
                FormField::Title => edit_text(&mut self.form.title, key),
                FormField::DueDate => edit_text(&mut self.form.due_date, key),
                FormField::Priority => {
                    if matches!(
                        key.code,
                        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                    ) {
                        self.form.cycle_priority();
                    }
                }
            },
        }
        None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, id: Uuid) -> Option<Command> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Browse;
                Some(Command::DeleteTask(id))
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.mode = Mode::Browse;
                None
            }
            _ => None,
        }
    }

    /// Flag the slice a command is about to load, so it can be drawn first
    pub fn mark_pending(&mut self, command: &Command) {
        match command {
            Command::Login { .. } | Command::Register { .. } => self.session.auth.loading = true,
            _ => self.session.tasks.loading = true,
        }
    }

    /// Run a command against the server; returns a follow-up command if any
    pub async fn run(&mut self, command: Command) -> Option<Command> {
        match command {
            Command::Login { email, password } => {
                match self.session.login_user(&email, &password).await {
                    Ok(user) => {
                        info!("Signed in as {}", user.email);
                        self.login = LoginForm::default();
                        self.reset_dashboard();
                        self.notifications.success("Welcome back!");
                        return Some(Command::FetchTasks);
                    }
                    Err(e) => self.notifications.error(e.to_string()),
                }
            }
            Command::Register {
                name,
                email,
                password,
            } => {
                let name = (!name.is_empty()).then_some(name.as_str());
                match self.session.register_user(name, &email, &password).await {
                    Ok(_) => {
                        self.session.logout();
                        self.login = LoginForm {
                            email,
                            ..LoginForm::default()
                        };
                        self.notifications.success("Account created! Please log in.");
                    }
                    Err(e) => self.notifications.error(e.to_string()),
                }
            }
            Command::FetchTasks => {
                let result = self.session.fetch_tasks().await;
                self.loaded = true;
                match result {
                    Ok(()) => self.clamp_selection(),
                    Err(e) => self.task_error(e),
                }
            }
            Command::CreateTask(task) => match self.session.create_task(&task).await {
                Ok(_) => {
                    self.form = TaskForm::default();
                    self.mode = Mode::Browse;
                    self.notifications.success("Task added successfully!");
                }
                Err(e) => self.task_error(e),
            },
            Command::CycleStatus { id, next } => {
                match self.session.update_task(id, &UpdateTask::status(next)).await {
                    Ok(task) => {
                        self.notifications
                            .info(format!("Task moved to {}", task.status));
                        // The task may have left the active filter
                        self.clamp_selection();
                    }
                    Err(e) => self.task_error(e),
                }
            }
            Command::DeleteTask(id) => match self.session.delete_task(id).await {
                Ok(()) => {
                    self.clamp_selection();
                    self.notifications.success("Task deleted");
                }
                Err(e) => self.task_error(e),
            },
        }
        None
    }

    fn task_error(&mut self, error: ClientError) {
        if error.is_unauthorized() {
            warn!("Session rejected by server, signing out");
            self.session.logout();
            self.reset_dashboard();
            self.notifications.error("Session expired. Please log in again.");
        } else {
            self.notifications.error(error.to_string());
        }
    }

    fn sign_out(&mut self) {
        self.session.logout();
        self.reset_dashboard();
        self.notifications.info("Signed out");
    }

    fn reset_dashboard(&mut self) {
        self.view = DashboardView::default();
        self.form = TaskForm::default();
        self.mode = Mode::Browse;
        self.selected = 0;
        self.loaded = false;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

fn edit_text(text: &mut String, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => {
            text.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => text.push(c),
        _ => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        client::ApiClient,
        dashboard::task,
        storage::{StoredSession, temp_storage},
    };
    use common::models::UserProfile;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn offline_client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9").unwrap()
    }

    pub(crate) fn signed_out_app() -> App {
        App::new(SessionContext::hydrate(offline_client(), temp_storage()))
    }

    /// Signed in as "Jo" with the first fetch done and the given tasks loaded
    pub(crate) fn dashboard_app(tasks: Vec<Task>) -> App {
        let storage = temp_storage();
        storage
            .save(&StoredSession {
                token: "token".to_string(),
                user: UserProfile {
                    id: Uuid::new_v4(),
                    name: "Jo".to_string(),
                    email: "jo@x.com".to_string(),
                },
            })
            .unwrap();

        let mut app = App::new(SessionContext::hydrate(offline_client(), storage));
        app.session.tasks.list = tasks;
        app.loaded = true;
        app
    }

    #[test]
    fn signed_out_starts_on_login_screen() {
        let app = signed_out_app();

        assert_eq!(app.screen(), Screen::Login);
        assert_eq!(app.startup_command(), None);
    }

    #[test]
    fn restored_session_fetches_tasks_first() {
        let mut app = dashboard_app(Vec::new());
        app.loaded = false;

        assert_eq!(app.screen(), Screen::Loading);
        assert_eq!(app.startup_command(), Some(Command::FetchTasks));
    }

    #[test]
    fn login_form_submits_credentials() {
        let mut app = signed_out_app();

        type_text(&mut app, "jo@x.com");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "pw");

        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Some(Command::Login {
                email: "jo@x.com".to_string(),
                password: "pw".to_string(),
            })
        );
    }

    #[test]
    fn login_form_requires_email_and_password() {
        let mut app = signed_out_app();
        type_text(&mut app, "jo@x.com");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        assert_eq!(app.notifications.active().len(), 1);
    }

    #[test]
    fn ctrl_r_switches_to_registration() {
        let mut app = signed_out_app();

        app.handle_key(ctrl('r'));
        assert_eq!(app.login.mode, AuthMode::Register);
        assert_eq!(app.login.focused(), LoginField::Name);

        type_text(&mut app, "Jo");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "jo@x.com");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "pw");

        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Some(Command::Register {
                name: "Jo".to_string(),
                email: "jo@x.com".to_string(),
                password: "pw".to_string(),
            })
        );
    }

    #[test]
    fn greeting_defaults_to_user() {
        let mut app = dashboard_app(Vec::new());
        assert_eq!(app.user_name(), "Jo");

        app.session.auth.user = None;
        assert_eq!(app.user_name(), "User");
    }

    #[test]
    fn enter_cycles_selected_task_status() {
        let todo = task("a", TaskStatus::Todo, TaskPriority::High, None);
        let id = todo.id;
        let mut app = dashboard_app(vec![todo]);

        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Some(Command::CycleStatus {
                id,
                next: TaskStatus::InProgress,
            })
        );
    }

    #[test]
    fn delete_needs_confirmation() {
        let doomed = task("a", TaskStatus::Todo, TaskPriority::High, None);
        let id = doomed.id;
        let mut app = dashboard_app(vec![doomed]);

        assert_eq!(app.handle_key(key(KeyCode::Char('d'))), None);
        assert_eq!(app.mode, Mode::ConfirmDelete(id));

        assert_eq!(app.handle_key(key(KeyCode::Char('n'))), None);
        assert_eq!(app.mode, Mode::Browse);

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(
            app.handle_key(key(KeyCode::Char('y'))),
            Some(Command::DeleteTask(id))
        );
        assert_eq!(app.mode, Mode::Browse);
    }

    #[test]
    fn task_form_ignores_blank_title() {
        let mut app = dashboard_app(Vec::new());
        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.mode, Mode::Editing);

        type_text(&mut app, "   ");
        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        assert!(app.notifications.active().is_empty());
    }

    #[test]
    fn task_form_builds_new_task() {
        let mut app = dashboard_app(Vec::new());
        app.handle_key(key(KeyCode::Char('a')));

        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "2025-03-01");
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Right));

        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Some(Command::CreateTask(NewTask {
                title: "Buy milk".to_string(),
                status: None,
                due_date: NaiveDate::from_ymd_opt(2025, 3, 1),
                priority: Some(TaskPriority::Low),
            }))
        );
    }

    #[test]
    fn task_form_rejects_bad_date() {
        let mut app = dashboard_app(Vec::new());
        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "tomorrow");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        assert_eq!(
            app.notifications.active()[0].message,
            "Due date must be YYYY-MM-DD"
        );
    }

    #[test]
    fn filter_key_clamps_selection() {
        let mut app = dashboard_app(vec![
            task("a", TaskStatus::Todo, TaskPriority::High, None),
            task("b", TaskStatus::Completed, TaskPriority::Low, None),
        ]);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 1);

        app.handle_key(key(KeyCode::Char('f')));

        assert_eq!(app.visible_tasks().len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn sign_out_returns_to_login() {
        let mut app = dashboard_app(Vec::new());

        app.handle_key(key(KeyCode::Char('o')));

        assert_eq!(app.screen(), Screen::Login);
    }

    #[tokio::test]
    async fn unreachable_server_reports_error_toast() {
        let mut app = signed_out_app();

        let follow_up = app
            .run(Command::Login {
                email: "jo@x.com".to_string(),
                password: "pw".to_string(),
            })
            .await;

        assert_eq!(follow_up, None);
        assert_eq!(app.screen(), Screen::Login);
        assert_eq!(app.notifications.active().len(), 1);
        assert!(!app.session.auth.loading);
    }
}
