//! Main TUI application state and logic

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::components::{StatusDisplay, Tab, TabBar};
use super::events::{AppEvent, ScreenAction};
use super::screens::*;
use super::ui::centered_rect;
use crate::api::{self, AuthApi, BirthdayApi, HttpApi};
use crate::config::Config;
use crate::session::Session;
use crate::store::{OperationHandle, Reconciled, SliceKind, Store, StoreEvent};

const INPUT_POLL: Duration = Duration::from_millis(100);
const TOAST_TIMEOUT: Duration = Duration::from_secs(4);
const LOADING_BIRTHDAYS: &str = "Loading birthdays...";
const LOGIN_HINT: &str = "Enter: submit | F2: login/register | Esc: quit";
const IDLE_HINT: &str = "F1/?: help | Tab/1-4: switch tab | L: logout | q: quit";

/// Builds the authenticated API for a fresh session
pub type Connect = Box<dyn Fn(Session) -> Arc<dyn BirthdayApi>>;

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
}

/// Everything that belongs to one signed-in session; dropped on logout
pub struct Dashboard {
    pub session: Session,
    pub store: Store,
    pub tabs: TabBar,
    pub admin: AdminScreen,
    pub details: DetailsScreen,
    pub wishes: WishesScreen,
    pub photos: PhotosScreen,
    /// Running mutations by generation, with the toast to show on success
    pending: HashMap<u64, (OperationHandle, &'static str)>,
}

impl Dashboard {
    fn new(config: &Config, session: Session, store: Store) -> Self {
        let rows = &config.rows_per_page_options;
        let is_admin = session.is_admin();
        Self {
            tabs: TabBar::new(is_admin),
            admin: AdminScreen::new(rows),
            details: DetailsScreen::new(is_admin, rows),
            wishes: WishesScreen::new(rows),
            photos: PhotosScreen::new(rows, config.photo_dir.clone()),
            pending: HashMap::new(),
            session,
            store,
        }
    }

    fn is_capturing_input(&self) -> bool {
        match self.tabs.current() {
            Tab::Admin => self.admin.is_capturing_input(),
            Tab::Details => self.details.is_capturing_input(),
            Tab::Wishes => self.wishes.is_capturing_input(),
            Tab::Photos => self.photos.is_capturing_input(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, today: NaiveDate) -> ScreenAction {
        let birthdays = self.store.birthdays().items();
        match self.tabs.current() {
            Tab::Admin => self.admin.handle_key(key, self.store.users().items()),
            Tab::Details => self.details.handle_key(key, birthdays, today),
            Tab::Wishes => self.wishes.handle_key(key, birthdays),
            Tab::Photos => self.photos.handle_key(key, birthdays),
        }
    }

    fn track(&mut self, handle: OperationHandle, success: &'static str) {
        debug!("Tracking {} #{}", handle.operation().name(), handle.generation());
        self.pending.insert(handle.generation(), (handle, success));
    }

    /// Abort every save this dashboard started and is still waiting on
    fn cancel_pending(&mut self) -> usize {
        let cancelled = self.pending.len();
        for (_, (handle, _)) in self.pending.drain() {
            self.store.cancel_birthday_op(&handle);
        }
        cancelled
    }

    fn user_label(&self) -> String {
        match self.store.current_user() {
            Some(user) => format!("{} ({})", user.name, user.role.as_str()),
            None => format!("loading... ({})", self.session.role().as_str()),
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, today: NaiveDate) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.tabs.render(f, chunks[0], &self.user_label());

        let birthdays = self.store.birthdays().items();
        match self.tabs.current() {
            Tab::Admin => {
                self.admin
                    .draw(f, chunks[1], self.store.users().items(), birthdays.len())
            }
            Tab::Details => self.details.draw(f, chunks[1], birthdays, today),
            Tab::Wishes => self.wishes.draw(f, chunks[1], birthdays),
            Tab::Photos => self.photos.draw(f, chunks[1], birthdays),
        }
    }
}

/// Main TUI application state
pub struct App {
    pub config: Config,
    auth: Arc<dyn AuthApi>,
    connect: Connect,

    pub login: LoginScreen,
    pub dashboard: Option<Dashboard>,

    pub status: StatusDisplay,
    pub should_quit: bool,
    pub show_help_popup: bool,

    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    /// Tasks that report through `events_tx`
    background: Vec<AbortHandle>,
}

impl App {
    /// Create the application against the configured HTTP service
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpApi::new(&config)?;
        let auth: Arc<dyn AuthApi> = Arc::new(http.clone());
        let connect: Connect = Box::new(move |session: Session| -> Arc<dyn BirthdayApi> {
            Arc::new(http.clone().with_session(session))
        });

        let mut app = Self::with_backend(config, auth, connect);
        let session = app.config.session();
        if session.is_authenticated() {
            info!("Using token from the environment");
            app.start_session(session);
        }
        Ok(app)
    }

    pub fn with_backend(config: Config, auth: Arc<dyn AuthApi>, connect: Connect) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut status = StatusDisplay::new().with_auto_clear(TOAST_TIMEOUT);
        status.hint = LOGIN_HINT.to_string();
        Self {
            config,
            auth,
            connect,
            login: LoginScreen::new(),
            dashboard: None,
            status,
            should_quit: false,
            show_help_popup: false,
            events_tx,
            events_rx,
            background: Vec::new(),
        }
    }

    pub fn current_screen(&self) -> Screen {
        if self.dashboard.is_some() {
            Screen::Dashboard
        } else {
            Screen::Login
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(INPUT_POLL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }

            self.process_background();
            self.status.tick();

            if self.should_quit {
                break;
            }
            tokio::task::yield_now().await;
        }

        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.store.reset();
        }
        Ok(())
    }

    /// Apply every finished background task
    pub fn process_background(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_app_event(event);
        }

        let events = match self.dashboard.as_mut() {
            Some(dashboard) => dashboard.store.poll(),
            None => Vec::new(),
        };
        for event in events {
            self.handle_store_event(event);
        }
        self.show_fetch_progress();
    }

    fn show_fetch_progress(&mut self) {
        let Some(dashboard) = self.dashboard.as_ref() else {
            return;
        };
        let loading = dashboard.store.birthdays().is_loading();
        let showing = self
            .status
            .get_current()
            .is_some_and(|m| m.message == LOADING_BIRTHDAYS);
        if loading && self.status.get_current().is_none() {
            self.status.set_loading(LOADING_BIRTHDAYS.to_string());
        } else if !loading && showing {
            self.status.clear();
        }
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.show_help_popup {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?')) {
                self.show_help_popup = false;
            }
            return;
        }
        if key.code == KeyCode::F(1) {
            self.show_help_popup = true;
            return;
        }

        let today = Local::now().date_naive();
        let action = match self.dashboard.as_mut() {
            None => self.login.handle_key(key),
            Some(dashboard) => {
                if !dashboard.is_capturing_input() {
                    match key.code {
                        KeyCode::Char('q') => {
                            self.should_quit = true;
                            return;
                        }
                        KeyCode::Char('?') => {
                            self.show_help_popup = true;
                            return;
                        }
                        KeyCode::Char('L') => {
                            self.logout();
                            return;
                        }
                        KeyCode::Char('X') => {
                            match dashboard.cancel_pending() {
                                0 => self.status.set_info("No pending changes".to_string()),
                                n => self.status.set_info(format!("Cancelled {} pending change(s)", n)),
                            }
                            return;
                        }
                        KeyCode::Tab => {
                            dashboard.tabs.next();
                            return;
                        }
                        KeyCode::BackTab => {
                            dashboard.tabs.previous();
                            return;
                        }
                        KeyCode::Char(c) if c.is_ascii_digit() => {
                            let number = c.to_digit(10).unwrap_or(0) as usize;
                            if dashboard.tabs.select_number(number) {
                                return;
                            }
                        }
                        _ => {}
                    }
                }
                dashboard.handle_key(key, today)
            }
        };

        self.perform(action);
    }

    /// Carry out what a screen asked for
    pub fn perform(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::SetStatus(message) => self.status.set_info(message),
            ScreenAction::SetError(message) => self.status.set_error(message),

            ScreenAction::Login(credentials) => {
                self.login.busy = true;
                self.status.set_loading("Logging in...".to_string());
                let auth = Arc::clone(&self.auth);
                self.spawn_background(async move {
                    let result = auth.login(&credentials).await.map_err(|e| e.user_message());
                    AppEvent::LoginFinished(result)
                });
            }
            ScreenAction::Register(registration) => {
                self.login.busy = true;
                self.status.set_loading("Creating account...".to_string());
                let auth = Arc::clone(&self.auth);
                self.spawn_background(async move {
                    let result = auth
                        .register(&registration)
                        .await
                        .map_err(|e| e.user_message());
                    AppEvent::RegisterFinished {
                        email: registration.email,
                        result,
                    }
                });
            }

            ScreenAction::SavePhotos { id, count } => self.save_photos(id, count),

            store_action => {
                let Some(dashboard) = self.dashboard.as_mut() else {
                    warn!("Ignoring {:?} without a session", store_action);
                    return;
                };
                let store = &mut dashboard.store;
                let (handle, success) = match store_action {
                    ScreenAction::CreateBirthday(payload) => (
                        store.spawn_create_birthday(payload),
                        "Birthday added successfully",
                    ),
                    ScreenAction::UpdateBirthday { id, patch } => (
                        store.spawn_update_birthday(&id, patch),
                        "Birthday updated successfully",
                    ),
                    ScreenAction::DeleteBirthday(id) => (
                        store.spawn_delete_birthday(&id),
                        "Birthday deleted successfully",
                    ),
                    ScreenAction::SaveWish { id, wish } => {
                        (store.spawn_update_wish(&id, wish), "Wish saved successfully")
                    }
                    ScreenAction::UploadPhoto { id, path } => (
                        store.spawn_upload_photo(&id, path),
                        "Photo uploaded successfully",
                    ),
                    _ => return,
                };
                dashboard.track(handle, success);
                self.status.set_loading("Saving...".to_string());
            }
        }
    }

    fn save_photos(&mut self, id: String, count: usize) {
        let Some(dashboard) = self.dashboard.as_ref() else {
            return;
        };
        if let Err(e) = self.config.ensure_photo_dir() {
            self.status.set_error(format!("{:#}", e));
            return;
        }

        let api = dashboard.store.api();
        let dir = self.config.photo_dir.clone();
        self.status.set_loading(format!("Saving {} photo(s)...", count));
        self.spawn_background(async move {
            let indices: Vec<usize> = (0..count).collect();
            let result = api::save_photos(api.as_ref(), &id, &indices, &dir)
                .await
                .map_err(|e| e.user_message());
            AppEvent::PhotosSaved(result)
        });
    }

    fn spawn_background<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            // receiver lives as long as the app
            let _ = tx.send(task.await);
        });
        self.background.retain(|h| !h.is_finished());
        self.background.push(handle.abort_handle());
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoginFinished(Ok(response)) => {
                self.login.busy = false;
                info!("Logged in with role {}", response.role.as_str());
                self.start_session(Session::from(response));
                self.status.set_success("Login successful".to_string());
            }
            AppEvent::LoginFinished(Err(message)) => {
                self.login.busy = false;
                self.status.set_error(message);
            }
            AppEvent::RegisterFinished { email, result } => {
                self.login.busy = false;
                match result {
                    Ok(()) => {
                        self.login.registered(&email);
                        self.status
                            .set_success("Registration successful! Please login.".to_string());
                    }
                    Err(message) => self.status.set_error(message),
                }
            }
            AppEvent::UserCount(result) => match result {
                Ok(count) => {
                    if let Some(dashboard) = self.dashboard.as_mut() {
                        dashboard.admin.user_count = Some(count);
                    }
                }
                Err(message) => self.status.set_error(message),
            },
            AppEvent::PhotosSaved(result) => match result {
                Ok(paths) => self.status.set_success(format!(
                    "Saved {} photo(s) to {}",
                    paths.len(),
                    self.config.photo_dir.display()
                )),
                Err(message) => self.status.set_error(message),
            },
        }
    }

    fn handle_store_event(&mut self, event: StoreEvent) {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };
        let success = dashboard
            .pending
            .remove(&event.ticket.generation())
            .map(|(_, message)| message);

        match event.result {
            Ok(Reconciled::Applied) | Ok(Reconciled::Missing) => {
                if let (SliceKind::Birthdays, Some(message)) = (event.slice, success) {
                    self.status.set_success(message.to_string());
                }
            }
            Ok(Reconciled::Stale) | Ok(Reconciled::Cancelled) => {
                debug!("Dropped {} #{}", event.ticket.operation().name(), event.ticket.generation());
            }
            Err(e) => self.status.set_error(e.message().to_string()),
        }
    }

    /// Open a dashboard for `session` and start loading its data
    pub fn start_session(&mut self, session: Session) {
        let api = (self.connect)(session.clone());
        let mut store = Store::new(Arc::clone(&api));
        store.spawn_fetch_current_user();
        store.spawn_fetch_birthdays();

        if session.is_admin() {
            store.spawn_fetch_users();
            self.spawn_background(async move {
                AppEvent::UserCount(api.user_count().await.map_err(|e| e.user_message()))
            });
        }

        self.dashboard = Some(Dashboard::new(&self.config, session, store));
        self.status.hint = IDLE_HINT.to_string();
    }

    /// Cancel everything in flight and drop the session
    pub fn logout(&mut self) {
        if let Some(mut dashboard) = self.dashboard.take() {
            dashboard.store.reset();
        }
        for handle in self.background.drain(..) {
            handle.abort();
        }
        while self.events_rx.try_recv().is_ok() {}

        self.login.reset();
        self.status.hint = LOGIN_HINT.to_string();
        self.status.set_info("Logged out".to_string());
        info!("Logged out");
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        let today = Local::now().date_naive();
        match self.dashboard.as_mut() {
            None => self.login.draw(f, chunks[0]),
            Some(dashboard) => dashboard.draw(f, chunks[0], today),
        }

        self.status.render(f, chunks[1]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 70, area);
        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(self.get_context_help())
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false });

        f.render_widget(help_popup, popup_area);
    }

    /// Get context-sensitive help content
    fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            F1 / ? - Toggle this help\n\
            Ctrl+C - Quit application\n\n";

        let screen_help = match self.dashboard.as_ref().map(|d| d.tabs.current()) {
            None => {
                "Login:\n\
                Tab / Shift+Tab - Next / previous field\n\
                Enter - Submit\n\
                F2 - Switch between login and registration\n\
                Esc - Quit"
            }
            Some(tab) => match tab {
                Tab::Admin => {
                    "Admin Panel:\n\
                    / - Search users\n\
                    ↑/↓ - Select, ←/→ - Page, r - Rows per page\n\
                    Tab / 1-4 - Switch tab, X - Cancel pending saves, L - Logout, q - Quit"
                }
                Tab::Details => {
                    "Birthday Details:\n\
                    a - Add birthday\n\
                    e / Enter - Edit selected\n\
                    d - Delete selected (asks for confirmation)\n\
                    / - Search, ←/→ - Page, r - Rows per page\n\
                    In the form: Tab/↑↓ move, ←/→ change choice, Enter save, Esc cancel\n\
                    Tab / 1-4 - Switch tab, X - Cancel pending saves, L - Logout, q - Quit"
                }
                Tab::Wishes => {
                    "Wishes:\n\
                    w / Enter - Write a wish for the selected birthday\n\
                    / - Search, ←/→ - Page, r - Rows per page\n\
                    Tab / 1-4 - Switch tab, X - Cancel pending saves, L - Logout, q - Quit"
                }
                Tab::Photos => {
                    "Photos:\n\
                    u / Enter - Upload an image file for the selected birthday\n\
                    s - Save the selected birthday's photos to the photo directory\n\
                    / - Search, ←/→ - Page, r - Rows per page\n\
                    Tab / 1-4 - Switch tab, X - Cancel pending saves, L - Logout, q - Quit"
                }
            },
        };

        format!("{}{}", global_help, screen_help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{birthday, user, FakeApi};
    use crate::models::{NewBirthday, Role};

    fn app_with(fake: Arc<FakeApi>) -> App {
        let auth: Arc<dyn AuthApi> = fake.clone();
        let connect: Connect = Box::new(move |_: Session| -> Arc<dyn BirthdayApi> { fake.clone() });
        App::with_backend(Config::default(), auth, connect)
    }

    async fn settle(app: &mut App) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
            app.process_background();
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn status_text(app: &App) -> Option<String> {
        app.status.get_current().map(|m| m.message.clone())
    }

    #[tokio::test]
    async fn test_admin_login_loads_dashboard() {
        let fake = Arc::new(
            FakeApi::with_birthdays(vec![birthday("a", "Alice"), birthday("b", "Bob")])
                .with_users(vec![user("u1", "Admin", Role::Admin), user("u2", "Una", Role::User)]),
        );
        let mut app = app_with(fake);

        type_text(&mut app, "admin@example.com");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "secret");
        press(&mut app, KeyCode::Enter);
        assert!(app.login.busy);
        settle(&mut app).await;

        assert_eq!(app.current_screen(), Screen::Dashboard);
        let dashboard = app.dashboard.as_ref().unwrap();
        assert_eq!(dashboard.tabs.current(), Tab::Admin);
        assert_eq!(dashboard.store.birthdays().items().len(), 2);
        assert_eq!(dashboard.store.users().items().len(), 2);
        assert_eq!(dashboard.admin.user_count, Some(2));
        assert_eq!(dashboard.store.current_user().map(|u| u.id.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn test_failed_login_shows_server_message() {
        let mut app = app_with(Arc::new(FakeApi::new()));
        type_text(&mut app, "nobody@example.com");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "secret");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(app.current_screen(), Screen::Login);
        assert!(!app.login.busy);
        assert_eq!(status_text(&app).as_deref(), Some("Invalid email or password"));
    }

    #[tokio::test]
    async fn test_registration_returns_to_login() {
        let mut app = app_with(Arc::new(FakeApi::new()));
        press(&mut app, KeyCode::F(2));
        type_text(&mut app, "Carol");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "carol@example.com");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "secret1");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(app.login.mode, LoginMode::Login);
        assert_eq!(app.login.form.value("email"), "carol@example.com");
        assert_eq!(
            status_text(&app).as_deref(),
            Some("Registration successful! Please login.")
        );
    }

    #[tokio::test]
    async fn test_mutations_toast_on_success_and_failure() {
        let fake = Arc::new(FakeApi::with_birthdays(vec![birthday("a", "Alice")]));
        let mut app = app_with(fake.clone());
        app.start_session(Session::new("token", Role::User));
        settle(&mut app).await;

        let payload = NewBirthday::new(
            "Dave",
            "Male",
            "friend",
            "555",
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            "dave@example.com",
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        app.perform(ScreenAction::CreateBirthday(payload));
        settle(&mut app).await;
        assert_eq!(status_text(&app).as_deref(), Some("Birthday added successfully"));
        let store = &app.dashboard.as_ref().unwrap().store;
        assert_eq!(store.birthdays().items().len(), 2);

        fake.fail_next(500, Some("Database unavailable"));
        app.perform(ScreenAction::DeleteBirthday("a".to_string()));
        settle(&mut app).await;
        assert_eq!(status_text(&app).as_deref(), Some("Database unavailable"));
        let store = &app.dashboard.as_ref().unwrap().store;
        assert!(store.birthdays().get("a").is_some());
    }

    #[tokio::test]
    async fn test_non_admin_has_no_admin_tab() {
        let fake = Arc::new(FakeApi::new());
        let mut app = app_with(fake);
        app.start_session(Session::new("token", Role::User));
        let dashboard = app.dashboard.as_ref().unwrap();
        assert_eq!(dashboard.tabs.current(), Tab::Details);
        assert!(!dashboard.tabs.tabs.contains(&Tab::Admin));
    }

    #[tokio::test]
    async fn test_logout_cancels_in_flight_work() {
        let fake = Arc::new(FakeApi::with_birthdays(vec![birthday("a", "Alice")]));
        let _release = fake.hold("list");
        let mut app = app_with(fake);
        app.start_session(Session::new("token", Role::Admin));
        assert!(app.dashboard.as_ref().unwrap().store.in_flight() > 0);

        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.current_screen(), Screen::Login);
        assert!(app.background.is_empty());
        settle(&mut app).await;

        assert_eq!(app.current_screen(), Screen::Login);
        assert_eq!(status_text(&app).as_deref(), Some("Logged out"));
    }

    #[tokio::test]
    async fn test_cancel_pending_keeps_record() {
        let fake = Arc::new(FakeApi::with_birthdays(vec![birthday("a", "Alice")]));
        let mut app = app_with(fake.clone());
        app.start_session(Session::new("token", Role::User));
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('X'));
        assert_eq!(status_text(&app).as_deref(), Some("No pending changes"));

        let release = fake.hold("delete");
        app.perform(ScreenAction::DeleteBirthday("a".to_string()));
        press(&mut app, KeyCode::Char('X'));
        assert_eq!(
            status_text(&app).as_deref(),
            Some("Cancelled 1 pending change(s)")
        );

        let _ = release.send(());
        settle(&mut app).await;
        let dashboard = app.dashboard.as_ref().unwrap();
        assert!(dashboard.pending.is_empty());
        assert!(dashboard.store.birthdays().get("a").is_some());
        assert_eq!(
            status_text(&app).as_deref(),
            Some("Cancelled 1 pending change(s)")
        );
    }

    #[tokio::test]
    async fn test_typing_in_a_form_does_not_trigger_shortcuts() {
        let mut app = app_with(Arc::new(FakeApi::new()));
        app.start_session(Session::new("token", Role::User));
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "qL2");

        assert!(!app.should_quit);
        let dashboard = app.dashboard.as_ref().unwrap();
        assert_eq!(dashboard.tabs.current(), Tab::Details);
        assert_eq!(dashboard.details.form.value("name"), "qL2");
    }
}
