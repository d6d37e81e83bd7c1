use anyhow::Context as _;
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use eframe::egui;
use egui::{Color32, RichText};
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::api::{LoginResponse, ScheduleClient};
use crate::config::{Config, ViewMode};
use crate::schedule::{parse_clock_time, Clock, FixedClock, Roster, Shift, ShiftDraft, SystemClock};
use super::login::{LoginAction, LoginForm};
use super::shift_dialog::{DialogAction, ShiftDialog};
use super::theme::Palette;
use super::views::{self, GridContext};

/// Pins the grid's "now" to a fixed `HH:MM`, handy for screenshots
const FROZEN_TIME_ENV: &str = "SHIFTBOARD_FROZEN_TIME";

type DateRange = (NaiveDate, NaiveDate);

pub struct ShiftboardApp {
    config: Config,
    palette: Palette,
    clock: Box<dyn Clock>,
    board: Board,

    // Current view
    selected_date: NaiveDate,

    // Async communication
    runtime: tokio::runtime::Runtime,
    result_rx: Receiver<AsyncResult>,
    result_tx: Sender<AsyncResult>,
}

struct Session {
    token: String,
    user_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum AppState {
    #[default]
    Login,
    Schedule,
}

enum AsyncResult {
    LoggedIn(LoginResponse),
    LoginFailed(String),
    ScheduleLoaded {
        range: DateRange,
        shifts: Vec<Shift>,
        roster: Roster,
    },
    LoadFailed {
        range: DateRange,
        message: String,
    },
    ShiftSaved(Shift, bool), // (shift, is_edit)
    SaveFailed(String),
}

/// What the app still has to do after a result was applied
#[derive(Debug, PartialEq)]
enum Followup {
    None,
    /// Remember the email and load the visible period
    SignedIn { email: String },
}

/// Screen and session state that async results act on. Holds no runtime
/// or window handles.
#[derive(Default)]
struct Board {
    state: AppState,
    login: LoginForm,
    session: Option<Session>,

    shifts: Vec<Shift>,
    roster: Roster,
    /// Range of the load in flight or last applied; anything else is stale
    loaded_range: Option<DateRange>,

    dialog: ShiftDialog,
    saving: bool,

    // Status
    status_message: Option<(String, bool)>, // (message, is_error)
    loading: bool,
}

impl Board {
    fn new(last_email: String) -> Self {
        Self {
            login: LoginForm::new(last_email),
            ..Default::default()
        }
    }

    fn begin_login(&mut self) {
        self.login.loading = true;
        self.login.error = None;
    }

    fn begin_load(&mut self, range: DateRange) {
        self.loaded_range = Some(range);
        self.loading = true;
        // Clear shifts immediately for snappy UI
        self.shifts.clear();
    }

    fn is_current(&self, range: DateRange) -> bool {
        self.loaded_range == Some(range)
    }

    fn logout(&mut self) {
        info!("signed out");
        self.session = None;
        self.shifts.clear();
        self.roster = Roster::default();
        self.loaded_range = None;
        self.loading = false;
        self.saving = false;
        self.dialog.close();
        self.status_message = None;
        self.state = AppState::Login;
    }

    fn apply(&mut self, result: AsyncResult) -> Followup {
        match result {
            AsyncResult::LoggedIn(response) => {
                let user_name = response.user.display_name();
                info!(user = %user_name, "signed in");
                self.session = Some(Session {
                    token: response.token,
                    user_name,
                });
                self.login.loading = false;
                self.login.error = None;
                self.login.password.clear();
                self.state = AppState::Schedule;
                return Followup::SignedIn { email: response.user.email };
            }
            AsyncResult::LoginFailed(msg) => {
                self.login.loading = false;
                self.login.error = Some(msg);
            }
            AsyncResult::ScheduleLoaded { range, shifts, roster } => {
                // Response for a period the user already left, or from before logout
                if !self.is_current(range) {
                    debug!(?range, "dropping stale schedule");
                    return Followup::None;
                }
                info!(shifts = shifts.len(), employees = roster.employees.len(), "schedule loaded");
                self.shifts = shifts;
                self.roster = roster;
                self.loading = false;
                self.status_message = None;
            }
            AsyncResult::LoadFailed { range, message } => {
                if !self.is_current(range) {
                    debug!(?range, error = %message, "dropping stale load error");
                    return Followup::None;
                }
                warn!(error = %message, "schedule load failed");
                self.loading = false;
                self.status_message = Some((message, true));
            }
            AsyncResult::ShiftSaved(shift, is_edit) => {
                if self.session.is_none() {
                    return Followup::None;
                }
                self.saving = false;
                self.dialog.close();
                upsert_shift(&mut self.shifts, shift);
                let msg = if is_edit { "Shift updated" } else { "Shift created" };
                self.status_message = Some((msg.to_string(), false));
            }
            AsyncResult::SaveFailed(msg) => {
                if self.session.is_none() {
                    return Followup::None;
                }
                warn!(error = %msg, "save failed");
                self.saving = false;
                self.status_message = Some((msg, true));
            }
        }
        Followup::None
    }

    fn busy(&self) -> bool {
        self.loading || self.saving || self.login.loading
    }
}

fn clock_from_env() -> Box<dyn Clock> {
    match std::env::var(FROZEN_TIME_ENV) {
        Ok(value) => match parse_clock_time(&value) {
            Ok(time) => {
                info!(%time, "using frozen clock");
                Box::new(FixedClock(time))
            }
            Err(e) => {
                warn!(error = %e, "ignoring {}", FROZEN_TIME_ENV);
                Box::new(SystemClock)
            }
        },
        Err(_) => Box::new(SystemClock),
    }
}

/// Replace a shift by id, or add it, keeping date/start order
fn upsert_shift(shifts: &mut Vec<Shift>, shift: Shift) {
    match shifts.iter_mut().find(|s| s.id == shift.id) {
        Some(existing) => *existing = shift,
        None => shifts.push(shift),
    }
    shifts.sort_by(|a, b| {
        a.date.cmp(&b.date).then_with(|| a.start_time.cmp(&b.start_time))
    });
}

impl ShiftboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default config");
            Config::default()
        });
        let palette = Palette::default();
        super::setup_fonts(&cc.egui_ctx);
        super::setup_theme(&cc.egui_ctx, &palette);

        let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        let (result_tx, result_rx) = channel();

        Ok(Self {
            board: Board::new(config.last_email.clone()),
            config,
            palette,
            clock: clock_from_env(),
            selected_date: Local::now().date_naive(),
            runtime,
            result_rx,
            result_tx,
        })
    }

    fn visible_days(&self) -> Vec<NaiveDate> {
        views::visible_days(self.selected_date, self.config.view_mode)
    }

    fn visible_range(&self) -> DateRange {
        let days = self.visible_days();
        match (days.first(), days.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => (self.selected_date, self.selected_date),
        }
    }

    fn check_async_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match self.board.apply(result) {
                Followup::SignedIn { email } => {
                    self.config.last_email = email;
                    if let Err(e) = self.config.save() {
                        warn!(error = %e, "could not save config");
                    }
                    self.refresh_data();
                }
                Followup::None => {}
            }
        }
    }

    fn submit_login(&mut self, email: String, password: String) {
        self.board.begin_login();

        let config = self.config.clone();
        let tx = self.result_tx.clone();
        self.runtime.spawn(async move {
            let result = async {
                let client = ScheduleClient::anonymous(&config)?;
                client.login(&email, &password).await
            }.await;

            let _ = match result {
                Ok(response) => tx.send(AsyncResult::LoggedIn(response)),
                Err(e) => tx.send(AsyncResult::LoginFailed(e.to_string())),
            };
        });
    }

    fn refresh_data(&mut self) {
        let Some(session) = &self.board.session else {
            return;
        };
        let token = session.token.clone();

        let range = self.visible_range();
        self.board.begin_load(range);

        let config = self.config.clone();
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let (from, to) = range;
            let result = async {
                let client = ScheduleClient::with_token(&config, &token)?;
                let shifts = client.list_shifts(from, to).await?;
                let employees = client.list_employees().await?;
                let groups = client.list_employee_groups().await?;
                Ok::<_, anyhow::Error>((shifts, Roster::new(employees, groups)))
            }.await;

            let _ = match result {
                Ok((shifts, roster)) => tx.send(AsyncResult::ScheduleLoaded { range, shifts, roster }),
                Err(e) => tx.send(AsyncResult::LoadFailed {
                    range,
                    message: format!("Error: {:#}", e),
                }),
            };
        });
    }

    fn navigate(&mut self, direction: i64) {
        let step = match self.config.view_mode {
            ViewMode::Week => 7,
            ViewMode::Day => 1,
        };
        self.selected_date += Duration::days(step * direction);
        self.refresh_data();
    }

    fn set_view_mode(&mut self, view_mode: ViewMode) {
        if self.config.view_mode == view_mode {
            return;
        }
        self.config.view_mode = view_mode;
        if let Err(e) = self.config.save() {
            warn!(error = %e, "could not save config");
        }
        self.refresh_data();
    }

    fn open_add_dialog(&mut self, date: NaiveDate, start: NaiveTime) {
        let draft = ShiftDraft::new_at(date, start);
        self.board.dialog.open_with(&draft, self.config.view_mode, self.config.clock_format);
    }

    fn open_edit_dialog(&mut self, shift: &Shift) {
        debug!(id = %shift.id, "editing shift");
        self.board.dialog.open_with(&shift.to_draft(), self.config.view_mode, self.config.clock_format);
    }

    fn save_shift(&mut self, draft: ShiftDraft) {
        let Some(session) = &self.board.session else {
            return;
        };
        let token = session.token.clone();
        self.board.saving = true;

        let config = self.config.clone();
        let tx = self.result_tx.clone();
        let is_edit = draft.is_edit();

        self.runtime.spawn(async move {
            let result = async {
                let client = ScheduleClient::with_token(&config, &token)?;
                client.save_shift(&draft).await
            }.await;

            let _ = match result {
                Ok(shift) => tx.send(AsyncResult::ShiftSaved(shift, is_edit)),
                Err(e) => tx.send(AsyncResult::SaveFailed(format!("Could not save shift: {:#}", e))),
            };
        });
    }

    fn open_page(&self, page: &str) {
        let url = self.config.page_url(page);
        if let Err(e) = open::that(&url) {
            warn!(%url, error = %e, "could not open browser");
        }
    }

    fn render_login(&mut self, ui: &mut egui::Ui) {
        match self.board.login.show(ui, &self.palette) {
            Some(LoginAction::Submit { email, password }) => self.submit_login(email, password),
            Some(LoginAction::OpenPage(page)) => self.open_page(page),
            None => {}
        }
    }

    fn render_schedule(&mut self, ui: &mut egui::Ui) {
        let days = self.visible_days();

        // Header with period navigation
        ui.horizontal(|ui| {
            let (button_bg, button_text) = super::theme::button_colors();

            egui::Frame::none()
                .fill(button_bg)
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let left_arrow = ui.add(egui::Label::new(
                            RichText::new(egui_phosphor::regular::CARET_LEFT).size(14.0).color(button_text)
                        ).sense(egui::Sense::click()));
                        if left_arrow.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        }
                        if left_arrow.clicked() {
                            self.navigate(-1);
                        }

                        ui.add_space(4.0);
                        ui.label(RichText::new(views::period_label(&days)).size(14.0).color(button_text));
                        ui.add_space(4.0);

                        let right_arrow = ui.add(egui::Label::new(
                            RichText::new(egui_phosphor::regular::CARET_RIGHT).size(14.0).color(button_text)
                        ).sense(egui::Sense::click()));
                        if right_arrow.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        }
                        if right_arrow.clicked() {
                            self.navigate(1);
                        }
                    });
                });

            if ui.button("Today").clicked() {
                self.selected_date = Local::now().date_naive();
                self.refresh_data();
            }

            ui.add_space(8.0);
            let mut view_mode = self.config.view_mode;
            ui.selectable_value(&mut view_mode, ViewMode::Week, "Week");
            ui.selectable_value(&mut view_mode, ViewMode::Day, "Day");
            self.set_view_mode(view_mode);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let logout = ui.add(egui::Button::new(
                    RichText::new(egui_phosphor::regular::SIGN_OUT).size(16.0)
                ).frame(false)).on_hover_text("Sign out");
                if logout.clicked() {
                    self.board.logout();
                    return;
                }

                if let Some(session) = &self.board.session {
                    ui.label(RichText::new(&session.user_name).color(Color32::from_rgb(176, 176, 168)));
                }

                let add_button = egui::Button::new(
                    RichText::new(format!("{} Add shift", egui_phosphor::regular::PLUS)).color(Color32::WHITE)
                ).fill(self.palette.brand_accent);
                if ui.add(add_button).clicked() {
                    let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default();
                    self.open_add_dialog(self.selected_date, start);
                }

                if self.board.loading {
                    ui.spinner();
                }
            });
        });

        if self.board.state != AppState::Schedule {
            return;
        }

        ui.add_space(8.0);

        let grid = GridContext {
            scale: &self.config.grid,
            palette: &self.palette,
            clock_format: self.config.clock_format,
            today: Local::now().date_naive(),
            now: self.clock.now(),
        };
        let result = views::render_schedule_view(ui, &days, &self.board.shifts, &self.board.roster, &grid);

        // The open dialog owns input until it closes
        if self.board.dialog.is_open() {
            return;
        }
        // Edit wins if a single frame somehow produced both
        if let Some(shift) = result.edit_shift {
            self.open_edit_dialog(&shift);
        } else if let Some((date, time)) = result.add_at {
            self.open_add_dialog(date, time);
        }
    }
}

impl eframe::App for ShiftboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_async_results();

        egui::CentralPanel::default().frame(
            egui::Frame::none().inner_margin(egui::Margin::symmetric(12.0, 8.0))
        ).show(ctx, |ui| {
            // Status message with close button
            let mut dismiss_message = false;
            if self.board.state == AppState::Schedule {
                if let Some((msg, is_error)) = &self.board.status_message {
                    let color = if *is_error {
                        Color32::from_rgb(224, 108, 117)
                    } else {
                        Color32::from_rgb(152, 195, 121)
                    };
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(msg).color(color));
                        ui.add_space(8.0);
                        let close_btn = ui.add(egui::Label::new(
                            RichText::new(egui_phosphor::regular::X).size(14.0).color(Color32::from_rgb(120, 120, 130))
                        ).sense(egui::Sense::click()));
                        if close_btn.hovered() {
                            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                        }
                        if close_btn.clicked() {
                            dismiss_message = true;
                        }
                    });
                    ui.add_space(8.0);
                }
            }
            if dismiss_message {
                self.board.status_message = None;
            }

            match self.board.state {
                AppState::Login => self.render_login(ui),
                AppState::Schedule => self.render_schedule(ui),
            }
        });

        if self.board.state == AppState::Schedule {
            match self.board.dialog.show(ctx, &self.board.roster, self.board.saving) {
                Some(DialogAction::Submit(draft)) => self.save_shift(draft),
                Some(DialogAction::Cancel) | None => {}
            }
        }

        // Keep open-ended shifts and the now line moving
        if self.board.busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_secs(60));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SessionUser;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn shift(id: &str, day: u32, hour: u32) -> Shift {
        Shift {
            id: id.into(),
            date: date(day),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: None,
            employee_id: None,
            employee_group: None,
            approved: false,
        }
    }

    fn this_week() -> DateRange {
        (date(6), date(12))
    }

    fn next_week() -> DateRange {
        (date(13), date(19))
    }

    fn loaded(range: DateRange, shifts: Vec<Shift>) -> AsyncResult {
        AsyncResult::ScheduleLoaded { range, shifts, roster: Roster::default() }
    }

    fn board_with_session() -> Board {
        let mut board = Board::new("ops@example.com".into());
        let followup = board.apply(AsyncResult::LoggedIn(LoginResponse {
            token: "t0k".into(),
            user: SessionUser {
                email: "ops@example.com".into(),
                first_name: Some("Ada".into()),
                last_name: None,
            },
        }));
        assert_eq!(followup, Followup::SignedIn { email: "ops@example.com".into() });
        board
    }

    #[test]
    fn login_moves_to_schedule() {
        let board = board_with_session();
        assert_eq!(board.state, AppState::Schedule);
        assert_eq!(board.session.as_ref().map(|s| s.user_name.as_str()), Some("Ada"));
        assert!(!board.login.loading);
    }

    #[test]
    fn login_failure_stays_on_form() {
        let mut board = Board::new(String::new());
        board.begin_login();
        board.apply(AsyncResult::LoginFailed("Invalid email or password".into()));
        assert_eq!(board.state, AppState::Login);
        assert!(!board.login.loading);
        assert_eq!(board.login.error.as_deref(), Some("Invalid email or password"));
    }

    #[test]
    fn stale_schedule_is_dropped() {
        let mut board = board_with_session();
        board.begin_load(this_week());
        board.begin_load(next_week());

        board.apply(loaded(this_week(), vec![shift("old", 6, 9)]));
        assert!(board.shifts.is_empty());
        assert!(board.loading);

        board.apply(loaded(next_week(), vec![shift("new", 13, 9)]));
        assert_eq!(board.shifts.len(), 1);
        assert!(!board.loading);
    }

    #[test]
    fn stale_load_error_is_dropped() {
        let mut board = board_with_session();
        board.begin_load(this_week());
        board.begin_load(next_week());

        board.apply(AsyncResult::LoadFailed { range: this_week(), message: "Error: boom".into() });
        assert!(board.loading);
        assert!(board.status_message.is_none());

        board.apply(AsyncResult::LoadFailed { range: next_week(), message: "Error: boom".into() });
        assert!(!board.loading);
        assert_eq!(board.status_message, Some(("Error: boom".to_string(), true)));
    }

    #[test]
    fn logout_with_load_in_flight() {
        let mut board = board_with_session();
        board.begin_load(this_week());
        board.logout();
        assert!(!board.busy());

        board.apply(loaded(this_week(), vec![shift("late", 6, 9)]));
        board.apply(AsyncResult::ShiftSaved(shift("late", 6, 9), false));
        assert_eq!(board.state, AppState::Login);
        assert!(board.shifts.is_empty());
        assert!(!board.busy());
        assert!(board.status_message.is_none());
    }

    #[test]
    fn saved_shift_is_upserted() {
        let mut board = board_with_session();
        board.begin_load(this_week());
        board.apply(loaded(this_week(), vec![shift("a", 6, 9)]));
        board.saving = true;

        board.apply(AsyncResult::ShiftSaved(shift("b", 6, 7), false));
        assert!(!board.saving);
        assert_eq!(board.shifts.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(board.status_message, Some(("Shift created".to_string(), false)));
    }

    #[test]
    fn upsert_replaces_by_id_and_keeps_order() {
        let mut shifts = vec![shift("a", 6, 9), shift("b", 7, 8)];

        let mut moved = shift("a", 8, 7);
        moved.approved = true;
        upsert_shift(&mut shifts, moved);
        assert_eq!(shifts.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), ["b", "a"]);
        assert!(shifts[1].approved);

        upsert_shift(&mut shifts, shift("c", 6, 12));
        assert_eq!(shifts.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), ["c", "b", "a"]);
    }
}
