use chrono::{Duration, NaiveDate, NaiveTime};
use egui::{Color32, RichText};

use crate::api::{format_clock_time, parse_clock_input};
use crate::config::{ClockFormat, ViewMode};
use crate::schedule::{Roster, ShiftDraft, UNASSIGNED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    Submit(ShiftDraft),
    Cancel,
}

/// Create/edit form for a single shift
#[derive(Debug, Default)]
pub struct ShiftDialog {
    open: bool,
    id: Option<String>,
    date_input: String,
    start_input: String,
    end_input: String,
    employee_id: Option<String>,
    group_id: Option<String>,
    approved: bool,
    /// Start time field is only offered in week view
    show_start_time: bool,
    /// Start carried over from the initial data when the field is hidden
    fixed_start: NaiveTime,
    error: Option<String>,
}

impl ShiftDialog {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_with(&mut self, draft: &ShiftDraft, view_mode: ViewMode, clock_format: ClockFormat) {
        *self = Self {
            open: true,
            id: draft.id.clone(),
            date_input: draft.date.format("%Y-%m-%d").to_string(),
            start_input: format_clock_time(draft.start_time, clock_format),
            end_input: draft
                .end_time
                .map(|t| format_clock_time(t, clock_format))
                .unwrap_or_default(),
            employee_id: draft.employee_id.clone(),
            group_id: draft.employee_group_id.clone(),
            approved: draft.approved,
            show_start_time: view_mode == ViewMode::Week,
            fixed_start: draft.start_time,
            error: None,
        };
    }

    pub fn close(&mut self) {
        self.open = false;
        self.error = None;
    }

    pub fn title(&self) -> &'static str {
        if self.id.is_some() {
            "Edit Shift"
        } else {
            "Create New Shift"
        }
    }

    /// Validate the inputs into a draft
    pub fn build_draft(&self) -> Result<ShiftDraft, String> {
        let date = NaiveDate::parse_from_str(self.date_input.trim(), "%Y-%m-%d")
            .map_err(|_| "Date must look like 2024-05-31".to_string())?;

        let start_time = if self.show_start_time {
            parse_clock_input(&self.start_input)
                .ok_or_else(|| "Start time is not a valid time".to_string())?
        } else {
            self.fixed_start
        };

        // Blank end time means the shift is still running
        let end_time = if self.end_input.trim().is_empty() {
            None
        } else {
            Some(
                parse_clock_input(&self.end_input)
                    .ok_or_else(|| "End time is not a valid time".to_string())?,
            )
        };

        Ok(ShiftDraft {
            id: self.id.clone(),
            date,
            start_time,
            end_time,
            employee_id: self.employee_id.clone(),
            employee_group_id: self.group_id.clone(),
            approved: self.approved,
        })
    }

    fn shift_date(&mut self, days: i64) {
        if let Ok(date) = NaiveDate::parse_from_str(self.date_input.trim(), "%Y-%m-%d") {
            self.date_input = (date + Duration::days(days)).format("%Y-%m-%d").to_string();
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, roster: &Roster, saving: bool) -> Option<DialogAction> {
        if !self.open {
            return None;
        }

        let mut action = None;
        let mut window_open = true;

        let (content_bg, frame_color, frame_text) = super::theme::dialog_colors();
        let dialog_frame = egui::Frame::none()
            .fill(content_bg)
            .stroke(egui::Stroke::new(2.0, frame_color))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(20.0));

        egui::Window::new(self.title())
            .open(&mut window_open)
            .collapsible(false)
            .resizable(false)
            .default_width(460.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame)
            .show(ctx, |ui| {
                ui.set_min_width(420.0);

                egui::Grid::new("shift_form_grid")
                    .num_columns(2)
                    .spacing([12.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Date");
                        ui.horizontal(|ui| {
                            if ui.small_button(egui_phosphor::regular::CARET_LEFT).clicked() {
                                self.shift_date(-1);
                            }
                            ui.add(
                                egui::TextEdit::singleline(&mut self.date_input)
                                    .desired_width(120.0)
                                    .hint_text("YYYY-MM-DD"),
                            );
                            if ui.small_button(egui_phosphor::regular::CARET_RIGHT).clicked() {
                                self.shift_date(1);
                            }
                        });
                        ui.end_row();

                        if self.show_start_time {
                            ui.label("Start");
                            ui.add(
                                egui::TextEdit::singleline(&mut self.start_input)
                                    .desired_width(120.0)
                                    .hint_text("9:00am"),
                            );
                            ui.end_row();
                        }

                        ui.label("End");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.end_input)
                                .desired_width(120.0)
                                .hint_text("blank = active"),
                        );
                        ui.end_row();

                        ui.label("Employee");
                        let selected_name = roster.display_name(self.employee_id.as_deref());
                        egui::ComboBox::from_id_salt("shift_employee")
                            .selected_text(selected_name)
                            .width(240.0)
                            .show_ui(ui, |ui| {
                                ui.selectable_value(&mut self.employee_id, None, UNASSIGNED);
                                for employee in &roster.employees {
                                    ui.selectable_value(
                                        &mut self.employee_id,
                                        Some(employee.id.clone()),
                                        employee.full_name(),
                                    );
                                }
                            });
                        ui.end_row();

                        ui.label("Group");
                        let selected_group = self
                            .group_id
                            .as_deref()
                            .and_then(|id| roster.group(id).ok())
                            .map(|g| g.name.clone())
                            .unwrap_or_else(|| "None".to_string());
                        egui::ComboBox::from_id_salt("shift_group")
                            .selected_text(selected_group)
                            .width(240.0)
                            .show_ui(ui, |ui| {
                                ui.selectable_value(&mut self.group_id, None, "None");
                                for group in &roster.groups {
                                    ui.selectable_value(&mut self.group_id, Some(group.id.clone()), group.name.as_str());
                                }
                            });
                        ui.end_row();

                        ui.label("");
                        ui.checkbox(&mut self.approved, "Approved");
                        ui.end_row();
                    });

                if let Some(error) = &self.error {
                    ui.add_space(6.0);
                    ui.label(RichText::new(error).color(Color32::from_rgb(0xff, 0x44, 0x44)));
                }

                ui.add_space(14.0);
                ui.horizontal(|ui| {
                    let save_label = if saving { "Saving..." } else { "Save" };
                    if ui.add_enabled(!saving, egui::Button::new(save_label)).clicked() {
                        match self.build_draft() {
                            Ok(draft) => {
                                self.error = None;
                                action = Some(DialogAction::Submit(draft));
                            }
                            Err(message) => self.error = Some(message),
                        }
                    }
                    if ui.button(RichText::new("Cancel").color(frame_text)).clicked() {
                        action = Some(DialogAction::Cancel);
                    }
                });
            });

        if !window_open {
            action = Some(DialogAction::Cancel);
        }
        if action == Some(DialogAction::Cancel) {
            self.close();
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn opened(draft: &ShiftDraft, view: ViewMode) -> ShiftDialog {
        let mut dialog = ShiftDialog::default();
        dialog.open_with(draft, view, ClockFormat::Hour24);
        dialog
    }

    #[test]
    fn title_depends_on_id() {
        let new = ShiftDraft::new_at(monday(), t(9, 0));
        assert_eq!(opened(&new, ViewMode::Week).title(), "Create New Shift");

        let existing = ShiftDraft { id: Some("7".into()), ..new };
        assert_eq!(opened(&existing, ViewMode::Week).title(), "Edit Shift");
    }

    #[test]
    fn unchanged_form_round_trips_the_draft() {
        let draft = ShiftDraft {
            id: Some("7".into()),
            end_time: Some(t(17, 30)),
            employee_id: Some("e1".into()),
            employee_group_id: Some("g1".into()),
            approved: true,
            ..ShiftDraft::new_at(monday(), t(9, 0))
        };
        assert_eq!(opened(&draft, ViewMode::Week).build_draft(), Ok(draft));
    }

    #[test]
    fn blank_end_is_open_ended() {
        let mut dialog = opened(&ShiftDraft::new_at(monday(), t(9, 0)), ViewMode::Week);
        dialog.end_input = "  ".into();
        assert_eq!(dialog.build_draft().unwrap().end_time, None);
        dialog.end_input = "5pm".into();
        assert_eq!(dialog.build_draft().unwrap().end_time, Some(t(17, 0)));
    }

    #[test]
    fn day_view_keeps_start_from_initial_data() {
        let mut dialog = opened(&ShiftDraft::new_at(monday(), t(13, 45)), ViewMode::Day);
        dialog.start_input = "garbage".into();
        assert_eq!(dialog.build_draft().unwrap().start_time, t(13, 45));
    }

    #[test]
    fn invalid_inputs_are_reported() {
        let mut dialog = opened(&ShiftDraft::new_at(monday(), t(9, 0)), ViewMode::Week);
        dialog.start_input = "25:00".into();
        assert!(dialog.build_draft().is_err());

        dialog.start_input = "9am".into();
        dialog.date_input = "06/05/2024".into();
        assert!(dialog.build_draft().is_err());
    }

    #[test]
    fn open_and_close() {
        let mut dialog = ShiftDialog::default();
        assert!(!dialog.is_open());
        dialog.open_with(&ShiftDraft::new_at(monday(), t(9, 0)), ViewMode::Day, ClockFormat::Hour12);
        assert!(dialog.is_open());
        dialog.close();
        assert!(!dialog.is_open());
    }

    #[test]
    fn date_arrows_move_by_day() {
        let mut dialog = opened(&ShiftDraft::new_at(monday(), t(9, 0)), ViewMode::Week);
        dialog.shift_date(-1);
        assert_eq!(dialog.date_input, "2024-05-05");
        dialog.shift_date(2);
        assert_eq!(dialog.date_input, "2024-05-07");
    }
}
