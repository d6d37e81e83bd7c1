use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use egui::{Color32, Ui};

use crate::api::{format_clock_time, snap_to_quarter};
use crate::config::{ClockFormat, ViewMode};
use crate::schedule::{
    assign_slots, minutes_of_day, resolve_gesture, shift_geometry, sort_for_paint, CardGesture,
    GridAction, GridScale, Roster, Shift, ShiftCard, SlottedShift,
};
use super::theme::Palette;

/// Result from schedule view interactions
#[derive(Debug, Default)]
pub struct ScheduleResult {
    pub edit_shift: Option<Shift>,
    pub add_at: Option<(NaiveDate, NaiveTime)>,
}

impl ScheduleResult {
    fn apply(&mut self, action: GridAction) {
        match action {
            GridAction::EditShift(shift) => self.edit_shift = Some(shift),
            GridAction::AddShiftAt(date, time) => self.add_at = Some((date, time)),
            GridAction::None => {}
        }
    }
}

/// Everything the grid needs besides the data itself
pub struct GridContext<'a> {
    pub scale: &'a GridScale,
    pub palette: &'a Palette,
    pub clock_format: ClockFormat,
    pub today: NaiveDate,
    /// Wall-clock time for this frame, used for open-ended shifts
    pub now: NaiveTime,
}

/// Monday of the week containing `date`, or the date itself in day view
pub fn visible_days(anchor: NaiveDate, view_mode: ViewMode) -> Vec<NaiveDate> {
    match view_mode {
        ViewMode::Day => vec![anchor],
        ViewMode::Week => {
            let monday = crate::api::week_start(anchor);
            (0..7).map(|i| monday + Duration::days(i)).collect()
        }
    }
}

/// Header label for a period, e.g. "May 6 - 12, 2024" or "Monday, May 6, 2024"
pub fn period_label(days: &[NaiveDate]) -> String {
    match (days.first(), days.last()) {
        (Some(first), Some(last)) if first == last => first.format("%A, %B %-d, %Y").to_string(),
        (Some(first), Some(last)) if first.month() == last.month() => {
            format!("{} - {}, {}", first.format("%B %-d"), last.day(), last.year())
        }
        (Some(first), Some(last)) => {
            format!("{} - {}", first.format("%b %-d"), last.format("%b %-d, %Y"))
        }
        _ => String::new(),
    }
}

fn weekday_name(day: NaiveDate) -> &'static str {
    match day.weekday() {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Cards for one day, in paint order. Card text ignores the clock
/// preference, which only applies to the hour axis.
fn day_cards<'a>(
    day_shifts: &[SlottedShift<'a>],
    roster: &Roster,
    grid: &GridContext<'_>,
) -> Vec<ShiftCard<'a>> {
    let mut cards: Vec<ShiftCard<'a>> = day_shifts
        .iter()
        .map(|s| {
            let geometry = shift_geometry(s.shift, grid.now, grid.scale);
            ShiftCard::present(s.shift, geometry, s.slot, roster)
        })
        .filter(|card| card.geometry.is_valid())
        .collect();
    sort_for_paint(&mut cards);
    cards
}

/// Card drawn at its final position
struct PlacedCard<'a> {
    card: ShiftCard<'a>,
    rect: egui::Rect,
}

/// Render the time grid with one column per day
pub fn render_schedule_view(
    ui: &mut Ui,
    days: &[NaiveDate],
    shifts: &[Shift],
    roster: &Roster,
    grid: &GridContext<'_>,
) -> ScheduleResult {
    let mut result = ScheduleResult::default();
    let scale = grid.scale;
    let palette = grid.palette;

    // Layout constants
    let hour_label_width = 60.0;
    let header_height = 32.0;
    let hour_height = scale.pixels_per_hour;
    let num_hours = scale.visible_hours() as usize;
    let total_grid_height = scale.grid_height();

    let available_width = ui.available_width();
    let num_days = days.len().max(1);
    let day_width = (available_width - hour_label_width) / num_days as f32;

    let slots = assign_slots(shifts, grid.now);

    // Fixed day headers (outside ScrollArea)
    let (header_rect, _) = ui.allocate_exact_size(
        egui::vec2(available_width, header_height),
        egui::Sense::hover()
    );

    let painter = ui.painter();

    for (i, day) in days.iter().enumerate() {
        let x = header_rect.min.x + hour_label_width + i as f32 * day_width;
        let col_header_rect = egui::Rect::from_min_size(
            egui::pos2(x, header_rect.min.y),
            egui::vec2(day_width, header_height)
        );

        let is_today = *day == grid.today;
        let day_color = if is_today { palette.brand_accent } else { Color32::from_rgb(0xb0, 0xb0, 0xa8) };
        let shift_count = slots.get(day).map(Vec::len).unwrap_or(0);

        let text_y = col_header_rect.center().y;
        let day_galley = painter.layout_no_wrap(
            format!("{} {}", weekday_name(*day), day.day()),
            egui::FontId::proportional(14.0),
            day_color
        );
        let day_width_px = day_galley.rect.width();
        painter.galley(egui::pos2(col_header_rect.min.x + 8.0, text_y - day_galley.rect.height() / 2.0), day_galley, day_color);

        if shift_count > 0 {
            painter.text(
                egui::pos2(col_header_rect.min.x + 8.0 + day_width_px + 8.0, text_y),
                egui::Align2::LEFT_CENTER,
                format!("{} {}", egui_phosphor::regular::USERS, shift_count),
                egui::FontId::proportional(12.0),
                Color32::WHITE,
            );
        }

        // Vertical separator line between columns
        if i > 0 {
            painter.line_segment(
                [
                    egui::pos2(x, col_header_rect.min.y + 4.0),
                    egui::pos2(x, col_header_rect.max.y - 4.0),
                ],
                egui::Stroke::new(1.0, palette.grid_line),
            );
        }
    }

    // Scrollable grid area
    egui::ScrollArea::vertical()
        .id_salt("schedule_grid")
        .auto_shrink([false, false])
        .show(ui, |ui| {
        let (grid_rect, _) = ui.allocate_exact_size(
            egui::vec2(available_width, total_grid_height),
            egui::Sense::hover()
        );

        let painter = ui.painter();

        // Highlight current day column with dim background
        if let Some(i) = days.iter().position(|d| *d == grid.today) {
            let col_x = grid_rect.min.x + hour_label_width + i as f32 * day_width;
            let col_rect = egui::Rect::from_min_size(
                egui::pos2(col_x, grid_rect.min.y),
                egui::vec2(day_width, total_grid_height)
            );
            painter.rect_filled(col_rect, 0.0, palette.today_column);
        }

        // Vertical grid lines for columns, plus the right edge
        for i in 0..=days.len() {
            let x = grid_rect.min.x + hour_label_width + i as f32 * day_width;
            painter.line_segment(
                [egui::pos2(x, grid_rect.min.y), egui::pos2(x, grid_rect.max.y)],
                egui::Stroke::new(1.0, palette.grid_line),
            );
        }

        // Hour labels and horizontal grid lines
        for hour_idx in 0..=num_hours {
            let hour = scale.first_hour + hour_idx as u32;
            let y = grid_rect.min.y + hour_idx as f32 * hour_height;

            if hour_idx < num_hours {
                if let Some(label_time) = NaiveTime::from_hms_opt(hour, 0, 0) {
                    painter.text(
                        egui::pos2(grid_rect.min.x + hour_label_width - 8.0, y),
                        egui::Align2::RIGHT_TOP,
                        format_clock_time(label_time, grid.clock_format),
                        egui::FontId::proportional(11.0),  // Smaller font for axis labels
                        palette.axis_label,
                    );
                }
            }

            painter.line_segment(
                [
                    egui::pos2(grid_rect.min.x + hour_label_width, y),
                    egui::pos2(grid_rect.max.x, y),
                ],
                egui::Stroke::new(1.0, if hour_idx == 0 { palette.hour_line } else { palette.grid_line }),
            );

            // 15-minute subdivision lines
            if hour_idx < num_hours {
                let quarter_height = hour_height / 4.0;
                for quarter in 1..4 {
                    let quarter_y = y + quarter as f32 * quarter_height;
                    painter.line_segment(
                        [
                            egui::pos2(grid_rect.min.x + hour_label_width, quarter_y),
                            egui::pos2(grid_rect.max.x, quarter_y),
                        ],
                        egui::Stroke::new(1.0, palette.quarter_line),
                    );
                }
            }
        }

        for (day_idx, day) in days.iter().enumerate() {
            let col_x = grid_rect.min.x + hour_label_width + day_idx as f32 * day_width;
            let col_rect = egui::Rect::from_min_size(
                egui::pos2(col_x, grid_rect.min.y),
                egui::vec2(day_width, total_grid_height)
            );

            let cards = slots
                .get(day)
                .map(|day_shifts| day_cards(day_shifts, roster, grid))
                .unwrap_or_default();

            let placed: Vec<PlacedCard<'_>> = cards
                .into_iter()
                .map(|card| {
                    let (x, width) = card.placement.resolve(col_x, day_width);
                    let rect = egui::Rect::from_min_size(
                        egui::pos2(x, grid_rect.min.y + card.geometry.top),
                        egui::vec2(width.max(0.0), card.paint_height()),
                    );
                    PlacedCard { card, rect }
                })
                .collect();

            let col_painter = ui.painter().with_clip_rect(col_rect);
            for placed_card in &placed {
                paint_shift_card(&col_painter, placed_card, palette);
            }

            // Current time marker on today's column
            if *day == grid.today {
                let now_minutes = minutes_of_day(grid.now) - (scale.first_hour * 60) as i32;
                if now_minutes >= 0 {
                    let y = grid_rect.min.y + now_minutes as f32 * scale.pixels_per_minute();
                    col_painter.line_segment(
                        [egui::pos2(col_rect.min.x, y), egui::pos2(col_rect.max.x, y)],
                        egui::Stroke::new(2.0, palette.now_line),
                    );
                    col_painter.circle_filled(egui::pos2(col_rect.min.x + 3.0, y), 4.0, palette.now_line);
                }
            }

            // One interactive area per column; cards are hit-tested against
            // it so a gesture lands on exactly one target. Click-only sense,
            // cards are never dragged.
            let col_response = ui.interact(col_rect, ui.id().with(("day_col", day_idx)), egui::Sense::click());
            let pointer = col_response.hover_pos().or_else(|| col_response.interact_pointer_pos());
            let hit = pointer.and_then(|pos| {
                placed.iter().rev().find(|p| p.rect.contains(pos))
            });

            if hit.is_some() && col_response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }

            let gesture = if col_response.double_clicked() {
                Some(CardGesture::DoubleClick)
            } else if col_response.clicked() {
                Some(CardGesture::Click)
            } else {
                None
            };

            if let Some(gesture) = gesture {
                let empty_slot = pointer.map(|pos| {
                    let minutes = scale.minutes_at(pos.y - grid_rect.min.y);
                    (*day, snap_to_quarter(minutes))
                });
                let action = resolve_gesture(gesture, hit.map(|p| p.card.shift), empty_slot);
                result.apply(action);
            }

            if let Some(hit) = hit {
                col_response.on_hover_text_at_pointer(&hit.card.tooltip);
            }
        }
    }); // end ScrollArea

    result
}

/// Paint a single shift card (interaction is handled by the column)
fn paint_shift_card(painter: &egui::Painter, placed: &PlacedCard<'_>, palette: &Palette) {
    let card = &placed.card;
    let rect = placed.rect;
    let (fill, border, text_color) = palette.card_colors(card.variant);
    let corner_radius = 6.0;

    // Shadow helps tell stacked cards apart
    painter.rect_filled(
        rect.translate(egui::vec2(0.0, 1.0)),
        corner_radius,
        Color32::from_black_alpha(40),
    );
    painter.rect(rect, corner_radius, fill, egui::Stroke::new(1.0, border));

    let padding = 8.0;
    let text_width = (rect.width() - padding * 2.0).max(0.0);
    let card_painter = painter.with_clip_rect(painter.clip_rect().intersect(rect));
    let mut y = rect.min.y + padding.min(rect.height() / 4.0);

    for (line_idx, line) in card.lines().enumerate() {
        let (font, color) = if line_idx == 0 {
            (egui::FontId::proportional(13.0), text_color)
        } else if line_idx == 1 {
            (egui::FontId::proportional(11.0), text_color)
        } else {
            (egui::FontId::proportional(11.0), text_color.gamma_multiply(0.75))
        };

        let mut job = egui::text::LayoutJob::simple_singleline(line.to_string(), font, color);
        job.wrap = egui::text::TextWrapping::truncate_at_width(text_width);
        let galley = card_painter.layout_job(job);
        let line_height = galley.size().y;
        card_painter.galley(egui::pos2(rect.min.x + padding, y), galley, color);
        y += line_height + 4.0;
    }

    // Open-ended shifts get a filled clock in the corner
    if card.shift.is_open_ended() && rect.height() > 16.0 {
        card_painter.text(
            egui::pos2(rect.max.x - 6.0, rect.min.y + 4.0),
            egui::Align2::RIGHT_TOP,
            egui_phosphor::fill::CLOCK,
            egui::FontId::new(12.0, super::theme::phosphor_fill_family()),
            text_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_view_spans_monday_to_sunday() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        let days = visible_days(wednesday, ViewMode::Week);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(days[6], NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());
        assert_eq!(visible_days(wednesday, ViewMode::Day), vec![wednesday]);
    }

    #[test]
    fn period_labels() {
        let monday = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(period_label(&visible_days(monday, ViewMode::Week)), "May 6 - 12, 2024");
        assert_eq!(period_label(&[monday]), "Monday, May 6, 2024");

        let end_of_month = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
        assert_eq!(
            period_label(&visible_days(end_of_month, ViewMode::Week)),
            "Jul 29 - Aug 4, 2024"
        );
        assert_eq!(period_label(&[]), "");
    }

    fn shift(id: &str, start: u32, end: u32) -> Shift {
        Shift {
            id: id.into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end, 0, 0),
            employee_id: None,
            employee_group: None,
            approved: false,
        }
    }

    #[test]
    fn twelve_hour_clock_leaves_card_text_alone() {
        let shifts = vec![shift("b", 10, 12), shift("a", 9, 17)];
        let scale = GridScale::default();
        let palette = Palette::DEFAULT;
        let grid = GridContext {
            scale: &scale,
            palette: &palette,
            clock_format: ClockFormat::Hour12,
            today: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            now: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        };

        let slots = assign_slots(&shifts, grid.now);
        let day = slots.values().next().unwrap();
        let cards = day_cards(day, &Roster::default(), &grid);

        let ranges: Vec<&str> = cards.iter().map(|c| c.time_range.as_str()).collect();
        assert_eq!(ranges, ["09:00 - 17:00", "10:00 - 12:00"]);
        assert_eq!(cards[0].tooltip, "09:00 - 17:00 | Unassigned");
        assert!(cards[0].placement.z_index < cards[1].placement.z_index);
        // the axis still follows the preference
        assert_eq!(
            format_clock_time(NaiveTime::from_hms_opt(17, 0, 0).unwrap(), grid.clock_format),
            "5:00pm"
        );
    }

    #[test]
    fn gestures_map_onto_result() {
        let mut result = ScheduleResult::default();
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let time = NaiveTime::from_hms_opt(10, 15, 0).unwrap();
        result.apply(GridAction::None);
        assert!(result.edit_shift.is_none() && result.add_at.is_none());
        result.apply(GridAction::AddShiftAt(date, time));
        assert_eq!(result.add_at, Some((date, time)));
    }
}
