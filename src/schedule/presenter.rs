//! Decides what a shift card shows and where it sits horizontally.
//! Pure functions of the shift, its geometry and its overlap slot.

use chrono::{NaiveDate, NaiveTime};

use super::layout::Geometry;
use super::model::{Roster, Shift};
use super::overlap::LayoutSlot;

/// Left inset of every card, in points
pub const CARD_GUTTER_LEFT: f32 = 8.0;
/// Horizontal space taken out of the column before it is split between cards
pub const CARD_GUTTER_TOTAL: f32 = 16.0;
pub const CARD_MIN_HEIGHT: f32 = 20.0;
pub const BASE_Z_INDEX: i32 = 20;

/// Cards taller than this show the employee name
const NAME_LINE_MIN_HEIGHT: f32 = 40.0;
/// Cards taller than this also show the group name
const GROUP_LINE_MIN_HEIGHT: f32 = 60.0;

pub const ACTIVE_LABEL: &str = "Active";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalVariant {
    Approved,
    Pending,
}

impl ApprovalVariant {
    pub fn of(shift: &Shift) -> Self {
        if shift.approved {
            ApprovalVariant::Approved
        } else {
            ApprovalVariant::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPlacement {
    pub index: usize,
    pub total: usize,
    pub z_index: i32,
    /// Offset of the card's left edge as a percentage of the column width
    pub left_percent: f32,
}

impl CardPlacement {
    pub fn for_slot(slot: LayoutSlot) -> Self {
        let total = slot.total.max(1);
        Self {
            index: slot.index,
            total,
            z_index: BASE_Z_INDEX + slot.index as i32,
            left_percent: slot.index as f32 * (100.0 / total as f32),
        }
    }

    /// Absolute x and width of the card inside a column
    pub fn resolve(&self, column_left: f32, column_width: f32) -> (f32, f32) {
        let inner = column_width - CARD_GUTTER_TOTAL;
        let width = if self.total > 1 {
            inner / self.total as f32
        } else {
            inner
        };
        let x = column_left + CARD_GUTTER_LEFT + column_width * self.left_percent / 100.0;
        (x, width)
    }
}

/// Everything the painter needs for one card
#[derive(Debug, Clone)]
pub struct ShiftCard<'a> {
    pub shift: &'a Shift,
    pub geometry: Geometry,
    pub placement: CardPlacement,
    pub variant: ApprovalVariant,
    pub time_range: String,
    pub employee_line: Option<String>,
    pub group_line: Option<String>,
    pub tooltip: String,
}

impl<'a> ShiftCard<'a> {
    pub fn present(
        shift: &'a Shift,
        geometry: Geometry,
        slot: LayoutSlot,
        roster: &Roster,
    ) -> Self {
        let start_label = hh_mm(shift.start_time);
        let end_label = end_label(shift);
        let employee_name = roster.display_name(shift.employee_id.as_deref());
        let time_range = format!("{} - {}", start_label, end_label);

        let employee_line = (geometry.height > NAME_LINE_MIN_HEIGHT).then(|| employee_name.clone());
        let group_line = if geometry.height > GROUP_LINE_MIN_HEIGHT {
            shift.employee_group.as_ref().map(|g| g.name.clone())
        } else {
            None
        };

        Self {
            shift,
            geometry,
            placement: CardPlacement::for_slot(slot),
            variant: ApprovalVariant::of(shift),
            tooltip: format!("{} | {}", time_range, employee_name),
            time_range,
            employee_line,
            group_line,
        }
    }

    /// Height actually painted, never below the minimum card height
    pub fn paint_height(&self) -> f32 {
        self.geometry.height.max(CARD_MIN_HEIGHT)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.time_range.as_str())
            .chain(self.employee_line.as_deref())
            .chain(self.group_line.as_deref())
    }
}

/// "Active" for running shifts, otherwise the end as "HH:MM"
pub fn end_label(shift: &Shift) -> String {
    match shift.end_time {
        Some(end) => hh_mm(end),
        None => ACTIVE_LABEL.to_string(),
    }
}

/// Card times are always the truncated 24h "HH:MM", whatever the axis uses
pub fn hh_mm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Sort cards so that painting in order leaves higher z on top
pub fn sort_for_paint(cards: &mut [ShiftCard<'_>]) {
    cards.sort_by_key(|c| c.placement.z_index);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardGesture {
    Click,
    DoubleClick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    None,
    EditShift(Shift),
    AddShiftAt(NaiveDate, NaiveTime),
}

/// Route a pointer gesture on the grid.
///
/// A card under the pointer swallows the gesture: only a double-click on
/// it does anything, and the empty-slot handler never sees it.
pub fn resolve_gesture(
    gesture: CardGesture,
    card: Option<&Shift>,
    empty_slot: Option<(NaiveDate, NaiveTime)>,
) -> GridAction {
    match (card, gesture) {
        (Some(shift), CardGesture::DoubleClick) => GridAction::EditShift(shift.clone()),
        (Some(_), _) => GridAction::None,
        (None, CardGesture::DoubleClick) => match empty_slot {
            Some((date, time)) => GridAction::AddShiftAt(date, time),
            None => GridAction::None,
        },
        (None, _) => GridAction::None,
    }
}
