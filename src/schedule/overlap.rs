//! Groups each day's shifts into clusters of overlapping intervals so cards
//! can be laid out side by side.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use super::layout::shift_interval;
use super::model::Shift;

/// Position of a shift inside its overlap group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSlot {
    pub index: usize,
    pub total: usize,
}

/// Shift plus its slot, borrowed from the caller's list
#[derive(Debug, Clone, Copy)]
pub struct SlottedShift<'a> {
    pub shift: &'a Shift,
    pub slot: LayoutSlot,
}

/// Partition `shifts` by date, then sweep each date in start order. A shift
/// joins the running group when it starts before the group's latest end.
/// Intervals that only touch (end == next start) are not overlapping.
pub fn assign_slots(shifts: &[Shift], now: NaiveTime) -> BTreeMap<NaiveDate, Vec<SlottedShift<'_>>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<(&Shift, (i32, i32))>> = BTreeMap::new();
    for shift in shifts {
        by_date
            .entry(shift.date)
            .or_default()
            .push((shift, shift_interval(shift, now)));
    }

    let mut result = BTreeMap::new();
    for (date, mut day) in by_date {
        day.sort_by(|(a, (a_start, _)), (b, (b_start, _))| {
            a_start.cmp(b_start).then_with(|| a.id.cmp(&b.id))
        });

        let mut slotted = Vec::with_capacity(day.len());
        let mut group: Vec<&Shift> = Vec::new();
        let mut group_end = i32::MIN;

        for (shift, (start, end)) in day {
            if !group.is_empty() && start >= group_end {
                flush_group(&mut group, &mut slotted);
            }
            group.push(shift);
            group_end = if group.len() == 1 { end } else { group_end.max(end) };
        }
        flush_group(&mut group, &mut slotted);

        result.insert(date, slotted);
    }
    result
}

fn flush_group<'a>(group: &mut Vec<&'a Shift>, out: &mut Vec<SlottedShift<'a>>) {
    let total = group.len();
    out.extend(group.drain(..).enumerate().map(|(index, shift)| SlottedShift {
        shift,
        slot: LayoutSlot { index, total },
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(id: &str, day: u32, start: (u32, u32), end: Option<(u32, u32)>) -> Shift {
        Shift {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: end.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            employee_id: None,
            employee_group: None,
            approved: false,
        }
    }

    fn slots_by_id(map: &BTreeMap<NaiveDate, Vec<SlottedShift<'_>>>) -> Vec<(String, usize, usize)> {
        map.values()
            .flatten()
            .map(|s| (s.shift.id.clone(), s.slot.index, s.slot.total))
            .collect()
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn three_way_overlap_shares_one_group() {
        let shifts = vec![
            shift("c", 4, (10, 0), Some((12, 0))),
            shift("a", 4, (8, 0), Some((11, 0))),
            shift("b", 4, (9, 0), Some((10, 30))),
        ];
        let slots = assign_slots(&shifts, noon());
        assert_eq!(
            slots_by_id(&slots),
            vec![
                ("a".to_string(), 0, 3),
                ("b".to_string(), 1, 3),
                ("c".to_string(), 2, 3),
            ]
        );
    }

    #[test]
    fn touching_shifts_are_separate_groups() {
        let shifts = vec![
            shift("early", 4, (8, 0), Some((12, 0))),
            shift("late", 4, (12, 0), Some((16, 0))),
        ];
        let slots = assign_slots(&shifts, noon());
        assert_eq!(
            slots_by_id(&slots),
            vec![("early".to_string(), 0, 1), ("late".to_string(), 0, 1)]
        );
    }

    #[test]
    fn chained_overlap_is_transitive() {
        // b overlaps a and c, a and c do not touch each other
        let shifts = vec![
            shift("a", 4, (8, 0), Some((10, 0))),
            shift("b", 4, (9, 0), Some((13, 0))),
            shift("c", 4, (12, 0), Some((14, 0))),
        ];
        let slots = assign_slots(&shifts, noon());
        assert!(slots_by_id(&slots).iter().all(|(_, _, total)| *total == 3));
    }

    #[test]
    fn dates_are_grouped_independently() {
        let shifts = vec![
            shift("mon", 4, (9, 0), Some((17, 0))),
            shift("tue", 5, (9, 0), Some((17, 0))),
        ];
        let slots = assign_slots(&shifts, noon());
        assert_eq!(slots.len(), 2);
        assert!(slots.values().all(|day| day[0].slot == LayoutSlot { index: 0, total: 1 }));
    }

    #[test]
    fn open_shift_extends_to_now() {
        let shifts = vec![
            shift("open", 4, (8, 0), None),
            shift("later", 4, (11, 0), Some((13, 0))),
        ];
        let slots = assign_slots(&shifts, noon());
        assert_eq!(slots_by_id(&slots)[1], ("later".to_string(), 1, 2));

        let early = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let slots = assign_slots(&shifts, early);
        assert_eq!(slots_by_id(&slots)[1], ("later".to_string(), 0, 1));
    }
}
