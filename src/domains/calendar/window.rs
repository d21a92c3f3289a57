//! Which Ekadashis a user may pick, and which one the dashboard opens on.
//!
//! Everything here is pure: callers compute `today` once per load (local
//! calendar date) and pass it in.

use crate::domains::calendar::types::{CalendarEntry, CalendarWindow, SelectionMode};
use crate::types::UserRole;
use chrono::NaiveDate;

/// Past entries (strictly before today) a core devotee can see
pub const PAST_ENTRIES_VISIBLE: usize = 3;

/// Entries on or after today a core devotee can see
pub const UPCOMING_ENTRIES_VISIBLE: usize = 1;

/// Entries selectable by `role`, ascending by date.
///
/// Admins see the whole calendar. Core devotees see the three most recent
/// entries before `today` and the nearest one on or after it.
pub fn visible_entries(role: UserRole, calendar: &[CalendarEntry], today: NaiveDate) -> Vec<CalendarEntry> {
    let mut window: Vec<CalendarEntry> = match role {
        UserRole::Admin => calendar.to_vec(),
        UserRole::CoreDevotee => {
            let mut past: Vec<&CalendarEntry> = calendar.iter().filter(|e| e.date < today).collect();
            past.sort_by(|a, b| b.date.cmp(&a.date));

            let mut upcoming: Vec<&CalendarEntry> = calendar.iter().filter(|e| e.date >= today).collect();
            upcoming.sort_by(|a, b| a.date.cmp(&b.date));

            past.into_iter()
                .take(PAST_ENTRIES_VISIBLE)
                .chain(upcoming.into_iter().take(UPCOMING_ENTRIES_VISIBLE))
                .cloned()
                .collect()
        }
    };

    window.sort_by(|a, b| a.date.cmp(&b.date));
    window
}

/// The latest entry dated on or before `today`, else the earliest entry.
pub fn default_selection(window: &[CalendarEntry], today: NaiveDate) -> Option<&CalendarEntry> {
    window
        .iter()
        .filter(|e| e.date <= today)
        .max_by_key(|e| e.date)
        .or_else(|| window.iter().min_by_key(|e| e.date))
}

/// Build the window for a role and apply the selection rule for `mode`.
pub fn select_window(
    role: UserRole,
    calendar: &[CalendarEntry],
    today: NaiveDate,
    mode: SelectionMode,
) -> CalendarWindow {
    let entries = visible_entries(role, calendar, today);
    let selected = match mode {
        SelectionMode::Dashboard => default_selection(&entries, today).map(|e| e.id),
        SelectionMode::Form => None,
    };

    CalendarWindow {
        today,
        entries,
        selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(date: &str) -> CalendarEntry {
        CalendarEntry {
            id: Uuid::new_v4(),
            name: format!("Ekadashi {}", date),
            date: d(date),
        }
    }

    fn dates(entries: &[CalendarEntry]) -> Vec<String> {
        entries.iter().map(|e| e.date.to_string()).collect()
    }

    fn march_calendar() -> Vec<CalendarEntry> {
        // deliberately unordered
        vec![
            entry("2024-03-20"),
            entry("2024-02-10"),
            entry("2024-03-01"),
            entry("2024-04-03"),
            entry("2024-02-24"),
            entry("2024-02-17"),
        ]
    }

    #[test]
    fn test_core_devotee_sees_three_past_and_next_upcoming() {
        let today = d("2024-03-10");
        let window = select_window(UserRole::CoreDevotee, &march_calendar(), today, SelectionMode::Dashboard);

        assert_eq!(
            dates(&window.entries),
            vec!["2024-02-17", "2024-02-24", "2024-03-01", "2024-03-20"]
        );
        assert_eq!(window.selected_entry().unwrap().date, d("2024-03-01"));
    }

    #[test]
    fn test_admin_sees_everything_in_date_order() {
        let today = d("2024-03-10");
        let window = select_window(UserRole::Admin, &march_calendar(), today, SelectionMode::Dashboard);

        assert_eq!(window.entries.len(), 6);
        assert!(window.entries.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(window.selected_entry().unwrap().date, d("2024-03-01"));
    }

    #[test]
    fn test_entry_dated_today_counts_as_upcoming_and_is_selected() {
        let calendar = vec![entry("2024-03-01"), entry("2024-03-10"), entry("2024-03-25")];
        let today = d("2024-03-10");
        let window = select_window(UserRole::CoreDevotee, &calendar, today, SelectionMode::Dashboard);

        assert_eq!(dates(&window.entries), vec!["2024-03-01", "2024-03-10"]);
        assert_eq!(window.selected_entry().unwrap().date, today);
    }

    #[test]
    fn test_only_future_entries_selects_earliest() {
        let calendar = vec![entry("2024-05-01"), entry("2024-04-15")];
        let today = d("2024-03-10");

        let admin = select_window(UserRole::Admin, &calendar, today, SelectionMode::Dashboard);
        assert_eq!(admin.selected_entry().unwrap().date, d("2024-04-15"));

        let devotee = select_window(UserRole::CoreDevotee, &calendar, today, SelectionMode::Dashboard);
        assert_eq!(dates(&devotee.entries), vec!["2024-04-15"]);
        assert_eq!(devotee.selected_entry().unwrap().date, d("2024-04-15"));
    }

    #[test]
    fn test_form_mode_never_preselects() {
        let window = select_window(UserRole::CoreDevotee, &march_calendar(), d("2024-03-10"), SelectionMode::Form);
        assert_eq!(window.entries.len(), 4);
        assert!(window.selected.is_none());
    }

    #[test]
    fn test_empty_calendar_has_no_selection() {
        let window = select_window(UserRole::Admin, &[], d("2024-03-10"), SelectionMode::Dashboard);
        assert!(window.entries.is_empty());
        assert!(window.selected.is_none());
        assert!(default_selection(&[], d("2024-03-10")).is_none());
    }

    #[test]
    fn test_devotee_window_bounds_hold_for_every_split() {
        let calendar: Vec<CalendarEntry> = (0..12)
            .map(|i| entry(&format!("2024-{:02}-11", i + 1)))
            .collect();

        for month in 1..=12u32 {
            let today = NaiveDate::from_ymd_opt(2024, month, 1).unwrap();
            let window = visible_entries(UserRole::CoreDevotee, &calendar, today);

            let past = window.iter().filter(|e| e.date < today).count();
            let upcoming = window.iter().filter(|e| e.date >= today).count();
            assert!(past <= PAST_ENTRIES_VISIBLE);
            assert!(upcoming <= UPCOMING_ENTRIES_VISIBLE);
            assert!(window.len() <= PAST_ENTRIES_VISIBLE + UPCOMING_ENTRIES_VISIBLE);
            assert!(window.windows(2).all(|w| w[0].date <= w[1].date));

            let expected_default = window
                .iter()
                .filter(|e| e.date <= today)
                .map(|e| e.date)
                .max()
                .or_else(|| window.iter().map(|e| e.date).min());
            assert_eq!(default_selection(&window, today).map(|e| e.date), expected_default);
        }
    }
}
