//! Per-stage predicates. Each returns `true` to keep the notice.

use notam_core::{EnrichedNotam, ReviewState};

use super::{CategoryToggles, CorridorFilter, SmartFilters, TimeWindowFilter, VisibilityFilter};

pub fn global_ignore(notice: &EnrichedNotam, visibility: &VisibilityFilter) -> bool {
    visibility.show_ignored || !notice.is_globally_ignored
}

/// Notices with no route distance pass, there is nothing to measure
pub fn route_corridor(notice: &EnrichedNotam, corridor: &CorridorFilter) -> bool {
    if !corridor.enabled {
        return true;
    }
    notice
        .route_distance_nm
        .is_none_or(|d| d <= corridor.width_nm)
}

pub fn time_window(notice: &EnrichedNotam, window: &TimeWindowFilter) -> bool {
    !window.enabled || notice.is_active_for_flight
}

pub fn category(notice: &EnrichedNotam, toggles: &CategoryToggles) -> bool {
    toggles.is_enabled(notice.category)
}

pub fn smart(notice: &EnrichedNotam, smart: &SmartFilters) -> bool {
    if smart.hide_helicopter && notice.notam.is_helicopter_related() {
        return false;
    }

    if smart.filter_obstacles
        && notice.notam.is_obstacle()
        && notice
            .terminal_distance_nm
            .is_some_and(|d| d > smart.obstacle_distance_nm)
    {
        return false;
    }

    smart.scope.matches(notice.notam.scope.as_deref())
}

/// `needle` is already trimmed and lowercased
pub fn search(notice: &EnrichedNotam, needle: &str) -> bool {
    let notam = &notice.notam;
    [
        Some(notam.message.as_str()),
        notam.location.as_deref(),
        notam.q_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

pub fn visibility(notice: &EnrichedNotam, visibility: &VisibilityFilter) -> bool {
    match notice.state() {
        ReviewState::Read => visibility.show_read,
        ReviewState::Ignored => visibility.show_ignored,
        _ => true,
    }
}
