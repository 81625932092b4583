//! Category filters applied to day summaries.

use serde::{Deserialize, Serialize};

use crate::models::{Category, Event};

/// Filter group a user can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterGroup {
    Moon,
    Planets,
    Meteor,
    Season,
    Eclipse,
}

impl FilterGroup {
    /// Group controlling `category`. Rise/set is never filtered.
    pub fn of(category: Category) -> Option<Self> {
        match category {
            Category::Ephemeris => None,
            Category::PhaseEvent => Some(FilterGroup::Moon),
            Category::Apsis | Category::Conjunction | Category::Opposition => {
                Some(FilterGroup::Planets)
            }
            Category::Season => Some(FilterGroup::Season),
            Category::MeteorShower => Some(FilterGroup::Meteor),
            Category::Eclipse => Some(FilterGroup::Eclipse),
        }
    }
}

/// Enabled filter groups. Everything is enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilter {
    pub moon: bool,
    pub planets: bool,
    pub meteor: bool,
    pub season: bool,
    pub eclipse: bool,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            moon: true,
            planets: true,
            meteor: true,
            season: true,
            eclipse: true,
        }
    }
}

impl EventFilter {
    pub fn is_enabled(&self, group: FilterGroup) -> bool {
        match group {
            FilterGroup::Moon => self.moon,
            FilterGroup::Planets => self.planets,
            FilterGroup::Meteor => self.meteor,
            FilterGroup::Season => self.season,
            FilterGroup::Eclipse => self.eclipse,
        }
    }

    pub fn toggled(mut self, group: FilterGroup) -> Self {
        let flag = match group {
            FilterGroup::Moon => &mut self.moon,
            FilterGroup::Planets => &mut self.planets,
            FilterGroup::Meteor => &mut self.meteor,
            FilterGroup::Season => &mut self.season,
            FilterGroup::Eclipse => &mut self.eclipse,
        };
        *flag = !*flag;
        self
    }

    pub fn allows(&self, category: Category) -> bool {
        FilterGroup::of(category).map_or(true, |g| self.is_enabled(g))
    }

    /// Events whose category is enabled, order preserved.
    pub fn apply<'a>(&self, events: impl IntoIterator<Item = &'a Event>) -> Vec<Event> {
        events
            .into_iter()
            .filter(|e| self.allows(e.category))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;

    fn event(kind: EventKind) -> Event {
        Event::new(kind, "x", None)
    }

    #[test]
    fn test_default_allows_everything() {
        let filter = EventFilter::default();
        assert!(Category::ALL.into_iter().all(|c| filter.allows(c)));
    }

    #[test]
    fn test_planets_group_covers_apsis() {
        let filter = EventFilter::default().toggled(FilterGroup::Planets);
        assert!(!filter.allows(Category::Apsis));
        assert!(!filter.allows(Category::Conjunction));
        assert!(!filter.allows(Category::Opposition));
        assert!(filter.allows(Category::PhaseEvent));
        assert!(filter.allows(Category::Ephemeris));
    }

    #[test]
    fn test_apply_keeps_order() {
        let events = vec![
            event(EventKind::MeteorShower {
                name: "Perséides".to_string(),
            }),
            event(EventKind::Season {
                season: crate::models::SeasonKind::JuneSolstice,
            }),
            event(EventKind::MeteorShower {
                name: "Ursides".to_string(),
            }),
        ];
        let filter = EventFilter {
            season: false,
            ..EventFilter::default()
        };
        let kept = filter.apply(&events);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|e| e.category == Category::MeteorShower));
    }

    #[test]
    fn test_partial_query_defaults_to_enabled() {
        let filter: EventFilter = serde_json::from_str(r#"{"meteor": false}"#).unwrap();
        assert!(!filter.meteor);
        assert!(filter.moon && filter.planets && filter.season && filter.eclipse);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let filter = EventFilter::default();
        assert_eq!(
            filter.toggled(FilterGroup::Eclipse).toggled(FilterGroup::Eclipse),
            filter
        );
    }
}
