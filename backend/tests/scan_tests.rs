mod support;

use std::sync::Arc;

use astrocal::config::ScanConfig;
use astrocal::ephemeris::{Direction, EclipseEvent};
use astrocal::models::{
    ApsisKind, Body, Category, EclipseBody, EclipseKind, Event, EventKind, MoonQuarter, Observer,
    SeasonKind,
};
use astrocal::services::{EventCalendar, EventFilter};

use support::{date, days_between, seasons_2024, utc, ScriptedEphemeris};

fn calendar_with(provider: ScriptedEphemeris, offset_minutes: i32) -> EventCalendar {
    let config = ScanConfig {
        utc_offset_minutes: offset_minutes,
        ..ScanConfig::default()
    };
    EventCalendar::new(Arc::new(provider), config)
}

fn texts(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.text.as_str()).collect()
}

fn of_category(events: &[Event], category: Category) -> Vec<&Event> {
    events.iter().filter(|e| e.category == category).collect()
}

#[test]
fn test_paris_perseids_with_sun_rise_set() {
    let provider = ScriptedEphemeris::new()
        .with_rise_set(Body::Sun, Direction::Rise, utc(2024, 8, 12, 4, 40))
        .with_rise_set(Body::Sun, Direction::Set, utc(2024, 8, 12, 19, 5))
        .with_seasons(2024, seasons_2024());
    let calendar = calendar_with(provider, 120);

    let events = calendar.scan_day(date(2024, 8, 12), Some(&Observer::PARIS));

    let showers = of_category(&events, Category::MeteorShower);
    assert_eq!(showers.len(), 1);
    assert_eq!(showers[0].text, "Pluie d'étoiles filantes : Perséides");
    assert!(showers[0].time.is_none());

    let sun = of_category(&events, Category::Ephemeris);
    assert_eq!(sun.len(), 1);
    assert_eq!(sun[0].text, "Soleil : lever 06:40, coucher 21:05");
    assert_eq!(
        sun[0].kind,
        EventKind::RiseSet {
            body: Body::Sun,
            rise: Some(utc(2024, 8, 12, 4, 40)),
            set: Some(utc(2024, 8, 12, 19, 5)),
        }
    );
    assert_eq!(sun[0].time, Some(utc(2024, 8, 12, 4, 40)));
}

#[test]
fn test_rise_set_requires_observer() {
    let provider = ScriptedEphemeris::new()
        .with_rise_set(Body::Sun, Direction::Rise, utc(2024, 8, 12, 4, 40));
    let calendar = calendar_with(provider, 120);

    let events = calendar.scan_day(date(2024, 8, 12), None);
    assert!(of_category(&events, Category::Ephemeris).is_empty());
}

#[test]
fn test_december_solstice_only_on_its_day() {
    let provider = ScriptedEphemeris::new().with_seasons(2024, seasons_2024());
    let calendar = calendar_with(provider, 60);

    for day in 18..=24 {
        let events = calendar.scan_day(date(2024, 12, day), None);
        let seasons = of_category(&events, Category::Season);
        if day == 21 {
            assert_eq!(seasons.len(), 1);
            assert_eq!(seasons[0].text, "Solstice d'Hiver (10:20)");
            assert_eq!(seasons[0].time, Some(utc(2024, 12, 21, 9, 20)));
            assert_eq!(
                seasons[0].kind,
                EventKind::Season {
                    season: SeasonKind::DecemberSolstice
                }
            );
        } else {
            assert!(seasons.is_empty(), "unexpected season on day {}", day);
        }
    }
}

#[test]
fn test_season_bucketed_by_civil_day() {
    // 2024-06-20 20:51 UTC is already the 21st at UTC+5.
    let provider = ScriptedEphemeris::new().with_seasons(2024, seasons_2024());
    let calendar = calendar_with(provider, 300);

    let on_20th = calendar.scan_day(date(2024, 6, 20), None);
    let on_21st = calendar.scan_day(date(2024, 6, 21), None);
    assert!(of_category(&on_20th, Category::Season).is_empty());
    assert_eq!(
        texts(&on_21st)
            .into_iter()
            .filter(|t| t.starts_with("Solstice"))
            .collect::<Vec<_>>(),
        vec!["Solstice d'Été (01:51)"]
    );
}

#[test]
fn test_rise_set_on_adjacent_day_is_dropped() {
    // A 36-hour search window lets the provider return next-day instants.
    let provider = ScriptedEphemeris::new()
        .with_rise_set(Body::Moon, Direction::Rise, utc(2024, 8, 13, 0, 0))
        .with_rise_set(Body::Moon, Direction::Set, utc(2024, 8, 12, 14, 0));
    let config = ScanConfig {
        utc_offset_minutes: 120,
        search_limit_days: 1.5,
        ..ScanConfig::default()
    };
    let calendar = EventCalendar::new(Arc::new(provider), config);

    let events = calendar.scan_day(date(2024, 8, 12), Some(&Observer::PARIS));
    let moon = of_category(&events, Category::Ephemeris);
    assert_eq!(moon.len(), 1);
    assert_eq!(moon[0].text, "Lune : lever --:--, coucher 16:00");
    assert_eq!(
        moon[0].kind,
        EventKind::RiseSet {
            body: Body::Moon,
            rise: None,
            set: Some(utc(2024, 8, 12, 14, 0)),
        }
    );

    let next = calendar.scan_day(date(2024, 8, 13), Some(&Observer::PARIS));
    let moon = of_category(&next, Category::Ephemeris);
    assert_eq!(moon.len(), 1);
    assert_eq!(moon[0].text, "Lune : lever 02:00, coucher --:--");
}

#[test]
fn test_quarter_and_apsis_on_their_day() {
    let provider = ScriptedEphemeris::new()
        .with_quarter(MoonQuarter::Full, utc(2024, 8, 19, 18, 26))
        .with_apsis(ApsisKind::Perigee, utc(2024, 8, 21, 5, 0), 360_200.4);
    let calendar = calendar_with(provider, 120);

    let before = calendar.scan_day(date(2024, 8, 18), None);
    assert!(of_category(&before, Category::PhaseEvent).is_empty());

    let full = calendar.scan_day(date(2024, 8, 19), None);
    let phase = of_category(&full, Category::PhaseEvent);
    assert_eq!(phase.len(), 1);
    assert!(phase[0].text.starts_with("Pleine Lune ("));
    assert!(phase[0].text.ends_with("%) à 20:26"));
    assert_eq!(phase[0].time, Some(utc(2024, 8, 19, 18, 26)));

    let perigee = calendar.scan_day(date(2024, 8, 21), None);
    let apsis = of_category(&perigee, Category::Apsis);
    assert_eq!(apsis.len(), 1);
    assert_eq!(apsis[0].text, "Périgée Lunaire (360 200 km)");
    assert!(of_category(&calendar.scan_day(date(2024, 8, 20), None), Category::Apsis).is_empty());
}

#[test]
fn test_conjunctions_and_opposition_need_threshold_and_extremum() {
    let moon_jupiter_min = utc(2024, 3, 15, 12, 0);
    let venus_mars_min = utc(2024, 3, 20, 12, 0);
    let jupiter_opposition = utc(2024, 3, 17, 12, 0);
    let provider = ScriptedEphemeris::new()
        .with_separation(Body::Moon, Body::Jupiter, move |t| {
            let d = days_between(t, moon_jupiter_min);
            3.0 + 10.0 * d * d
        })
        .with_separation(Body::Venus, Body::Mars, move |t| {
            let d = days_between(t, venus_mars_min);
            0.5 + 0.2 * d * d
        })
        .with_elongation(Body::Jupiter, move |t| {
            let d = days_between(t, jupiter_opposition);
            179.5 - 0.1 * d * d
        });
    let calendar = calendar_with(provider, 0);

    let mut found = Vec::new();
    for day in 8..=28 {
        for evt in calendar.scan_day(date(2024, 3, day), None) {
            if matches!(evt.category, Category::Conjunction | Category::Opposition) {
                found.push((day, evt.text));
            }
        }
    }
    assert_eq!(
        found,
        vec![
            (15, "Lune - Jupiter : 3.0°".to_string()),
            (17, "Jupiter à l'opposition".to_string()),
            (20, "Vénus - Mars : 0.5°".to_string()),
        ]
    );
}

#[test]
fn test_minimum_above_threshold_is_ignored() {
    let closest = utc(2024, 3, 15, 12, 0);
    let provider = ScriptedEphemeris::new().with_separation(Body::Moon, Body::Saturn, move |t| {
        let d = days_between(t, closest);
        7.0 + d * d
    });
    let calendar = calendar_with(provider, 0);

    let events = calendar.scan_day(date(2024, 3, 15), None);
    assert!(of_category(&events, Category::Conjunction).is_empty());
}

#[test]
fn test_solar_conjunction_and_eclipses() {
    let provider = ScriptedEphemeris::new()
        .with_solar_conjunction(Body::Jupiter, utc(2024, 5, 18, 10, 0))
        .with_eclipse(EclipseEvent {
            body: EclipseBody::Solar,
            kind: EclipseKind::Total,
            peak: utc(2024, 4, 8, 18, 17),
        })
        .with_eclipse(EclipseEvent {
            body: EclipseBody::Lunar,
            kind: EclipseKind::Partial,
            peak: utc(2024, 9, 18, 2, 44),
        });
    let calendar = calendar_with(provider, 0);

    let conj = calendar.scan_day(date(2024, 5, 18), None);
    assert!(texts(&conj).contains(&"Conjonction solaire de Jupiter"));
    let day_before = calendar.scan_day(date(2024, 5, 17), None);
    assert!(of_category(&day_before, Category::Conjunction).is_empty());

    let solar = calendar.scan_day(date(2024, 4, 8), None);
    assert_eq!(
        of_category(&solar, Category::Eclipse)
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>(),
        vec!["Éclipse Solaire (totale)"]
    );
    let lunar = calendar.scan_day(date(2024, 9, 18), None);
    assert_eq!(
        of_category(&lunar, Category::Eclipse)
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>(),
        vec!["Éclipse Lunaire (partielle)"]
    );
    assert!(of_category(&calendar.scan_day(date(2024, 9, 17), None), Category::Eclipse).is_empty());
}

#[test]
fn test_greatest_elongation_of_inner_planets() {
    let provider = ScriptedEphemeris::new()
        .with_max_elongation(Body::Mercury, utc(2024, 12, 24, 23, 30), 22.04)
        .with_max_elongation(Body::Venus, utc(2025, 1, 10, 3, 0), 47.18)
        .with_max_elongation(Body::Jupiter, utc(2024, 12, 25, 8, 0), 175.0);
    let calendar = calendar_with(provider, 60);

    // 23:30 UTC is already the 25th at UTC+1.
    assert!(of_category(&calendar.scan_day(date(2024, 12, 24), None), Category::Opposition).is_empty());
    let christmas = calendar.scan_day(date(2024, 12, 25), None);
    let elongations = of_category(&christmas, Category::Opposition);
    assert_eq!(elongations.len(), 1);
    assert_eq!(elongations[0].text, "Élongation maximale de Mercure (22.0°)");
    assert_eq!(elongations[0].label, "Elong. Max Mercure");
    assert_eq!(elongations[0].time, Some(utc(2024, 12, 24, 23, 30)));
    assert_eq!(elongations[0].bodies, vec![Body::Mercury, Body::Sun]);

    let venus = calendar.scan_day(date(2025, 1, 10), None);
    assert!(venus.iter().any(|e| matches!(
        e.kind,
        EventKind::MaxElongation { planet: Body::Venus, .. }
    )));

    let hidden = EventFilter {
        planets: false,
        ..EventFilter::default()
    };
    assert!(hidden.apply(&venus).is_empty());
}

#[test]
fn test_scan_is_idempotent() {
    let closest = utc(2024, 12, 14, 12, 0);
    let provider = ScriptedEphemeris::new()
        .with_seasons(2024, seasons_2024())
        .with_quarter(MoonQuarter::FirstQuarter, utc(2024, 12, 8, 15, 27))
        .with_rise_set(Body::Sun, Direction::Rise, utc(2024, 12, 14, 7, 38))
        .with_separation(Body::Moon, Body::Jupiter, move |t| {
            let d = days_between(t, closest);
            5.0 + d * d
        });
    let calendar = calendar_with(provider, 60);

    for day in [8, 14, 21] {
        let first = calendar.scan_day(date(2024, 12, day), Some(&Observer::PARIS));
        let second = calendar.scan_day(date(2024, 12, day), Some(&Observer::PARIS));
        assert_eq!(first, second);
    }
}

#[test]
fn test_failing_checks_degrade_to_no_event() {
    let provider = ScriptedEphemeris::new()
        .with_seasons(2024, seasons_2024())
        .with_quarter(MoonQuarter::Full, utc(2024, 12, 15, 9, 2))
        .with_rise_set(Body::Sun, Direction::Rise, utc(2024, 12, 14, 7, 38))
        .failing("seasons")
        .failing("search_moon_quarter")
        .failing("separation")
        .failing("elongation")
        .failing("search_rise_set");
    let calendar = calendar_with(provider, 60);

    let events = calendar.scan_day(date(2024, 12, 14), Some(&Observer::PARIS));
    assert_eq!(texts(&events), vec!["Pluie d'étoiles filantes : Géminides"]);

    let solstice = calendar.scan_day(date(2024, 12, 21), None);
    assert!(of_category(&solstice, Category::Season).is_empty());
}

#[test]
fn test_detailed_day_is_sorted_untimed_last() {
    let provider = ScriptedEphemeris::new()
        .with_seasons(2024, seasons_2024())
        .with_rise_set(Body::Sun, Direction::Rise, utc(2024, 12, 21, 7, 40))
        .with_rise_set(Body::Sun, Direction::Set, utc(2024, 12, 21, 16, 0))
        .with_quarter(MoonQuarter::LastQuarter, utc(2024, 12, 22, 22, 18));
    let calendar = calendar_with(provider, 60);

    let events = calendar
        .day_events_detailed(date(2024, 12, 21), &Observer::PARIS)
        .unwrap();
    let times: Vec<_> = events.iter().map(|e| e.time).collect();
    assert_eq!(
        times,
        vec![Some(utc(2024, 12, 21, 7, 40)), Some(utc(2024, 12, 21, 9, 20))]
    );

    let ursids = calendar
        .day_events_detailed(date(2024, 12, 22), &Observer::PARIS)
        .unwrap();
    assert_eq!(ursids.last().map(|e| e.time), Some(None));
    assert_eq!(ursids.first().map(|e| e.category), Some(Category::PhaseEvent));
}
