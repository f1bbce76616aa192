use std::sync::mpsc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use growlog::{
    app::{App, AppState, KeyOutcome},
    config::Roster,
    filter::TimeRange,
    runtime::{AppEvent, FixedTicker, Runner, TestEventSource},
    store::MemoryStore,
    ui, NewAttempt, Trend,
};
use ratatui::{backend::TestBackend, Terminal};

// Headless dashboard driven through Runner/TestEventSource without a TTY

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
}

fn seeded_app() -> App {
    let mut store = MemoryStore::new();
    for (day, person, subject, correct) in [
        (2, "ben", "Math", 9),
        (20, "ana", "Math", 4),
        (27, "ana", "Science", 9),
        (28, "ben", "Science", 6),
    ] {
        let attempt = NewAttempt::new(
            person,
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            subject,
            10,
            10,
            correct,
        )
        .unwrap();
        store.insert_at(attempt, at(day));
    }
    App::new(
        Box::new(store),
        Roster::default(),
        TimeRange::SevenDays,
        at(30),
    )
    .unwrap()
}

fn press(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

/// Drains the runner until quit or the step bound, redrawing after each key
fn drive(app: &mut App, events: Vec<AppEvent>) -> (bool, String) {
    let (tx, rx) = mpsc::channel();
    for ev in events {
        tx.send(ev).unwrap();
    }
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal.draw(|f| ui::draw(app, f)).unwrap();

    let mut quit = false;
    for _ in 0..50u32 {
        match runner.step() {
            AppEvent::Tick => {
                if app.on_tick(at(30)) {
                    terminal.draw(|f| ui::draw(app, f)).unwrap();
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f)).unwrap();
            }
            AppEvent::Key(key) => {
                if app.on_key(key, at(30)) == KeyOutcome::Quit {
                    quit = true;
                    break;
                }
                terminal.draw(|f| ui::draw(app, f)).unwrap();
            }
        }
    }

    let screen = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect();
    (quit, screen)
}

#[test]
fn headless_range_change_reloads_summary() {
    let mut app = seeded_app();
    assert_eq!(app.dashboard.records.len(), 2);

    let (quit, screen) = drive(&mut app, vec![press('3')]);

    assert!(!quit);
    assert_eq!(app.filter().range, TimeRange::OneMonth);
    assert_eq!(app.dashboard.records.len(), 4);
    assert!(screen.contains("Time range: 1 Month"));
    assert!(screen.contains("Records: 4"));
}

#[test]
fn headless_person_cycle() {
    let mut app = seeded_app();

    let (_, screen) = drive(&mut app, vec![press('3'), press('p')]);

    assert_eq!(app.filter().person.as_deref(), Some("ana"));
    let summary = app.dashboard.summary.as_ref().unwrap();
    assert_eq!(summary.best_subject, "Science");
    assert_eq!(summary.trend, Trend::Improving);
    assert!(screen.contains("Person: ana"));

    // ana -> ben -> all
    drive(&mut app, vec![press('p'), press('p')]);
    assert_eq!(app.filter().person, None);
}

#[test]
fn headless_data_toggle_and_quit() {
    let mut app = seeded_app();

    let (quit, screen) = drive(&mut app, vec![press('d')]);
    assert!(!quit);
    assert_eq!(app.state, AppState::Data);
    assert!(screen.contains("Data Progress"));
    assert!(screen.contains("6 / 10 (60.00%)"));

    let (quit, _) = drive(
        &mut app,
        vec![
            AppEvent::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
            AppEvent::Resize,
            AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
        ],
    );
    assert!(quit);
    assert_eq!(app.state, AppState::Dashboard);
}

#[test]
fn headless_ctrl_c_quits_from_any_screen() {
    let mut app = seeded_app();
    let (quit, _) = drive(
        &mut app,
        vec![
            press('d'),
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            press('d'),
        ],
    );
    assert!(quit);
    assert_eq!(app.state, AppState::Data);
}
