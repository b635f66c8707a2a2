/*
 *  tests/board_integration.rs
 *
 *  Integration tests for the board loop
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 */

use agileboard::clock::{Clock, TimePoint};
use agileboard::config::{Config, ColorOrder};
use agileboard::display::{DisplayCapabilities, DisplayDriver, DisplayError, MatrixRenderer};
use agileboard::error::TransportError;
use agileboard::http::HttpGet;
use agileboard::inbox::{channel, InboundMessage};
use agileboard::mode::Mode;
use agileboard::{App, AppError};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use std::cell::{Cell, RefCell};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const TIME: &str = r#"{"abbreviation":"GMT","datetime":"2026-01-12T14:29:50.250000+00:00"}"#;
const RATES: &str = r#"{"count":4,"results":[
    {"value_inc_vat":"31.5","valid_from":"2026-01-12T14:30:00Z"},
    {"value_inc_vat":28.1,"valid_from":"2026-01-12T14:00:00Z"},
    {"value_inc_vat":7.9,"valid_from":"2026-01-12T13:00:00Z"},
    {"value_inc_vat":24.0,"valid_from":"2026-01-12T13:30:00Z"}
]}"#;

/// Answers by URL; `down` makes every request fail.
#[derive(Default)]
struct FakeApis {
    down: bool,
    time_calls: Cell<u32>,
    rate_calls: Cell<u32>,
    rate_urls: RefCell<Vec<String>>,
}

impl HttpGet for FakeApis {
    async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        if self.down {
            return Err(TransportError::Other("network unreachable".into()));
        }
        if url.contains("standard-unit-rates") {
            self.rate_calls.set(self.rate_calls.get() + 1);
            self.rate_urls.borrow_mut().push(url.to_string());
            Ok(RATES.to_string())
        } else {
            self.time_calls.set(self.time_calls.get() + 1);
            Ok(TIME.to_string())
        }
    }
}

struct FakeClock {
    mono: Instant,
    wall: NaiveDateTime,
}

impl FakeClock {
    fn at(h: u32, m: u32, s: u32) -> Self {
        let wall = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap().and_hms_opt(h, m, s).unwrap();
        Self { mono: Instant::now(), wall }
    }

    fn step(&mut self, ms: u64) {
        self.mono += Duration::from_millis(ms);
        self.wall += TimeDelta::milliseconds(ms as i64);
    }
}

impl Clock for FakeClock {
    fn monotonic(&self) -> Instant {
        self.mono
    }
    fn now(&self) -> TimePoint {
        TimePoint::from_naive(self.wall)
    }
    fn set(&mut self, wall: NaiveDateTime) {
        self.wall = wall;
    }
}

#[derive(Default)]
struct Panel {
    frame: Vec<Rgb888>,
    flushes: usize,
    brightness: Option<u8>,
}

struct CaptureDriver {
    caps: DisplayCapabilities,
    panel: Arc<Mutex<Panel>>,
}

impl CaptureDriver {
    fn new() -> (Self, Arc<Mutex<Panel>>) {
        let panel = Arc::new(Mutex::new(Panel::default()));
        let caps = DisplayCapabilities {
            width: 64,
            height: 32,
            bit_depth: 8,
            color_order: ColorOrder::Rgb,
            supports_brightness: true,
        };
        (Self { caps, panel: Arc::clone(&panel) }, panel)
    }
}

impl DisplayDriver for CaptureDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.caps
    }
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        self.panel.lock().unwrap().brightness = Some(value);
        Ok(())
    }
    fn write_frame(&mut self, frame: &[Rgb888]) -> Result<(), DisplayError> {
        self.panel.lock().unwrap().frame = frame.to_vec();
        Ok(())
    }
    fn flush(&mut self) -> Result<(), DisplayError> {
        self.panel.lock().unwrap().flushes += 1;
        Ok(())
    }
    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut panel = self.panel.lock().unwrap();
        panel.frame.iter_mut().for_each(|p| *p = Rgb888::BLACK);
        Ok(())
    }
}

fn lit(panel: &Arc<Mutex<Panel>>) -> usize {
    panel.lock().unwrap().frame.iter().filter(|p| **p != Rgb888::BLACK).count()
}

fn board(cfg: &Config, apis: FakeApis, clock: FakeClock) -> (App<FakeApis, FakeClock>, Arc<Mutex<Panel>>) {
    let (driver, panel) = CaptureDriver::new();
    let renderer = MatrixRenderer::from_config(Box::new(driver), cfg);
    let app = App::new(cfg, apis, clock, Box::new(renderer)).unwrap();
    (app, panel)
}

#[tokio::test]
async fn test_half_hour_refresh_cycle() {
    let cfg = Config::default();
    let (mut app, panel) = board(&cfg, FakeApis::default(), FakeClock::at(9, 0, 0));

    let first = app.tick().await.unwrap();
    assert!(first.synced && first.fetched);

    // synced wall time drops the fraction
    let now = app.clock().now();
    assert_eq!((now.hour, now.minute, now.second), (14, 29, 50));

    // rates sorted, shifted an hour, capped at three periods
    let rates = app.state().rates.clone().unwrap();
    let starts: Vec<String> = rates.iter().map(|r| r.valid_from.format("%H:%M").to_string()).collect();
    assert_eq!(starts, vec!["14:00", "14:30", "15:00"]);
    assert_eq!(rates[0].price, 7.9);
    assert_eq!(app.state().period_lowest.unwrap().format("%H:%M").to_string(), "14:00");

    assert!(lit(&panel) > 0);
    assert_eq!(panel.lock().unwrap().brightness, Some(255));

    // run to 14:30:05 in 100 ms ticks
    for _ in 0..150 {
        app.clock_mut().step(100);
        app.tick().await.unwrap();
    }

    let apis = app.http();
    assert_eq!(apis.time_calls.get(), 1);
    assert_eq!(apis.rate_calls.get(), 2);
    assert!(apis.rate_urls.borrow()[1].contains("period_from=2026-01-12T14:30:00"));
    assert_eq!(app.errors().count(), 0);

    // one redraw per second plus the first tick
    assert_eq!(panel.lock().unwrap().flushes, 16);
}

#[tokio::test]
async fn test_unreachable_network_escalates() {
    let cfg = Config { error_threshold: 3, ..Default::default() };
    let apis = FakeApis { down: true, ..Default::default() };
    let (mut app, panel) = board(&cfg, apis, FakeClock::at(10, 15, 0));

    let mut outcome = None;
    for _ in 0..100 {
        if let Err(e) = app.tick().await {
            outcome = Some(e);
            break;
        }
        app.clock_mut().step(100);
    }

    assert!(matches!(outcome, Some(AppError::TooManyErrors { count: 4, threshold: 3 })));
    assert!(!app.is_synced());
    // the board kept drawing the clock regardless
    assert!(lit(&panel) > 0);
}

#[tokio::test]
async fn test_off_then_shutdown() {
    let cfg = Config::default();
    let (app, panel) = board(&cfg, FakeApis::default(), FakeClock::at(9, 0, 0));
    let (tx, inbox) = channel(4);
    let mut app = app.with_inbox(inbox);

    app.tick().await.unwrap();
    assert!(lit(&panel) > 0);

    tx.try_send(InboundMessage::new("agileboard/mode", "off")).unwrap();
    app.clock_mut().step(1000);
    app.tick().await.unwrap();
    assert_eq!(app.state().mode, Mode::Off);
    assert_eq!(panel.lock().unwrap().brightness, Some(0));
    assert_eq!(lit(&panel), 0);

    tx.try_send(InboundMessage::new("agileboard/mode", "on")).unwrap();
    app.clock_mut().step(1000);
    app.tick().await.unwrap();
    assert!(lit(&panel) > 0);

    app.shutdown().unwrap();
    assert_eq!(lit(&panel), 0);
}
