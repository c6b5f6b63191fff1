//! Keyboard scenarios run against the simulated platform.

use anyhow::{Result, ensure};

use cafe_platform::{SimCall, SimPlatform, sim::DEFAULT_WORK_MEMORY_SIZE};
use cafe_swkbd::{KeyboardPump, Presenter, Session};
use cafe_types::config::CafeConfig;
use cafe_types::event::{CafeEvent, EventQueue, SysWmEvent};
use cafe_types::input::{KeyEvent, KpadStatus, VpadStatus};
use cafe_types::swkbd::{ControllerType, Region};
use cafe_types::window::{Window, WindowFlags};

/// A named check of the session's observable behavior.
pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&CafeConfig) -> Result<()>,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "S1 commit",
        run: commit,
    },
    Scenario {
        name: "S2 cancel",
        run: cancel,
    },
    Scenario {
        name: "S3 locale flip",
        run: locale_flip,
    },
    Scenario {
        name: "S4 disabled",
        run: disabled,
    },
    Scenario {
        name: "S5 TV-only window",
        run: tv_only,
    },
    Scenario {
        name: "S6 remote channel range",
        run: kpad_range,
    },
    Scenario {
        name: "USB keyboard",
        run: usb_keyboard,
    },
];

fn session(config: &CafeConfig) -> Session<SimPlatform> {
    let mut sim = SimPlatform::new();
    // The full console work area is not needed here.
    sim.work_memory_size = DEFAULT_WORK_MEMORY_SIZE / 64;
    let mut session = Session::new(sim);
    session.apply_config(&config.swkbd);
    session
}

fn w1() -> Window {
    Window::new(1, WindowFlags::empty())
}

fn commit(config: &CafeConfig) -> Result<()> {
    let mut s = session(config);
    let mut events = EventQueue::new();
    s.set_enabled(true);
    s.set_locale(Some("en_US"));
    s.show(&w1());

    let mut frames = 0;
    while events.is_empty() {
        ensure!(s.set_vpad(&VpadStatus::default()), "gamepad not routed");
        if frames == 3 {
            s.platform_mut().commit("hello");
        }
        s.calc(&mut events);
        frames += 1;
        ensure!(frames < 10, "no commit after {frames} frames");
    }

    let got = events.drain();
    log::info!("committed after {frames} frames: {got:?}");
    ensure!(
        got == [
            CafeEvent::SysWm(SysWmEvent::SwkbdOkStart),
            CafeEvent::KeyboardText("hello".into()),
            CafeEvent::SysWm(SysWmEvent::SwkbdOkFinish),
        ],
        "unexpected events {got:?}"
    );
    Ok(())
}

fn cancel(config: &CafeConfig) -> Result<()> {
    let mut s = session(config);
    let mut events = EventQueue::new();
    s.set_locale(Some("en_US"));
    s.show(&w1());
    s.platform_mut().cancel();
    s.calc(&mut events);
    // The form is gone once the platform reports it hidden.
    s.calc(&mut events);

    let got = events.drain();
    ensure!(
        got == [CafeEvent::SysWm(SysWmEvent::SwkbdCancel)],
        "unexpected events {got:?}"
    );
    ensure!(!s.is_shown(&w1()), "still shown after cancel");
    Ok(())
}

fn locale_flip(config: &CafeConfig) -> Result<()> {
    let mut s = session(config);
    s.set_locale(Some("en_US"));
    s.show(&w1());
    s.hide();
    s.set_locale(Some("ja_JP"));
    s.show(&w1());

    let regions = s.platform().created_regions();
    log::info!("created for {regions:?}");
    ensure!(
        regions == [Region::Usa, Region::Japan],
        "unexpected regions {regions:?}"
    );
    Ok(())
}

fn disabled(config: &CafeConfig) -> Result<()> {
    let mut s = session(config);
    let mut events = EventQueue::new();
    s.set_enabled(false);
    s.show(&w1());
    s.calc(&mut events);

    let creates = s
        .platform()
        .count(|c| matches!(c, SimCall::Create { .. }));
    ensure!(creates == 0, "created {creates} times while disabled");
    ensure!(!s.is_shown(&w1()), "shown while disabled");
    ensure!(events.is_empty(), "events while disabled");
    Ok(())
}

fn tv_only(config: &CafeConfig) -> Result<()> {
    let mut s = session(config);
    let mut presenter = Presenter::new();
    let tv = Window::new(2, WindowFlags::TV_ONLY);
    s.show(&tv);

    let controller = s.platform().last_appear().map(|a| a.controller);
    ensure!(
        controller == Some(ControllerType::WiiRemote0),
        "appeared with {controller:?}"
    );
    presenter.present(&mut s, &tv);
    let tv_draws = s.platform().count(|c| *c == SimCall::DrawTv);
    let drc_draws = s.platform().count(|c| *c == SimCall::DrawDrc);
    ensure!(tv_draws == 1 && drc_draws == 0, "drew tv {tv_draws} drc {drc_draws}");
    Ok(())
}

fn kpad_range(config: &CafeConfig) -> Result<()> {
    let mut s = session(config);
    let status = KpadStatus::default();
    ensure!(!s.set_kpad(4, &status), "channel 4 accepted while hidden");
    s.show(&w1());
    ensure!(!s.set_kpad(4, &status), "channel 4 accepted while visible");
    ensure!(!s.set_kpad(-1, &status), "channel -1 accepted");
    ensure!(s.set_kpad(3, &status), "channel 3 rejected while visible");
    Ok(())
}

fn usb_keyboard(config: &CafeConfig) -> Result<()> {
    let mut s = session(config);
    let mut events = EventQueue::new();
    let pump = KeyboardPump::attach(s.platform_mut())?;
    let key = KeyEvent {
        channel: 0,
        pressed: true,
        hid_code: 0x0B,
        symbol: u16::from(b'h'),
    };

    s.platform().press_key(key);
    pump.pump(&s, &mut events);
    ensure!(events.len() == 2, "expected key and text, got {}", events.len());

    events.drain();
    s.show(&w1());
    s.platform().press_key(key);
    pump.pump(&s, &mut events);
    ensure!(events.is_empty(), "keys leaked past the visible keyboard");

    pump.detach(s.platform_mut())?;
    Ok(())
}
