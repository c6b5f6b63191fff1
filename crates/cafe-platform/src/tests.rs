//! Tests for the simulated platform.

use std::ptr::NonNull;
use std::sync::{Arc, Mutex};

use cafe_types::input::{ControllerInfo, KeyEvent, VpadStatus};
use cafe_types::swkbd::{AppearArg, CreateArg, FsClient, InputFormState, Region};

use super::*;

fn create_arg(work: &mut [u8], client: &mut FsClient) -> CreateArg {
    CreateArg {
        region: Region::Usa,
        work_memory: NonNull::new(work.as_mut_ptr()),
        fs_client: Some(NonNull::from(client)),
    }
}

#[test]
fn create_requires_buffers() {
    let mut sim = SimPlatform::new();
    assert!(!sim.create(&CreateArg::default()));
    assert!(!sim.is_created());
    assert_eq!(sim.created_regions(), vec![Region::Europe]);
}

#[test]
fn create_and_destroy() {
    let mut sim = SimPlatform::new();
    let mut work = vec![0u8; 16];
    let mut client = FsClient::zeroed();
    assert!(sim.create(&create_arg(&mut work, &mut client)));
    assert!(sim.is_created());
    assert_eq!(sim.work_memory(), NonNull::new(work.as_mut_ptr()));
    sim.destroy();
    assert!(!sim.is_created());
    assert!(sim.work_memory().is_none());
}

#[test]
fn scripted_create_failure() {
    let mut sim = SimPlatform::new();
    sim.fail_create = true;
    let mut work = vec![0u8; 16];
    let mut client = FsClient::zeroed();
    assert!(!sim.create(&create_arg(&mut work, &mut client)));
    assert!(!sim.is_created());
}

#[test]
fn appear_makes_form_visible() {
    let mut sim = SimPlatform::new();
    let mut work = vec![0u8; 16];
    let mut client = FsClient::zeroed();
    sim.create(&create_arg(&mut work, &mut client));
    assert_eq!(sim.input_form_state(), InputFormState::Hidden);
    assert!(sim.appear_input_form(&AppearArg::default()));
    assert_eq!(sim.input_form_state(), InputFormState::Visible);
    sim.disappear_input_form();
    assert_eq!(sim.input_form_state(), InputFormState::Hidden);
}

#[test]
fn appear_without_create_fails() {
    let mut sim = SimPlatform::new();
    assert!(!sim.appear_input_form(&AppearArg::default()));
    assert_eq!(sim.input_form_state(), InputFormState::Hidden);
}

#[test]
fn commit_is_reported_by_next_calc_only() {
    let mut sim = SimPlatform::new();
    sim.set_state(InputFormState::Visible);
    sim.commit("hello");
    assert!(!sim.is_decide_ok_button());
    sim.calc(&ControllerInfo::default());
    assert!(sim.is_decide_ok_button());
    assert_eq!(sim.input_form_state(), InputFormState::Hidden);
    let expected: Vec<u16> = "hello\0".encode_utf16().collect();
    assert_eq!(sim.input_form_string(), Some(expected.as_slice()));
    sim.calc(&ControllerInfo::default());
    assert!(!sim.is_decide_ok_button());
}

#[test]
fn cancel_leaves_form_visible() {
    let mut sim = SimPlatform::new();
    sim.set_state(InputFormState::Visible);
    sim.cancel();
    sim.calc(&ControllerInfo::default());
    assert!(sim.is_decide_cancel_button());
    assert!(!sim.is_decide_ok_button());
    assert_eq!(sim.input_form_state(), InputFormState::Visible);
}

#[test]
fn commit_raw_appends_terminator() {
    let mut sim = SimPlatform::new();
    sim.commit_raw(&[0x0041, 0x0042]);
    assert_eq!(sim.input_form_string(), Some(&[0x0041u16, 0x0042, 0][..]));
}

#[test]
fn calc_records_controller_input() {
    let mut sim = SimPlatform::new();
    let info = ControllerInfo {
        vpad: Some(VpadStatus {
            trigger: 0x8000,
            ..Default::default()
        }),
        ..Default::default()
    };
    sim.calc(&info);
    assert_eq!(sim.last_calc_input(), Some(&info));
}

#[test]
fn sub_thread_work_clears_need_flags() {
    let mut sim = SimPlatform::new();
    sim.need_font = true;
    sim.need_predict = true;
    sim.calc_sub_thread_font();
    sim.calc_sub_thread_predict();
    assert!(!sim.is_need_calc_sub_thread_font());
    assert!(!sim.is_need_calc_sub_thread_predict());
}

#[test]
fn fs_client_registration() {
    let mut sim = SimPlatform::new();
    let mut client = FsClient::zeroed();
    let ptr = NonNull::from(&mut client);
    sim.fs_init();
    assert!(sim.fs_initialized());
    sim.add_client(ptr).unwrap();
    assert_eq!(sim.client_count(), 1);
    sim.del_client(ptr);
    assert_eq!(sim.client_count(), 0);
    sim.fs_shutdown();
    assert!(!sim.fs_initialized());
}

#[test]
fn fs_client_failure() {
    let mut sim = SimPlatform::new();
    sim.fail_add_client = true;
    let mut client = FsClient::zeroed();
    assert!(sim.add_client(NonNull::from(&mut client)).is_err());
    assert_eq!(sim.client_count(), 0);
}

#[test]
fn user_config_language() {
    let mut sim = SimPlatform::new();
    sim.system_language = Ok(0);
    let handle = sim.uc_open().unwrap();
    assert_eq!(sim.uc_read_u32(&handle, "cafe.language").unwrap(), 0);
    assert!(sim.uc_read_u32(&handle, "cafe.other").is_err());
    sim.uc_close(handle);
}

#[test]
fn product_area_bits() {
    let mut sim = SimPlatform::new();
    sim.product_area = Ok(ProductArea::USA | ProductArea::JAPAN);
    let handle = sim.mcp_open().unwrap();
    let area = sim.mcp_product_area(&handle).unwrap();
    assert!(area.contains(ProductArea::JAPAN));
    assert!(!area.contains(ProductArea::EUROPE));
    sim.mcp_close(handle);
}

#[test]
fn scan_out_format_tracking() {
    let mut sim = SimPlatform::new();
    assert_eq!(sim.color_buffer_format(), SurfaceFormat::UnormRgba8);
    sim.set_color_buffer_format(SurfaceFormat::SrgbRgba8);
    assert_eq!(sim.color_buffer_format(), SurfaceFormat::SrgbRgba8);
    assert_eq!(
        sim.calls,
        vec![SimCall::SetColorBufferFormat(SurfaceFormat::SrgbRgba8)]
    );
}

#[test]
fn keyboard_callback_delivery() {
    let mut sim = SimPlatform::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    sim.kbd_setup(Box::new(move |e| sink.lock().unwrap().push(e)))
        .unwrap();
    let event = KeyEvent {
        pressed: true,
        hid_code: 4,
        symbol: u16::from(b'a'),
        ..Default::default()
    };
    assert!(sim.press_key(event));
    assert_eq!(seen.lock().unwrap().as_slice(), &[event]);
    sim.kbd_teardown().unwrap();
    assert!(!sim.press_key(event));
}

#[test]
fn keyboard_double_setup_fails() {
    let mut sim = SimPlatform::new();
    sim.kbd_setup(Box::new(|_| {})).unwrap();
    assert!(sim.kbd_setup(Box::new(|_| {})).is_err());
}
