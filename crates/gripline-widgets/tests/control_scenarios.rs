#![forbid(unsafe_code)]

//! End-to-end scenarios for the gripline controls.
//!
//! Each test drives a control the way a host would: mount, answer the frame
//! request with a [`LayoutSource`], forward pointer and key events, and carry
//! out the returned host commands.
//!
//! # Invariants tested
//!
//! 1. Overlay visibility flips exactly when content starts to overflow.
//! 2. An end-to-end thumb drag reaches exactly `0` and `extent - viewport`.
//! 3. A second press never leaves two listener sets attached.
//! 4. Step quantization rounds to the nearest step on both midpoint sides.
//! 5. The color picker keeps its hue through an achromatic color.
//! 6. A controlled width is reported, never written.
//! 7. A centred press on a slider commits the midpoint value.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use gripline_core::event::PointerInput;
use gripline_core::geometry::{Axis, Rect};
use gripline_core::metrics::{LayoutSource, ScrollMetrics};
use gripline_web::pointer_capture::{DragHost, HostCommand};
use gripline_widgets::color::{ColorFieldConfig, ColorPicker, Hsv, Rgb, hue_bar_config, rgb_to_hsv};
use gripline_widgets::resize_handle::{BoxSize, ResizableBox, ResizeHandle, ResizeHandleConfig};
use gripline_widgets::scrollbar::{ScrollTarget, ScrollbarConfig, ScrollbarOverlay};
use gripline_widgets::slider::{Slider, SliderConfig};
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A 400x200 scroll container with an 8px vertical track on its right edge.
struct ScrollPane {
    scroll: ScrollMetrics,
}

impl ScrollPane {
    fn new(extent: f64) -> Self {
        Self {
            scroll: ScrollMetrics::new(extent, 200.0, 0.0),
        }
    }
}

impl LayoutSource for ScrollPane {
    fn track_rect(&self, _axis: Axis) -> Option<Rect> {
        Some(Rect::new(392.0, 0.0, 8.0, 200.0))
    }

    fn container_rect(&self) -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, 400.0, 200.0))
    }

    fn scroll_metrics(&self, _axis: Axis) -> Option<ScrollMetrics> {
        Some(self.scroll)
    }
}

#[derive(Default)]
struct ScrollLog(Vec<f64>);

impl ScrollTarget for ScrollLog {
    fn set_scroll_position(&mut self, _axis: Axis, position: f64) {
        self.0.push(position);
    }
}

/// A horizontal slider track `length` px long at the container origin.
struct SliderTrack {
    length: f64,
}

impl LayoutSource for SliderTrack {
    fn track_rect(&self, _axis: Axis) -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, self.length, 8.0))
    }

    fn container_rect(&self) -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, self.length, 8.0))
    }
}

/// Tracks live listener sets and captured pointers.
#[derive(Debug, Default)]
struct CountingHost {
    live_listener_sets: i32,
    max_live_listener_sets: i32,
    attaches: u32,
    detaches: u32,
    captured: BTreeSet<u32>,
}

impl DragHost for CountingHost {
    fn acquire_capture(&mut self, pointer_id: u32) {
        self.captured.insert(pointer_id);
    }

    fn release_capture(&mut self, pointer_id: u32) {
        self.captured.remove(&pointer_id);
    }

    fn attach_window_listeners(&mut self) {
        self.attaches += 1;
        self.live_listener_sets += 1;
        self.max_live_listener_sets = self.max_live_listener_sets.max(self.live_listener_sets);
    }

    fn detach_window_listeners(&mut self) {
        self.detaches += 1;
        self.live_listener_sets -= 1;
    }
}

fn mounted_overlay(pane: &ScrollPane) -> ScrollbarOverlay {
    let mut overlay = ScrollbarOverlay::new(ScrollbarConfig::vertical());
    overlay.mount();
    overlay.on_frame(pane);
    overlay
}

fn mounted_slider(config: SliderConfig, length: f64) -> Slider {
    let mut slider = Slider::new(config);
    slider.mount();
    assert!(slider.on_frame(&SliderTrack { length }));
    slider
}

// ---------------------------------------------------------------------------
// Scrollbar overlay
// ---------------------------------------------------------------------------

#[test]
fn overlay_appears_exactly_when_content_overflows() {
    let fits = mounted_overlay(&ScrollPane::new(200.0));
    assert!(!fits.is_visible());

    let overflows = mounted_overlay(&ScrollPane::new(201.0));
    assert!(overflows.is_visible());
}

#[test]
fn hidden_overlay_is_inert() {
    let mut overlay = mounted_overlay(&ScrollPane::new(200.0));
    let mut log = ScrollLog::default();
    assert!(
        overlay
            .pointer_down(PointerInput::primary(1, 396.0, 100.0), &mut log)
            .is_none()
    );
    assert!(log.0.is_empty());
}

#[test]
fn thumb_drag_covers_the_full_scroll_range() {
    // 10 000px of content in a 200px viewport floors the thumb at 24px.
    let pane = ScrollPane::new(10_000.0);
    let mut overlay = mounted_overlay(&pane);
    let thumb = overlay.thumb();
    assert_eq!(thumb.size, 24.0);
    let travel = 200.0 - thumb.size;

    let mut log = ScrollLog::default();
    let press = PointerInput::primary(1, 396.0, 12.0);
    overlay.pointer_down(press, &mut log).expect("press on thumb");
    overlay.capture_acquired(1);
    overlay.pointer_move(press.at(396.0, 12.0 + travel / 2.0), &mut log);
    overlay.pointer_move(press.at(396.0, 12.0 + travel), &mut log);
    overlay.pointer_up(press.at(396.0, 12.0 + travel), &mut log);
    assert_eq!(log.0.last().copied(), Some(9_800.0));
    assert_eq!(overlay.thumb().offset, travel);

    // Overshooting past the end pins there; dragging back reaches zero.
    let press = PointerInput::primary(2, 396.0, 12.0 + travel);
    overlay.pointer_down(press, &mut log).expect("press on thumb");
    overlay.pointer_move(press.at(396.0, 900.0), &mut log);
    assert_eq!(log.0.last().copied(), Some(9_800.0));
    overlay.pointer_move(press.at(396.0, 12.0), &mut log);
    overlay.pointer_up(press.at(396.0, 12.0), &mut log);
    assert_eq!(log.0.last().copied(), Some(0.0));
    assert_eq!(overlay.thumb().offset, 0.0);
}

#[test]
fn track_click_centres_the_thumb_under_the_pointer() {
    let pane = ScrollPane::new(1_000.0);
    let mut overlay = mounted_overlay(&pane);
    // Thumb is 40px; travel 160px over 800px of scroll.
    assert_eq!(overlay.thumb().size, 40.0);

    let mut log = ScrollLog::default();
    let dispatch = overlay
        .pointer_down(PointerInput::primary(1, 396.0, 120.0), &mut log)
        .expect("press on track");
    assert!(overlay.is_dragging());
    assert_eq!(log.0, vec![500.0]);
    assert_eq!(overlay.thumb().offset, 100.0);
    assert_eq!(
        dispatch.commands,
        vec![
            HostCommand::AcquireCapture { pointer_id: 1 },
            HostCommand::AttachWindowListeners,
        ]
    );

    // Holding and moving continues from the jumped position.
    overlay.pointer_move(PointerInput::primary(1, 396.0, 140.0), &mut log);
    assert_eq!(log.0.last().copied(), Some(600.0));
}

// ---------------------------------------------------------------------------
// Drag sessions
// ---------------------------------------------------------------------------

#[test]
fn second_press_never_doubles_listeners() {
    let mut slider = mounted_slider(SliderConfig::default().thumb_size(20.0), 200.0);
    let mut host = CountingHost::default();

    slider
        .pointer_down(PointerInput::primary(1, 10.0, 4.0))
        .expect("measured")
        .apply_to(&mut host);
    slider.capture_acquired(1).apply_to(&mut host);
    slider
        .pointer_move(PointerInput::primary(1, 60.0, 4.0))
        .apply_to(&mut host);
    assert!(slider.is_dragging());

    let second = slider
        .pointer_down(PointerInput::primary(2, 150.0, 4.0))
        .expect("measured");
    assert!(second.preempted.is_some());
    assert_eq!(
        second.commands,
        vec![
            HostCommand::ReleaseCapture { pointer_id: 1 },
            HostCommand::DetachWindowListeners,
            HostCommand::AcquireCapture { pointer_id: 2 },
            HostCommand::AttachWindowListeners,
        ]
    );
    second.apply_to(&mut host);
    assert_eq!(host.live_listener_sets, 1);
    assert_eq!(host.captured, BTreeSet::from([2]));

    slider
        .pointer_up(PointerInput::primary(2, 150.0, 4.0))
        .apply_to(&mut host);
    assert_eq!(host.live_listener_sets, 0);
    assert_eq!(host.max_live_listener_sets, 1);
    assert_eq!(host.attaches, host.detaches);
}

#[test]
fn unmount_mid_drag_releases_everything() {
    let mut slider = mounted_slider(SliderConfig::default(), 200.0);
    let mut host = CountingHost::default();
    slider
        .pointer_down(PointerInput::primary(3, 120.0, 4.0))
        .expect("measured")
        .apply_to(&mut host);
    slider.capture_acquired(3).apply_to(&mut host);

    let unmount = slider.unmount();
    unmount.drag.apply_to(&mut host);
    assert_eq!(host.live_listener_sets, 0);
    assert!(host.captured.is_empty());
    assert!(!unmount.observer.is_empty());

    // Late events from a detached listener are no-ops.
    let late = slider.pointer_move(PointerInput::primary(3, 10.0, 4.0));
    assert!(late.is_ignored());
    assert!(late.commands.is_empty());
}

// ---------------------------------------------------------------------------
// Value controls
// ---------------------------------------------------------------------------

#[test]
fn step_quantization_rounds_to_nearest_on_both_sides_of_the_midpoint() {
    let mut slider = Slider::new(SliderConfig::default().range(0.0, 100.0).step(25.0));
    let commit = |slider: &mut Slider, raw: f64| {
        slider.set_value(raw);
        slider.value()
    };
    assert_eq!(commit(&mut slider, 38.0), 25.0);
    assert_eq!(commit(&mut slider, 62.0), 50.0);
    assert_eq!(commit(&mut slider, 62.5), 75.0);
    assert_eq!(commit(&mut slider, 63.0), 75.0);
}

#[test]
fn pointer_commits_are_quantized_too() {
    let mut slider = mounted_slider(
        SliderConfig::default()
            .range(0.0, 100.0)
            .step(25.0)
            .thumb_size(0.0),
        100.0,
    );
    slider.pointer_down(PointerInput::primary(1, 38.0, 4.0));
    assert_eq!(slider.value(), 25.0);
    slider.pointer_move(PointerInput::primary(1, 63.0, 4.0));
    assert_eq!(slider.value(), 75.0);
}

#[test]
fn centred_press_commits_the_midpoint() {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let config = SliderConfig::default()
        .range(55.0, 85.0)
        .step(1.0)
        .thumb_size(72.0)
        .edge_overlap(6.0);
    let mut slider =
        mounted_slider(config, 300.0).on_change(move |value| sink.borrow_mut().push(value));

    let press = PointerInput::primary(1, 150.0, 4.0);
    slider.pointer_down(press).expect("measured");
    slider.pointer_up(press);

    assert_eq!(slider.value(), 70.0);
    assert_eq!(*changes.borrow(), vec![70.0]);
    assert!(!slider.is_dragging());
}

#[test]
fn picker_keeps_hue_through_gray() {
    let emitted = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&emitted);
    let mut picker = ColorPicker::new(ColorFieldConfig::default(), hue_bar_config())
        .with_hsv(Hsv::new(200.0, 80.0, 90.0))
        .on_change(move |rgb| sink.borrow_mut().push(rgb));
    picker.with_field(|field| field.set_area(Some(Rect::new(0.0, 0.0, 200.0, 100.0))));

    // Drag saturation all the way out.
    let press = PointerInput::primary(1, 160.0, 10.0);
    picker.with_field(|field| field.pointer_down(press));
    picker.with_field(|field| field.pointer_move(press.at(0.0, 10.0)));
    assert_eq!(picker.hsv().s, 0.0);
    let gray = picker.rgb();
    assert_eq!(rgb_to_hsv(gray).h, 0.0);

    // The host echoes the gray back, then sends a darker gray of its own.
    assert_eq!(gray, Rgb::new(230, 230, 230));
    assert!(!picker.set_rgb(gray));
    assert!(picker.set_rgb(Rgb::new(200, 200, 200)));
    assert_eq!(picker.hsv().h, 200.0);

    // Bring saturation back up.
    picker.with_field(|field| field.pointer_move(press.at(100.0, 10.0)));
    picker.with_field(|field| field.pointer_up(press.at(100.0, 10.0)));
    assert_eq!(picker.hsv(), Hsv::new(200.0, 50.0, 90.0));
    let hue = rgb_to_hsv(picker.rgb()).h;
    assert!((hue - 200.0).abs() < 1.5, "hue drifted to {hue}");
    assert_eq!(emitted.borrow().last().copied(), Some(picker.rgb()));
}

// ---------------------------------------------------------------------------
// Resize handle
// ---------------------------------------------------------------------------

#[test]
fn controlled_width_is_reported_not_written() {
    let requested = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&requested);
    let bounds = ResizableBox {
        width: Some(300.0),
        min_width: 100.0,
        min_height: 50.0,
        ..ResizableBox::default()
    };
    let mut handle = ResizeHandle::new(
        ResizeHandleConfig::default(),
        bounds,
        BoxSize::new(0.0, 120.0),
    )
    .expect("valid bounds")
    .on_size_change(move |size| sink.borrow_mut().push(size));

    let press = PointerInput::primary(1, 300.0, 120.0);
    handle.pointer_down(press).expect("enabled");
    handle.pointer_move(press.at(350.0, 140.0));
    assert_eq!(*requested.borrow(), vec![BoxSize::new(350.0, 140.0)]);
    assert_eq!(handle.size(), BoxSize::new(300.0, 140.0));

    handle.pointer_up(press.at(350.0, 140.0));
    assert_eq!(handle.size().width, 300.0);

    handle.set_controlled_width(Some(350.0));
    assert_eq!(handle.size(), BoxSize::new(350.0, 140.0));
    assert_eq!(requested.borrow().len(), 1);
}
