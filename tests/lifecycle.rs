use std::rc::Rc;

use folio_scenes::camera::Rect;
use folio_scenes::config::SceneConfig;
use folio_scenes::geometry::GeometryId;
use folio_scenes::headless::{ContainerId, HeadlessHost, HostStats};
use folio_scenes::lifecycle::create_scene;
use folio_scenes::mount::Mount;
use folio_scenes::scene::Color;
use folio_scenes::theme::Theme;
use folio_scenes::typeface::Typeface;
use folio_scenes::widgets::{create_widget, WidgetKind};

const FACE: &str = include_str!("../static/fonts/block.typeface.json");

fn face() -> Rc<Typeface> {
    Rc::new(Typeface::from_json(FACE).unwrap())
}

fn host_with(rect: Rect) -> (HeadlessHost, ContainerId) {
    let host = HeadlessHost::new();
    let c = host.container(rect);
    (host, c)
}

fn seeded() -> SceneConfig {
    SceneConfig { seed: Some(17), ..Default::default() }
}

#[test]
fn repeated_mount_unmount_leaves_nothing_behind() {
    for n in [1usize, 5, 50] {
        let (host, c) = host_with(Rect::new(0.0, 0.0, 640.0, 480.0));
        for i in 0..n {
            let kind = WidgetKind::ALL[i % WidgetKind::ALL.len()];
            let mut m = Mount::new(&host, &c, kind, seeded(), Theme::Light);
            if kind.needs_typeface() {
                m.typeface_loaded(Ok(face()));
            }
            assert!(m.is_live(), "{kind} did not go live");
            host.pump_n(3, i as f64 * 100.0);
            m.unmount();
        }
        let stats = host.stats();
        assert_eq!(stats.live_surfaces, 0, "after {n} cycles");
        assert_eq!(stats.frame_loops, 0);
        assert_eq!(stats.listeners, 0);
        assert_eq!(stats.surfaces_created, n);
    }
}

#[test]
fn dropped_handle_releases_like_destroy() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 300.0, 300.0));
    {
        let widget = create_widget(WidgetKind::Boxes, &seeded(), None).unwrap();
        let _handle = create_scene(&host, &c, widget, Theme::Dark).unwrap();
        assert_eq!(host.stats().listeners, 2);
    }
    assert_eq!(
        host.stats(),
        HostStats { surfaces_created: 1, ..Default::default() }
    );
}

#[test]
fn theme_toggle_keeps_geometry() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 800.0, 600.0));
    let widget = create_widget(WidgetKind::Sphere, &seeded(), None).unwrap();
    let handle = create_scene(&host, &c, widget, Theme::Light).unwrap();

    let identity = |h: &folio_scenes::lifecycle::SceneHandle<HeadlessHost>| -> Vec<(GeometryId, usize)> {
        h.with_scene(|s| {
            s.shapes()
                .iter()
                .map(|sh| (sh.geometry.id(), sh.geometry.positions().as_ptr() as usize))
                .collect()
        })
    };
    let before = identity(&handle);
    assert_eq!(handle.with_scene(|s| s.materials()[1].color), Color(0x0036fe));

    handle.restyle(Theme::Dark);
    assert_eq!(handle.with_scene(|s| s.materials()[1].color), Color(0xfec800));
    assert_eq!(handle.with_scene(|s| s.materials()[0].color), Color(0xf6f3f0));
    handle.restyle(Theme::Light);
    assert_eq!(identity(&handle), before);
    handle.destroy();
}

#[test]
fn resize_uses_the_new_aspect_exactly() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 800.0, 600.0));
    let widget = create_widget(WidgetKind::Cube, &seeded(), None).unwrap();
    let handle = create_scene(&host, &c, widget, Theme::Light).unwrap();
    assert_eq!(handle.camera_aspect(), Some(800.0 / 600.0));

    host.resize(c, Rect::new(0.0, 0.0, 400.0, 300.0));
    host.pump(0.0);
    assert_eq!(handle.camera_aspect(), Some(400.0 / 300.0));
    let surface = host.surface(c).unwrap();
    assert_eq!((surface.size.width, surface.size.height), (400.0, 300.0));
    assert_eq!(surface.aspect, Some(400.0 / 300.0));

    host.resize(c, Rect::new(0.0, 0.0, 300.0, 400.0));
    assert_eq!(handle.camera_aspect(), Some(0.75));
}

#[test]
fn zero_size_container_defers_the_build() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 0.0, 0.0));
    let widget = create_widget(WidgetKind::Cube, &seeded(), None).unwrap();
    let handle = create_scene(&host, &c, widget, Theme::Light).unwrap();
    host.pump_n(5, 0.0);
    assert!(!handle.is_built());
    assert_eq!(handle.camera_aspect(), None);
    assert_eq!(host.stats().renders, 0);

    host.resize(c, Rect::new(0.0, 0.0, 500.0, 250.0));
    assert!(handle.is_built());
    assert_eq!(handle.camera_aspect(), Some(2.0));
    host.pump(100.0);
    assert_eq!(host.stats().renders, 1);
}

#[test]
fn layout_change_without_resize_event_is_picked_up_per_frame() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 0.0, 200.0));
    let widget = create_widget(WidgetKind::Sphere, &seeded(), None).unwrap();
    let handle = create_scene(&host, &c, widget, Theme::Light).unwrap();
    host.pump(0.0);
    assert!(!handle.is_built());
    host.set_rect(c, Rect::new(0.0, 0.0, 200.0, 200.0));
    host.pump(16.0);
    assert!(handle.is_built());
    assert_eq!(host.stats().renders, 1);
}

#[test]
fn late_typeface_after_unmount_creates_nothing() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 800.0, 600.0));
    let mut m = Mount::new(&host, &c, WidgetKind::FallingLetters, seeded(), Theme::Light);
    m.unmount();
    m.typeface_loaded(Ok(face()));
    assert_eq!(host.stats(), HostStats::default());
}

#[test]
fn restyle_while_loading_applies_at_build() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 1000.0, 600.0));
    let mut m = Mount::new(&host, &c, WidgetKind::Initials, seeded(), Theme::Light);
    m.restyle(Theme::Dark);
    m.typeface_loaded(Ok(face()));
    let handle = m.require_live().unwrap();
    let colors = handle.with_scene(|s| s.materials().iter().map(|m| m.color).collect::<Vec<_>>());
    assert_eq!(colors, vec![Color(0xffffff), Color(0xfdc700)]);
}

#[test]
fn same_seed_and_size_drop_letters_identically() {
    let starts = || {
        let (host, c) = host_with(Rect::new(0.0, 0.0, 1200.0, 700.0));
        let widget = create_widget(WidgetKind::FallingLetters, &seeded(), Some(face())).unwrap();
        let handle = create_scene(&host, &c, widget, Theme::Light).unwrap();
        let positions: Vec<_> = handle.with_scene(|s| {
            s.shapes()
                .iter()
                .map(|sh| (sh.transform.position, sh.geometry.segment_count()))
                .collect()
        });
        handle.destroy();
        positions
    };
    let a = starts();
    assert_eq!(a.len(), 50);
    assert_eq!(a, starts());
}

#[test]
fn pointer_and_scroll_reach_only_subscribed_widgets() {
    let host = HeadlessHost::new();
    let letters_box = host.container(Rect::new(0.0, 0.0, 800.0, 600.0));
    let boxes_box = host.container(Rect::new(0.0, 600.0, 800.0, 400.0));
    let letters = create_scene(
        &host,
        &letters_box,
        create_widget(WidgetKind::FallingLetters, &seeded(), Some(face())).unwrap(),
        Theme::Light,
    )
    .unwrap();
    let boxes = create_scene(
        &host,
        &boxes_box,
        create_widget(WidgetKind::Boxes, &seeded(), None).unwrap(),
        Theme::Light,
    )
    .unwrap();
    // resize for both, pointer move for letters, scroll for boxes
    assert_eq!(host.stats().listeners, 4);

    host.pump(0.0);
    let y_before = boxes.with_scene(|s| s.shapes()[0].transform.position.y);
    host.scroll_to(200.0);
    host.pump(16.0);
    let y_after = boxes.with_scene(|s| s.shapes()[0].transform.position.y);
    assert!(y_after > y_before, "scroll nudge should lift the boxes");

    host.pointer_move(glam::Vec2::new(400.0, 300.0));
    host.pump(32.0);
    assert!(letters.is_built());

    letters.destroy();
    boxes.destroy();
    assert_eq!(host.stats().listeners, 0);
}

#[test]
fn pointer_sweep_shoves_settled_letters() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 800.0, 600.0));
    let letters = create_scene(
        &host,
        &c,
        create_widget(WidgetKind::FallingLetters, &seeded(), Some(face())).unwrap(),
        Theme::Light,
    )
    .unwrap();
    // 800x600 gives a 20 x 22.5 layout; client y 500 is world y -7.5,
    // the middle of the bottom row. Park the repulsor left of the wall.
    host.pointer_move(glam::Vec2::new(-100.0, 500.0));
    host.pump_n(900, 0.0);
    let positions = || letters.with_scene(|s| s.shapes().iter().map(|sh| sh.transform.position).collect::<Vec<_>>());
    let settled = positions();

    for step in 0..100 {
        host.pointer_move(glam::Vec2::new(-100.0 + step as f32 * 10.0, 500.0));
        host.pump(15_000.0 + step as f64 * 1000.0 / 60.0);
    }
    let moved = settled
        .iter()
        .zip(positions())
        .filter(|(a, b)| a.distance(*b) > 0.2)
        .count();
    assert!(moved > 0, "no letter moved under the pointer");
    letters.destroy();
}

#[test]
fn portrait_letters_land_between_the_walls() {
    let (host, c) = host_with(Rect::new(0.0, 0.0, 400.0, 800.0));
    let letters = create_scene(
        &host,
        &c,
        create_widget(WidgetKind::FallingLetters, &seeded(), Some(face())).unwrap(),
        Theme::Light,
    )
    .unwrap();
    let ground = SceneConfig::default().falling_letters.ground_y;
    // 15 * 400 / 800 world units wide
    let half_width = 3.75;
    let starts = letters.with_scene(|s| s.shapes().iter().map(|sh| sh.transform.position.y).collect::<Vec<_>>());
    assert_eq!(starts.len(), 50);
    assert!(starts.iter().all(|y| y - 1.5 > ground));

    host.pump_n(1800, 0.0);
    letters.with_scene(|s| {
        for sh in s.shapes() {
            let p = sh.transform.position;
            assert!(p.y - 1.5 >= ground - 0.1, "letter sank to {}", p.y);
            assert!(p.x.abs() + 1.05 <= half_width + 0.1, "letter escaped to x = {}", p.x);
        }
    });
    letters.destroy();
}
