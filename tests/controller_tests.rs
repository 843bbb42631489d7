use balloons::geometry;
use balloons::host::HostOp;
use balloons::*;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tokio::time::{Instant, sleep};

const TIMEOUT: Duration = Duration::from_millis(500);

fn setup(size: Size) -> (Arc<RecordingHost>, NodeId) {
    let host = Arc::new(RecordingHost::new());
    let parent = host.add_container(size);
    (host, parent)
}

fn three_balloons() -> Options {
    Options::default().with_balloons(vec![
        BalloonSpec::at(0.0),
        BalloonSpec::at(90.0),
        BalloonSpec::at(180.0),
    ])
}

fn attach(host: &Arc<RecordingHost>, parent: NodeId, options: Options) -> Controller {
    create_controller(&MemoryCache::new(), host.clone(), parent, options)
}

#[tokio::test]
async fn test_init_builds_structure_once() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());
    let ops = host.ops().len();

    controller.init().init();

    assert_eq!(host.ops().len(), ops);
    assert_eq!(controller.state(), LifecycleState::Enabled);

    let anchor = controller.anchor().unwrap();
    assert_eq!(host.children(parent), vec![anchor.container, anchor.wrapper]);
    assert_eq!(host.children(anchor.wrapper), vec![anchor.root]);
    assert_eq!(host.style(anchor.wrapper).number("left"), Some(150.0));
    assert_eq!(host.style(anchor.wrapper).number("top"), Some(100.0));
    assert_eq!(anchor.center, None);
}

#[tokio::test]
async fn test_second_construction_returns_existing_controller() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let cache = MemoryCache::new();

    let first = create_controller(&cache, host.clone(), parent, three_balloons());
    let ops = host.ops().len();
    let second = create_controller(&cache, host.clone(), parent, Options::default());

    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
    assert_eq!(host.ops().len(), ops);
    assert_eq!(second.balloons().len(), 3);
}

#[test]
fn test_concurrent_attach_builds_one_controller() {
    const THREADS: usize = 4;

    for _ in 0..50 {
        let (host, parent) = setup(Size::new(300.0, 200.0));
        let cache = MemoryCache::new();
        let barrier = Barrier::new(THREADS);

        let controllers: Vec<Controller> = thread::scope(|s| {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        create_controller(&cache, host.clone(), parent, three_balloons())
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert!(controllers.iter().all(|c| *c == controllers[0]));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(parent), Some(controllers[0].clone()));
        assert_eq!(host.children(parent).len(), 2);
        assert_eq!(controllers[0].state(), LifecycleState::Enabled);
        assert_eq!(controllers[0].balloons().len(), 3);
    }
}

#[tokio::test]
async fn test_square_container_sets_radius() {
    let (host, parent) = setup(Size::new(240.0, 240.0));
    let controller = attach(&host, parent, three_balloons());

    assert_eq!(controller.radius(), 240.0);
    let balloon = &controller.balloons()[0];
    assert_eq!(balloon.radius, 240.0);
    assert_eq!(
        host.style(balloon.nodes.container).number("left"),
        Some(240.0)
    );
}

#[tokio::test]
async fn test_non_square_container_keeps_configured_radius() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());

    assert_eq!(controller.radius(), 100.0);
    let balloon = &controller.balloons()[1];
    assert_eq!(
        host.style(balloon.nodes.container).number("top"),
        Some(-100.0)
    );
}

#[tokio::test]
async fn test_center_marker() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let options = Options {
        center: true,
        ..three_balloons()
    };
    let controller = attach(&host, parent, options);

    let anchor = controller.anchor().unwrap();
    let center = anchor.center.unwrap();
    assert_eq!(host.class(center).unwrap().as_str(), "balloon-center");
    assert_eq!(host.children(anchor.root)[0], center);

    let style = host.style(center);
    assert_eq!(style.number("width"), Some(100.0));
    assert_eq!(style.number("left"), Some(-50.0));
    assert_eq!(style.number("opacity"), Some(0.5));
}

#[tokio::test]
async fn test_invalid_specs_are_skipped_with_dense_indices() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let options = Options::default().with_balloons(vec![
        BalloonSpec::at(45.0),
        BalloonSpec::default(),
        BalloonSpec::at(f64::NAN),
        BalloonSpec::at(90.0).with_radius(f64::INFINITY),
        BalloonSpec::at(400.0),
    ]);
    let controller = attach(&host, parent, options);

    let balloons = controller.balloons();
    assert_eq!(balloons.len(), 2);
    assert_eq!(balloons[0].index, 0);
    assert_eq!(balloons[1].index, 1);
    assert_eq!(balloons[1].angle_degrees, 40.0);
    assert_eq!(host.content(balloons[1].nodes.inner).unwrap(), "40º");
}

#[tokio::test]
async fn test_balloon_nodes() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let options = three_balloons().with_renderer(|angle, index| format!("{index}:{angle}"));
    let controller = attach(&host, parent, options);
    let root = controller.anchor().unwrap().root;

    let balloon = &controller.balloons()[2];
    assert_eq!(host.class(balloon.nodes.container).unwrap().as_str(), "balloon");
    assert_eq!(host.class(balloon.nodes.inner).unwrap().as_str(), "balloon-inner");
    assert_eq!(host.children(root)[2], balloon.nodes.container);
    assert_eq!(host.children(balloon.nodes.container), vec![balloon.nodes.inner]);
    assert_eq!(host.content(balloon.nodes.inner).unwrap(), "2:180");

    let style = host.style(balloon.nodes.inner);
    assert_eq!(style["display"].to_string(), "none");
    assert_eq!(style["transform"].to_string(), "rotate(-90deg)");
}

#[tokio::test(start_paused = true)]
async fn test_show_staggers_fades() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());
    let start = Instant::now();

    assert_eq!(controller.show().await, Ok(()));

    assert!(start.elapsed() >= TIMEOUT * 3);
    let inner: Vec<_> = controller.balloons().iter().map(|b| b.nodes.inner).collect();
    let expected: Vec<_> = inner.iter().map(|node| (*node, Fade::In)).collect();
    assert_eq!(host.fades(), expected);
    assert!(host.ops().iter().any(|op| matches!(
        op,
        HostOp::Fade { duration, .. } if *duration == Duration::from_millis(600)
    )));
}

#[tokio::test(start_paused = true)]
async fn test_hide_waits_for_running_show() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());

    let show = controller.show();
    let hide = controller.hide();

    assert_eq!(hide.await, Ok(()));
    assert_eq!(show.await, Ok(()));
    let fades: Vec<_> = host.fades().into_iter().map(|(_, fade)| fade).collect();
    assert_eq!(
        fades,
        vec![Fade::In, Fade::In, Fade::In, Fade::Out, Fade::Out, Fade::Out]
    );
}

#[tokio::test(start_paused = true)]
async fn test_autoshow() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let options = Options {
        autoshow: true,
        ..three_balloons()
    };
    let _controller = attach(&host, parent, options);

    sleep(TIMEOUT * 4).await;

    assert_eq!(host.fades().len(), 3);
    assert!(host.fades().iter().all(|(_, fade)| *fade == Fade::In));
}

#[tokio::test]
async fn test_show_now_and_hide_now() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());

    controller.show_now().hide_now();

    let fades: Vec<_> = host.fades().into_iter().map(|(_, fade)| fade).collect();
    assert_eq!(
        fades,
        vec![Fade::In, Fade::In, Fade::In, Fade::Out, Fade::Out, Fade::Out]
    );
}

#[tokio::test]
async fn test_rotate_is_relative_to_base_angle() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());
    let balloon = controller.balloons()[0].clone();

    controller.rotate(30.0).rotate(30.0);

    let expected = geometry::polar_to_offset(100.0, 30.0);
    let container = host.style(balloon.nodes.container);
    assert_eq!(container.number("left"), Some(expected.x.into()));
    assert_eq!(container.number("top"), Some(expected.y.into()));
    assert_eq!(
        host.style(balloon.nodes.inner)["transform"].to_string(),
        "rotate(60deg)"
    );

    let animations = host
        .ops()
        .into_iter()
        .filter(|op| matches!(op, HostOp::Animate { duration, .. } if *duration == TIMEOUT))
        .count();
    assert_eq!(animations, 6);
    assert_eq!(controller.balloons()[0].angle_degrees, 0.0);
}

#[tokio::test]
async fn test_rotate_without_content_rotation() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let options = Options {
        rotate_content: false,
        ..three_balloons()
    };
    let controller = attach(&host, parent, options);
    let inner = controller.balloons()[0].nodes.inner;

    controller.rotate(90.0);

    assert!(host.style(inner).get("transform").is_none());
}

#[tokio::test]
async fn test_rotate_ignores_non_finite_offset() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());
    let ops = host.ops().len();

    controller.rotate(f64::NAN).rotate(f64::INFINITY);

    assert_eq!(host.ops().len(), ops);
}

#[tokio::test]
async fn test_hover_expands_and_restores() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let options = Options {
        opacity: Some(0.6),
        ..three_balloons()
    };
    let controller = attach(&host, parent, options);
    let inner = controller.balloons()[0].nodes.inner;

    assert_eq!(host.dispatch(inner, Pointer::Enter), 1);
    let style = host.style(inner);
    assert_eq!(style.number("width"), Some(30.0));
    assert_eq!(style.number("margin-left"), Some(-15.0));
    assert_eq!(style.number("opacity"), Some(1.0));
    assert!(controller.balloons()[0].expanded);

    host.dispatch(inner, Pointer::Leave);
    let style = host.style(inner);
    assert_eq!(style.number("width"), Some(10.0));
    assert_eq!(style.number("opacity"), Some(0.6));
    assert!(!controller.balloons()[0].expanded);
}

#[tokio::test]
async fn test_hover_round_trip_restores_bordered_style() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let options = Options {
        border: Some("2px solid white".to_string()),
        ..three_balloons()
    };
    let controller = attach(&host, parent, options);
    let inner = controller.balloons()[0].nodes.inner;
    let before = host.style(inner);
    assert_eq!(before.number("margin-top"), Some(-6.0));

    host.dispatch(inner, Pointer::Enter);
    assert_eq!(host.style(inner).number("margin-left"), Some(-16.0));

    host.dispatch(inner, Pointer::Leave);
    assert_eq!(host.style(inner), before);
}

#[tokio::test]
async fn test_hover_without_expansion() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let options = Options {
        expansible: Expansible::disabled(),
        ..three_balloons()
    };
    let controller = attach(&host, parent, options);
    let inner = controller.balloons()[0].nodes.inner;

    host.dispatch(inner, Pointer::Enter);

    assert_eq!(host.style(inner).number("width"), Some(10.0));
    assert!(!controller.balloons()[0].expanded);
    assert!(!host.ops().iter().any(|op| matches!(op, HostOp::Stop { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_disabled_controller_ignores_operations() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());
    let inner = controller.balloons()[0].nodes.inner;
    let ops = host.ops().len();

    controller.disable();
    assert_eq!(controller.state(), LifecycleState::Disabled);

    controller.rotate(45.0).show_now();
    host.dispatch(inner, Pointer::Enter);
    assert_eq!(controller.show().await, Ok(()));
    assert_eq!(host.ops().len(), ops);

    controller.enable().show_now();
    assert_eq!(host.fades().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_disable_fails_running_show() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = attach(&host, parent, three_balloons());

    let show = controller.show();
    sleep(TIMEOUT / 2).await;
    controller.disable();

    assert_eq!(
        show.await,
        Err(SequenceError::Disabled { completed: 1 })
    );
    assert_eq!(host.fades().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_show_before_init_resolves_immediately() {
    let (host, parent) = setup(Size::new(300.0, 200.0));
    let controller = Controller::new(host.clone(), parent, three_balloons());
    let start = Instant::now();

    assert_eq!(controller.state(), LifecycleState::Uninitialized);
    assert_eq!(controller.show().await, Ok(()));
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert!(host.ops().is_empty());
}

#[test]
fn test_show_outside_tokio_runs_in_background() {
    let host = Arc::new(RecordingHost::new());
    let parent = host.add_container(Size::new(300.0, 200.0));
    let options = Options {
        timeout: Duration::from_millis(1),
        ..three_balloons()
    };
    let controller = create_controller(&MemoryCache::new(), host.clone(), parent, options);
    let (tx, rx) = std::sync::mpsc::channel();

    let _ = controller.show().always(move || {
        let _ = tx.send(());
    });

    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    assert_eq!(host.fades().len(), 3);
}
