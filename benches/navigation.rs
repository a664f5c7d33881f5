use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use scene_nav::logging::{LogEvent, LogSink};
use scene_nav::{
    AnimationKind, Logger, LoggingResult, Navigator, NavigatorConfig, NullHost, SceneBuilder,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

fn build_navigator() -> Navigator {
    let mut config = NavigatorConfig::default().with_logger(Logger::new(NullSink));
    config.enable_metrics();
    Navigator::with_config(NullHost, config)
}

fn push_pop_cycle(c: &mut Criterion) {
    c.bench_function("push_pop_cycle", |b| {
        b.iter(|| {
            let mut nav = build_navigator();
            let root = nav.root();
            for n in 0..32 {
                let scene = nav.create_scene(SceneBuilder::new(format!("scene-{n}")));
                nav.push(root, scene, AnimationKind::Push).expect("push");
            }
            black_box(nav.pop_back_stack(root, "scene-1", true));
        });
    });
}

fn nested_lookup(c: &mut Criterion) {
    let mut nav = build_navigator();
    let mut container = nav.root();
    for depth in 0..16 {
        let tabs = nav.create_scene(SceneBuilder::new(format!("tabs-{depth}")));
        nav.add_to_added_list(container, tabs, true).expect("attach");
        for n in 0..4 {
            let sibling = nav.create_scene(SceneBuilder::new(format!("leaf-{depth}-{n}")));
            nav.add_to_added_list(container, sibling, false).expect("attach");
        }
        container = nav.scene(tabs).expect("live").child_container();
    }
    let root = nav.root();
    c.bench_function("nested_lookup", |b| {
        b.iter(|| black_box(nav.find_scene(root, black_box("leaf-15-0"))));
    });
}

fn present_dismiss_cycle(c: &mut Criterion) {
    c.bench_function("present_dismiss_cycle", |b| {
        b.iter(|| {
            let mut nav = build_navigator();
            let root = nav.root();
            let home = nav.create_scene(SceneBuilder::new("home"));
            nav.push(root, home, AnimationKind::Push).expect("push");
            for n in 0..8 {
                let modal = nav.create_scene(SceneBuilder::new(format!("modal-{n}")));
                nav.present(home, modal, n).expect("present");
                black_box(nav.dismiss_presentation(modal));
            }
        });
    });
}

criterion_group!(benches, push_pop_cycle, nested_lookup, present_dismiss_cycle);
criterion_main!(benches);
