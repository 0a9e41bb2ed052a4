use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;
use kestrel::testkit::probe;

const TAG_ADD: i32 = 0;
const TAG_PROBE: i32 = 1;

struct Counter {
    count: Arc<AtomicU32>,
}

impl Actor for Counter {
    fn receive(&mut self, _ctx: &Context, msg: Message) {
        match msg.tag {
            TAG_ADD => {
                self.count.fetch_add(1, Ordering::SeqCst);
            }
            TAG_PROBE => {
                let p = msg.downcast::<kestrel::testkit::Probe<u32>>().unwrap();
                p.event(self.count.load(Ordering::SeqCst));
            }
            _ => {}
        }
    }
}

#[test]
fn actor_create_rejects_invalid_names() {
    let sys = ActorSystem::create(Settings::default());
    let factory = Arc::new(|| Box::new(Counter { count: Arc::new(AtomicU32::new(0)) }) as Box<dyn Actor>);

    assert!(sys.add_actor(factory.clone(), "valid-name").is_ok());
    assert!(sys.add_actor(factory.clone(), "/").is_err());
    assert!(sys.add_actor(factory.clone(), "*").is_err());
    assert!(sys.add_actor(factory.clone(), "a/b/c").is_err());
    assert!(sys.add_actor(factory.clone(), "@").is_err());
    assert!(sys.add_actor(factory.clone(), "#").is_err());
    assert!(sys.add_actor(factory, "").is_err());

    sys.shutdown(true);
}

#[test]
fn actor_create_rejects_duplicate_sibling_names() {
    let sys = ActorSystem::create(Settings::default());
    let factory = Arc::new(|| Box::new(Counter { count: Arc::new(AtomicU32::new(0)) }) as Box<dyn Actor>);

    assert!(sys.add_actor(factory.clone(), "dup").is_ok());
    assert!(sys.add_actor(factory, "dup").is_err());

    sys.shutdown(true);
}

#[test]
fn actor_send_is_processed_in_order() {
    // A generous queue_size so this burst never has to contend with the
    // bounded normal-priority lane before the worker pool has a chance to
    // drain it.
    let settings = Settings { queue_size: 20_000, ..Settings::default() };
    let sys = ActorSystem::create(settings);
    let count = Arc::new(AtomicU32::new(0));
    let actor = sys
        .add_actor(
            Arc::new({
                let count = count.clone();
                move || Box::new(Counter { count: count.clone() }) as Box<dyn Actor>
            }),
            "counter",
        )
        .unwrap();

    for _ in 0..10_000 {
        sys.send(actor, Message::new((), TAG_ADD));
    }

    let (p, rx) = probe::<u32>();
    sys.send(actor, Message::new(p, TAG_PROBE));
    rx.assert_recv(10_000, Duration::from_secs(2));

    sys.shutdown(true);
}

struct Child;

impl Actor for Child {
    fn receive(&mut self, _ctx: &Context, _msg: Message) {}
}

struct Parent {
    probe: Option<kestrel::testkit::Probe<()>>,
}

impl Actor for Parent {
    fn pre_start(&mut self, ctx: &Context) {
        let factory = Arc::new(|| Box::new(Child) as Box<dyn Actor>);
        ctx.add_child(factory.clone(), "child_a").unwrap();
        ctx.add_child(factory.clone(), "child_b").unwrap();
        ctx.add_child(factory.clone(), "child_c").unwrap();
        ctx.add_child(factory, "child_d").unwrap();
    }

    fn receive(&mut self, _ctx: &Context, msg: Message) {
        self.probe = msg.downcast::<kestrel::testkit::Probe<()>>().ok();
    }

    fn post_stop(&mut self, _ctx: &Context) {
        // All children must already be gone by the time the parent's own
        // post_stop runs, since the stop cascade finishes children first.
        if let Some(p) = self.probe.take() {
            p.event(());
        }
    }
}

#[test]
fn actor_stop_cascades_to_children_before_parent_post_stop() {
    let sys = ActorSystem::create(Settings::default());
    let parent = sys
        .add_actor(Arc::new(|| Box::new(Parent { probe: None }) as Box<dyn Actor>), "parent")
        .unwrap();

    let (p, rx) = probe::<()>();
    sys.send(parent, Message::new(p, 0));
    std::thread::sleep(Duration::from_millis(100));

    sys.stop(parent);
    rx.assert_recv((), Duration::from_secs(1));

    sys.shutdown(true);
}
