use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;
use kestrel::testkit::probe;

struct Child;

impl Actor for Child {
    fn receive(&mut self, _ctx: &Context, msg: Message) {
        let p = msg.downcast::<kestrel::testkit::Probe<()>>().unwrap();
        p.event(());
    }
}

#[derive(Default)]
struct SelectTest;

impl Actor for SelectTest {
    fn pre_start(&mut self, ctx: &Context) {
        let child = Arc::new(|| Box::new(Child) as Box<dyn Actor>);
        ctx.add_child(child.clone(), "child_a").unwrap();
        ctx.add_child(child, "child_b").unwrap();
    }

    fn receive(&mut self, _ctx: &Context, _msg: Message) {}
}

#[test]
fn get_actor_from_path_resolves_a_registered_child() {
    let sys = ActorSystem::create(Settings::default());
    sys.add_actor(Arc::new(|| Box::new(SelectTest::default()) as Box<dyn Actor>), "select-actor")
        .unwrap();

    std::thread::sleep(Duration::from_millis(100));

    let child_a = sys
        .get_actor_from_path("/root/user/select-actor/child_a")
        .expect("child_a should be registered under select-actor");

    let (p, rx) = probe::<()>();
    sys.send(child_a, Message::new(p, 0));
    rx.assert_recv((), Duration::from_secs(1));

    assert!(sys.get_actor_from_path("/root/user/select-actor/missing").is_none());

    sys.shutdown(true);
}

struct AliasTarget {
    probe: kestrel::testkit::Probe<Identity>,
}

impl Actor for AliasTarget {
    fn receive(&mut self, ctx: &Context, _msg: Message) {
        self.probe.event(ctx.myself);
    }
}

struct AliasSender;

impl Actor for AliasSender {
    fn pre_start(&mut self, ctx: &Context) {
        ctx.send_via_alias("workers", Message::new((), 0));
    }

    fn receive(&mut self, _ctx: &Context, _msg: Message) {}
}

#[test]
fn send_via_alias_resolves_to_the_deterministic_member() {
    let sys = ActorSystem::create(Settings::default());
    let (p, rx) = probe::<Identity>();

    let a_probe = p.clone();
    let a = sys
        .add_actor(Arc::new(move || Box::new(AliasTarget { probe: a_probe.clone() }) as Box<dyn Actor>), "worker-a")
        .unwrap();
    let b_probe = p.clone();
    let b = sys
        .add_actor(Arc::new(move || Box::new(AliasTarget { probe: b_probe.clone() }) as Box<dyn Actor>), "worker-b")
        .unwrap();
    sys.set_alias(a, "workers");
    sys.set_alias(b, "workers");

    sys.add_actor(Arc::new(|| Box::new(AliasSender) as Box<dyn Actor>), "alias-sender")
        .unwrap();

    let expected = a.min(b);
    rx.assert_recv(expected, Duration::from_secs(1));

    sys.shutdown(true);
}

#[test]
fn actor_names_reject_path_separators_and_wildcards() {
    let sys = ActorSystem::create(Settings::default());
    let factory = Arc::new(|| Box::new(Child) as Box<dyn Actor>);

    assert!(sys.add_actor(factory.clone(), "foo").is_ok());
    assert!(sys.add_actor(factory.clone(), "foo/bar").is_err());
    assert!(sys.add_actor(factory.clone(), "*").is_err());
    assert!(sys.add_actor(factory.clone(), "foo`").is_err());
    assert!(sys.add_actor(factory, "foo@").is_err());

    sys.shutdown(true);
}
