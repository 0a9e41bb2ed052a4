use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

#[test]
fn system_create_succeeds_with_default_settings() {
    let sys = ActorSystem::create(Settings::default());
    assert!(sys.get_actor_from_path("/root").is_some());
    assert!(sys.get_actor_from_path("/root/user").is_some());
    assert!(sys.get_actor_from_path("/root/system").is_some());
    sys.shutdown(true);
}

struct ShutdownTest {
    level: u32,
}

impl Actor for ShutdownTest {
    fn pre_start(&mut self, ctx: &Context) {
        if self.level < 10 {
            let level = self.level + 1;
            let name = format!("test-actor-{}", level);
            ctx.add_child(Arc::new(move || Box::new(ShutdownTest { level }) as Box<dyn Actor>), &name)
                .unwrap();
        }
    }

    fn receive(&mut self, _ctx: &Context, _msg: Message) {}
}

#[test]
fn system_shutdown_tears_down_a_deep_actor_tree() {
    let sys = ActorSystem::create(Settings::default());

    let _ = sys
        .add_actor(Arc::new(|| Box::new(ShutdownTest { level: 1 }) as Box<dyn Actor>), "test-actor-1")
        .unwrap();

    // await_termination blocks until only the three bootstrap roots remain.
    sys.shutdown(true);
}

#[test]
fn settings_default_is_internally_consistent() {
    let settings = Settings::default();
    assert!(settings.parallelism >= 1);
    let (lo, hi) = settings.resource_pool_bounds();
    assert!(lo <= hi);
}

#[test]
fn ask_returns_the_actors_reply() {
    struct Doubler;
    impl Actor for Doubler {
        fn receive(&mut self, ctx: &Context, msg: Message) {
            if let Some(sender) = msg.source {
                let n = msg.downcast::<u32>().unwrap_or(0);
                ctx.send(sender, Message::new(n * 2, 0));
            }
        }
    }

    let sys = ActorSystem::create(Settings::default());
    let actor = sys
        .add_actor(Arc::new(|| Box::new(Doubler) as Box<dyn Actor>), "doubler")
        .unwrap();

    let reply = sys
        .ask(actor, Message::new(21_u32, 0), Duration::from_secs(1))
        .expect("doubler should reply before the timeout");
    assert_eq!(reply.downcast::<u32>().unwrap(), 42);

    sys.shutdown(true);
}

#[test]
fn ask_times_out_when_nobody_replies() {
    struct Silent;
    impl Actor for Silent {
        fn receive(&mut self, _ctx: &Context, _msg: Message) {}
    }

    let sys = ActorSystem::create(Settings::default());
    let actor = sys
        .add_actor(Arc::new(|| Box::new(Silent) as Box<dyn Actor>), "silent")
        .unwrap();

    let reply = sys.ask(actor, Message::new((), 0), Duration::from_millis(100));
    assert!(reply.is_err());

    sys.shutdown(true);
}
