use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

#[derive(Default)]
struct DumbActor;

impl Actor for DumbActor {
    fn receive(&mut self, _ctx: &Context, _msg: Message) {}
}

const TAG_PANIC: i32 = 0;

#[derive(Default)]
struct PanicActor;

impl Actor for PanicActor {
    fn pre_start(&mut self, ctx: &Context) {
        let dumb = || Box::new(DumbActor) as Box<dyn Actor>;
        ctx.add_child(Arc::new(dumb), "child_a").unwrap();
        ctx.add_child(Arc::new(dumb), "child_b").unwrap();
        ctx.add_child(Arc::new(dumb), "child_c").unwrap();
        ctx.add_child(Arc::new(dumb), "child_d").unwrap();
    }

    fn post_restart(&mut self, ctx: &Context) {
        println!("{}: restarted", ctx.myself);
    }

    fn receive(&mut self, _ctx: &Context, msg: Message) {
        if msg.tag == TAG_PANIC {
            panic!("// TEST PANIC // TEST PANIC // TEST PANIC //");
        }
    }

    // Restart is the default strategy; spelled out here for clarity.
    fn supervisor_strategy(&self) -> SupervisorStrategy {
        SupervisorStrategy::Restart
    }
}

#[derive(Default)]
struct RestartSup {
    actor_to_fail: Option<Identity>,
}

impl Actor for RestartSup {
    fn pre_start(&mut self, ctx: &Context) {
        self.actor_to_fail = ctx
            .add_child(Arc::new(|| Box::new(PanicActor::default()) as Box<dyn Actor>), "actor-to-fail")
            .ok();
    }

    fn receive(&mut self, ctx: &Context, msg: Message) {
        if let Some(target) = self.actor_to_fail {
            ctx.send(target, msg);
        }
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let sup = sys
        .add_actor(Arc::new(|| Box::new(RestartSup::default()) as Box<dyn Actor>), "supervisor")
        .unwrap();

    println!("Before panic we see supervisor and actor that will panic!");
    std::thread::sleep(Duration::from_millis(200));

    sys.send(sup, Message::new((), TAG_PANIC));
    std::thread::sleep(Duration::from_millis(200));
    println!("We should see panic printed, but we're still alive and the panic actor was restarted!");

    sys.shutdown(true);
}
