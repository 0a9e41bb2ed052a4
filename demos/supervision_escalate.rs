use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

#[derive(Default)]
struct DumbActor;

impl Actor for DumbActor {
    fn receive(&mut self, _ctx: &Context, _msg: Message) {}
}

const TAG_PANIC: i32 = 0;

// Panics on every message and asks its own parent to answer for the
// failure instead of handling it locally.
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

    fn receive(&mut self, _ctx: &Context, msg: Message) {
        if msg.tag == TAG_PANIC {
            panic!("// TEST PANIC // TEST PANIC // TEST PANIC //");
        }
    }

    fn supervisor_strategy(&self) -> SupervisorStrategy {
        SupervisorStrategy::Escalate
    }
}

// Also escalates, so a panic two levels down climbs all the way to
// `EscRestartSup` before anything actually restarts.
#[derive(Default)]
struct EscalateSup {
    actor_to_fail: Option<Identity>,
}

impl Actor for EscalateSup {
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

    fn supervisor_strategy(&self) -> SupervisorStrategy {
        SupervisorStrategy::Escalate
    }
}

#[derive(Default)]
struct EscRestartSup {
    escalator: Option<Identity>,
}

impl Actor for EscRestartSup {
    fn pre_start(&mut self, ctx: &Context) {
        self.escalator = ctx
            .add_child(Arc::new(|| Box::new(EscalateSup::default()) as Box<dyn Actor>), "escalate-supervisor")
            .ok();
    }

    fn post_restart(&mut self, ctx: &Context) {
        println!("{}: restarted after the escalation reached it", ctx.myself);
    }

    fn receive(&mut self, ctx: &Context, msg: Message) {
        if let Some(target) = self.escalator {
            ctx.send(target, msg);
        }
    }

    fn supervisor_strategy(&self) -> SupervisorStrategy {
        SupervisorStrategy::Restart
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let sup = sys
        .add_actor(Arc::new(|| Box::new(EscRestartSup::default()) as Box<dyn Actor>), "supervisor")
        .unwrap();

    println!("Before panic we see supervisor and the actor that will panic!");
    std::thread::sleep(Duration::from_millis(200));

    sys.send(sup, Message::new((), TAG_PANIC));
    std::thread::sleep(Duration::from_millis(200));
    println!("The panic escalated two levels up; only the top supervisor restarted.");

    sys.shutdown(true);
}
