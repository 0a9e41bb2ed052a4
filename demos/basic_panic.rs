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

    fn receive(&mut self, _ctx: &Context, msg: Message) {
        if msg.tag == TAG_PANIC {
            panic!("// TEST PANIC // TEST PANIC // TEST PANIC //");
        }
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let sup = sys
        .add_actor(Arc::new(|| Box::new(PanicActor::default()) as Box<dyn Actor>), "panic_actor")
        .unwrap();

    println!("Before panic we see supervisor and actor that will panic!");
    std::thread::sleep(Duration::from_millis(200));

    sys.send(sup, Message::new((), TAG_PANIC));
    std::thread::sleep(Duration::from_millis(200));
    println!("We should see a panic printed above, but the default Restart strategy kept the actor alive!");

    sys.shutdown(true);
}
