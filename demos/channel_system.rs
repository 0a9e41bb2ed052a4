use std::sync::Arc;
use std::time::Duration;

use kestrel::message::TAG_TERMINATED;
use kestrel::prelude::*;

const TAG_PANIC: i32 = 0;

#[derive(Default)]
struct DumbActor;

impl Actor for DumbActor {
    fn receive(&mut self, _ctx: &Context, msg: Message) {
        if msg.tag == TAG_PANIC {
            panic!("// TEST PANIC // TEST PANIC // TEST PANIC //");
        }
    }
}

/// Watches `dumb-actor` and prints a line for its restarts (observed as
/// ordinary replies since a restart doesn't terminate the cell) and for
/// its eventual termination.
struct WatcherActor {
    watched: Identity,
}

impl Actor for WatcherActor {
    fn pre_start(&mut self, ctx: &Context) {
        ctx.watch(self.watched);
    }

    fn receive(&mut self, ctx: &Context, msg: Message) {
        if msg.tag == TAG_TERMINATED {
            println!("{}: -> saw termination of {:?}", ctx.myself, msg.source);
        }
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let dumb = sys
        .add_actor(Arc::new(|| Box::new(DumbActor) as Box<dyn Actor>), "dumb-actor")
        .unwrap();

    let _watcher = sys
        .add_actor(Arc::new(move || Box::new(WatcherActor { watched: dumb }) as Box<dyn Actor>), "watcher-actor")
        .unwrap();

    std::thread::sleep(Duration::from_millis(200));

    println!("Send Panic message to dumb actor to force a restart");
    sys.send(dumb, Message::new((), TAG_PANIC));
    std::thread::sleep(Duration::from_millis(200));

    println!("Stopping dumb actor");
    sys.stop(dumb);
    std::thread::sleep(Duration::from_millis(200));

    sys.shutdown(true);
}
