use std::sync::Arc;
use std::time::Duration;

use kestrel::deadletter::DeadLetterSink;
use kestrel::identity::Identity;
use kestrel::message::Message;
use kestrel::prelude::*;
use kestrel::testkit::probe;

const TAG_SOME_MESSAGE: i32 = 0;

#[derive(Default)]
struct DumbActor;

impl Actor for DumbActor {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        if msg.tag == TAG_SOME_MESSAGE {
            println!("{}: got msg", ctx.myself);
        }
    }
}

/// Collects every dead letter onto a probe instead of just logging it, so
/// a caller can observe the event deterministically.
struct ProbeDeadLetterSink(kestrel::testkit::Probe<(Option<Identity>, i32)>);

impl DeadLetterSink for ProbeDeadLetterSink {
    fn deliver(&self, dest: Option<Identity>, msg: Message) {
        self.0.event((dest, msg.tag));
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let (probe_tx, probe_rx) = probe::<(Option<Identity>, i32)>();
    sys.set_dead_letter_sink(Arc::new(ProbeDeadLetterSink(probe_tx)));

    println!("Creating dumb actor");
    let dumb = sys
        .add_actor(Arc::new(|| Box::new(DumbActor) as Box<dyn Actor>), "dumb-actor")
        .unwrap();

    println!("Stopping dumb actor");
    sys.stop(dumb);
    std::thread::sleep(Duration::from_millis(200));

    println!("Sending SomeMessage to the now-stopped actor");
    sys.send(dumb, Message::new((), TAG_SOME_MESSAGE));

    match probe_rx.recv(Duration::from_millis(500)) {
        Some((dest, tag)) => println!("dead letter observed: dest={:?} tag={}", dest, tag),
        None => println!("no dead letter observed"),
    }

    sys.shutdown(true);
}
