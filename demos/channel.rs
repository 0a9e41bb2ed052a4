use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

#[derive(Clone, Debug)]
struct PowerStatus;

const TAG_POWER_STATUS: i32 = 0;

// No pub-sub channel type exists in this crate; a broadcast is just the
// publisher addressing every subscriber directly, which is what a
// channel's `Publish` ends up doing internally anyway.
struct Broadcaster {
    subscribers: Vec<Identity>,
}

impl Actor for Broadcaster {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        if msg.tag == TAG_POWER_STATUS {
            for &sub in &self.subscribers {
                ctx.send(sub, Message::new(PowerStatus, TAG_POWER_STATUS));
            }
        }
    }
}

struct Subscriber {
    label: &'static str,
}

impl Actor for Subscriber {
    fn receive(&mut self, _ctx: &Context, msg: Message) {
        if let Ok(status) = msg.downcast::<PowerStatus>() {
            println!("{}: -> got msg: {:?}", self.label, status);
        }
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let gps = sys
        .add_actor(Arc::new(|| Box::new(Subscriber { label: "gps-actor" }) as Box<dyn Actor>), "gps-actor")
        .unwrap();
    let nav = sys
        .add_actor(
            Arc::new(|| Box::new(Subscriber { label: "navigation-actor" }) as Box<dyn Actor>),
            "navigation-actor",
        )
        .unwrap();

    let broadcaster = sys
        .add_actor(
            Arc::new(move || Box::new(Broadcaster { subscribers: vec![gps, nav] }) as Box<dyn Actor>),
            "power-status-broadcaster",
        )
        .unwrap();

    std::thread::sleep(Duration::from_millis(200));

    println!("Sending PowerStatus message to all subscribers");
    sys.send(broadcaster, Message::new((), TAG_POWER_STATUS));

    std::thread::sleep(Duration::from_millis(200));
    sys.shutdown(true);
}
