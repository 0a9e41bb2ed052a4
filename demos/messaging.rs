use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

// Define the messages we'll use. #[derive(Tagged)] assigns each variant a
// stable tag so Message::new(payload, payload.tag()) can't drift out of
// sync with the match in `receive`.
#[derive(Tagged)]
enum CounterMsg {
    Add,
    Sub,
    Print,
}

struct Counter {
    count: u32,
}

impl Actor for Counter {
    fn receive(&mut self, _ctx: &Context, msg: Message) {
        match msg.tag {
            CounterMsg::ADD_TAG => self.count += 1,
            CounterMsg::SUB_TAG => self.count -= 1,
            CounterMsg::PRINT_TAG => println!("Total counter value: {}", self.count),
            _ => {}
        }
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let factory = Arc::new(|| Box::new(Counter { count: 0 }) as Box<dyn Actor>);
    let actor = sys.add_actor(factory, "counter").unwrap();

    sys.send(actor, Message::new((), CounterMsg::Add.tag()));
    sys.send(actor, Message::new((), CounterMsg::Add.tag()));
    sys.send(actor, Message::new((), CounterMsg::Sub.tag()));
    sys.send(actor, Message::new((), CounterMsg::Print.tag()));

    // force main to wait before exiting program
    std::thread::sleep(Duration::from_millis(500));
    sys.shutdown(true);
}
