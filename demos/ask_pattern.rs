use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

#[derive(Default)]
struct MyActor;

impl Actor for MyActor {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        // `source` is the transient pseudo-cell `ask` set up for this
        // request; replying is an ordinary send back to it.
        if let Some(sender) = msg.source {
            let n = msg.downcast::<u32>().unwrap_or(0);
            ctx.send(sender, Message::new(n * 2, 0));
        }
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let my_actor = sys
        .add_actor(Arc::new(|| Box::new(MyActor::default()) as Box<dyn Actor>), "my-actor")
        .unwrap();

    // `ask` blocks the calling thread on a transient pseudo-cell rather
    // than returning a future the caller has to drive to completion.
    let reply = sys.ask(my_actor, Message::new(100_u32, 0), Duration::from_secs(1));

    match reply {
        Ok(msg) => {
            let value = msg.downcast::<u32>().unwrap_or(0);
            println!("The result value is: {}", value);
        }
        Err(_) => println!("ask timed out"),
    }

    sys.shutdown(true);
}
