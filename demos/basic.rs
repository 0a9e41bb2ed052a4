use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

#[derive(Default)]
struct MyActor;

// implement the Actor trait
impl Actor for MyActor {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        let greeting = msg.downcast::<String>().unwrap_or_else(|_| "?".into());
        println!("{} received: {}", ctx.myself, greeting);
    }
}

// start the system and create an actor
fn main() {
    let sys = ActorSystem::create(Settings::default());

    let my_actor = sys
        .add_actor(Arc::new(|| Box::new(MyActor::default()) as Box<dyn Actor>), "my-actor")
        .unwrap();

    sys.send(my_actor, Message::new("Hello my actor!".to_string(), 0));

    std::thread::sleep(Duration::from_millis(500));
    sys.shutdown(true);
}
