use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

const TAG_PRINT: i32 = 0;

#[derive(Default)]
struct Child;

impl Actor for Child {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        if msg.tag == TAG_PRINT {
            let text = msg.downcast::<String>().unwrap_or_default();
            println!("child got a message {}", text);
        }
    }
}

const TAG_KILL_CHILD: i32 = 1;
const TAG_OTHER: i32 = 2;

struct MyActor {
    child: Option<Identity>,
}

impl Actor for MyActor {
    fn pre_start(&mut self, ctx: &Context) {
        self.child = ctx.add_child(Arc::new(|| Box::new(Child) as Box<dyn Actor>), "my-child").ok();
    }

    fn receive(&mut self, ctx: &Context, msg: Message) {
        match msg.tag {
            TAG_KILL_CHILD => {
                if let Some(child) = self.child.take() {
                    ctx.system().stop(child);
                }
            }
            TAG_OTHER => {
                let text = msg.downcast::<String>().unwrap_or_default();
                println!("parent got a message {}", text);
                if let Some(child) = self.child {
                    ctx.send(child, Message::new(text, TAG_PRINT));
                }
            }
            _ => {}
        }
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    println!("Starting actor my-actor");
    let my_actor = sys
        .add_actor(Arc::new(|| Box::new(MyActor { child: None }) as Box<dyn Actor>), "my-actor")
        .unwrap();

    std::thread::sleep(Duration::from_millis(200));

    println!("Killing my-actor's child");
    sys.send(my_actor, Message::new((), TAG_KILL_CHILD));
    std::thread::sleep(Duration::from_millis(200));

    sys.shutdown(true);
}
