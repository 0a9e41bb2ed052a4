use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;

#[derive(Default)]
struct Child;

impl Actor for Child {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        let text = msg.downcast::<String>().unwrap_or_default();
        println!("{}: got msg: {}", ctx.myself, text);
    }
}

#[derive(Default)]
struct SelectTest;

impl Actor for SelectTest {
    fn pre_start(&mut self, ctx: &Context) {
        let child = Arc::new(|| Box::new(Child) as Box<dyn Actor>);
        let a = ctx.add_child(child.clone(), "child_a").unwrap();
        let b = ctx.add_child(child, "child_b").unwrap();
        // `child_a` answers to both its path and a shared alias, so a
        // caller that only knows the alias can still reach it.
        ctx.system().set_alias(a, "workers");
        ctx.system().set_alias(b, "workers");
    }

    fn receive(&mut self, ctx: &Context, msg: Message) {
        let text = msg.downcast::<String>().unwrap_or_default();
        println!("select-actor: got msg: {}", text);

        // absolute path lookup: /root/user/select-actor/child_a
        let path = "/root/user/select-actor/child_a";
        if let Some(dest) = ctx.system().get_actor_from_path(path) {
            println!("select-actor: -> path: {}", path);
            ctx.send(dest, Message::new(path.to_string(), 0));
        }

        // alias lookup: whichever child currently answers to "workers"
        println!("select-actor: -> alias: workers");
        ctx.send_via_alias("workers", Message::new("workers".to_string(), 0));
    }
}

fn main() {
    let sys = ActorSystem::create(Settings::default());

    let actor = sys
        .add_actor(Arc::new(|| Box::new(SelectTest::default()) as Box<dyn Actor>), "select-actor")
        .unwrap();

    sys.send(actor, Message::new("msg for select-actor".to_string(), 0));

    std::thread::sleep(Duration::from_millis(300));
    sys.shutdown(true);
}
